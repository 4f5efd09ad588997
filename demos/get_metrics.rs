use smbmc::{Client, ClientBuilder};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example:
    //   SMBMC_SERVER=https://192.168.1.10 SMBMC_USER=ADMIN SMBMC_PASS=password \
    //     cargo run --example get_metrics -- pmbus sensor
    let metrics: Vec<String> = std::env::args().skip(1).collect();

    let client: Client = ClientBuilder::from_env()?
        .accept_invalid_certs(true)
        .build()?;

    let metrics = if metrics.is_empty() {
        client.get_all_metrics()?
    } else {
        client.get_metrics(&metrics)?
    };

    for psu in metrics.pmbus.iter().flatten() {
        println!("PSU: {psu:?}");
    }
    for sensor in metrics.sensor.iter().flatten() {
        println!("Sensor: {sensor:?}");
    }

    Ok(())
}
