use std::time::Duration;

use smbmc::{Client, SensorState, SensorType};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example:
    //   cargo run --example get_sensors -- https://192.168.1.10 ADMIN password
    let mut args = std::env::args().skip(1);
    let server = args.next().ok_or("missing <server>")?;
    let username = args.next().ok_or("missing <username>")?;
    let password = args.next().ok_or("missing <password>")?;

    let client = Client::builder(server)
        .username(username)
        .password(password)
        .timeout(Duration::from_secs(5))
        .accept_invalid_certs(true)
        .build()?;

    for sensor in client.get_sensor_metrics()? {
        match (sensor.sensor_type, sensor.flags) {
            (SensorType::PowerSupply, Some(flags)) => {
                let names: Vec<_> = flags.names().collect();
                println!("{:>3} {:<16} {}", sensor.id, sensor.name, names.join(" | "));
            }
            _ if sensor.state == SensorState::NotPresent => {
                println!("{:>3} {:<16} not present", sensor.id, sensor.name);
            }
            _ => println!(
                "{:>3} {:<16} {} {} (lc {}, uc {})",
                sensor.id, sensor.name, sensor.reading, sensor.unit, sensor.lc, sensor.uc
            ),
        }
    }

    Ok(())
}
