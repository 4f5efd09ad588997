#[cfg(feature = "async")]
mod enabled {
    use std::time::Duration;

    use smbmc::AsyncClient;

    #[tokio::main(flavor = "current_thread")]
    pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
        // Example:
        //   cargo run --example tokio_get_metrics --features async -- https://192.168.1.10 ADMIN password
        let mut args = std::env::args().skip(1);
        let server = args.next().ok_or("missing <server>")?;
        let username = args.next().ok_or("missing <username>")?;
        let password = args.next().ok_or("missing <password>")?;

        let client = AsyncClient::builder(server)
            .username(username)
            .password(password)
            .timeout(Duration::from_secs(5))
            .session_timeout(Duration::from_secs(10 * 60))
            .accept_invalid_certs(true)
            .build_async()?;

        let metrics = client.get_all_metrics().await?;
        println!("Metrics: {metrics:?}");
        println!("Session age: {:?}", client.session_age().await);

        Ok(())
    }
}

#[cfg(feature = "async")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    enabled::main()
}

#[cfg(not(feature = "async"))]
fn main() {
    eprintln!("This example requires feature `async` (or `tokio`).");
}
