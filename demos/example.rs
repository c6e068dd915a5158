//! Walkthrough against a live secret service: store a secret, read it
//! back, delete it, and verify the deletion.
//!
//! Needs a running keyring daemon on the session bus; unlocking may
//! pop an interactive prompt.

use secret_service_app_client::{ClientConfig, Error, SecretClient};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = ClientConfig::new("secret-service-app-client-example");
    let mut client = SecretClient::connect(config).await?;

    client.unlock().await?;
    println!("collection unlocked");

    client.set("api_key", "secret123").await?;
    match client.get("api_key").await? {
        Some(value) => println!("stored and read back: {value}"),
        None => println!("stored value did not come back!"),
    }

    client.delete("api_key").await?;
    match client.get("api_key").await? {
        Some(_) => println!("deleted value is still there!"),
        None => println!("deleted and verified gone"),
    }

    client.close().await?;
    Ok(())
}
