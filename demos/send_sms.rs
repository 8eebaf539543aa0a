use std::io;

use fast2sms_relay::{RelayConfig, SendRequest, SmsRelay};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = RelayConfig::from_dotenv()?;

    let phone = std::env::var("FAST2SMS_PHONE").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "FAST2SMS_PHONE environment variable is required",
        )
    })?;

    let relay = SmsRelay::new(&config)?;
    // Without FAST2SMS_MESSAGE a timestamped test message is sent.
    let envelope = match std::env::var("FAST2SMS_MESSAGE") {
        Ok(message) => relay.send_sms(&SendRequest::new(phone, message)).await,
        Err(_) => relay.send_test(&phone).await,
    };
    println!("{}", serde_json::to_string_pretty(&envelope)?);

    Ok(())
}
