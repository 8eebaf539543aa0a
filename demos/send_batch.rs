use std::io;

use fast2sms_relay::{RelayConfig, SendRequest, SmsRelay};
use tracing_subscriber::EnvFilter;

/// Sends the same message to every number in `FAST2SMS_PHONES` (comma separated).
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = RelayConfig::from_dotenv()?;

    let phones = std::env::var("FAST2SMS_PHONES").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "FAST2SMS_PHONES environment variable is required",
        )
    })?;
    let message = std::env::var("FAST2SMS_MESSAGE")
        .unwrap_or_else(|_| "Your invoice is ready.".to_owned());

    let items = phones
        .split(',')
        .map(|phone| SendRequest::new(phone.trim(), message.clone()))
        .collect::<Vec<_>>();

    let relay = SmsRelay::new(&config)?;
    let envelope = relay.send_batch(items).await;
    println!("{}", serde_json::to_string_pretty(&envelope)?);

    Ok(())
}
