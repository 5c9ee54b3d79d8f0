use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use sms_udp_gateway::async_result::AsyncResult;
use sms_udp_gateway::config::GatewayConfig;
use sms_udp_gateway::datagram::DatagramChannel;
use sms_udp_gateway::gateway::Gateway;
use sms_udp_gateway::sms::{SmppTransport, SmsTransport};

const SEGMENT_QUEUE_LEN: usize = 64;

#[tokio::main]
async fn main() -> AsyncResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            tracing::info!("loading config from {}", path);
            GatewayConfig::load(path)?
        }
        None => GatewayConfig::default(),
    };

    let channel = DatagramChannel::bind_connected(
        config.udp.local_addr.as_str(),
        config.udp.server_addr.as_str(),
    )
    .await?;
    let mut transport = SmppTransport::connect(&config.sms).await?;
    let (listener, segments) = mpsc::channel(SEGMENT_QUEUE_LEN);
    transport.register_segment_listener(listener);

    Gateway::new(channel, transport, &config)
        .run(segments)
        .await?;
    Ok(())
}
