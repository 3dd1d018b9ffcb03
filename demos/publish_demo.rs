// ABOUTME: Connects, logs in, and publishes one message to an AMQP broker
// ABOUTME: Demo binary exercising the public Connection API end to end

use amqp091_core::{Connection, ConnectionConfig};
use argh::FromArgs;

/// publish a single message over a fresh AMQP connection
#[derive(FromArgs)]
struct Args {
    /// broker address, host:port
    #[argh(option, default = "String::from(\"127.0.0.1:5672\")")]
    addr: String,

    /// virtual host
    #[argh(option, default = "String::from(\"/\")")]
    vhost: String,

    /// SASL PLAIN username
    #[argh(option, default = "String::from(\"guest\")")]
    username: String,

    /// SASL PLAIN password
    #[argh(option, default = "String::from(\"guest\")")]
    password: String,

    /// exchange to publish to
    #[argh(option, default = "String::new()")]
    exchange: String,

    /// routing key
    #[argh(option, default = "String::from(\"demo\")")]
    routing_key: String,

    /// message body
    #[argh(option, default = "String::from(\"hello from amqp091-core\")")]
    message: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let args: Args = argh::from_env();
    let config = ConnectionConfig::plain(&args.vhost, &args.username, &args.password);

    tracing::info!(addr = %args.addr, "connecting");
    let mut connection = Connection::connect(args.addr.as_str(), config).await?;

    connection
        .basic_publish(
            &args.exchange,
            &args.routing_key,
            false,
            false,
            None,
            args.message.as_bytes(),
        )
        .await?;

    tracing::info!("message published");
    Ok(())
}
