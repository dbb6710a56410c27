use tokio::net::TcpListener;
use todo_server::config::ServerConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env();
    let addr = config.addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "listening");
    todo_server::run(listener).await
}
