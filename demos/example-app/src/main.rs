mod app;

use rested::RestedConfig;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), app::BoxError> {
    rested::init_tracing();

    let config = RestedConfig::load("dev")?;
    let router = app::build(&config).await?;

    let addr = config.server()?.addr;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, profile = config.profile(), "Listening");
    rested::http::serve(listener, router).await?;
    Ok(())
}
