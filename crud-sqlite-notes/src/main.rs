mod app;
mod db;
mod notes;
mod shared;

pub use app::{
    config, create_app,
    errors::{self, Error, Result},
    state,
};
pub use db::{init_db, DB};
pub use shared::views;

use config::Config;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> errors::Result<()> {
    let config = Config::from_env()?;

    shared::tracing::setup_tracing(&config);

    let conn = init_db(&config).await?;

    let app = create_app(conn, &config).await?;

    let app = shared::tracing::add_tracing_layer(app);

    let listener = TcpListener::bind(config.addr()).await?;

    tracing::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
