use axum::{middleware, Router};
use minijinja::Environment;
use tower_http::services::ServeDir;

use crate::{config::Config, db::DB, notes, views::Views};

use super::{
    errors::{self, on_error},
    state::AppState,
};

pub async fn create_app(db: DB, config: &Config) -> errors::Result<Router> {
    let mut env = Environment::new();
    notes::add_templates(&mut env)?;
    notes::render::add_filters(&mut env);

    let views = Views::new(env);
    let state = AppState { conn: db, views };

    let app = Router::new()
        .merge(notes::router(state))
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .layer(middleware::from_fn(on_error));

    Ok(app)
}
