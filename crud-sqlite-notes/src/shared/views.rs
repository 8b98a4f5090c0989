use std::{convert::Infallible, sync::Arc};

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{Html, IntoResponse, Response},
};
use minijinja::Environment;

use crate::errors::Error;

/// Compiled page templates shared by every request.
#[derive(Debug, Clone)]
pub struct Views {
    pub env: Arc<Environment<'static>>,
}

impl Views {
    pub fn new(env: Environment<'static>) -> Self {
        let engine = Arc::new(env);
        Self { env: engine }
    }
}

impl Views {
    pub fn response<D: serde::Serialize>(&self, key: &str, data: D) -> Response {
        match self.render(key, data) {
            Ok(x) => Html(x).into_response(),
            Err(err) => Error::from(err).into_response(),
        }
    }

    pub fn render<D: serde::Serialize>(&self, key: &str, data: D) -> std::result::Result<String, minijinja::Error> {
        let template = self.env.get_template(key)?;
        template.render(&data)
    }
}

#[async_trait]
impl<ApplicationState> FromRequestParts<ApplicationState> for Views
where
    Self: FromRef<ApplicationState>,
    ApplicationState: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(_: &mut Parts, state: &ApplicationState) -> std::result::Result<Self, Self::Rejection> {
        Ok(Self::from_ref(state))
    }
}
