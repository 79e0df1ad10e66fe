//! HTTP route handlers for Tessera.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use mosaic_common::{ErrorBody, MosaicError};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::blocks::BlockError;
use crate::partial::PartialError;
use crate::state::AppState;
use crate::template::TemplateError;

mod captcha;
mod health;
mod pages;

pub use pages::ClientAddr;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let media = ServeDir::new(&state.config.media_root);

    Router::new()
        // Health & Status
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))

        // CAPTCHA endpoints
        .route("/captcha", get(captcha::get_captcha))
        .route("/captcha/verify", post(captcha::verify_captcha))

        // Single block of any template
        .route("/block/{block}", get(pages::serve_block))

        // Generated media (captcha images)
        .nest_service("/media", media)

        // Configured pages, full or partial
        .fallback(get(pages::serve_page))

        .layer(TraceLayer::new_for_http())

        // Add shared state
        .with_state(state)
}

/// Error returned by handlers, rendered as a JSON body
#[derive(Debug)]
pub struct ApiError(pub MosaicError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(code = self.0.code(), error = %self.0, "Request failed");
        } else {
            tracing::debug!(code = self.0.code(), error = %self.0, "Request rejected");
        }

        let body = ErrorBody {
            error: self.0.to_string(),
            code: self.0.code().to_string(),
            status: status.as_u16(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<MosaicError> for ApiError {
    fn from(err: MosaicError) -> Self {
        Self(err)
    }
}

impl From<TemplateError> for ApiError {
    fn from(err: TemplateError) -> Self {
        Self(err.into())
    }
}

impl From<BlockError> for ApiError {
    fn from(err: BlockError) -> Self {
        Self(err.into())
    }
}

impl From<PartialError> for ApiError {
    fn from(err: PartialError) -> Self {
        Self(err.into())
    }
}

/// Run synchronous template or image work off the async workers
async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| MosaicError::Internal(format!("blocking task failed: {e}")))?
}
