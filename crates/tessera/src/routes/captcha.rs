//! CAPTCHA generation and verification endpoints.

use std::sync::Arc;

use axum::{Json, extract::State};
use mosaic_common::{CaptchaAnswer, CaptchaTicket, CaptchaVerdict, MosaicError};

use super::{ApiError, ClientAddr, blocking};
use crate::captcha::CaptchaGenerator;
use crate::state::AppState;

fn generator(state: &AppState) -> Result<Arc<CaptchaGenerator>, ApiError> {
    state
        .captcha
        .clone()
        .ok_or_else(|| MosaicError::Captcha("captcha assets unavailable".to_string()).into())
}

/// Generate a new CAPTCHA image for the calling client
pub async fn get_captcha(
    State(state): State<AppState>,
    client: ClientAddr,
) -> Result<Json<CaptchaTicket>, ApiError> {
    let generator = generator(&state)?;

    let generated = blocking(move || {
        generator
            .generate(client.0)
            .map_err(|e| ApiError(MosaicError::Captcha(format!("{e:#}"))))
    })
    .await?;

    let image_url = format!(
        "/media/{}/{}",
        state.config.captcha.temp_path.trim_matches('/'),
        generated.filename
    );

    Ok(Json(CaptchaTicket {
        hash: generated.hash,
        filename: generated.filename,
        image_url,
    }))
}

/// Verify a typed CAPTCHA answer against its hash
pub async fn verify_captcha(
    State(state): State<AppState>,
    Json(payload): Json<CaptchaAnswer>,
) -> Result<Json<CaptchaVerdict>, ApiError> {
    let generator = generator(&state)?;
    let valid = generator.verify(&payload.answer, &payload.hash);

    tracing::debug!(valid, "Verified CAPTCHA answer");

    Ok(Json(CaptchaVerdict { valid }))
}
