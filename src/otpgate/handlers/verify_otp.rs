use super::{MessageResponse, SharedStore};
use crate::otpgate::error::{ApiError, ErrorResponse};
use axum::{Json, extract::Extension, http::StatusCode};
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize)]
pub struct VerifyOtp {
    email: String,
    otp: String,
}

#[utoipa::path(
    post,
    path= "/verify-otp",
    request_body = VerifyOtp,
    responses (
        (status = 200, description = "OTP verified, account can log in", body = MessageResponse, content_type = "application/json"),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 401, description = "Unknown email, wrong or expired OTP", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    ),
    tag= "verify"
)]
// axum handler for OTP verification
#[instrument(skip_all)]
pub async fn verify_otp(
    Extension(store): Extension<SharedStore>,
    payload: Option<Json<VerifyOtp>>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::invalid_body());
    };

    debug!(email = %request.email, "verify OTP request");

    let state = match store.otp_state(&request.email).await {
        Ok(Some(state)) => state,
        Ok(None) => {
            debug!("No account for email");
            return Err(ApiError::Unauthorized("Invalid email or OTP".to_string()));
        }
        Err(e) => {
            error!("Error querying OTP: {:?}", e);
            return Err(ApiError::Internal("Database error".to_string()));
        }
    };

    if state.otp != request.otp {
        debug!("OTP does not match");
        return Err(ApiError::Unauthorized("Invalid OTP".to_string()));
    }

    // a verified account stays verified, the window only gates the first confirmation
    if !state.is_verified && state.is_expired(Utc::now()) {
        debug!(otp_expiry = %state.otp_expiry, "OTP expired");
        return Err(ApiError::Unauthorized("OTP expired".to_string()));
    }

    match store.mark_verified(&request.email).await {
        Ok(true) => (),
        Ok(false) => {
            return Err(ApiError::Unauthorized("Invalid email or OTP".to_string()));
        }
        Err(e) => {
            error!("Error marking account verified: {:?}", e);
            return Err(ApiError::Internal("Database error".to_string()));
        }
    }

    info!(email = %request.email, "account verified");

    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("OTP verified successfully")),
    ))
}
