use super::{SharedStore, run_blocking};
use crate::otpgate::{
    error::{ApiError, ErrorResponse},
    password::{DUMMY_HASH, verify_password},
};
use axum::{Json, extract::Extension, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

// Unknown phone and wrong password share this text.
const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(ToSchema, Deserialize)]
pub struct Login {
    phone: String,
    password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct LoginResponse {
    pub message: String,
    pub email: String,
}

#[utoipa::path(
    post,
    path= "/login",
    request_body = Login,
    responses (
        (status = 200, description = "Login successful", body = LoginResponse, content_type = "application/json"),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 401, description = "Invalid credentials or account not verified", body = ErrorResponse),
        (status = 500, description = "Storage or hashing failure", body = ErrorResponse),
    ),
    tag= "login"
)]
// axum handler for login
#[instrument(skip_all)]
pub async fn login(
    Extension(store): Extension<SharedStore>,
    payload: Option<Json<Login>>,
) -> Result<(StatusCode, Json<LoginResponse>), ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::invalid_body());
    };

    let Login { phone, password } = request;

    debug!(phone = %phone, "login request");

    let credentials = match store.credentials_by_phone(&phone).await {
        Ok(Some(credentials)) => credentials,
        Ok(None) => {
            debug!("User not found");

            // same Argon2 work as a wrong password
            let _ = run_blocking(move || verify_password(&password, DUMMY_HASH)).await;

            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }
        Err(e) => {
            error!("Error getting credentials from database: {:?}", e);
            return Err(ApiError::Internal("Database error".to_string()));
        }
    };

    if !credentials.is_verified {
        debug!("User not verified");
        return Err(ApiError::Unauthorized(
            "Please verify your account first".to_string(),
        ));
    }

    let password_hash = credentials.password_hash;

    match run_blocking(move || verify_password(&password, &password_hash)).await {
        Ok(true) => {
            debug!("Login successful");

            Ok((
                StatusCode::OK,
                Json(LoginResponse {
                    message: "Login successful".to_string(),
                    email: credentials.email,
                }),
            ))
        }
        Ok(false) => {
            debug!("Invalid password");

            Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))
        }
        Err(e) => {
            error!("Error verifying password: {:?}", e);

            Err(ApiError::Internal("Error processing password".to_string()))
        }
    }
}
