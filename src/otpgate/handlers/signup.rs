use super::{MessageResponse, SharedEmailSender, SharedStore, run_blocking, valid_email, valid_phone};
use crate::otpgate::{
    accounts::{InsertOutcome, NewAccount},
    email::EmailMessage,
    error::{ApiError, ErrorResponse},
    otp::{generate_otp, otp_email_body, otp_expiry},
    password::hash_password,
};
use axum::{Json, extract::Extension, http::StatusCode};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

pub const OTP_EMAIL_SUBJECT: &str = "Your OTP code";

#[derive(ToSchema, Deserialize)]
pub struct Signup {
    email: String,
    phone: String,
    password: String,
}

#[utoipa::path(
    post,
    path= "/signup",
    request_body = Signup,
    responses (
        (status = 201, description = "Account created and OTP sent", body = MessageResponse, content_type = "application/json"),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 409, description = "Email or phone number already registered", body = ErrorResponse),
        (status = 500, description = "Hashing, storage or mail failure", body = ErrorResponse),
    ),
    tag= "signup"
)]
// axum handler for signup
#[instrument(skip_all)]
pub async fn signup(
    Extension(store): Extension<SharedStore>,
    Extension(sender): Extension<SharedEmailSender>,
    payload: Option<Json<Signup>>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Some(Json(user)) = payload else {
        return Err(ApiError::invalid_body());
    };

    debug!(email = %user.email, phone = %user.phone, "signup request");

    if !valid_email(&user.email) {
        return Err(ApiError::BadRequest("Invalid email".to_string()));
    }

    if !valid_phone(&user.phone) {
        return Err(ApiError::BadRequest("Invalid phone number".to_string()));
    }

    if user.password.is_empty() {
        return Err(ApiError::BadRequest("Invalid password".to_string()));
    }

    let password = user.password;
    let password_hash = run_blocking(move || hash_password(&password))
        .await
        .map_err(|e| {
            error!("Error hashing password: {:?}", e);
            ApiError::Internal("Error processing password".to_string())
        })?;

    let otp = generate_otp();
    let account = NewAccount {
        email: user.email,
        phone: user.phone,
        password_hash,
        otp: otp.clone(),
        otp_expiry: otp_expiry(Utc::now()),
    };

    let id = match store.insert_if_absent(&account).await {
        Ok(InsertOutcome::Inserted(id)) => id,
        Ok(InsertOutcome::Conflict) => {
            debug!("Email or phone number already registered");
            return Err(ApiError::Conflict(
                "Email or phone number already registered".to_string(),
            ));
        }
        Err(e) => {
            error!("Error saving account: {:?}", e);
            return Err(ApiError::Internal(
                "Error saving user to database".to_string(),
            ));
        }
    };

    let message = EmailMessage {
        to_email: account.email.clone(),
        subject: OTP_EMAIL_SUBJECT.to_string(),
        body: otp_email_body(&otp),
    };
    let mail_sender = Arc::clone(&sender);

    if let Err(e) = run_blocking(move || mail_sender.send(&message)).await {
        error!("Error sending OTP email: {:?}", e);

        // the account could never be verified, drop it so the user can sign up again
        match store.discard_unverified(id).await {
            Ok(true) => debug!(account_id = %id, "pending account discarded"),
            Ok(false) => warn!(account_id = %id, "pending account already gone or verified"),
            Err(e) => error!(account_id = %id, "Error discarding pending account: {:?}", e),
        }

        return Err(ApiError::Internal("Failed to send OTP email".to_string()));
    }

    info!(account_id = %id, "account created, OTP sent");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("OTP sent successfully")),
    ))
}
