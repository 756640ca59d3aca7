#![allow(dead_code)]

use anyhow::{Context, Result, anyhow};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use otpgate::otpgate::{
    accounts::AccountStore,
    cors_layer,
    email::{EmailMessage, EmailSender},
    router,
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Keeps every message instead of mailing it, or fails every send.
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<EmailMessage>>,
    fail: bool,
}

impl RecordingSender {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn last_otp_for(&self, email: &str) -> Option<String> {
        let sent = self.sent.lock().ok()?;
        sent.iter()
            .rev()
            .find(|message| message.to_email == email)
            .and_then(|message| message.body.strip_prefix("Your OTP code is: "))
            .map(|rest| rest.trim().to_string())
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().map(|sent| sent.len()).unwrap_or(0)
    }
}

impl EmailSender for RecordingSender {
    fn send(&self, message: &EmailMessage) -> Result<()> {
        if self.fail {
            return Err(anyhow!("smtp unavailable"));
        }
        self.sent
            .lock()
            .map_err(|_| anyhow!("poisoned"))?
            .push(message.clone());
        Ok(())
    }
}

/// The full router over a given store, driven in-process.
pub struct TestApp<S> {
    pub app: Router,
    pub store: Arc<S>,
    pub sender: Arc<RecordingSender>,
}

impl<S: AccountStore + 'static> TestApp<S> {
    pub fn with_store(store: S, sender: RecordingSender) -> Result<Self> {
        let store = Arc::new(store);
        let sender = Arc::new(sender);
        let app = router(store.clone(), sender.clone(), cors_layer(None)?);

        Ok(Self { app, store, sender })
    }

    pub async fn post(&self, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))?,
        )
        .await
    }

    pub async fn send(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        let response = self.app.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).context("response is not JSON")?
        };

        Ok((status, json))
    }

    pub async fn signup(&self, email: &str, phone: &str, password: &str) -> Result<(StatusCode, Value)> {
        self.post(
            "/signup",
            json!({ "email": email, "phone": phone, "password": password }),
        )
        .await
    }

    pub async fn verify(&self, email: &str, otp: &str) -> Result<(StatusCode, Value)> {
        self.post("/verify-otp", json!({ "email": email, "otp": otp }))
            .await
    }

    pub async fn login(&self, phone: &str, password: &str) -> Result<(StatusCode, Value)> {
        self.post("/login", json!({ "phone": phone, "password": password }))
            .await
    }
}

/// Signup, duplicate phone, wrong then right code, login, wrong password.
/// Returns the OTP that verified the account.
pub async fn run_account_lifecycle<S: AccountStore + 'static>(app: &TestApp<S>) -> Result<String> {
    let (status, body) = app.signup("a@x.com", "111", "pw1").await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "message": "OTP sent successfully" }));

    let (status, body) = app.signup("b@x.com", "111", "pw2").await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body,
        json!({ "error": "Email or phone number already registered" })
    );

    let otp = app
        .sender
        .last_otp_for("a@x.com")
        .context("OTP mail not sent")?;
    let wrong = if otp == "000000" { "111111" } else { "000000" };

    let (status, _) = app.verify("a@x.com", wrong).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.login("111", "pw1").await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({ "error": "Please verify your account first" })
    );

    let (status, body) = app.verify("a@x.com", &otp).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "OTP verified successfully" }));

    let (status, body) = app.login("111", "pw1").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "message": "Login successful", "email": "a@x.com" })
    );

    let (status, body) = app.login("111", "wrong").await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Invalid credentials" }));

    Ok(otp)
}
