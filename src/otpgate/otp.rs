use chrono::{DateTime, Duration, Utc};
use rand::Rng;

pub const OTP_LENGTH: usize = 6;

/// How long a freshly issued code stays valid.
pub const OTP_TTL_SECONDS: i64 = 120;

/// Six random decimal digits, leading zeros kept.
#[must_use]
pub fn generate_otp() -> String {
    let code: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{code:0width$}", width = OTP_LENGTH)
}

#[must_use]
pub fn otp_expiry(issued_at: DateTime<Utc>) -> DateTime<Utc> {
    issued_at + Duration::seconds(OTP_TTL_SECONDS)
}

#[must_use]
pub fn otp_email_body(otp: &str) -> String {
    format!("Your OTP code is: {otp}\r\n")
}
