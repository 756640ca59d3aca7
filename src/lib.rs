//! # Otpgate (signup, email OTP verification, login)
//!
//! `otpgate` is a small account service. It registers accounts identified by a
//! unique email and a unique phone number, confirms email ownership with a
//! six-digit one-time code, and checks phone + password credentials.
//!
//! ## Account lifecycle
//!
//! - **Signup:** the password is hashed with Argon2id, a one-time code valid for
//!   two minutes is stored alongside the account and mailed to the user. The row
//!   is written with a single insert-if-absent statement; the unique constraints
//!   on `email` and `phone` decide conflicts.
//! - **Verification:** the submitted code must equal the stored one and must not
//!   be expired. Verification is monotonic, an account is never unverified again.
//! - **Login:** unverified accounts are always rejected. Unknown phone numbers and
//!   wrong passwords produce the same response.
//!
//! There are no sessions or tokens: a successful login only returns the
//! account's email.

pub mod cli;
pub mod otpgate;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
