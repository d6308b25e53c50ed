//! # SSO (Single Sign-On Authentication)
//!
//! `sso` verifies user credentials and issues signed, time-limited tokens scoped
//! to a registered client application.
//!
//! ## Applications
//!
//! Every client application owns a signing secret. A token minted for one
//! application is signed with that application's secret only, so it never
//! verifies against another application.
//!
//! ## Passwords
//!
//! Passwords are stored as Argon2id hashes with a per-user random salt. Login
//! answers an unknown email and a wrong password with the same error, and does
//! comparable work on both paths.
//!
//! ## Tokens
//!
//! Tokens are compact HS256 JWTs carrying `uid`, `email`, `app_id` and `exp`.
//! A token is valid while the current time is strictly before `exp`.

pub mod auth;
pub mod cli;
pub mod models;
pub mod sso;
pub mod storage;
pub mod token;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
