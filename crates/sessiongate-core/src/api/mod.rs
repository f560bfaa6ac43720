//! Authentication backends.
//!
//! `AuthBackend` is what the gate talks to. It is either the `AuthClient`,
//! which speaks JSON over HTTP to the accounts service:
//!
//! - `POST {base}/signup/` with `{username, password}`
//! - `POST {base}/login/` with `{username, password}`, answering `{access, refresh}`
//! - `GET {base}/dashboard/` with a bearer token, answering `{message}`
//!
//! or the `SimulatedBackend`, which answers the same calls from an in-process
//! user table. Both report failures as `ApiError`.

pub mod backend;
pub mod client;
pub mod error;
pub mod simulated;

pub use backend::AuthBackend;
pub use client::AuthClient;
pub use error::ApiError;
pub use simulated::SimulatedBackend;
