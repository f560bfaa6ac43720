//! Core library for sessiongate.
//!
//! This crate holds everything except the terminal front end:
//!
//! - `config`: persisted application configuration
//! - `auth`: token storage, the `Session` object and credentials
//! - `api`: the remote HTTP client and the simulated backend
//! - `gate`: the `SessionGate` that ties session, backend and view together
//! - `view`: the view model the front end renders

pub mod api;
pub mod auth;
pub mod config;
pub mod gate;
pub mod view;

pub use api::{ApiError, AuthBackend, AuthClient, SimulatedBackend};
pub use auth::{Credentials, Session, TokenPair, TokenStore};
pub use config::{BackendKind, Config, NoticeStyle, StorageKind};
pub use gate::{GateDecision, SessionGate};
pub use view::{FormFocus, Notice, NoticeKind, View, ViewModel};
