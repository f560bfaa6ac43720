//! Authentication state: credentials, the persisted token pair and the
//! `Session` object that owns it.
//!
//! - `Credentials`: transient username/password for one submit
//! - `TokenStore`: key-value persistence (file, OS keychain or memory)
//! - `Session`: the token pair lifecycle on top of a store
//!
//! Tokens live under the fixed keys `access_token` and `refresh_token`.

pub mod credentials;
pub mod session;
pub mod store;

pub use credentials::Credentials;
pub use session::{Session, TokenPair};
pub use store::{FileStore, KeyringStore, MemoryStore, TokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
