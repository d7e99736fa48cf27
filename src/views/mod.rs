//! Terminal views
//!
//! Each view is a plain state struct with async handlers; rendering is its
//! `Display` impl. [`App`] composes them and owns the session.

pub mod auth;
pub mod root;
pub mod wallet;

#[cfg(test)]
pub(crate) mod fakes;

pub use auth::{AuthMode, AuthView};
pub use root::{App, Screen};
pub use wallet::{WalletPhase, WalletView, IMPORT_NEW};
