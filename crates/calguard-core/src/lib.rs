//! calguard core: transport-agnostic primitives for the creation guard.
//!
//! This crate defines resource path classification, the rate-limit and quota
//! constants, the actor record and the error surface shared by the gateway and
//! any host embedding it. It carries no runtime or transport dependencies.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths surface as `GuardError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod actor;
pub mod error;
pub mod limits;
pub mod path;

pub use actor::Actor;
/// Shared result type.
pub use error::{GuardError, Result};
pub use limits::{CollectionCeiling, RateLimitSpec};
pub use path::{classify, CreationCategory, ResourcePath};
