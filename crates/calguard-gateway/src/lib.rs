//! calguard gateway library entry.
//!
//! Wires the collaborator backends, the creation guard, configuration,
//! metrics, and the HTTP bind hook into a cohesive stack. It is consumed by
//! the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod backend;
pub mod config;
pub mod obs;
pub mod policy;
pub mod router;
pub mod services;
pub mod transport;
