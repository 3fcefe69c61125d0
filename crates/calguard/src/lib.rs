//! Top-level facade crate for calguard.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use calguard_core::*;
}

pub mod gateway {
    pub use calguard_gateway::*;
}
