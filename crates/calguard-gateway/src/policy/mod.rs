//! Policy layer: the creation guard.
//!
//! Classifies the target of a resource creation and vetoes it when the actor
//! exceeds the category's rolling-window limit or the collection ceiling.

pub mod guard;

pub use guard::CreationGuard;
