//! HTTP host adapter.
//!
//! `before_bind` runs the creation guard in front of resource-creating
//! requests; `response` turns guard errors into HTTP responses.

pub mod bind_hook;
pub mod response;

pub use bind_hook::{actor_id, before_bind, mount_relative, ACTOR_HEADER};
pub use response::GuardRejection;
