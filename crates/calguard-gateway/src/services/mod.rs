//! Built-in handlers behind the bind hook.

pub mod bind;

pub use bind::dev_bind;
