//! Lightweight in-process metrics (dependency-free).
//!
//! Guard decisions and check latency are stored as atomics and rendered in
//! Prometheus text format by the `/metrics` handler.

pub mod metrics;

pub use metrics::GuardMetrics;
