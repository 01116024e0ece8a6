//! HTTP and WebSocket front end for fileforge.
//!
//! Exposes batch conversion per domain, capability lookups and a live status
//! stream. The binary in `main.rs` wires these pieces to a real
//! [`ProcessToolRunner`](fileforge_core::ProcessToolRunner); tests build the
//! same router around a mock runner.

pub mod api;
pub mod metrics;
pub mod state;
