//! Upstream module
//!
//! Resolves a client model name to a backend target and forwards chat
//! requests to it.

pub mod headers;
pub mod invoker;
pub mod resolver;

pub use invoker::{call_upstream, ByteStream, UpstreamResponse};
pub use resolver::select_upstream_config;
