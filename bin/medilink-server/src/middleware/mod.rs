//! HTTP middleware stack: CORS and per-request trace IDs.

pub mod cors;
pub mod trace;
