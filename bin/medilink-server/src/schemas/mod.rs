//! Request and response bodies for the HTTP API.

pub mod appointments;
pub mod doctors;
pub mod messaging;
