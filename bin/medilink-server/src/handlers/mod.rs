pub mod appointments;
pub mod messaging;
