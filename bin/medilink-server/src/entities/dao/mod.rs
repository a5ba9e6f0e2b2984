pub mod appointment;
pub mod conversation;
pub mod doctor;
pub mod message;

pub use appointment::{Appointment, AppointmentStatus, AppointmentType};
pub use conversation::Conversation;
pub use doctor::Doctor;
pub use message::Message;
