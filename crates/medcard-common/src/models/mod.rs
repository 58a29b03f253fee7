pub mod card;
pub mod patient;
pub mod session;

pub use card::{Card, CardDetails, Consultation, NewCard};
pub use patient::{Address, Patient, PatientInput};
pub use session::{Credentials, Session};
