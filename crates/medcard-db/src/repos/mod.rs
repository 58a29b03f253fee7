pub mod card;
pub mod patient;
pub mod session;
