pub mod auth;
pub mod reminder_state;
pub mod timeout;
pub mod usecase;
