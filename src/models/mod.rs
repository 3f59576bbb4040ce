pub mod chat;
pub mod escalation;
