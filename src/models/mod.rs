pub mod chat;
pub mod journal;
pub mod mood;
pub mod patient;
pub mod user;
