pub mod analytics;
pub mod auth;
pub mod chats;
pub mod health;
pub mod journals;
pub mod moods;
pub mod patients;
pub mod users;
