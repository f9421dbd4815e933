pub mod admin;
pub mod auth;
pub mod events;
pub mod links;
pub mod photos;
