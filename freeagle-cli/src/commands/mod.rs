pub mod config;
pub mod events;
pub mod favorites;
pub mod invite;
pub mod joined;
pub mod login;
pub mod share;
