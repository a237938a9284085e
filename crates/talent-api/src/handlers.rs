//! Request handlers.

pub mod admin;
pub mod auth;
pub mod candidate;
pub mod employer;
pub mod health;
pub mod interviews;
pub mod jobs;
pub mod matched;

pub use health::{health, ready};
