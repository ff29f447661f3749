//! cardwall: team status board built from project tracker stories.

pub mod cards;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod stickers;
