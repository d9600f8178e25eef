pub mod auth;
pub mod data;
pub mod entries;
pub mod health;
pub mod mood;
pub mod tasks;
