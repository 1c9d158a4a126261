pub mod app;
pub mod chat;
pub mod config;
pub mod provider;
pub mod report;
pub mod shared;
