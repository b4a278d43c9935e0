pub mod auth;
pub mod check;
pub mod cli;
pub mod config;
