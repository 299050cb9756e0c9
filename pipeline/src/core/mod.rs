//! Core application infrastructure

pub mod cli;
pub mod config;
pub mod constants;
pub mod notify;

pub use crate::app::CoreApp;
pub use cli::{CliConfig, Commands};
pub use config::AppConfig;
pub use notify::{LogNotifier, Notifier, RunEvent};
