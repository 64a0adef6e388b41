//! Telegram bot front end.

mod command;
mod runner;
mod service;

pub use command::Command;
pub use runner::BotRunner;
pub use service::BotService;
