pub mod command;
pub mod config;
pub mod decode;
pub mod info;
pub mod output;
pub mod progress;
