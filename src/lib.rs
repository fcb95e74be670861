pub mod actuator;
pub mod command;
pub mod config;
pub mod server;
