pub mod add;
pub mod common;
pub mod config;
pub mod delete;
pub mod similar;
pub mod status;
pub mod sync;
