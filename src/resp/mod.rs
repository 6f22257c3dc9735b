// RESP surface: TCP server and command handlers

pub mod handler;
pub mod server;
mod utils;

pub use handler::handle_command;
pub use server::{RespConfig, RespServer};
