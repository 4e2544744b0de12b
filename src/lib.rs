pub mod assembler;
pub mod client;
pub mod config;
pub mod data;
pub mod error;
pub mod grid;
pub mod ids;
pub mod page;
pub mod presenter;
pub mod registry;
pub mod server;
pub mod session;
pub mod time_window;

pub use error::{Error, Result, ValidationError};
