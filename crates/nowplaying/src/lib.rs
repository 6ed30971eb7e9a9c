pub mod config;
pub use config::Config;

pub mod error;
pub use error::Error;

pub mod auth;
pub mod http;
pub mod ntfy;
pub mod spotify;

mod poller;
pub use poller::{Poller, SessionReport};

#[cfg(test)]
mod testing;
