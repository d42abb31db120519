pub mod activity;
pub mod app;
pub mod config;
pub mod credentials;
pub mod cycle;
pub mod error;
pub mod keyboard;
pub mod keymap;
pub mod logging;
pub mod refresher;
pub mod scheduler;
pub mod slack;
pub mod spotify;
pub mod status;

pub use error::{Error, Result};
