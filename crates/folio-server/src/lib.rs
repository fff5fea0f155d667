//! Development server with live reload for folio docs.
//!
//! Builds the site into the output directory, serves it, and rebuilds on
//! every change under the docs and static directories.

pub mod server;
pub mod watcher;
pub mod websocket;

pub use server::{DevServer, DevServerConfig, ServerError};
pub use watcher::{FileWatcher, WatchEvent};
pub use websocket::{HmrHub, HmrMessage};
