//! Core functionality for the desktop app.
//!
//! - `feed`: background webcam thread exposed as a camera source
//! - `detection`: detection requests on worker threads
//! - `settings`: settings persistence and loading

pub mod detection;
pub mod feed;
pub mod settings;
