//! Desktop photo booth: live webcam preview with remote emotion analysis.

pub mod app;
pub mod core;
pub mod rendering;
pub mod theme;
pub mod types;
pub mod ui;

pub use app::{FLASH_DURATION, load_texture_from_image};
pub use core::feed::{FeedBackend, LiveFeed, LiveFeedSource};
pub use types::{EmotionApp, JobMessage, PreviewState};
