//! UI panels.

pub mod preview;
pub mod results;
pub mod status_bar;
