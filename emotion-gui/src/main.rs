//! Desktop entry point.

use eframe::NativeOptions;
use emotion_gui::EmotionApp;
use emotion_utils::init_logging;

fn main() -> eframe::Result<()> {
    init_logging(log::LevelFilter::Info).expect("failed to initialize logging");
    let mut options = NativeOptions::default();
    options.viewport = options
        .viewport
        .with_inner_size([1280.0, 800.0])
        .with_min_inner_size([900.0, 600.0]);

    eframe::run_native(
        "Live Emotion Photo Booth",
        options,
        Box::new(|cc| Ok(Box::new(EmotionApp::new(cc)))),
    )
}
