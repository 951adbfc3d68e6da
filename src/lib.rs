pub mod chunk;
pub mod common;
pub mod config;
pub mod defaults;
pub mod detector;
pub mod error;
pub mod input;
pub mod registry;
pub mod sniff;
pub mod stream;

pub use common::detection::{DetectionResult, SNIFF_WINDOW_LENGTH};
pub use config::Settings;
pub use defaults::{DefaultFields, DefaultSpec};
pub use detector::{detect, detect_async, Detector, ErrorPolicy};
pub use error::DetectError;
pub use input::{AsyncInput, Input};
pub use stream::{FileStream, LocalStream, PeekReader, PeekStream};
