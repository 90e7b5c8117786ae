#![deny(clippy::all)]

pub mod config;
pub mod video_matching;

#[cfg(feature = "node")]
mod node;

pub use config::MatchConfig;
pub use video_matching::matcher::{MatchReport, Matcher};
pub use video_matching::pipeline::run_batch;
pub use video_matching::report::RunReport;
pub use video_matching::{MatchError, MatchResult, ReferenceImage, Upload, VideoInput};
