//! tubelink library
//!
//! Resolves a YouTube URL to a direct, time-limited media URL by walking an
//! ordered chain of extraction strategies.

pub mod extractor;
pub mod server;
pub mod utils;

// Re-export main types for easier use
pub use extractor::{build_chain, DownloadInfo, Extractor, HybridExtractor, VideoTarget};
pub use server::{router, AppState};
pub use utils::{AppSettings, TubelinkError};
