//! Strategies that talk to YouTube without external tools

pub mod youtube;

pub use youtube::NativeYoutubeExtractor;
