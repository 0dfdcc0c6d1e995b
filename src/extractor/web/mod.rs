//! Strategies backed by third-party web APIs

pub mod invidious;
pub mod resolver;

pub use invidious::InvidiousExtractor;
pub use resolver::ResolverApiExtractor;
