//! Orchestration layer for video publishing
//!
//! This module provides the pipeline orchestrator and the factory that wires
//! it to the production collaborators.

pub mod factory;
pub mod video_publisher;

// Re-export main types for convenience
pub use factory::VideoPublisherFactory;
pub use video_publisher::VideoPublisher;
