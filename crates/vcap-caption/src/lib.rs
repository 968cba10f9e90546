//! Vision-model caption generation.
//!
//! This crate provides:
//! - A client for an Ollama-compatible chat endpoint ([`OllamaClient`])
//! - Caption sanitization for overlay rendering
//! - [`CaptionGenerator`]: sample a frame, ask the model, sanitize, and fall
//!   back to a fixed caption whenever anything goes wrong

pub mod client;
pub mod config;
pub mod error;
pub mod generator;
pub mod sanitize;

pub use client::{OllamaClient, VisionModel};
pub use config::CaptionConfig;
pub use error::{CaptionError, CaptionResult};
pub use generator::{Caption, CaptionGenerator, CaptionService, FallbackReason};
pub use sanitize::sanitize;
