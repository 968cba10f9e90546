//! Object storage for worker inputs and outputs.
//!
//! This crate provides:
//! - The [`ObjectStore`] capability (download to file, upload from file)
//! - An S3-compatible backend with MinIO and Cloudflare R2 profiles
//! - A local-filesystem backend for development and tests
//! - Backend selection from the environment

pub mod client;
pub mod config;
pub mod error;
pub mod local;
pub mod store;

pub use client::{S3Config, S3Store};
pub use config::{connect, StorageBackend, StorageConfig};
pub use error::{StorageError, StorageResult};
pub use local::LocalStore;
pub use store::ObjectStore;
