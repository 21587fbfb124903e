#![forbid(unsafe_code)]
//! Fetches CSV objects from S3 into in-memory [`Table`]s.
mod config;
pub mod csv;
mod fetcher;
pub mod fs;
pub mod fs_s3;
mod table;

pub use crate::csv::DecodeError;
pub use config::*;
pub use fetcher::*;
pub use fs::{BlobStorageProvider, LocalDisk};
pub use table::*;
