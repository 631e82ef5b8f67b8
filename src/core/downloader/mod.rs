pub mod client;

pub use client::{sha256_hex, verify_sha256, Downloader};
