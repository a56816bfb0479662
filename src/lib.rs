//! Directory-style upload, download, listing and removal over flat object
//! storage. Keys are plain strings; directories exist only as `/`-separated
//! prefixes.

pub mod cli;
pub mod config;
pub mod demo;
pub mod error;
pub mod storage;
pub mod utils;
