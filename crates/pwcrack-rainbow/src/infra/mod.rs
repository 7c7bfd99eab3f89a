//! Infrastructure layer - I/O and external dependencies
//!
//! This module handles the chain store backends and table file operations.

pub mod file_store;
pub mod store;
pub mod table_io;
