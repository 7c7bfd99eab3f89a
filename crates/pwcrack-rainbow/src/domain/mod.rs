//! Domain layer - Pure computational logic
//!
//! This module contains pure functions and algorithms without I/O dependencies.

pub mod alphabet;
pub mod chain;
pub mod hash;
pub mod reduction;
pub mod table_format;
