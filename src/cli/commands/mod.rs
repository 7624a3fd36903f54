//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod init;
pub mod insert_record;
pub mod pdg_update;
pub mod validate;
