//! CLI command implementations.

pub mod common;
pub mod config;
pub mod init;
pub mod show;
pub mod track;
pub mod trim;
pub mod update;
