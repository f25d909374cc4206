//! CLI command implementations.

pub mod common;
pub mod init_config;
pub mod model;
pub mod run;
pub mod samplers;
pub mod version;
