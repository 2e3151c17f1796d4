// src/lib.rs

pub mod batch;
pub mod config;
pub mod core;
pub mod error;
pub mod keygen;
pub mod persistence;

pub use crate::config::Config;
pub use crate::core::engine::Decypher;
pub use crate::core::key::Key;
pub use crate::error::{DecypherError, Result};
