// src/lib.rs

//! Bill watcher library
//!
//! Polls a legislation feed, logs each newly introduced bill exactly once,
//! and announces it through a pluggable posting backend.

pub mod error;
#[cfg(feature = "lambda")]
pub mod lambda;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
