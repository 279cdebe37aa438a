// src/models/mod.rs

//! Domain models for the bill watcher.

mod bill;
mod config;
mod record;

// Re-export all public types
pub use bill::BillEntry;
pub use config::{
    Config, CycleConfig, FeedConfig, LoggingConfig, NotifierConfig, NotifierKind,
    ProcessingOrder, StoreConfig, env,
};
pub use record::SeenRecord;
