//! Poll cycle entry points.
//!
//! - `find_new`: Split a fetched batch into new and already-logged entries
//! - `run_once`: One fetch → filter → persist → notify pass

pub mod cycle;
pub mod novelty;

pub use cycle::{CycleReport, PollCycle, run_once};
pub use novelty::{NoveltyResult, filter_new, find_new};
