//! Lethe - Exception-Reuse Memory-Growth Demonstration
//!
//! Companion crate for an article on a memory-leak pattern: reusing a
//! single exception instance in a traceback-attaching runtime makes the
//! instance accumulate one retained context per raise, pinning the frames
//! and payloads those contexts reference, while constructing a fresh
//! exception per raise keeps retained memory flat.
//!
//! # Architecture
//!
//! - **Types**: trial configuration, memory samples, trial results
//! - **Exception**: the simulated exception and its retained-context model
//! - **Memory**: process resident-memory probe and collection pass
//! - **Tracker**: sample recording and trend derivation
//! - **Trial**: the measurement procedure (raise/catch loop with sampling)
//! - **Report**: console summaries and CSV/JSON artifacts
//!
//! # Example
//!
//! ```no_run
//! use lethe_core::{run_mode, ProgressStyle, RaiseMode, TrialConfig};
//!
//! fn main() -> lethe_core::Result<()> {
//!     let config = TrialConfig::for_mode(RaiseMode::Singleton);
//!     let result = run_mode(&config, ProgressStyle::FrameCount)?;
//!     println!("retained {} contexts", result.retained_contexts);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod exception;
pub mod memory;
pub mod report;
pub mod tracker;
pub mod trial;
pub mod types;

// Re-export commonly used types
pub use error::{LetheError, Result};
pub use exception::{CatchReport, RaiseContext, RaiseSource, Raised, ServiceError};
pub use memory::MemoryProbe;
pub use tracker::MemoryTracker;
pub use trial::{run_mode, run_trial, ProgressStyle};
pub use types::{RaiseMode, Sample, TrialConfig, TrialResult};
