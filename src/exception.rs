//! Simulated exception values and their retained-context model
//!
//! The article's leak hinges on a runtime attaching a new traceback to an
//! exception on every raise without releasing the previous one. Rust has no
//! such mechanism, so the mechanism is modeled explicitly: a raise captures
//! a [`RaiseContext`] (synthetic call-stack frames plus the payload those
//! frames pin) and attaches it to the exception. A reused instance keeps
//! every attached context; a fresh instance holds only the current one and
//! releases it when the handler drops it.

use crate::types::RaiseMode;

/// Depth of the synthetic call chain a raise travels through
/// (level1 -> level2 -> level3, as in the article's demo)
pub const CALL_CHAIN_DEPTH: usize = 3;

/// One synthetic stack frame captured at raise time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRecord {
    /// Function name of the frame
    pub function: &'static str,
    /// Line recorded for the frame
    pub line: u32,
}

/// Execution context captured by a single raise
///
/// Stands in for a traceback: the frames active at the moment of the raise
/// and the large payload those frames reference.
#[derive(Debug)]
pub struct RaiseContext {
    frames: Vec<FrameRecord>,
    payload: Vec<u8>,
}

impl RaiseContext {
    /// Capture the synthetic call chain along with a payload of roughly
    /// `payload_kb` kilobytes (filled with 'x', as in the article scripts)
    pub fn capture(payload_kb: u64) -> Self {
        let frames = vec![
            FrameRecord { function: "level1", line: 1 },
            FrameRecord { function: "level2", line: 2 },
            FrameRecord { function: "level3", line: 3 },
        ];
        let payload = vec![b'x'; (payload_kb as usize) * 1024];
        Self { frames, payload }
    }

    /// Number of frames in this context
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Bytes pinned by this context's payload
    pub fn payload_bytes(&self) -> usize {
        self.payload.len()
    }
}

/// Web-service flavored exception, as in the article
///
/// Carries the message / status code / error code shape the problematic
/// real-world singletons had, plus every raise context it still retains.
#[derive(Debug)]
pub struct ServiceError {
    pub message: String,
    pub status_code: u16,
    pub error_code: &'static str,
    contexts: Vec<RaiseContext>,
}

impl ServiceError {
    pub fn new(message: impl Into<String>, status_code: u16, error_code: &'static str) -> Self {
        Self {
            message: message.into(),
            status_code,
            error_code,
            contexts: Vec::new(),
        }
    }

    /// The exception both demos raise
    pub fn unauthorized() -> Self {
        Self::new("Unauthorized access", 401, "UNAUTHORIZED")
    }

    pub fn not_found() -> Self {
        Self::new("Resource not found", 404, "NOT_FOUND")
    }

    /// Attach a raise context without releasing previous ones.
    /// On a reused instance this is the leak: retained contexts grow by
    /// exactly one per raise.
    pub fn attach_context(&mut self, context: RaiseContext) {
        self.contexts.push(context);
    }

    /// Release every retained context (what proper handling would do)
    pub fn clear_contexts(&mut self) {
        self.contexts.clear();
    }

    /// Number of contexts currently retained
    pub fn retained_contexts(&self) -> usize {
        self.contexts.len()
    }

    /// Total synthetic frames currently retained across all contexts
    pub fn retained_frames(&self) -> usize {
        self.contexts.iter().map(RaiseContext::frame_count).sum()
    }

    /// Total payload bytes currently pinned by retained contexts
    pub fn retained_payload_bytes(&self) -> usize {
        self.contexts.iter().map(RaiseContext::payload_bytes).sum()
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {} ({})", self.status_code, self.message, self.error_code)
    }
}

impl std::error::Error for ServiceError {}

/// A raised exception as seen by the catch site
///
/// A reused instance stays owned by its [`RaiseSource`]; a fresh instance
/// travels with the error and is reclaimed when the handler drops it.
#[derive(Debug)]
pub enum Raised {
    /// The long-lived singleton was raised; it remains owned by the source
    Reused,
    /// A fresh instance was raised and is owned by this value
    Fresh(ServiceError),
}

/// What the catch handler observed about retained state after one raise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatchReport {
    pub retained_contexts: usize,
    pub retained_frames: usize,
}

/// Where raised exceptions come from: one long-lived instance (reused on
/// every raise) or a fresh construction per raise.
///
/// The singleton instance lives inside the source and is passed into the
/// trial explicitly, so trials stay independently constructible; there is
/// no module-level exception state.
#[derive(Debug)]
pub enum RaiseSource {
    Singleton(ServiceError),
    Factory,
}

impl RaiseSource {
    /// Build the source for a raise mode; singleton mode constructs its
    /// one exception instance here, before any loop runs.
    pub fn for_mode(mode: RaiseMode) -> Self {
        match mode {
            RaiseMode::Singleton => RaiseSource::Singleton(ServiceError::unauthorized()),
            RaiseMode::Factory => RaiseSource::Factory,
        }
    }

    /// Raise once, attaching `context` to the exception
    pub fn raise(&mut self, context: RaiseContext) -> Raised {
        match self {
            RaiseSource::Singleton(exc) => {
                exc.attach_context(context);
                Raised::Reused
            }
            RaiseSource::Factory => {
                let mut exc = ServiceError::unauthorized();
                exc.attach_context(context);
                Raised::Fresh(exc)
            }
        }
    }

    /// Inspect retained state from the catch site, before the raised value
    /// is dropped
    pub fn observe(&self, raised: &Raised) -> CatchReport {
        match (self, raised) {
            (RaiseSource::Singleton(exc), Raised::Reused) => CatchReport {
                retained_contexts: exc.retained_contexts(),
                retained_frames: exc.retained_frames(),
            },
            (_, Raised::Fresh(exc)) => CatchReport {
                retained_contexts: exc.retained_contexts(),
                retained_frames: exc.retained_frames(),
            },
            // A Reused token can only come from a Singleton source
            (RaiseSource::Factory, Raised::Reused) => CatchReport {
                retained_contexts: 0,
                retained_frames: 0,
            },
        }
    }

    /// Retained state still reachable through the source itself
    /// (nonzero only for the singleton)
    pub fn retained(&self) -> CatchReport {
        match self {
            RaiseSource::Singleton(exc) => CatchReport {
                retained_contexts: exc.retained_contexts(),
                retained_frames: exc.retained_frames(),
            },
            RaiseSource::Factory => CatchReport {
                retained_contexts: 0,
                retained_frames: 0,
            },
        }
    }
}
