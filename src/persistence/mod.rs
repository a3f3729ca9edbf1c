//! Remote score persistence
//!
//! The score service is best-effort: every call may fail, and a failure only
//! means "no server data". Nothing here ever blocks the tick loop; calls run
//! on background threads and their replies are picked up by polling.
//!
//! Endpoints:
//! - `GET /get_best` → `{ "high_score": n }`
//! - `POST /submit_run` with `{ "score": n }` or the detailed run record
//!   → `{ "high_score": n, "message": "..." }`

pub mod client;
#[cfg(not(target_arch = "wasm32"))]
pub mod http;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SubmitFormat;
use crate::sim::ScoreRecord;

pub use client::BackgroundClient;
#[cfg(not(target_arch = "wasm32"))]
pub use http::HttpScoreService;

/// Where the reference score server listens
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("score service unavailable: {0}")]
    Unavailable(String),
    #[error("score service answered HTTP {0}")]
    Status(u16),
    #[error("unexpected reply from score service: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestScore {
    pub high_score: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitReply {
    pub high_score: u64,
    #[serde(default)]
    pub message: String,
}

/// Request body for `/submit_run`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmitBody {
    Simple {
        score: u64,
    },
    Detailed {
        distance: f32,
        duration: f32,
        stamina_collected: f32,
        max_speed: f32,
        identity_dropped: bool,
    },
}

impl SubmitBody {
    pub fn from_record(record: &ScoreRecord, format: SubmitFormat) -> Self {
        match format {
            SubmitFormat::Simple => SubmitBody::Simple {
                score: record.score,
            },
            SubmitFormat::Detailed => SubmitBody::Detailed {
                distance: record.distance,
                duration: record.duration,
                stamina_collected: record.stamina_collected,
                max_speed: record.max_speed,
                identity_dropped: record.identity_dropped,
            },
        }
    }
}

/// A score backend. Implementations may block; callers run them off the
/// simulation thread.
pub trait ScoreService: Send + Sync {
    fn fetch_best(&self) -> Result<u64, PersistenceError>;
    fn submit(&self, body: &SubmitBody) -> Result<SubmitReply, PersistenceError>;
}

/// Backend used when no server is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineService;

impl ScoreService for OfflineService {
    fn fetch_best(&self) -> Result<u64, PersistenceError> {
        Err(PersistenceError::Unavailable("offline mode".to_string()))
    }

    fn submit(&self, _body: &SubmitBody) -> Result<SubmitReply, PersistenceError> {
        Err(PersistenceError::Unavailable("offline mode".to_string()))
    }
}

/// A reply delivered back to the simulation thread
#[derive(Debug, Clone, PartialEq)]
pub enum ServerReply {
    Best(u64),
    Submitted(SubmitReply),
}

/// Non-blocking face of the score service, as seen by a session
pub trait ScoreSink: Send {
    /// Ask for the current best score
    fn request_best(&mut self);
    /// Hand off a finished run. Fire-and-forget.
    fn submit(&mut self, body: SubmitBody);
    /// Replies that have arrived since the last poll
    fn poll(&mut self) -> Vec<ServerReply>;
}

/// Sink that drops everything; the game is fully playable without a server
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineSink;

impl ScoreSink for OfflineSink {
    fn request_best(&mut self) {
        log::info!("Score server disabled - playing local mode");
    }

    fn submit(&mut self, _body: SubmitBody) {}

    fn poll(&mut self) -> Vec<ServerReply> {
        Vec::new()
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    submitted: Vec<SubmitBody>,
    best_requests: u32,
    replies: VecDeque<ServerReply>,
}

/// In-memory sink. Clones share state, so a host can keep a handle after
/// giving one to a session.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<T>(&self, f: impl FnOnce(&mut MemoryInner) -> T) -> T {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    /// Queue a reply for the next poll
    pub fn push_reply(&self, reply: ServerReply) {
        self.with(|m| m.replies.push_back(reply));
    }

    pub fn submitted(&self) -> Vec<SubmitBody> {
        self.with(|m| m.submitted.clone())
    }

    pub fn best_requests(&self) -> u32 {
        self.with(|m| m.best_requests)
    }
}

impl ScoreSink for MemorySink {
    fn request_best(&mut self) {
        self.with(|m| m.best_requests += 1);
    }

    fn submit(&mut self, body: SubmitBody) {
        self.with(|m| m.submitted.push(body));
    }

    fn poll(&mut self) -> Vec<ServerReply> {
        self.with(|m| m.replies.drain(..).collect())
    }
}
