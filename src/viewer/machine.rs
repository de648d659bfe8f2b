//! Fallback over the ranked candidate chain.
//!
//! A candidate counts as loaded on its load event or when its timeout
//! elapses, whichever comes first; cross-origin frames give no way to verify
//! that content really rendered. An error moves on to the next candidate.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ViewerTimeouts;

use super::candidates::ViewerCandidate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "index", rename_all = "kebab-case")]
pub enum ViewerState {
    Uninitialized,
    Loading(usize),
    Loaded(usize),
    /// Every candidate failed; the download prompt is shown.
    Exhausted,
}

impl ViewerState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ViewerState::Loaded(_) | ViewerState::Exhausted)
    }
}

/// What a frame reported for the candidate it was pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEvent {
    Load,
    Error,
}

/// Points the host frame at a candidate and waits for its load or error
/// event. The future may never resolve; the machine bounds it.
#[async_trait]
pub trait FrameLoader: Send {
    async fn load(&mut self, candidate: &ViewerCandidate) -> FrameEvent;
}

pub struct ViewerMachine {
    candidates: Vec<ViewerCandidate>,
    state: ViewerState,
    load_timeout: Duration,
    wps_load_timeout: Duration,
}

impl ViewerMachine {
    pub fn new(candidates: Vec<ViewerCandidate>, timeouts: &ViewerTimeouts) -> Self {
        Self {
            candidates,
            state: ViewerState::Uninitialized,
            load_timeout: timeouts.load_timeout,
            wps_load_timeout: timeouts.wps_load_timeout,
        }
    }

    pub fn state(&self) -> ViewerState {
        self.state
    }

    pub fn candidates(&self) -> &[ViewerCandidate] {
        &self.candidates
    }

    /// The candidate being loaded or shown.
    pub fn current(&self) -> Option<&ViewerCandidate> {
        match self.state {
            ViewerState::Loading(i) | ViewerState::Loaded(i) => self.candidates.get(i),
            _ => None,
        }
    }

    pub fn timeout_for(&self, candidate: &ViewerCandidate) -> Duration {
        if candidate.kind.is_wps() {
            self.wps_load_timeout
        } else {
            self.load_timeout
        }
    }

    /// Enters the chain at the first candidate.
    pub fn start(&mut self) -> ViewerState {
        if self.state == ViewerState::Uninitialized {
            self.state = self.loading_or_exhausted(0);
        }
        self.state
    }

    pub fn on_load(&mut self) -> ViewerState {
        if let ViewerState::Loading(i) = self.state {
            self.state = ViewerState::Loaded(i);
        }
        self.state
    }

    /// Load timeouts are not failures: whatever the frame shows stays.
    pub fn on_timeout(&mut self) -> ViewerState {
        if let Some(candidate) = self.current() {
            warn!(viewer = %candidate.name, "viewer load timed out; keeping it");
        }
        self.on_load()
    }

    pub fn on_error(&mut self) -> ViewerState {
        if let ViewerState::Loading(i) = self.state {
            self.state = self.loading_or_exhausted(i + 1);
        }
        self.state
    }

    fn loading_or_exhausted(&self, index: usize) -> ViewerState {
        if index < self.candidates.len() {
            ViewerState::Loading(index)
        } else {
            ViewerState::Exhausted
        }
    }

    /// Drives the chain to a terminal state.
    pub async fn run(&mut self, loader: &mut dyn FrameLoader) -> ViewerState {
        self.start();
        while let ViewerState::Loading(index) = self.state {
            let candidate = self.candidates[index].clone();
            let limit = self.timeout_for(&candidate);
            debug!(viewer = %candidate.name, index, "loading viewer");
            match tokio::time::timeout(limit, loader.load(&candidate)).await {
                Ok(FrameEvent::Load) => {
                    info!(viewer = %candidate.name, "viewer loaded");
                    self.on_load();
                }
                Ok(FrameEvent::Error) => {
                    warn!(viewer = %candidate.name, "viewer failed; trying the next one");
                    self.on_error();
                }
                Err(_) => {
                    self.on_timeout();
                }
            }
        }
        if self.state == ViewerState::Exhausted {
            warn!(candidates = self.candidates.len(), "no viewer could show the document");
        }
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::candidates::{rank_viewers, ViewerKind};
    use crate::viewer::FileType;

    fn machine(url: &str) -> ViewerMachine {
        let candidates = rank_viewers(url, FileType::Docx).unwrap();
        ViewerMachine::new(candidates, &ViewerTimeouts::default())
    }

    #[test]
    fn transitions_follow_the_chain() {
        let mut m = machine("https://docs.qq.com/doc/1");
        assert_eq!(m.state(), ViewerState::Uninitialized);
        assert_eq!(m.start(), ViewerState::Loading(0));
        assert_eq!(m.on_error(), ViewerState::Loading(1));
        assert_eq!(m.on_load(), ViewerState::Loaded(1));
        assert_eq!(m.current().map(|c| c.kind), Some(ViewerKind::GoogleDocs));
        assert_eq!(m.on_error(), ViewerState::Loaded(1));
    }

    #[test]
    fn running_out_of_candidates_exhausts() {
        let mut m = machine("https://kdocs.cn/l/x");
        m.start();
        assert_eq!(m.on_error(), ViewerState::Exhausted);
        assert!(m.current().is_none());

        let mut empty = ViewerMachine::new(Vec::new(), &ViewerTimeouts::default());
        assert_eq!(empty.start(), ViewerState::Exhausted);
    }

    #[test]
    fn wps_gets_the_shorter_timeout() {
        let m = machine("https://blog.test/a.doc");
        let wps = &m.candidates()[1];
        assert!(wps.kind.is_wps());
        assert_eq!(m.timeout_for(wps), Duration::from_secs(8));
        assert_eq!(m.timeout_for(&m.candidates()[0]), Duration::from_secs(15));
    }

    #[test]
    fn state_serializes_with_index() {
        let json = serde_json::to_string(&ViewerState::Loading(2)).unwrap();
        assert_eq!(json, r#"{"state":"loading","index":2}"#);
    }
}
