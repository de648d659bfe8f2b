//! Best-effort removal of vendor chrome from WPS-hosted frames.
//!
//! Strategies degrade in order: read the frame's document directly
//! (same-origin only), ask the frame over a message round trip, then keep
//! hiding known chrome selectors on a timer, and finally give up.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::ViewerTimeouts;

/// Elements holding the document itself, most specific first.
pub const CONTENT_SELECTORS: [&str; 7] = [
    ".et-container-middle",
    ".et-content-wrap",
    ".content-wrap",
    ".main-content",
    ".document-content",
    ".et-main-wrap",
    ".workspace",
];

/// Toolbars, headers, promotion banners and shadows.
pub const CHROME_SELECTORS: [&str; 17] = [
    ".et-cmb-bar-wrap",
    ".component-header-wrap",
    ".et-edit-bar-wrap",
    ".et-toolbar-wrap",
    ".et-header-wrap",
    ".et-menu-bar",
    ".et-status-bar",
    ".toolbar-wrap",
    ".header-wrap",
    ".shadow",
    "[class*=\"shadow\"]",
    "[class^=\"shadow\"]",
    "[class$=\"shadow\"]",
    "[id*=\"shadow\"]",
    ".et-shadow",
    ".wps-shadow",
    ".kdocs-shadow",
];

/// What the long-term sweep keeps removing.
pub const SWEEP_SELECTORS: [&str; 5] = [
    ".shadow",
    "[class*=\"shadow\"]",
    ".et-cmb-bar-wrap",
    ".component-header-wrap",
    ".et-edit-bar-wrap",
];

/// Hidden elements are also removed from this poll attempt on.
pub const REMOVE_AFTER_ATTEMPTS: u32 = 5;

/// The frame's document belongs to another origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("frame document is cross-origin")]
pub struct CrossOrigin;

/// Messages exchanged with the framed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FrameMessage {
    ExtractContent { selectors: Vec<String> },
    ContentExtracted { content: String },
}

impl FrameMessage {
    pub fn extract_request() -> Self {
        FrameMessage::ExtractContent {
            selectors: CONTENT_SELECTORS[..5].iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Access to the document inside a frame.
#[async_trait]
pub trait FrameDocument: Send {
    /// Outer HTML of the first element matching `selectors`, tried in order,
    /// falling back to the body. `Ok(None)` when the document has neither.
    fn extract_html(&self, selectors: &[&str]) -> Result<Option<String>, CrossOrigin>;

    /// Hides every element matching `selectors`, detaching them as well when
    /// `remove` is set. Returns how many were touched.
    fn hide_elements(&mut self, selectors: &[&str], remove: bool) -> Result<usize, CrossOrigin>;

    /// Posts `message` to the frame and waits for its reply. `None` when the
    /// frame cannot be reached.
    async fn post_message(&mut self, message: FrameMessage) -> Option<FrameMessage>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum ExtractionOutcome {
    DirectAccess { html: String },
    PostMessage { html: String },
    Unavailable,
}

pub struct ContentExtractor {
    post_message_timeout: Duration,
}

impl ContentExtractor {
    pub fn new(timeouts: &ViewerTimeouts) -> Self {
        Self {
            post_message_timeout: timeouts.post_message_timeout,
        }
    }

    pub async fn extract(&self, document: &mut dyn FrameDocument) -> ExtractionOutcome {
        match document.extract_html(&CONTENT_SELECTORS) {
            Ok(Some(html)) => {
                info!(bytes = html.len(), "frame content extracted directly");
                return ExtractionOutcome::DirectAccess { html };
            }
            Ok(None) => {
                debug!("frame has no content element");
                return ExtractionOutcome::Unavailable;
            }
            Err(CrossOrigin) => debug!("frame is cross-origin; asking it over postMessage"),
        }

        let reply = tokio::time::timeout(
            self.post_message_timeout,
            document.post_message(FrameMessage::extract_request()),
        )
        .await;
        match reply {
            Ok(Some(FrameMessage::ContentExtracted { content })) => {
                info!(bytes = content.len(), "frame content received over postMessage");
                ExtractionOutcome::PostMessage { html: content }
            }
            Ok(_) => {
                debug!("frame gave no usable reply");
                ExtractionOutcome::Unavailable
            }
            Err(_) => {
                debug!("postMessage extraction timed out");
                ExtractionOutcome::Unavailable
            }
        }
    }
}

/// Totals from a chrome-stripping run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StripReport {
    pub polls: u32,
    pub sweeps: u32,
    pub hidden: usize,
    /// Polls and sweeps refused because the document was cross-origin.
    pub refused: u32,
}

/// Hides chrome every `poll_interval` for `poll_attempts` attempts, then
/// sweeps every `sweep_interval` until `sweep_duration` has passed.
pub struct ChromeStripper {
    poll_interval: Duration,
    poll_attempts: u32,
    sweep_interval: Duration,
    sweep_duration: Duration,
}

impl ChromeStripper {
    pub fn new(timeouts: &ViewerTimeouts) -> Self {
        Self {
            poll_interval: timeouts.poll_interval,
            poll_attempts: timeouts.poll_attempts,
            sweep_interval: timeouts.sweep_interval,
            sweep_duration: timeouts.sweep_duration,
        }
    }

    pub async fn run(&self, document: &mut dyn FrameDocument) -> StripReport {
        let mut report = StripReport::default();

        let mut ticker = interval_at(Instant::now() + self.poll_interval, self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        for attempt in 1..=self.poll_attempts {
            ticker.tick().await;
            report.polls += 1;
            match document.hide_elements(&CHROME_SELECTORS, attempt > REMOVE_AFTER_ATTEMPTS) {
                Ok(0) => {}
                Ok(count) => {
                    debug!(attempt, count, "chrome hidden");
                    report.hidden += count;
                }
                Err(CrossOrigin) => report.refused += 1,
            }
        }
        debug!(polls = report.polls, "periodic hiding finished");

        let sweep = async {
            let mut ticker = interval_at(Instant::now() + self.sweep_interval, self.sweep_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                report.sweeps += 1;
                match document.hide_elements(&SWEEP_SELECTORS, true) {
                    Ok(count) => report.hidden += count,
                    Err(CrossOrigin) => report.refused += 1,
                }
            }
        };
        // the sweep never ends by itself
        let _ = tokio::time::timeout(self.sweep_duration, sweep).await;

        info!(
            hidden = report.hidden,
            refused = report.refused,
            "chrome stripping finished"
        );
        report
    }
}

/// Extraction, falling back to timed hiding when nothing could be extracted.
pub async fn strip_chrome(
    document: &mut dyn FrameDocument,
    timeouts: &ViewerTimeouts,
) -> (ExtractionOutcome, Option<StripReport>) {
    let outcome = ContentExtractor::new(timeouts).extract(document).await;
    if outcome != ExtractionOutcome::Unavailable {
        return (outcome, None);
    }
    let report = ChromeStripper::new(timeouts).run(document).await;
    (outcome, Some(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_use_the_frame_protocol() {
        let json = serde_json::to_value(FrameMessage::extract_request()).unwrap();
        assert_eq!(json["type"], "extractContent");
        assert_eq!(json["selectors"].as_array().unwrap().len(), 5);

        let reply: FrameMessage =
            serde_json::from_str(r#"{"type":"contentExtracted","content":"<p>hi</p>"}"#).unwrap();
        assert_eq!(
            reply,
            FrameMessage::ContentExtracted {
                content: "<p>hi</p>".into()
            }
        );
    }
}
