//! Progress-callback trait for pipeline events.
//!
//! Inject an [`Arc<dyn PipelineProgressCallback>`] via
//! [`crate::config::PipelineConfigBuilder::progress_callback`] to follow a run
//! as it moves through the stages and the units of the extraction stage.
//! The CLI drives its spinner from these events; the web UI leaves them off.
//!
//! # Example
//!
//! ```rust
//! use adaptxt::{ExtractionUnit, PipelineConfig, PipelineProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     units: AtomicUsize,
//! }
//!
//! impl PipelineProgressCallback for CountingCallback {
//!     fn on_unit_complete(&self, unit: &ExtractionUnit, chars: usize) {
//!         self.units.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{unit}: {chars} chars");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { units: AtomicUsize::new(0) });
//!
//! let config = PipelineConfig::builder()
//!     .progress_callback(counter as Arc<dyn PipelineProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::ExtractionUnit;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// The pipeline stages, in the order a run visits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Extraction,
    Detection,
    Translation,
    Summarization,
    Speech,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Extraction => "Extracting",
            Stage::Detection => "Detecting language",
            Stage::Translation => "Translating",
            Stage::Summarization => "Summarizing",
            Stage::Speech => "Transcribing",
        };
        f.write_str(s)
    }
}

/// Called by the pipeline as it runs.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait PipelineProgressCallback: Send + Sync {
    /// Called when a stage begins.
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called when one extraction unit produced text (possibly zero chars).
    fn on_unit_complete(&self, unit: &ExtractionUnit, chars: usize) {
        let _ = (unit, chars);
    }

    /// Called when one extraction unit failed and contributes nothing.
    fn on_unit_error(&self, unit: &ExtractionUnit, error: &str) {
        let _ = (unit, error);
    }

    /// Called when a stage finishes, whatever its outcome.
    ///
    /// `status` is `success`, `empty`, `failed` or `skipped`.
    fn on_stage_complete(&self, stage: Stage, status: &str) {
        let _ = (stage, status);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl PipelineProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::PipelineConfig`].
pub type ProgressCallback = Arc<dyn PipelineProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingCallback {
        events: Mutex<Vec<String>>,
    }

    impl PipelineProgressCallback for RecordingCallback {
        fn on_stage_start(&self, stage: Stage) {
            self.events.lock().unwrap().push(format!("start {stage:?}"));
        }

        fn on_unit_complete(&self, unit: &ExtractionUnit, chars: usize) {
            self.events.lock().unwrap().push(format!("{unit} {chars}"));
        }

        fn on_unit_error(&self, unit: &ExtractionUnit, _error: &str) {
            self.events.lock().unwrap().push(format!("{unit} error"));
        }

        fn on_stage_complete(&self, stage: Stage, status: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("done {stage:?} {status}"));
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_stage_start(Stage::Extraction);
        cb.on_unit_complete(&ExtractionUnit::Image, 12);
        cb.on_unit_error(&ExtractionUnit::PageText { page: 1 }, "boom");
        cb.on_stage_complete(Stage::Extraction, "success");
    }

    #[test]
    fn recording_callback_receives_events_in_order() {
        let rec = Arc::new(RecordingCallback::default());
        let cb: ProgressCallback = rec.clone();
        cb.on_stage_start(Stage::Extraction);
        cb.on_unit_complete(&ExtractionUnit::PageText { page: 1 }, 40);
        cb.on_unit_error(&ExtractionUnit::PageImage { page: 1, index: 2 }, "bad jpeg");
        cb.on_stage_complete(Stage::Extraction, "success");
        cb.on_stage_start(Stage::Translation);
        cb.on_stage_complete(Stage::Translation, "failed");

        let events = rec.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                "start Extraction",
                "page 1 text 40",
                "page 1 image 2 error",
                "done Extraction success",
                "start Translation",
                "done Translation failed",
            ]
        );
    }

    #[test]
    fn stage_display_is_a_verb() {
        assert_eq!(Stage::Translation.to_string(), "Translating");
    }
}
