//! Per-page result rendering.

use parking_lot::Mutex;
use tracing::debug;

use inkcheck_protocols::{CorrectionResult, Intent, ResultView, TransformResult};

/// Something a page displayed.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Progress(Intent),
    Correction {
        original: String,
        result: CorrectionResult,
    },
    Prompt(TransformResult),
    Error(String),
}

/// Keeps everything rendered in one page, in order.
#[derive(Default)]
pub struct PageView {
    rendered: Mutex<Vec<Rendered>>,
}

impl PageView {
    pub fn rendered(&self) -> Vec<Rendered> {
        self.rendered.lock().clone()
    }

    pub fn last(&self) -> Option<Rendered> {
        self.rendered.lock().last().cloned()
    }

    fn push(&self, item: Rendered) {
        self.rendered.lock().push(item);
    }
}

impl ResultView for PageView {
    fn show_progress(&self, intent: Intent) {
        debug!(%intent, "Showing progress");
        self.push(Rendered::Progress(intent));
    }

    fn show_correction(&self, original: &str, result: &CorrectionResult) {
        self.push(Rendered::Correction {
            original: original.to_string(),
            result: result.clone(),
        });
    }

    fn show_prompt(&self, result: &TransformResult) {
        self.push(Rendered::Prompt(result.clone()));
    }

    fn show_error(&self, message: &str) {
        self.push(Rendered::Error(message.to_string()));
    }
}
