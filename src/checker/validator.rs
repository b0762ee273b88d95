// src/checker/validator.rs
// =============================================================================
// Ties the pieces of a link check run together:
//
//   ScanTarget -> extract_references -> check_local / check_remote -> summary
//
// Files are processed one after another and, inside a file, references are
// checked one after another. Results are handed to a callback as soon as they
// exist so output streams while the run is still going.
// =============================================================================

use std::fs;
use tracing::{debug, warn};

use super::extract::extract_references;
use super::http::{check_remote, Transport};
use super::local::check_local;
use super::reference::{CheckResult, ReferenceKind, ScanTarget};
use super::summary::RunSummary;

pub struct LinkValidator<T: Transport> {
    transport: T,
}

impl<T: Transport> LinkValidator<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Checks every reference in `content`, which belongs to `target`.
    /// One result per reference, in extraction order.
    pub async fn check_content(&self, target: &ScanTarget, content: &str) -> Vec<CheckResult> {
        let references = extract_references(target, content);
        debug!(file = %target.path.display(), count = references.len(), "references found");

        let mut results = Vec::with_capacity(references.len());
        for reference in &references {
            let result = match reference.kind {
                ReferenceKind::Local => check_local(reference, target),
                ReferenceKind::Remote => check_remote(&self.transport, reference).await,
            };
            results.push(result);
        }
        results
    }

    /// Scans all targets and returns the summary of the run.
    ///
    /// Unreadable files are logged and skipped; they never end the run.
    pub async fn run<F>(&self, targets: &[ScanTarget], mut on_result: F) -> RunSummary
    where
        F: FnMut(&CheckResult),
    {
        let mut summary = RunSummary::new();

        for target in targets {
            let bytes = match fs::read(&target.path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("Could not read {}: {}", target.path.display(), e);
                    continue;
                }
            };
            // non-UTF-8 bytes are replaced, not fatal
            let content = String::from_utf8_lossy(&bytes);

            for result in self.check_content(target, &content).await {
                on_result(&result);
                summary.record(&result);
            }
        }

        summary
    }
}
