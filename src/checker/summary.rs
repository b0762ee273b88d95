// src/checker/summary.rs
// =============================================================================
// Collects results while a run progresses and turns them into an exit code.
//
// Only failures are kept; successes are counted. The failure list is
// append-only and stays in scan order.
// =============================================================================

use std::path::Path;

use super::reference::{CheckResult, CheckStatus};

#[derive(Debug, Default)]
pub struct RunSummary {
    pub checked: usize,
    pub failures: Vec<CheckResult>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result: &CheckResult) {
        self.checked += 1;
        if !result.is_ok() {
            self.failures.push(result.clone());
        }
    }

    pub fn ok_count(&self) -> usize {
        self.checked - self.failures.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// 0 = every reference is fine, 1 = at least one failed
    pub fn exit_code(&self) -> i32 {
        if self.has_failures() {
            1
        } else {
            0
        }
    }
}

/// The success/failure markers printed in front of each result line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbols {
    pub ok: &'static str,
    pub fail: &'static str,
}

impl Symbols {
    pub const UNICODE: Symbols = Symbols {
        ok: "\u{2714}",
        fail: "\u{274c}",
    };

    pub const ASCII: Symbols = Symbols {
        ok: "OK",
        fail: "FAIL",
    };

    pub fn new(force_ascii: bool) -> Self {
        if force_ascii {
            Self::ASCII
        } else {
            Self::UNICODE
        }
    }

    /// `<symbol>: <file>: <reference>`
    pub fn format(&self, result: &CheckResult) -> String {
        let symbol = match result.status {
            CheckStatus::Ok => self.ok,
            CheckStatus::Fail => self.fail,
        };
        format_line(symbol, &result.file, &result.reference)
    }
}

fn format_line(symbol: &str, file: &Path, reference: &str) -> String {
    format!("{}: {}: {}", symbol, file.display(), reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::reference::{Detail, Reference, ScanTarget};

    fn results() -> (CheckResult, CheckResult) {
        let target = ScanTarget::new("a.md", ".");
        let good = Reference::remote("https://good.example.com", &target);
        let bad = Reference::remote("https://bad.example.com", &target);
        (
            CheckResult::ok(&good),
            CheckResult::fail(&bad, Some(Detail::Status(404))),
        )
    }

    #[test]
    fn test_empty_summary_exits_zero() {
        let summary = RunSummary::new();
        assert_eq!(summary.exit_code(), 0);
        assert_eq!(summary.checked, 0);
    }

    #[test]
    fn test_one_failure_exits_one() {
        let (good, bad) = results();
        let mut summary = RunSummary::new();
        summary.record(&good);
        summary.record(&bad);

        assert_eq!(summary.exit_code(), 1);
        assert_eq!(summary.ok_count(), 1);
        assert_eq!(summary.failures, vec![bad]);
    }

    #[test]
    fn test_ascii_line_format() {
        let (good, bad) = results();
        let symbols = Symbols::new(true);
        assert_eq!(symbols.format(&good), "OK: a.md: https://good.example.com");
        assert_eq!(symbols.format(&bad), "FAIL: a.md: https://bad.example.com");
    }

    #[test]
    fn test_unicode_line_format() {
        let (good, _) = results();
        assert_eq!(
            Symbols::new(false).format(&good),
            "\u{2714}: a.md: https://good.example.com"
        );
    }
}
