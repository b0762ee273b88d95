// src/checker/reference.rs
// =============================================================================
// The data that flows through a link check run:
//
//   ScanTarget  -> one file picked by the selector
//   Reference   -> one link found inside a ScanTarget
//   CheckResult -> the verdict for exactly one Reference
//
// All three are plain values: created once, never mutated afterwards.
// =============================================================================

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// A file selected for scanning, together with the root it was found under.
///
/// The root matters for local references: they may resolve relative to it
/// instead of the file's own directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTarget {
    pub path: PathBuf,
    pub root: PathBuf,
}

impl ScanTarget {
    pub fn new(path: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            root: root.into(),
        }
    }

    /// The declared suffix, e.g. ".md". Empty for files without an extension.
    pub fn suffix(&self) -> String {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default()
    }

    pub fn is_markdown(&self) -> bool {
        self.suffix() == ".md"
    }

    /// Directory that holds the file (falls back to the scan root)
    pub fn parent(&self) -> &Path {
        self.path.parent().unwrap_or(&self.root)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// A path inside the repository (markdown only)
    Local,
    /// A full http(s) URL
    Remote,
}

/// A link discovered in a scanned file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub kind: ReferenceKind,
    /// Exactly as it will be reported, delimiters already stripped
    pub text: String,
    pub file: PathBuf,
}

impl Reference {
    pub fn local(text: impl Into<String>, target: &ScanTarget) -> Self {
        Self {
            kind: ReferenceKind::Local,
            text: text.into(),
            file: target.path.clone(),
        }
    }

    pub fn remote(text: impl Into<String>, target: &ScanTarget) -> Self {
        Self {
            kind: ReferenceKind::Remote,
            text: text.into(),
            file: target.path.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Ok,
    Fail,
}

/// Extra information attached to a failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Detail {
    /// HTTP status code of the HEAD request
    Status(u16),
    /// Transport error text
    Error(String),
}

impl fmt::Display for Detail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Detail::Status(code) => write!(f, "HTTP {}", code),
            Detail::Error(message) => f.write_str(message),
        }
    }
}

/// The outcome of checking one reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub file: PathBuf,
    pub reference: String,
    pub kind: ReferenceKind,
    pub status: CheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Detail>,
}

impl CheckResult {
    pub fn ok(reference: &Reference) -> Self {
        Self::new(reference, CheckStatus::Ok, None)
    }

    pub fn fail(reference: &Reference, detail: Option<Detail>) -> Self {
        Self::new(reference, CheckStatus::Fail, detail)
    }

    fn new(reference: &Reference, status: CheckStatus, detail: Option<Detail>) -> Self {
        Self {
            file: reference.file.clone(),
            reference: reference.text.clone(),
            kind: reference.kind,
            status,
            detail,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == CheckStatus::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_of_markdown_file() {
        let target = ScanTarget::new("docs/README.md", "docs");
        assert_eq!(target.suffix(), ".md");
        assert!(target.is_markdown());
    }

    #[test]
    fn test_suffix_without_extension() {
        let target = ScanTarget::new("Makefile", ".");
        assert_eq!(target.suffix(), "");
        assert!(!target.is_markdown());
    }

    #[test]
    fn test_result_keeps_reference() {
        let target = ScanTarget::new("a.md", ".");
        let reference = Reference::remote("https://example.com", &target);
        let result = CheckResult::fail(&reference, Some(Detail::Status(404)));

        assert!(!result.is_ok());
        assert_eq!(result.reference, "https://example.com");
        assert_eq!(result.kind, ReferenceKind::Remote);
        assert_eq!(result.detail.unwrap().to_string(), "HTTP 404");
    }

    #[test]
    fn test_result_serializes_detail_untagged() {
        let target = ScanTarget::new("a.md", ".");
        let reference = Reference::remote("https://example.com", &target);
        let result = CheckResult::fail(&reference, Some(Detail::Status(503)));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "fail");
        assert_eq!(json["kind"], "remote");
        assert_eq!(json["detail"], 503);
    }
}
