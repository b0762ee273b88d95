// src/checker/local.rs
// =============================================================================
// Checks local (in-repository) markdown references against the filesystem.
//
// Resolution order for a reference like `docs/setup.md`:
// 1. `#anchor`                   -> in-page anchor, always ok
// 2. <file's directory>/<ref>    -> exists as file or directory?
// 3. <scan root>/<ref>
// 4. bare names only (no '.' or '/', not written as `/name`):
//    <scan root>/<name> and <scan root's parent>/<name>
//
// Leading and trailing slashes are stripped before joining, so `/docs/` and
// `docs` resolve the same way. The only difference a leading slash makes is
// that bare names skip step 4.
// =============================================================================

use std::path::{Path, PathBuf};

use super::reference::{CheckResult, Reference, ScanTarget};

pub fn check_local(reference: &Reference, target: &ScanTarget) -> CheckResult {
    if resolve_local(&reference.text, target).is_some() {
        CheckResult::ok(reference)
    } else {
        CheckResult::fail(reference, None)
    }
}

/// Returns the path a local reference resolves to, if any.
///
/// Anchors resolve to the owning file itself.
pub fn resolve_local(reference: &str, target: &ScanTarget) -> Option<PathBuf> {
    if reference.starts_with('#') {
        return Some(target.path.clone());
    }

    let absolute = reference.starts_with('/');
    let stripped = without_fragment(reference).trim_matches('/');
    let disambiguated = stripped.is_empty() || stripped.contains('.') || stripped.contains('/');

    let mut candidates = vec![target.parent().join(stripped), target.root.join(stripped)];
    if !absolute && !disambiguated {
        if let Some(grandparent) = target.root.parent() {
            candidates.push(grandparent.join(stripped));
        }
    }

    candidates.into_iter().find(|candidate| exists(candidate))
}

// `guide.md#install` -> `guide.md`
fn without_fragment(reference: &str) -> &str {
    match reference.find('#') {
        Some(index) => &reference[..index],
        None => reference,
    }
}

fn exists(path: &Path) -> bool {
    path.is_file() || path.is_dir()
}
