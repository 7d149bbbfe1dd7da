//! Hash domain governance lock tests.
//!
//! Proves:
//! 1. Canonical domain set has expected count (catches forgotten additions to ALL)
//! 2. All domain byte strings are unique
//! 3. All domains are null-terminated
//! 4. All domains follow the `CHROMA::*::V1\0` naming convention
//! 5. No raw `CHROMA::` domain literals in production source outside `hash_domain.rs`

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chroma_kernel::proof::hash::HashDomain;

#[test]
fn hash_domain_canonical_set_count() {
    assert_eq!(
        HashDomain::ALL.len(),
        6,
        "expected 6 domain variants; if you added a new domain, update this count"
    );
}

#[test]
fn hash_domain_all_unique_bytes() {
    let mut seen = BTreeSet::new();
    for domain in HashDomain::ALL {
        assert!(
            seen.insert(domain.as_bytes()),
            "duplicate domain bytes: {domain}"
        );
    }
}

#[test]
fn hash_domain_all_null_terminated() {
    for domain in HashDomain::ALL {
        assert!(
            domain.as_bytes().ends_with(&[0]),
            "{domain} is not null-terminated"
        );
    }
}

#[test]
fn hash_domain_all_follow_naming_convention() {
    for domain in HashDomain::ALL {
        let bytes = domain.as_bytes();
        assert!(
            bytes.starts_with(b"CHROMA::"),
            "{domain} does not start with CHROMA::"
        );
        assert!(
            bytes.ends_with(b"::V1\0"),
            "{domain} does not end with ::V1\\0"
        );
    }
}

// ---------------------------------------------------------------------------
// Source scan
// ---------------------------------------------------------------------------

/// Scan kernel/, search/, service/ source for `b"CHROMA::` literals.
/// The only file allowed to contain them is `hash_domain.rs`.
#[test]
fn no_raw_domain_literals_outside_authority() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
    let production_dirs = ["kernel/src", "search/src", "service/src"];

    let mut scanned = 0;
    let mut violations = Vec::new();
    for dir in production_dirs {
        let dir = root.join(dir);
        assert!(dir.is_dir(), "missing source dir {}", dir.display());
        for path in rust_files(&dir) {
            if path.file_name().and_then(|n| n.to_str()) == Some("hash_domain.rs") {
                continue;
            }
            scanned += 1;
            scan_file(&path, "b\"CHROMA::", &mut violations);
        }
    }

    assert!(scanned > 0, "no source files scanned");
    assert!(
        violations.is_empty(),
        "raw CHROMA:: domain literals found outside hash_domain.rs:\n{}",
        violations.join("\n")
    );
}

/// Record non-comment lines containing `pattern`, skipping `#[cfg(test)]`
/// blocks by brace depth.
fn scan_file(path: &Path, pattern: &str, violations: &mut Vec<String>) {
    let Ok(content) = std::fs::read_to_string(path) else {
        return;
    };

    let mut brace_depth: usize = 0;
    let mut skip_depth: Option<usize> = None;
    let mut cfg_test_pending = false;

    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim();

        if trimmed.contains("#[cfg(test)]") {
            cfg_test_pending = true;
            continue;
        }

        let opens = line.chars().filter(|&c| c == '{').count();
        let closes = line.chars().filter(|&c| c == '}').count();

        if cfg_test_pending && opens > 0 {
            skip_depth = Some(brace_depth);
            cfg_test_pending = false;
        }

        brace_depth = brace_depth.saturating_add(opens);
        brace_depth = brace_depth.saturating_sub(closes);

        if let Some(depth) = skip_depth {
            if brace_depth <= depth {
                skip_depth = None;
            }
            continue;
        }

        if trimmed.starts_with("//") {
            continue;
        }

        if trimmed.contains(pattern) {
            violations.push(format!("  {}:{}: {}", path.display(), i + 1, trimmed));
        }
    }
}

fn rust_files(dir: &Path) -> Vec<PathBuf> {
    let mut results = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                results.extend(rust_files(&path));
            } else if path.extension().and_then(|e| e.to_str()) == Some("rs") {
                results.push(path);
            }
        }
    }
    results
}
