//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - The engine is frame-driven: no sleeping and no wall-clock reads
//! - The core stays headless: no terminal or rendering crates
//!
//! The helpers here walk the workspace sources so each test only has to
//! describe what it forbids.

use std::fs;
use std::path::{Path, PathBuf};

/// A forbidden pattern found in a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File containing the match
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// The offending line, trimmed
    pub text: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} - {}", self.path.display(), self.line, self.text)
    }
}

/// Workspace root, resolved from this package's manifest directory
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// Every `.rs` file below `dir`, relative to the workspace root
pub fn rust_files(dir: &str) -> Vec<PathBuf> {
    let path = workspace_root().join(dir);
    assert!(path.exists(), "source directory {} is missing", path.display());

    walkdir::WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(|e| e.into_path())
        .collect()
}

/// Scan production lines of every file in `dir` for any of `patterns`
///
/// Comments and `#[cfg(test)]` modules are skipped.
pub fn scan(dir: &str, patterns: &[&str]) -> Vec<Violation> {
    let mut violations = Vec::new();
    for path in rust_files(dir) {
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => continue,
        };
        violations.extend(scan_source(&path, &content, patterns));
    }
    violations
}

/// Scan one file's content
pub fn scan_source(path: &Path, content: &str, patterns: &[&str]) -> Vec<Violation> {
    let mut violations = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        // Everything after the test module is test code
        if line.trim_start().starts_with("#[cfg(test)]") {
            break;
        }

        let code_part = line.split("//").next().unwrap_or(line);
        if patterns.iter().any(|p| code_part.contains(p)) {
            violations.push(Violation {
                path: path.to_path_buf(),
                line: idx + 1,
                text: line.trim().to_string(),
            });
        }
    }
    violations
}

/// Panic with a readable report if `violations` is not empty
pub fn report(title: &str, violations: &[Violation]) {
    if violations.is_empty() {
        return;
    }

    eprintln!("\n❌ CRITICAL: {title}\n");
    for violation in violations {
        eprintln!("  ❌ {violation}");
    }

    panic!(
        "\nFound {} violation(s).\nFix these before merging!",
        violations.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_source_finds_pattern() {
        let code = "fn tick() {\n    std::thread::sleep(d);\n}\n";
        let found = scan_source(Path::new("x.rs"), code, &["::sleep("]);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 2);
        assert_eq!(found[0].text, "std::thread::sleep(d);");
    }

    #[test]
    fn test_scan_source_skips_comments_and_tests() {
        let code = "// call ::sleep( here\nfn a() {}\n#[cfg(test)]\nmod tests {\n    fn b() { std::thread::sleep(d); }\n}\n";
        let found = scan_source(Path::new("x.rs"), code, &["::sleep("]);

        assert!(found.is_empty());
    }
}
