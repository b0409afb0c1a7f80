//! Integration Test: Headless Core
//!
//! **Policy**: `curtain-core` has zero knowledge of any rendering stack.
//! Visual output is limited to plain property values and host-implemented
//! traits.

use std::fs;

use architectural_enforcement::{report, scan, workspace_root};

const RENDERING_CRATES: &[&str] = &["ratatui", "crossterm", "wgpu", "winit", "egui", "bevy"];

#[test]
fn test_core_sources_import_no_rendering_crates() {
    let patterns: Vec<String> = RENDERING_CRATES
        .iter()
        .flat_map(|name| [format!("use {name}"), format!("{name}::")])
        .collect();
    let patterns: Vec<&str> = patterns.iter().map(String::as_str).collect();

    let violations = scan("curtain/core/src", &patterns);

    report("Rendering imports found in curtain-core!", &violations);
}

#[test]
fn test_core_manifest_has_no_rendering_dependencies() {
    let manifest = fs::read_to_string(workspace_root().join("curtain/core/Cargo.toml"))
        .expect("curtain/core/Cargo.toml should be readable");

    let offending: Vec<&str> = RENDERING_CRATES
        .iter()
        .copied()
        .filter(|name| {
            manifest
                .lines()
                .any(|line| line.trim_start().starts_with(&format!("{name} ")))
        })
        .collect();

    assert!(
        offending.is_empty(),
        "curtain-core must not depend on rendering crates: {offending:?}"
    );
}

#[test]
fn test_core_does_not_print() {
    let violations = scan(
        "curtain/core/src",
        &["println!(", "eprintln!(", "print!(", "dbg!("],
    );

    report("Direct printing found in curtain-core! Use tracing.", &violations);
}
