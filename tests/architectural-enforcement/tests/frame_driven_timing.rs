//! Integration Test: Frame-Driven Timing
//!
//! **Policy**: Panel timing advances only through the frame deltas a host
//! passes to `tick`. Production code in the core and the simulator MUST NOT
//! sleep or read the wall clock.

use architectural_enforcement::{report, scan};

const SLEEP_PATTERNS: &[&str] = &["::sleep(", ".sleep("];

const CLOCK_PATTERNS: &[&str] = &["Instant::now", "SystemTime::now", "chrono::"];

#[test]
fn test_no_sleep_in_production_code() {
    let mut violations = scan("curtain/core/src", SLEEP_PATTERNS);
    violations.extend(scan("curtain/sim/src", SLEEP_PATTERNS));

    report("Sleep calls found in production code!", &violations);
}

#[test]
fn test_no_wall_clock_in_core() {
    let violations = scan("curtain/core/src", CLOCK_PATTERNS);

    report(
        "Wall-clock reads found in the core! Advance timers from tick deltas.",
        &violations,
    );
}

#[test]
fn test_core_spawns_no_threads() {
    let violations = scan("curtain/core/src", &["thread::spawn", "tokio::spawn"]);

    report("Background work found in the core!", &violations);
}
