//! Process-termination behaviour of the fail-fast path.
//!
//! Each test re-runs itself in a child process (see
//! `checked_alloc_test_utils::abort`); the child takes the failing path and
//! the parent checks that it died by `abort()` with the expected diagnostic.

use checked_alloc::collections::{reserve_string, reserve_vec};
use checked_alloc::{CheckedAllocator, Diagnostic, FailFastConfig};
use checked_alloc_test_utils::abort::{self, assert_aborted, assert_completed, stderr_of};
use checked_alloc_test_utils::{FailAfter, FailingAllocator};

#[test]
fn failing_allocator_aborts_instead_of_returning() {
    if abort::is_child() {
        let alloc = CheckedAllocator::new(FailingAllocator);
        let _block = alloc.allocate(64);
        return;
    }
    let output = abort::run_child("failing_allocator_aborts_instead_of_returning");
    assert_aborted(&output);
    let stderr = stderr_of(&output);
    assert!(
        stderr.contains(
            "checked-alloc: fatal: allocation of 64 bytes (align 16) failed: out of memory; aborting"
        ),
        "unexpected diagnostic: {stderr}"
    );
}

#[test]
fn zeroed_request_to_failing_allocator_aborts() {
    if abort::is_child() {
        let alloc = CheckedAllocator::new(FailingAllocator);
        let _block = alloc.allocate_zeroed(8);
        return;
    }
    let output = abort::run_child("zeroed_request_to_failing_allocator_aborts");
    assert_aborted(&output);
}

#[test]
fn zero_size_never_reaches_failing_allocator() {
    if abort::is_child() {
        let alloc = CheckedAllocator::new(FailingAllocator);
        let block = alloc.allocate(0);
        assert!(block.is_empty());
        drop(block);
        return;
    }
    let output = abort::run_child("zero_size_never_reaches_failing_allocator");
    assert_completed(&output);
}

#[test]
fn earlier_blocks_stay_usable_until_exhaustion_aborts() {
    if abort::is_child() {
        let source = FailAfter::new(3);
        let alloc = CheckedAllocator::new(&source);
        let mut kept = Vec::new();
        for size in [16usize, 256, 4096, 65_536] {
            let mut block = alloc.allocate(size);
            block.fill(0xEE);
            eprintln!("child: allocated {size}");
            kept.push(block);
        }
        return;
    }
    let output = abort::run_child("earlier_blocks_stay_usable_until_exhaustion_aborts");
    assert_aborted(&output);
    let stderr = stderr_of(&output);
    assert!(stderr.contains("child: allocated 4096"));
    assert!(!stderr.contains("child: allocated 65536"));
    assert!(stderr.contains("allocation of 65536 bytes"));
}

#[test]
fn unrepresentable_size_aborts_with_layout_diagnostic() {
    if abort::is_child() {
        let _block = checked_alloc::allocate(usize::MAX);
        return;
    }
    let output = abort::run_child("unrepresentable_size_aborts_with_layout_diagnostic");
    assert_aborted(&output);
    assert!(stderr_of(&output).contains("size exceeds isize::MAX"));
}

#[test]
fn custom_label_prefixes_diagnostic() {
    if abort::is_child() {
        let config = FailFastConfig {
            label: "compiler",
            ..FailFastConfig::DEFAULT
        };
        let alloc = CheckedAllocator::with_config(FailingAllocator, config).unwrap();
        let _block = alloc.allocate(1);
        return;
    }
    let output = abort::run_child("custom_label_prefixes_diagnostic");
    assert_aborted(&output);
    assert!(stderr_of(&output).contains("compiler: fatal: allocation of 1 bytes"));
}

#[test]
fn silent_diagnostic_writes_nothing_of_its_own() {
    if abort::is_child() {
        let config = FailFastConfig {
            diagnostic: Diagnostic::Silent,
            ..FailFastConfig::DEFAULT
        };
        let alloc = CheckedAllocator::with_config(FailingAllocator, config).unwrap();
        let _block = alloc.allocate(32);
        return;
    }
    let output = abort::run_child("silent_diagnostic_writes_nothing_of_its_own");
    assert_aborted(&output);
    assert!(!stderr_of(&output).contains("fatal:"));
}

#[test]
fn backtrace_diagnostic_follows_message() {
    if abort::is_child() {
        let config = FailFastConfig {
            diagnostic: Diagnostic::Backtrace,
            ..FailFastConfig::DEFAULT
        };
        let alloc = CheckedAllocator::with_config(FailingAllocator, config).unwrap();
        let _block = alloc.allocate(32);
        return;
    }
    let output = abort::run_child("backtrace_diagnostic_follows_message");
    assert_aborted(&output);
    let stderr = stderr_of(&output);
    assert!(stderr.contains("allocation of 32 bytes"));
    // The backtrace follows the message on its own lines.
    assert!(stderr.lines().count() > 1);
}

#[test]
fn impossible_vec_reservation_aborts() {
    if abort::is_child() {
        let mut v: Vec<u64> = Vec::new();
        reserve_vec(&mut v, usize::MAX / 2);
        return;
    }
    let output = abort::run_child("impossible_vec_reservation_aborts");
    assert_aborted(&output);
    assert!(stderr_of(&output).contains("(align 8) failed"));
}

#[test]
fn impossible_string_reservation_aborts() {
    if abort::is_child() {
        let mut s = String::from("source line");
        reserve_string(&mut s, isize::MAX as usize);
        return;
    }
    let output = abort::run_child("impossible_string_reservation_aborts");
    assert_aborted(&output);
    let stderr = stderr_of(&output);
    assert!(stderr.contains("(align 1) failed: size exceeds isize::MAX"));
}

#[test]
fn overflow_on_top_of_existing_elements_is_not_reported_as_oom() {
    if abort::is_child() {
        let mut v: Vec<u64> = vec![0];
        reserve_vec(&mut v, isize::MAX as usize / 8);
        return;
    }
    let output = abort::run_child("overflow_on_top_of_existing_elements_is_not_reported_as_oom");
    assert_aborted(&output);
    let stderr = stderr_of(&output);
    assert!(stderr.contains("size exceeds isize::MAX"));
    assert!(!stderr.contains("out of memory"));
}
