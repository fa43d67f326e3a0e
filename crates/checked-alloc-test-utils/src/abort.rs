//! Harness for tests that expect the process to abort.
//!
//! An abort cannot be caught in-process, so the test re-runs its own binary
//! filtered to itself, with [`CHILD_ENV`] set. The child takes the aborting
//! path; the parent inspects how the child died.
//!
//! ```ignore
//! #[test]
//! fn failing_source_aborts() {
//!     if abort::is_child() {
//!         let _ = CheckedAllocator::new(FailingAllocator).allocate(16);
//!         return;
//!     }
//!     let output = abort::run_child("failing_source_aborts");
//!     abort::assert_aborted(&output);
//! }
//! ```

use std::env;
use std::process::{Command, Output};

/// Set in the child process; its value is the test being re-run.
pub const CHILD_ENV: &str = "CHECKED_ALLOC_ABORT_CHILD";

/// Whether this process is a child spawned by [`run_child`].
pub fn is_child() -> bool {
    env::var_os(CHILD_ENV).is_some()
}

/// Re-run the current test binary, filtered to exactly `test_name`.
///
/// `test_name` is the full libtest path: the bare function name for a
/// top-level test in `tests/`, or `module::tests::name` for a unit test.
pub fn run_child(test_name: &str) -> Output {
    let exe = env::current_exe().expect("test binary path is available");
    Command::new(exe)
        .args([test_name, "--exact", "--nocapture", "--test-threads=1"])
        .env(CHILD_ENV, test_name)
        .output()
        .expect("child test process spawns")
}

/// The child's stderr, lossily decoded.
pub fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Assert the child terminated abnormally via `abort()`.
///
/// On Unix this means killed by `SIGABRT`; elsewhere, any unsuccessful exit.
pub fn assert_aborted(output: &Output) {
    assert!(
        !output.status.success(),
        "child exited successfully; stderr:\n{}",
        stderr_of(output)
    );
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        const SIGABRT: i32 = 6;
        assert_eq!(
            output.status.signal(),
            Some(SIGABRT),
            "child did not abort (status {:?}); stderr:\n{}",
            output.status,
            stderr_of(output)
        );
    }
}

/// Assert the child ran to completion and its test passed.
pub fn assert_completed(output: &Output) {
    assert!(
        output.status.success(),
        "child failed (status {:?}); stderr:\n{}",
        output.status,
        stderr_of(output)
    );
}
