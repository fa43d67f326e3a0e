//! The fail-fast path: report, then abort.
//!
//! Reachable from inside the global allocator, so the `Message` path must
//! not allocate. It writes straight to the unbuffered `std::io::stderr()`
//! rather than through `eprintln!`, which also keeps the line visible when
//! the test harness is capturing output.

use std::backtrace::Backtrace;
use std::fmt;
use std::io::{self, Write};

use crate::config::{Diagnostic, FailFastConfig};
use crate::error::AllocError;

/// The single diagnostic line written before aborting.
#[derive(Clone, Copy, Debug)]
pub struct FailureReport<'a> {
    /// Program or subsystem prefix.
    pub label: &'a str,
    /// The failure being reported.
    pub error: &'a AllocError,
}

impl fmt::Display for FailureReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: fatal: {}; aborting", self.label, self.error)
    }
}

/// Report `error` per `config` and abort the process.
///
/// Never returns and never unwinds. Write errors on stderr are ignored.
#[cold]
#[inline(never)]
pub fn fail_fast(error: &AllocError, config: &FailFastConfig) -> ! {
    report(error, config.label, config.diagnostic);
    std::process::abort()
}

pub(crate) fn report(error: &AllocError, label: &str, diagnostic: Diagnostic) {
    let report = FailureReport { label, error };
    let mut stderr = io::stderr().lock();
    match diagnostic {
        Diagnostic::Silent => {}
        Diagnostic::Message => {
            let _ = writeln!(stderr, "{report}");
        }
        Diagnostic::Backtrace => {
            let _ = writeln!(stderr, "{report}");
            let _ = writeln!(stderr, "{}", Backtrace::force_capture());
        }
    }
    let _ = stderr.flush();
}
