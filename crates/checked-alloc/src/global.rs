//! A fail-fast `GlobalAlloc` adapter.
//!
//! Installing [`FailFastGlobal`] as the `#[global_allocator]` routes every
//! heap allocation in the process through the fail-fast path: a null from
//! the inner allocator becomes a diagnostic line and an abort, instead of
//! the standard library's default allocation error handler.
//!
//! ```ignore
//! #[global_allocator]
//! static GLOBAL: FailFastGlobal = FailFastGlobal::system().with_label("my-tool");
//! ```

#![allow(unsafe_code)]

use std::alloc::{GlobalAlloc, Layout, System};

use crate::config::{is_blank, Diagnostic};
use crate::error::AllocError;
use crate::failure;

/// `GlobalAlloc` wrapper that aborts on allocation failure.
///
/// The failure path never allocates: it always writes the plain message
/// line, regardless of any backtrace setting elsewhere.
#[derive(Debug)]
pub struct FailFastGlobal<A = System> {
    inner: A,
    label: &'static str,
    diagnostic: Diagnostic,
}

impl FailFastGlobal<System> {
    /// Wrap the system allocator.
    pub const fn system() -> Self {
        Self::new(System)
    }
}

impl<A> FailFastGlobal<A> {
    /// Wrap an arbitrary global allocator.
    pub const fn new(inner: A) -> Self {
        Self {
            inner,
            label: crate::config::FailFastConfig::DEFAULT_LABEL,
            diagnostic: Diagnostic::Message,
        }
    }

    /// Use `label` as the diagnostic prefix.
    ///
    /// # Panics
    ///
    /// Panics if `label` is empty or whitespace, the same rule
    /// [`FailFastConfig::validate`](crate::FailFastConfig::validate) applies.
    /// In a `static` initialiser this is a compile-time error.
    pub const fn with_label(mut self, label: &'static str) -> Self {
        assert!(!is_blank(label), "diagnostic label is empty");
        self.label = label;
        self
    }

    /// Abort without writing a diagnostic.
    pub const fn silent(mut self) -> Self {
        self.diagnostic = Diagnostic::Silent;
        self
    }

    /// The wrapped allocator.
    pub fn inner(&self) -> &A {
        &self.inner
    }

    #[cold]
    #[inline(never)]
    fn fail(&self, layout: Layout) -> ! {
        failure::report(&AllocError::exhausted(layout), self.label, self.diagnostic);
        std::process::abort()
    }
}

// SAFETY: every method forwards to `inner` unchanged; the only addition is
// that a null result aborts instead of being returned.
unsafe impl<A: GlobalAlloc> GlobalAlloc for FailFastGlobal<A> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        // SAFETY: forwarded from the caller's contract.
        let ptr = unsafe { self.inner.alloc(layout) };
        if ptr.is_null() {
            self.fail(layout);
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        // SAFETY: forwarded from the caller's contract.
        let ptr = unsafe { self.inner.alloc_zeroed(layout) };
        if ptr.is_null() {
            self.fail(layout);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        // SAFETY: forwarded from the caller's contract.
        unsafe { self.inner.dealloc(ptr, layout) }
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        // SAFETY: forwarded from the caller's contract.
        let new_ptr = unsafe { self.inner.realloc(ptr, layout, new_size) };
        if new_ptr.is_null() {
            // The caller guarantees new_size is a valid size for layout.align().
            let requested = Layout::from_size_align(new_size, layout.align()).unwrap_or(layout);
            self.fail(requested);
        }
        new_ptr
    }
}
