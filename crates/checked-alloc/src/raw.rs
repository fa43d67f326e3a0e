//! Low-level primitives over `std::alloc::System`.
//!
//! Every `unsafe` call in the system-backed allocation path lives here,
//! each with a `// SAFETY:` comment.

#![allow(unsafe_code)]

use std::alloc::{GlobalAlloc, Layout, System};
use std::ptr::{self, NonNull};

/// A non-null, `align`-aligned pointer valid for zero-byte accesses.
///
/// Used for zero-length blocks, which never reach an allocator.
pub(crate) fn dangling(align: usize) -> NonNull<u8> {
    NonNull::new(ptr::without_provenance_mut::<u8>(align)).unwrap_or(NonNull::dangling())
}

/// Ask `System` for `layout`, optionally zeroed. Returns `None` on failure.
///
/// `layout.size()` must be non-zero.
pub(crate) fn system_alloc(layout: Layout, zeroed: bool) -> Option<NonNull<u8>> {
    debug_assert!(layout.size() != 0, "zero-size layouts never reach System");
    // SAFETY: layout has non-zero size (checked by every caller, asserted above).
    let ptr = unsafe {
        if zeroed {
            System.alloc_zeroed(layout)
        } else {
            System.alloc(layout)
        }
    };
    NonNull::new(ptr)
}

/// Return memory obtained from [`system_alloc`].
///
/// # Safety
///
/// `ptr` must come from `system_alloc(layout, _)` with this exact layout
/// and must not have been released already.
pub(crate) unsafe fn system_release(ptr: NonNull<u8>, layout: Layout) {
    // SAFETY: forwarded from the caller's contract.
    unsafe { System.dealloc(ptr.as_ptr(), layout) }
}

/// Zero `len` bytes starting at `ptr`.
///
/// # Safety
///
/// `ptr` must be valid for writes of `len` bytes.
pub(crate) unsafe fn zero(ptr: NonNull<u8>, len: usize) {
    // SAFETY: forwarded from the caller's contract.
    unsafe { ptr::write_bytes(ptr.as_ptr(), 0, len) }
}
