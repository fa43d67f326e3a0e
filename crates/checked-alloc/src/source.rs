//! The underlying allocator seam.
//!
//! [`RawAllocator`] is the contract the fail-fast layer wraps: hand back a
//! block or say why not. [`SystemAllocator`] implements it over
//! `std::alloc::System`; tests substitute mocks (see `checked-alloc-test-utils`).

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::ptr::NonNull;

use crate::error::AllocError;
use crate::raw;

/// An underlying allocator that reports failure as a value.
///
/// The fail-fast layer never passes a zero-size layout to an implementation.
///
/// # Safety
///
/// A pointer returned by `try_allocate` or `try_allocate_zeroed` must be
/// valid for reads and writes of `layout.size()` bytes, aligned to
/// `layout.align()`, and must not overlap any other live allocation from
/// the same allocator until it is passed to `release`.
pub unsafe trait RawAllocator {
    /// Allocate a block for `layout`, contents unspecified.
    fn try_allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Allocate a block for `layout` with every byte zero.
    fn try_allocate_zeroed(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        let ptr = self.try_allocate(layout)?;
        // SAFETY: the trait contract makes ptr valid for layout.size() writes.
        unsafe { raw::zero(ptr, layout.size()) };
        Ok(ptr)
    }

    /// Return a block to the allocator.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by this allocator for exactly `layout`
    /// and must not be used after this call.
    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout);
}

// SAFETY: forwards to A, which upholds the contract.
unsafe impl<A: RawAllocator + ?Sized> RawAllocator for &A {
    fn try_allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        (**self).try_allocate(layout)
    }

    fn try_allocate_zeroed(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        (**self).try_allocate_zeroed(layout)
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded from the caller's contract.
        unsafe { (**self).release(ptr, layout) }
    }
}

/// The process-wide system allocator, `std::alloc::System`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SystemAllocator;

// SAFETY: System returns distinct, correctly aligned blocks or null.
unsafe impl RawAllocator for SystemAllocator {
    fn try_allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        raw::system_alloc(layout, false).ok_or(AllocError::exhausted(layout))
    }

    fn try_allocate_zeroed(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        raw::system_alloc(layout, true).ok_or(AllocError::exhausted(layout))
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: ptr came from system_alloc with this layout.
        unsafe { raw::system_release(ptr, layout) }
    }
}
