//! Test utilities and mock allocators for checked-alloc development.
//!
//! Provides [`RawAllocator`] implementations with controllable failure and
//! observable state, plus the [`abort`] harness for asserting that a code
//! path terminates the process.
//!
//! - [`FailingAllocator`]: every request fails.
//! - [`FailAfter`]: succeeds N times via the system allocator, then fails.
//! - [`CountingAllocator`]: system-backed, counts calls and bytes.
//! - [`RecordingAllocator`]: system-backed, tracks every live block.

#![deny(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod abort;

use std::alloc::Layout;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use checked_alloc::{AllocError, RawAllocator, SystemAllocator};
use indexmap::IndexMap;

/// An allocator with no memory: every request reports exhaustion.
#[derive(Clone, Copy, Debug, Default)]
pub struct FailingAllocator;

#[allow(unsafe_code)]
// SAFETY: never hands out memory.
unsafe impl RawAllocator for FailingAllocator {
    fn try_allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        Err(AllocError::exhausted(layout))
    }

    unsafe fn release(&self, _ptr: NonNull<u8>, _layout: Layout) {
        unreachable!("FailingAllocator never hands out memory");
    }
}

/// Succeeds `succeed_count` times through the system allocator, then fails.
#[derive(Debug)]
pub struct FailAfter {
    pub succeed_count: usize,
    call_count: AtomicUsize,
}

impl FailAfter {
    /// Create an allocator that succeeds `succeed_count` times then fails.
    pub fn new(succeed_count: usize) -> Self {
        Self {
            succeed_count,
            call_count: AtomicUsize::new(0),
        }
    }

    /// How many allocation requests have been made.
    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[allow(unsafe_code)]
// SAFETY: successful requests are served by SystemAllocator.
unsafe impl RawAllocator for FailAfter {
    fn try_allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        let n = self.call_count.fetch_add(1, Ordering::Relaxed);
        if n >= self.succeed_count {
            return Err(AllocError::exhausted(layout));
        }
        SystemAllocator.try_allocate(layout)
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: ptr came from SystemAllocator with this layout.
        unsafe { SystemAllocator.release(ptr, layout) }
    }
}

/// System-backed allocator that counts what passes through it.
#[derive(Debug, Default)]
pub struct CountingAllocator {
    allocations: AtomicUsize,
    releases: AtomicUsize,
    bytes_allocated: AtomicUsize,
}

impl CountingAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Successful allocations so far.
    pub fn allocations(&self) -> usize {
        self.allocations.load(Ordering::Relaxed)
    }

    /// Releases so far.
    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::Relaxed)
    }

    /// Total bytes handed out, including released blocks.
    pub fn bytes_allocated(&self) -> usize {
        self.bytes_allocated.load(Ordering::Relaxed)
    }

    /// Allocations not yet released.
    ///
    /// Releases are read first: a block is counted as allocated before it
    /// can be released, so the later allocation read is never smaller.
    pub fn outstanding(&self) -> usize {
        let releases = self.releases();
        self.allocations().saturating_sub(releases)
    }
}

#[allow(unsafe_code)]
// SAFETY: all memory is served by SystemAllocator.
unsafe impl RawAllocator for CountingAllocator {
    fn try_allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        let ptr = SystemAllocator.try_allocate(layout)?;
        self.allocations.fetch_add(1, Ordering::Relaxed);
        self.bytes_allocated
            .fetch_add(layout.size(), Ordering::Relaxed);
        Ok(ptr)
    }

    fn try_allocate_zeroed(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        let ptr = SystemAllocator.try_allocate_zeroed(layout)?;
        self.allocations.fetch_add(1, Ordering::Relaxed);
        self.bytes_allocated
            .fetch_add(layout.size(), Ordering::Relaxed);
        Ok(ptr)
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        self.releases.fetch_add(1, Ordering::Relaxed);
        // SAFETY: ptr came from SystemAllocator with this layout.
        unsafe { SystemAllocator.release(ptr, layout) }
    }
}

/// System-backed allocator that records every live block.
///
/// Live blocks are kept in allocation order, keyed by address, so tests
/// can check for overlap and for blocks released with the wrong layout.
#[derive(Debug, Default)]
pub struct RecordingAllocator {
    live: Mutex<IndexMap<usize, Layout>>,
}

impl RecordingAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    fn live(&self) -> MutexGuard<'_, IndexMap<usize, Layout>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of blocks currently allocated.
    pub fn live_count(&self) -> usize {
        self.live().len()
    }

    /// Total bytes in currently allocated blocks.
    pub fn live_bytes(&self) -> usize {
        self.live().values().map(|l| l.size()).sum()
    }

    /// `(address, layout)` of every live block, oldest first.
    pub fn snapshot(&self) -> Vec<(usize, Layout)> {
        self.live().iter().map(|(&a, &l)| (a, l)).collect()
    }

    /// Whether any two live blocks share a byte.
    pub fn has_overlap(&self) -> bool {
        let mut ranges: Vec<(usize, usize)> = self
            .live()
            .iter()
            .map(|(&addr, layout)| (addr, addr + layout.size()))
            .collect();
        ranges.sort_unstable();
        ranges.windows(2).any(|pair| pair[0].1 > pair[1].0)
    }
}

#[allow(unsafe_code)]
// SAFETY: all memory is served by SystemAllocator.
unsafe impl RawAllocator for RecordingAllocator {
    fn try_allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        let ptr = SystemAllocator.try_allocate(layout)?;
        self.live().insert(ptr.as_ptr() as usize, layout);
        Ok(ptr)
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        let recorded = self.live().shift_remove(&(ptr.as_ptr() as usize));
        assert_eq!(
            recorded,
            Some(layout),
            "released block {ptr:?} was not live with layout {layout:?}"
        );
        // SAFETY: ptr came from SystemAllocator with this layout.
        unsafe { SystemAllocator.release(ptr, layout) }
    }
}
