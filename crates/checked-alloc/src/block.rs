//! Owned blocks of raw memory.
//!
//! A [`Block`] is what a successful allocation hands back: `len` bytes of
//! uninitialised memory, exclusively owned by the caller. Dropping the block
//! releases it through the allocator that produced it. Zero-length blocks
//! use a dangling, aligned pointer and never touch an allocator.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::fmt;
use std::marker::PhantomData;
use std::mem::{ManuallyDrop, MaybeUninit};
use std::ptr::{self, NonNull};
use std::slice;

use crate::source::{RawAllocator, SystemAllocator};

/// An owned, uninitialised byte range.
#[must_use = "dropping a block releases it immediately"]
pub struct Block<A: RawAllocator = SystemAllocator> {
    ptr: NonNull<u8>,
    layout: Layout,
    allocator: A,
    _owns: PhantomData<[MaybeUninit<u8>]>,
}

// SAFETY: a Block is a unique owner of its bytes, like Box<[MaybeUninit<u8>]>.
// Moving it to another thread also moves the allocator handle used to release it.
unsafe impl<A: RawAllocator + Send> Send for Block<A> {}
// SAFETY: &Block only exposes shared reads of the bytes and &A.
unsafe impl<A: RawAllocator + Sync> Sync for Block<A> {}

impl<A: RawAllocator> Block<A> {
    /// Wrap memory the allocator just handed out.
    ///
    /// `ptr` must be valid for `layout` and owned by `allocator`, or dangling
    /// when `layout.size() == 0`.
    pub(crate) fn new(ptr: NonNull<u8>, layout: Layout, allocator: A) -> Self {
        Self {
            ptr,
            layout,
            allocator,
            _owns: PhantomData,
        }
    }

    /// Number of accessible bytes.
    pub fn len(&self) -> usize {
        self.layout.size()
    }

    /// Whether this is a zero-length block.
    pub fn is_empty(&self) -> bool {
        self.layout.size() == 0
    }

    /// Size and alignment the block was allocated with.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// The allocator this block will be released to.
    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    /// Start of the block.
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    /// Start of the block, for writes.
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Start of the block as a `NonNull`.
    pub fn as_non_null(&self) -> NonNull<u8> {
        self.ptr
    }

    /// View the block as possibly-uninitialised bytes.
    pub fn as_uninit_slice(&self) -> &[MaybeUninit<u8>] {
        // SAFETY: ptr is valid for len bytes (or dangling with len 0), and
        // MaybeUninit<u8> makes no initialisation claim.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr().cast(), self.len()) }
    }

    /// Mutable view of the block as possibly-uninitialised bytes.
    pub fn as_uninit_slice_mut(&mut self) -> &mut [MaybeUninit<u8>] {
        // SAFETY: as above, and &mut self guarantees exclusive access.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr().cast(), self.len()) }
    }

    /// Copy `src` into the front of the block, returning the initialised prefix.
    ///
    /// # Panics
    ///
    /// Panics if `src` is longer than the block.
    pub fn write_from(&mut self, src: &[u8]) -> &mut [u8] {
        assert!(
            src.len() <= self.len(),
            "source of {} bytes does not fit in a block of {} bytes",
            src.len(),
            self.len()
        );
        // SAFETY: src fits within the block; a Block never aliases caller memory.
        unsafe {
            ptr::copy_nonoverlapping(src.as_ptr(), self.ptr.as_ptr(), src.len());
            slice::from_raw_parts_mut(self.ptr.as_ptr(), src.len())
        }
    }

    /// Set every byte to `byte`, returning the fully initialised block.
    pub fn fill(&mut self, byte: u8) -> &mut [u8] {
        // SAFETY: ptr is valid for len bytes of writes; afterwards all are initialised.
        unsafe {
            ptr::write_bytes(self.ptr.as_ptr(), byte, self.len());
            slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len())
        }
    }

    /// View the block as initialised bytes.
    ///
    /// # Safety
    ///
    /// Every byte must have been initialised, e.g. by [`fill`](Self::fill),
    /// a full-length [`write_from`](Self::write_from), or a zeroed allocation.
    pub unsafe fn assume_init_ref(&self) -> &[u8] {
        // SAFETY: initialisation is the caller's contract; bounds as above.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len()) }
    }

    /// Give up ownership without releasing.
    ///
    /// The caller becomes responsible for returning the memory, either via
    /// [`Block::from_raw`] or directly to the allocator.
    pub fn into_raw(self) -> (NonNull<u8>, Layout) {
        let this = ManuallyDrop::new(self);
        // SAFETY: `this` is never used or dropped again, so the handle is
        // moved out exactly once.
        drop(unsafe { ptr::read(&this.allocator) });
        (this.ptr, this.layout)
    }

    /// Reassemble a block from [`Block::into_raw`] output.
    ///
    /// # Safety
    ///
    /// `ptr` and `layout` must come from `into_raw` on a block produced by
    /// `allocator` (or an equivalent handle to the same allocator), and must
    /// not be reassembled twice.
    pub unsafe fn from_raw(ptr: NonNull<u8>, layout: Layout, allocator: A) -> Self {
        Self::new(ptr, layout, allocator)
    }

    /// Leak the block, returning a slice that lives as long as the allocator.
    pub fn leak<'a>(self) -> &'a mut [MaybeUninit<u8>]
    where
        A: 'a,
    {
        let (ptr, layout) = self.into_raw();
        // SAFETY: the block is never released, so the bytes stay valid.
        unsafe { slice::from_raw_parts_mut(ptr.as_ptr().cast(), layout.size()) }
    }
}

impl<A: RawAllocator> Drop for Block<A> {
    fn drop(&mut self) {
        if self.layout.size() == 0 {
            return;
        }
        // SAFETY: non-empty blocks always come from `allocator` with `layout`.
        unsafe { self.allocator.release(self.ptr, self.layout) }
    }
}

impl<A: RawAllocator> fmt::Debug for Block<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("ptr", &self.ptr)
            .field("len", &self.layout.size())
            .field("align", &self.layout.align())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw;

    fn system_block(size: usize, align: usize) -> Block {
        let layout = Layout::from_size_align(size, align).unwrap();
        let ptr = if size == 0 {
            raw::dangling(align)
        } else {
            raw::system_alloc(layout, false).unwrap()
        };
        Block::new(ptr, layout, SystemAllocator)
    }

    #[test]
    fn write_then_read_back() {
        let mut block = system_block(16, 16);
        let data: Vec<u8> = (0..16).collect();
        assert_eq!(block.write_from(&data), data.as_slice());
        // SAFETY: all 16 bytes were written above.
        assert_eq!(unsafe { block.assume_init_ref() }, data.as_slice());
    }

    #[test]
    fn partial_write_returns_prefix() {
        let mut block = system_block(8, 8);
        let written = block.write_from(&[1, 2, 3]);
        assert_eq!(written, &[1, 2, 3]);
        assert_eq!(block.len(), 8);
    }

    #[test]
    #[should_panic(expected = "does not fit")]
    fn oversized_write_panics() {
        let mut block = system_block(4, 4);
        block.write_from(&[0; 5]);
    }

    #[test]
    fn fill_initialises_every_byte() {
        let mut block = system_block(64, 16);
        assert!(block.fill(0xAB).iter().all(|&b| b == 0xAB));
    }

    #[test]
    fn empty_block_is_aligned_and_droppable() {
        let block = system_block(0, 16);
        assert!(block.is_empty());
        assert!(block.as_uninit_slice().is_empty());
        assert_eq!(block.as_ptr() as usize % 16, 0);
    }

    #[test]
    fn raw_round_trip_keeps_contents() {
        let mut block = system_block(4, 4);
        block.write_from(&[9, 8, 7, 6]);
        let (ptr, layout) = block.into_raw();
        // SAFETY: ptr/layout came from into_raw on a system block.
        let block = unsafe { Block::from_raw(ptr, layout, SystemAllocator) };
        // SAFETY: all 4 bytes were written before into_raw.
        assert_eq!(unsafe { block.assume_init_ref() }, &[9, 8, 7, 6]);
    }

    #[test]
    fn debug_shows_shape() {
        let block = system_block(32, 8);
        let rendered = format!("{block:?}");
        assert!(rendered.contains("len: 32"));
        assert!(rendered.contains("align: 8"));
    }
}
