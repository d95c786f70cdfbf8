//! The public façade — `spec.md` §4.5's `initialize`/`allocate`/`free`/
//! `reallocate` surface, wired up from the component modules.
//!
//! Grounded on `examples/original_source/mm.c`'s `mm_init`/`mm_malloc`/
//! `mm_free`/`mm_realloc`, reshaped into methods on a struct that owns its
//! own [`Arena`] and [`FreeList`] instead of the reference's global statics.

use std::ptr::NonNull;

use crate::align::{CHUNKSIZE, DWORD, MIN_BLOCK, adjusted_size};
use crate::arena::Arena;
use crate::block::{block_size, is_allocated, next_block, set_tags};
use crate::checker;
use crate::checker::Violation;
use crate::coalesce::{extend_heap, free_block};
use crate::error::AllocError;
use crate::freelist::FreeList;
use crate::placement::{find_fit, place};
use crate::provider::{HeapProvider, SbrkHeap};
use crate::trace;

/// An explicit-free-list allocator generic over its [`HeapProvider`].
///
/// Most callers want the [`Allocator`] alias (backed by real `sbrk`); the
/// generic form exists so tests can plug in a provider that deterministically
/// simulates out-of-memory.
pub struct GenericAllocator<P: HeapProvider> {
  arena: Arena<P>,
  freelist: FreeList,
}

/// The allocator as a real process would use it, backed by POSIX `sbrk`.
pub type Allocator = GenericAllocator<SbrkHeap>;

impl Allocator {
  /// Builds an allocator backed by [`SbrkHeap`]. No system call is made
  /// until [`GenericAllocator::initialize`] runs.
  pub fn new() -> Self {
    Self::with_provider(SbrkHeap::new())
  }
}

impl Default for Allocator {
  fn default() -> Self {
    Self::new()
  }
}

impl<P: HeapProvider> GenericAllocator<P> {
  pub fn with_provider(provider: P) -> Self {
    Self { arena: Arena::new(provider), freelist: FreeList::new() }
  }

  /// Requests the first chunk from the heap provider and formats it as a
  /// single free block — `spec.md` §4.5's `initialize`. Must run before any
  /// other method; calling it twice simply requests another chunk.
  pub fn initialize(&mut self) -> Result<(), AllocError> {
    extend_heap(&mut self.arena, &mut self.freelist, CHUNKSIZE)
      .map(|_| ())
      .ok_or(AllocError::ProviderExhausted)
  }

  /// Reserves at least `size` usable bytes and returns the payload pointer,
  /// or `None` if the provider refuses to grow further. `size == 0` always
  /// returns `None` (`spec.md` §7: a non-exceptional outcome, not an error).
  pub fn allocate(&mut self, size: usize) -> Option<NonNull<u8>> {
    if size == 0 {
      return None;
    }
    let asize = adjusted_size(size);

    let bp = match find_fit(&self.arena, &self.freelist, asize) {
      Some(bp) => bp,
      None => {
        let request = asize.max(CHUNKSIZE);
        extend_heap(&mut self.arena, &mut self.freelist, request)?
      }
    };

    let outcome = place(&mut self.arena, &mut self.freelist, bp, asize);
    if outcome.needs_growth {
      // Placement emptied the free list. Growing keeps the "free list
      // non-empty after an allocation succeeds" invariant intact for the
      // caller's next request; failure here does not unwind this one.
      let _ = extend_heap(&mut self.arena, &mut self.freelist, CHUNKSIZE);
    }

    trace!("allocate: asize={asize} -> offset {bp}");
    Some(self.arena.payload_ptr(bp))
  }

  /// Returns `ptr`'s block to the free list, coalescing with any free
  /// physical neighbors — `spec.md` §4.5.
  ///
  /// # Safety-relevant precondition
  /// `ptr` must be a payload pointer previously returned by this same
  /// allocator's `allocate`/`reallocate` and not already freed. Violating
  /// this is undefined behavior, per `spec.md` §7 — the allocator does not
  /// detect double-frees or foreign pointers.
  pub fn free(&mut self, ptr: NonNull<u8>) {
    let bp = self.arena.offset_of(ptr);
    trace!("free: offset {bp}");
    free_block(&mut self.arena, &mut self.freelist, bp);
  }

  /// Resizes the allocation at `ptr` to `size` bytes, preserving the
  /// min(old, new) leading bytes of its contents — `spec.md` §4.5.
  ///
  /// `ptr == None` behaves as `allocate(size)`; `size == 0` behaves as
  /// `free(ptr)` and returns `None`. Shrinking falls back to the general
  /// allocate-copy-free path (`SPEC_FULL.md` §9: no in-place-shrink
  /// specialization).
  pub fn reallocate(&mut self, ptr: Option<NonNull<u8>>, size: usize) -> Option<NonNull<u8>> {
    let ptr = match ptr {
      None => return self.allocate(size),
      Some(ptr) => ptr,
    };
    if size == 0 {
      self.free(ptr);
      return None;
    }

    let bp = self.arena.offset_of(ptr);
    let asize = adjusted_size(size);
    let current = block_size(&self.arena, bp);

    if asize == current {
      return Some(ptr);
    }

    if asize < current || !self.try_expand_in_place(bp, current, asize) {
      return self.reallocate_by_copy(ptr, bp, size);
    }

    Some(ptr)
  }

  /// Attempts to satisfy a growing `reallocate` by absorbing a free
  /// physical successor, per `spec.md` §4.5's in-place expansion path.
  /// Returns `false` when there's no free neighbor or it isn't big enough,
  /// leaving `bp` untouched.
  fn try_expand_in_place(&mut self, bp: u32, current: u32, asize: u32) -> bool {
    let Some(next) = next_block(&self.arena, bp) else {
      return false;
    };
    if is_allocated(&self.arena, next) {
      return false;
    }
    let next_size = block_size(&self.arena, next);
    if current + next_size <= asize {
      // spec.md §4.5 requires the strict inequality `block_size(ptr) +
      // block_size(next) > asize`; an exact-fit neighbor still falls
      // through to the general allocate-copy-free path, matching
      // mm.c's `mm_realloc` (`asize < extendedBlockPayloadSize`).
      return false;
    }

    self.freelist.remove(&mut self.arena, next);
    let combined = current + next_size;
    let remainder = combined - asize;

    if remainder >= MIN_BLOCK {
      set_tags(&mut self.arena, bp, asize, true);
      let new_free = bp + asize;
      set_tags(&mut self.arena, new_free, remainder, false);
      self.freelist.insert_head(&mut self.arena, new_free);
    } else {
      // remainder is 0 or 8: too small (or exactly zero) to stand alone,
      // same orphan-absorption rule `place` uses.
      set_tags(&mut self.arena, bp, combined, true);
      if self.freelist.is_empty() {
        let _ = extend_heap(&mut self.arena, &mut self.freelist, CHUNKSIZE);
      }
    }

    true
  }

  fn reallocate_by_copy(&mut self, ptr: NonNull<u8>, bp: u32, size: usize) -> Option<NonNull<u8>> {
    let old_usable = (block_size(&self.arena, bp) - DWORD) as usize;
    let new_ptr = self.allocate(size)?;

    let copy_len = old_usable.min(size);
    unsafe {
      std::ptr::copy_nonoverlapping(ptr.as_ptr(), new_ptr.as_ptr(), copy_len);
    }
    self.free(ptr);
    Some(new_ptr)
  }

  /// Walks arena and free-list state looking for broken invariants —
  /// `spec.md` §8's "Universal invariants," exposed for diagnostics and
  /// tests. Never mutates state.
  pub fn consistency_check(&self) -> bool {
    checker::check(&self.arena, &self.freelist)
  }

  /// As [`consistency_check`](Self::consistency_check), but names every
  /// violation found instead of collapsing them to a bool.
  pub fn consistency_report(&self) -> Vec<Violation> {
    checker::report(&self.arena, &self.freelist)
  }
}
