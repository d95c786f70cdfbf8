//! The consistency checker — a read-only observer of core allocator state.
//!
//! `spec.md` §1 scopes this out of the core allocator proper ("a read-only
//! observer of core state") and §8 spells out the seven invariants it
//! checks. Grounded on `examples/original_source/mm.c`'s `mm_check`, with
//! the ad-hoc `printf`-based diagnostics replaced by a typed [`Violation`]
//! list so tests can assert *which* invariant broke.

use std::collections::HashSet;

use crate::align::{DWORD, MIN_BLOCK, WORD};
use crate::arena::{ALIGN_PAD, Arena};
use crate::block::{block_size, footer_offset, header_offset, in_arena, is_allocated, next_block};
use crate::freelist::FreeList;
use crate::provider::HeapProvider;

/// A single broken invariant from `spec.md` §8's "Universal invariants" list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
  /// Invariant 1: header and footer boundary tags disagree.
  HeaderFooterMismatch { bp: u32 },
  /// Invariant 2: block size is below the minimum or not double-word aligned.
  BadSize { bp: u32, size: u32 },
  /// Invariant 3/7: a block offset falls outside the granted arena.
  OutOfBounds { bp: u32 },
  /// Invariant 4: two physically adjacent blocks are both free.
  AdjacentFreeBlocks { a: u32, b: u32 },
  /// Invariant 4: a block reachable from the free list root is allocated.
  FreeListEntryNotFree { bp: u32 },
  /// Invariant 5: a physically free block is not reachable from the root.
  UnreachableFreeBlock { bp: u32 },
  /// Invariant 6: `b.next.prev != b` (or the symmetric case).
  BrokenLink { bp: u32 },
}

fn first_block_offset() -> u32 {
  ALIGN_PAD + WORD
}

fn header_footer_match<P: HeapProvider>(arena: &Arena<P>, bp: u32) -> bool {
  let hdr = unsafe { arena.read_u32(header_offset(bp)) };
  let ftr = unsafe { arena.read_u32(footer_offset(arena, bp)) };
  hdr == ftr
}

/// Walks both the physical block sequence and the free list, returning
/// every invariant violation found. Never mutates arena or free-list state.
pub fn report<P: HeapProvider>(arena: &Arena<P>, freelist: &FreeList) -> Vec<Violation> {
  let mut violations = Vec::new();
  if !arena.is_initialized() {
    return violations;
  }

  let mut physical_free: HashSet<u32> = HashSet::new();
  let mut bp = Some(first_block_offset());

  while let Some(cur) = bp {
    if !arena.in_bounds(header_offset(cur), WORD) {
      violations.push(Violation::OutOfBounds { bp: cur });
      break;
    }
    if !header_footer_match(arena, cur) {
      violations.push(Violation::HeaderFooterMismatch { bp: cur });
    }

    let size = block_size(arena, cur);
    if size < MIN_BLOCK || size % DWORD != 0 {
      violations.push(Violation::BadSize { bp: cur, size });
    }

    if !is_allocated(arena, cur) {
      physical_free.insert(cur);
    }

    bp = next_block(arena, cur);
  }

  for &free_bp in &physical_free {
    if let Some(next) = next_block(arena, free_bp) {
      if physical_free.contains(&next) {
        violations.push(Violation::AdjacentFreeBlocks { a: free_bp, b: next });
      }
    }
  }

  let mut reachable: HashSet<u32> = HashSet::new();
  for bp in freelist.iter(arena) {
    reachable.insert(bp);

    if !in_arena(arena, bp) {
      violations.push(Violation::OutOfBounds { bp });
      continue;
    }
    if is_allocated(arena, bp) {
      violations.push(Violation::FreeListEntryNotFree { bp });
    }
    if let Some(next) = freelist.next_of(arena, bp) {
      if freelist.prev_of(arena, next) != Some(bp) {
        violations.push(Violation::BrokenLink { bp });
      }
    }
  }

  for &free_bp in &physical_free {
    if !reachable.contains(&free_bp) {
      violations.push(Violation::UnreachableFreeBlock { bp: free_bp });
    }
  }

  violations
}

/// `spec.md`'s public `consistency_check` operation: `true` iff no
/// invariant violation was found.
pub fn check<P: HeapProvider>(arena: &Arena<P>, freelist: &FreeList) -> bool {
  report(arena, freelist).is_empty()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::coalesce::extend_heap;
  use crate::provider::test_support::FakeHeap;

  #[test]
  fn freshly_extended_arena_is_consistent() {
    let mut arena = Arena::new(FakeHeap::new(4096));
    let mut list = FreeList::new();
    extend_heap(&mut arena, &mut list, 4096).unwrap();

    assert!(check(&arena, &list));
  }

  #[test]
  fn uninitialized_arena_reports_nothing() {
    let arena: Arena<FakeHeap> = Arena::new(FakeHeap::new(4096));
    let list = FreeList::new();
    assert!(report(&arena, &list).is_empty());
  }
}
