//! The placement engine — `spec.md` §4.3.
//!
//! `find_fit` is the only linear-time operation in the allocator (the free
//! list traversal); `place` implements the split / orphan-8 / perfect-fit
//! rules, grounded on `examples/original_source/mm.c`'s `find_fit`/`place`.

use crate::align::{MIN_BLOCK, WORD};
use crate::arena::Arena;
use crate::block::{block_size, set_tags};
use crate::freelist::FreeList;
use crate::provider::HeapProvider;

/// First-fit search over the free list. `spec.md` §4.3: "no best-fit search."
pub fn find_fit<P: HeapProvider>(arena: &Arena<P>, freelist: &FreeList, asize: u32) -> Option<u32> {
  freelist.iter(arena).find(|&bp| block_size(arena, bp) >= asize)
}

/// Outcome of [`place`]: whether the caller must grow the arena to restore
/// the "free list is non-empty after placement succeeds" invariant
/// described in `spec.md` §4.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceOutcome {
  pub needs_growth: bool,
}

/// Reserves `bp` (a free block of size `>= asize`) for an allocation of
/// `asize` bytes, splitting off a remainder free block when there's room.
///
/// Precondition: `bp` is free and `block_size(bp) >= asize`.
pub fn place<P: HeapProvider>(
  arena: &mut Arena<P>,
  freelist: &mut FreeList,
  bp: u32,
  asize: u32,
) -> PlaceOutcome {
  let current_size = block_size(arena, bp);
  let remainder = current_size - asize;

  if remainder >= MIN_BLOCK {
    // Split: low portion becomes the allocated block, high portion
    // replaces `bp` in the free list at the same position.
    let new_free = next_block_payload_after_split(bp, asize);

    set_tags(arena, bp, asize, true);
    set_tags(arena, new_free, remainder, false);

    let prev = freelist.prev_of(arena, bp);
    let next = freelist.next_of(arena, bp);
    relink_in_place(arena, freelist, new_free, prev, next);

    PlaceOutcome { needs_growth: false }
  } else if remainder == 8 {
    // Orphan-8 rule: absorb the unsplittable fragment into the allocation.
    set_tags(arena, bp, asize + 8, true);
    freelist.remove(arena, bp);
    PlaceOutcome { needs_growth: freelist.is_empty() }
  } else {
    debug_assert_eq!(remainder, 0, "remainder must be 0, 8, or > MIN_BLOCK");
    set_tags(arena, bp, asize, true);
    freelist.remove(arena, bp);
    PlaceOutcome { needs_growth: freelist.is_empty() }
  }
}

fn next_block_payload_after_split(bp: u32, asize: u32) -> u32 {
  bp + asize
}

/// Swaps `old` for `new` at `old`'s exact position in the free list,
/// inheriting its neighbors (`spec.md` §4.3: "replaces bp in the free list
/// at exactly bp's position").
fn relink_in_place<P: HeapProvider>(
  arena: &mut Arena<P>,
  freelist: &mut FreeList,
  new: u32,
  prev: Option<u32>,
  next: Option<u32>,
) {
  write_next(arena, new, next);
  write_prev(arena, new, prev);

  match prev {
    Some(p) => write_next(arena, p, Some(new)),
    None => freelist.force_root(Some(new)),
  }
  if let Some(n) = next {
    write_prev(arena, n, Some(new));
  }
}

fn write_next<P: HeapProvider>(arena: &mut Arena<P>, bp: u32, next: Option<u32>) {
  unsafe { arena.write_u32(bp, next.unwrap_or(u32::MAX)) };
}

fn write_prev<P: HeapProvider>(arena: &mut Arena<P>, bp: u32, prev: Option<u32>) {
  unsafe { arena.write_u32(bp + WORD, prev.unwrap_or(u32::MAX)) };
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::align::{DWORD, WORD};
  use crate::block::{block_size, is_allocated, set_tags};
  use crate::provider::test_support::FakeHeap;

  fn free_block<P: HeapProvider>(arena: &mut Arena<P>, size: u32) -> u32 {
    let header = arena.grow(size).unwrap();
    let payload = header + WORD;
    set_tags(arena, payload, size, false);
    payload
  }

  #[test]
  fn find_fit_returns_first_adequate_block() {
    let mut arena = Arena::new(FakeHeap::new(4096));
    let mut list = FreeList::new();
    let a = free_block(&mut arena, 3 * DWORD);
    let b = free_block(&mut arena, 10 * DWORD);
    list.insert_head(&mut arena, a);
    list.insert_head(&mut arena, b);

    // head is `b` (LIFO); `a` doesn't fit 9*DWORD, `b` does.
    let bp = find_fit(&arena, &list, 9 * DWORD).unwrap();
    assert_eq!(bp, b);
  }

  #[test]
  fn place_splits_when_remainder_exceeds_minimum() {
    let mut arena = Arena::new(FakeHeap::new(4096));
    let mut list = FreeList::new();
    let bp = free_block(&mut arena, 64);
    list.insert_head(&mut arena, bp);

    let outcome = place(&mut arena, &mut list, bp, 24);
    assert!(!outcome.needs_growth);
    assert!(is_allocated(&arena, bp));
    assert_eq!(block_size(&arena, bp), 24);

    let remainder_bp = bp + 24;
    assert!(!is_allocated(&arena, remainder_bp));
    assert_eq!(block_size(&arena, remainder_bp), 40);
    assert_eq!(list.root(), Some(remainder_bp));
  }

  #[test]
  fn place_splits_when_remainder_is_exactly_the_minimum_block() {
    let mut arena = Arena::new(FakeHeap::new(4096));
    let mut list = FreeList::new();
    let bp = free_block(&mut arena, 32);
    list.insert_head(&mut arena, bp);

    // remainder == MIN_BLOCK (16) is a legal free block on its own and must
    // be split off, not absorbed into the allocation — mm.c's `place` uses
    // `splitSize > DSIZE` (i.e. remainder >= MIN_BLOCK), and an earlier
    // draft here used strict `>` against MIN_BLOCK, which mishandled this
    // exact boundary.
    let outcome = place(&mut arena, &mut list, bp, 16);
    assert!(!outcome.needs_growth);
    assert!(is_allocated(&arena, bp));
    assert_eq!(block_size(&arena, bp), 16);

    let remainder_bp = bp + 16;
    assert!(!is_allocated(&arena, remainder_bp));
    assert_eq!(block_size(&arena, remainder_bp), 16);
    assert_eq!(list.root(), Some(remainder_bp));
  }

  #[test]
  fn place_absorbs_orphan_eight_bytes() {
    let mut arena = Arena::new(FakeHeap::new(4096));
    let mut list = FreeList::new();
    let bp = free_block(&mut arena, 24);
    list.insert_head(&mut arena, bp);

    let outcome = place(&mut arena, &mut list, bp, 16);
    assert!(outcome.needs_growth);
    assert!(is_allocated(&arena, bp));
    assert_eq!(block_size(&arena, bp), 24);
    assert!(list.is_empty());
  }

  #[test]
  fn place_perfect_fit_removes_block() {
    let mut arena = Arena::new(FakeHeap::new(4096));
    let mut list = FreeList::new();
    let bp = free_block(&mut arena, 16);
    list.insert_head(&mut arena, bp);

    let outcome = place(&mut arena, &mut list, bp, 16);
    assert!(outcome.needs_growth);
    assert!(is_allocated(&arena, bp));
    assert!(list.is_empty());
  }
}
