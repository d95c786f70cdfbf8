//! Coalescing & growth engine — `spec.md` §4.4.
//!
//! Grounded on `examples/original_source/mm.c`'s `coalesce`/`extend_heap`.
//! The four-neighbor-case table is shared between the growth-time merge
//! (`coalesce_after_growth`, used by [`extend_heap`]) and the free-time
//! inline merge (`free_block`) through [`merge_span`], since both need the
//! identical case analysis — only *whose* list membership needs clearing
//! up front differs between the two entry paths (`spec.md` §4.5: `free`
//! "does not first insert the to-be-freed block and then call the general
//! coalesce," it folds the same case logic into a single list mutation).

use crate::align::{WORD, round_up_8};
use crate::arena::Arena;
use crate::block::{block_size, in_arena, is_allocated, next_block, prev_block, set_tags};
use crate::freelist::FreeList;
use crate::provider::HeapProvider;
use crate::trace;

/// Classifies `bp`'s physical neighbors and merges with whichever are free,
/// per the case table in `spec.md` §4.4. Does not insert the resulting
/// block into the free list — that is the caller's job, once, in the shape
/// its own entry path requires.
///
/// When `remove_bp` is set, `bp` itself is first spliced out of the free
/// list (the growth path inserts the fresh block before coalescing it).
fn merge_span<P: HeapProvider>(
  arena: &mut Arena<P>,
  freelist: &mut FreeList,
  bp: u32,
  remove_bp: bool,
) -> u32 {
  if remove_bp {
    freelist.remove(arena, bp);
  }

  let prev = prev_block(arena, bp).filter(|&p| in_arena(arena, p) && !is_allocated(arena, p));
  let next = next_block(arena, bp).filter(|&n| in_arena(arena, n) && !is_allocated(arena, n));

  match (prev, next) {
    (None, None) => bp,
    (None, Some(next)) => {
      freelist.remove(arena, next);
      let merged = block_size(arena, bp) + block_size(arena, next);
      set_tags(arena, bp, merged, false);
      bp
    }
    (Some(prev), None) => {
      freelist.remove(arena, prev);
      let merged = block_size(arena, prev) + block_size(arena, bp);
      set_tags(arena, prev, merged, false);
      prev
    }
    (Some(prev), Some(next)) => {
      freelist.remove(arena, prev);
      freelist.remove(arena, next);
      // Three independent term sizes, summed directly — spec.md §9 flags
      // the reference's nested `GET_SIZE(HDRP(bp) + GET_SIZE(HDRP(next)))`
      // as almost certainly a bug and asks for the intended three-way sum.
      let merged = block_size(arena, prev) + block_size(arena, bp) + block_size(arena, next);
      set_tags(arena, prev, merged, false);
      prev
    }
  }
}

/// Merges a block freshly appended by [`extend_heap`] with the former tail
/// of the arena, if it was free, then reinserts the result at the head of
/// the free list.
fn coalesce_after_growth<P: HeapProvider>(arena: &mut Arena<P>, freelist: &mut FreeList, bp: u32) -> u32 {
  let result = merge_span(arena, freelist, bp, true);
  freelist.insert_head(arena, result);
  result
}

/// Marks a live allocated block free and merges it with any free physical
/// neighbors in a single pass, inserting the final block into the free
/// list exactly once — `spec.md` §4.5.
pub fn free_block<P: HeapProvider>(arena: &mut Arena<P>, freelist: &mut FreeList, bp: u32) {
  let size = block_size(arena, bp);
  set_tags(arena, bp, size, false);

  let result = merge_span(arena, freelist, bp, false);
  freelist.insert_head(arena, result);
}

/// Requests at least `min_bytes` more from the heap provider, formats the
/// new region as a single free block, and merges it with the former tail
/// of the arena if that tail was free. Returns the resulting block's
/// payload offset, or `None` if the provider refused.
pub fn extend_heap<P: HeapProvider>(arena: &mut Arena<P>, freelist: &mut FreeList, min_bytes: u32) -> Option<u32> {
  let bytes = round_up_8(min_bytes);
  let header_offset = arena.grow(bytes)?;
  let payload = header_offset + WORD;

  set_tags(arena, payload, bytes, false);
  freelist.insert_head(arena, payload);

  let result = coalesce_after_growth(arena, freelist, payload);
  trace!("extend_heap: grew arena by {bytes} bytes, free block now at offset {result}");
  Some(result)
}
