//! Block layout & tag arithmetic — `spec.md` §4.1.
//!
//! Grounded on `examples/original_source/mm.c`'s `PACK`/`GET_SIZE`/
//! `GET_ALLOC`/`HDRP`/`FTRP`/`NEXT_BLKP`/`PREV_BLKP` macros, reimplemented
//! as functions over [`Arena`] offsets instead of C pointer macros. The
//! teacher's own `Block` struct (a header-only linked-list node) is
//! generalized here into the boundary-tagged, footer-bearing layout the
//! spec requires.

use crate::align::{DWORD, WORD};
use crate::arena::Arena;
use crate::provider::HeapProvider;

/// Packs a block size and allocation flag into a single boundary-tag word.
///
/// `size` is always a multiple of [`DWORD`], so its low three bits are free;
/// only bit 0 is used to record `alloc`.
#[inline]
pub fn pack(size: u32, alloc: bool) -> u32 {
  debug_assert_eq!(size % DWORD, 0, "block size must be double-word aligned");
  size | (alloc as u32)
}

#[inline]
pub fn tag_size(tag: u32) -> u32 {
  tag & !0x7
}

#[inline]
pub fn tag_alloc(tag: u32) -> bool {
  tag & 0x1 != 0
}

#[inline]
pub fn header_offset(payload_offset: u32) -> u32 {
  payload_offset - WORD
}

pub fn footer_offset<P: HeapProvider>(arena: &Arena<P>, payload_offset: u32) -> u32 {
  payload_offset + block_size(arena, payload_offset) - DWORD
}

/// Reads the block's total span (header through footer, inclusive) in bytes.
pub fn block_size<P: HeapProvider>(arena: &Arena<P>, payload_offset: u32) -> u32 {
  let tag = unsafe { arena.read_u32(header_offset(payload_offset)) };
  tag_size(tag)
}

pub fn is_allocated<P: HeapProvider>(arena: &Arena<P>, payload_offset: u32) -> bool {
  let tag = unsafe { arena.read_u32(header_offset(payload_offset)) };
  tag_alloc(tag)
}

/// Writes identical header and footer boundary tags for the block starting
/// at `payload_offset`, per invariant 1 (`spec.md` §3).
pub fn set_tags<P: HeapProvider>(arena: &mut Arena<P>, payload_offset: u32, size: u32, alloc: bool) {
  let tag = pack(size, alloc);
  let hdr = header_offset(payload_offset);
  let ftr = payload_offset + size - DWORD;
  unsafe {
    arena.write_u32(hdr, tag);
    arena.write_u32(ftr, tag);
  }
}

/// The physically next block's payload offset, or `None` when `bp` is the
/// last block in the arena (`spec.md` §4.1: "valid iff the result is
/// inside the arena").
pub fn next_block<P: HeapProvider>(arena: &Arena<P>, payload_offset: u32) -> Option<u32> {
  let size = block_size(arena, payload_offset);
  let next_payload = payload_offset + size;
  let next_header = header_offset(next_payload);
  if next_header < arena.len() {
    Some(next_payload)
  } else {
    None
  }
}

/// The physically previous block's payload offset, or `None` when `bp` is
/// the first block in the arena.
pub fn prev_block<P: HeapProvider>(arena: &Arena<P>, payload_offset: u32) -> Option<u32> {
  let hdr = header_offset(payload_offset);
  if hdr <= crate::arena::ALIGN_PAD {
    return None;
  }
  let prev_footer = hdr - WORD;
  let prev_size = tag_size(unsafe { arena.read_u32(prev_footer) });
  Some(payload_offset - prev_size)
}

/// Whether `payload_offset` names a block that lies entirely inside the
/// granted arena.
pub fn in_arena<P: HeapProvider>(arena: &Arena<P>, payload_offset: u32) -> bool {
  if payload_offset < crate::arena::ALIGN_PAD + WORD {
    return false;
  }
  let hdr = header_offset(payload_offset);
  if !arena.in_bounds(hdr, WORD) {
    return false;
  }
  let size = tag_size(unsafe { arena.read_u32(hdr) });
  size >= crate::align::MIN_BLOCK && arena.in_bounds(hdr, size)
}
