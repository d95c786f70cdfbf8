//! Owns the raw byte region handed out by a [`HeapProvider`] and the
//! unsafe read/write primitives the rest of the allocator builds on.
//!
//! `spec.md` §9 calls for modeling the arena as "a single owned byte
//! region" exposing "typed views over offsets," with links stored and
//! read through "explicit raw-memory read/write primitives scoped to that
//! byte region." This module is exactly that scope boundary: every other
//! module in this crate navigates the arena through 4-byte offsets
//! relative to [`Arena::lo`], never through raw pointers it keeps alive
//! itself.

use std::ptr::NonNull;

use crate::align::WORD;
use crate::provider::HeapProvider;

/// Bytes reserved at the very start of the arena so the first block's
/// payload still lands on a double-word boundary (`spec.md` §3: "tiles the
/// arena ... from `lo + padding`"). See `SPEC_FULL.md` §3 for the derivation.
pub const ALIGN_PAD: u32 = WORD;

pub struct Arena<P: HeapProvider> {
  provider: P,
  /// Absolute address of the first byte ever granted by the provider.
  base: Option<usize>,
  /// Bytes granted so far, measured from `base` (includes `ALIGN_PAD`).
  len: u32,
}

impl<P: HeapProvider> Arena<P> {
  pub fn new(provider: P) -> Self {
    Self { provider, base: None, len: 0 }
  }

  /// Offset, relative to `base`, of the first byte past the granted region.
  pub fn len(&self) -> u32 {
    self.len
  }

  pub fn is_initialized(&self) -> bool {
    self.base.is_some()
  }

  /// Requests `bytes` more from the provider and returns the header offset
  /// of the new region, formatted as nothing yet — the caller
  /// ([`crate::coalesce::extend_heap`]) is responsible for writing tags.
  pub fn grow(&mut self, bytes: u32) -> Option<u32> {
    let first_grant = self.base.is_none();
    let request = if first_grant { ALIGN_PAD + bytes } else { bytes };

    let start = self.provider.sbrk_like(request as usize)?;

    let header_offset = if first_grant {
      self.base = Some(start);
      self.len = ALIGN_PAD;
      ALIGN_PAD
    } else {
      self.len
    };

    self.len += bytes;
    Some(header_offset)
  }

  #[inline]
  fn base(&self) -> usize {
    self.base.expect("arena used before a successful grow()")
  }

  /// True when an offset range `[offset, offset + span)` lies entirely
  /// within the granted region (beyond the alignment padding).
  pub fn in_bounds(&self, offset: u32, span: u32) -> bool {
    offset >= ALIGN_PAD && offset.checked_add(span).is_some_and(|end| end <= self.len)
  }

  /// Converts an in-arena payload offset into the absolute pointer handed
  /// to callers.
  pub fn payload_ptr(&self, payload_offset: u32) -> NonNull<u8> {
    let addr = self.base() + payload_offset as usize;
    NonNull::new(addr as *mut u8).expect("arena addresses are never null")
  }

  /// Recovers the payload offset for a pointer previously returned by
  /// [`Arena::payload_ptr`].
  pub fn offset_of(&self, ptr: NonNull<u8>) -> u32 {
    (ptr.as_ptr() as usize - self.base()) as u32
  }

  /// Reads the 4-byte word at `offset` bytes from `base`.
  ///
  /// # Safety
  /// `offset` must name a live word inside the granted region.
  pub unsafe fn read_u32(&self, offset: u32) -> u32 {
    let addr = (self.base() + offset as usize) as *const u32;
    unsafe { addr.read() }
  }

  /// Writes the 4-byte word at `offset` bytes from `base`.
  ///
  /// # Safety
  /// `offset` must name a live word inside the granted region.
  pub unsafe fn write_u32(&self, offset: u32, value: u32) {
    let addr = (self.base() + offset as usize) as *mut u32;
    unsafe { addr.write(value) };
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::provider::test_support::FakeHeap;

  #[test]
  fn first_grow_reserves_alignment_padding() {
    let mut arena = Arena::new(FakeHeap::new(4096));
    let header_offset = arena.grow(64).unwrap();
    assert_eq!(header_offset, ALIGN_PAD);
    assert_eq!(arena.len(), ALIGN_PAD + 64);
  }

  #[test]
  fn payload_ptr_and_offset_of_round_trip() {
    let mut arena = Arena::new(FakeHeap::new(4096));
    let header_offset = arena.grow(64).unwrap();
    let payload_offset = header_offset + WORD;
    let ptr = arena.payload_ptr(payload_offset);
    assert_eq!(arena.offset_of(ptr), payload_offset);
  }

  #[test]
  fn subsequent_grows_are_contiguous() {
    let mut arena = Arena::new(FakeHeap::new(4096));
    let first = arena.grow(64).unwrap();
    let second = arena.grow(32).unwrap();
    assert_eq!(second, first + 64);
  }
}
