//! Word-size constants and the block-size adjustment rule.
//!
//! Mirrors `rallocator::align`'s `align!` macro, generalized to the
//! allocator's word (4 B) / double-word (8 B) model instead of the host's
//! native pointer width — see `SPEC_FULL.md` §3 for why block metadata is
//! measured in 4-byte words regardless of host pointer size.

/// Size of one boundary-tag word, in bytes.
pub const WORD: u32 = 4;

/// Size of a double word — the allocator's alignment granularity.
pub const DWORD: u32 = 8;

/// Smallest legal block size: header + two free-list link words + footer.
pub const MIN_BLOCK: u32 = 16;

/// Default growth chunk requested from the heap provider on an allocation miss.
pub const CHUNKSIZE: u32 = 4096;

/// Rounds `value` up to the next multiple of `DWORD`.
#[inline]
pub const fn align_dword(value: u32) -> u32 {
  (value + DWORD - 1) & !(DWORD - 1)
}

/// Rounds `value` up to the next multiple of 8 (used for raw byte requests
/// to the heap provider, which are not necessarily already word-adjusted).
#[inline]
pub const fn round_up_8(value: u32) -> u32 {
  align_dword(value)
}

/// Computes the internal block size for a raw payload request of `n` bytes,
/// per `spec.md` §3's size adjustment rule:
///
/// ```text
/// asize = 16                                   if n <= 8
///       = 8 * ceil((n + 8 + 7) / 8)             otherwise
/// ```
#[inline]
pub const fn adjusted_size(n: usize) -> u32 {
  if n <= 8 {
    MIN_BLOCK
  } else {
    align_dword((n as u32) + WORD + WORD)
  }
}
