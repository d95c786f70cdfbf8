//! The heap provider contract (`spec.md` §6) and its `sbrk`-backed
//! implementation.
//!
//! Grounded on `rallocator::bump`'s direct use of `libc::sbrk` and on
//! `examples/original_source/mm.c`'s `mem_sbrk`/`mem_heap_lo`/`mem_heap_hi`
//! trio from `memlib`. The trait boundary itself is new relative to the
//! teacher (which calls `sbrk` inline): it exists so `allocator`'s tests
//! can plug in a provider that deterministically fails, instead of trying
//! to exhaust real process memory.

use libc::{c_void, intptr_t, sbrk};

/// A narrow interface over a linear, monotonically-growable address region.
///
/// Implementations must guarantee that successive successful calls to
/// [`sbrk_like`](HeapProvider::sbrk_like) return contiguous, non-overlapping
/// regions in increasing address order, and that the returned address is
/// always 8-byte aligned.
pub trait HeapProvider {
  /// Extends the arena by `bytes` and returns the starting address of the
  /// newly appended region, or `None` if the provider cannot satisfy the
  /// request.
  fn sbrk_like(&mut self, bytes: usize) -> Option<usize>;

  /// Inclusive lower bound of the region handed out so far, or `None`
  /// before the first successful [`sbrk_like`](HeapProvider::sbrk_like) call.
  fn lo(&self) -> Option<usize>;

  /// Inclusive upper bound (one past the last granted byte) of the region
  /// handed out so far, or `None` before the first grant.
  fn hi(&self) -> Option<usize>;
}

/// A [`HeapProvider`] backed by the POSIX `sbrk(2)` system call, exactly as
/// `rallocator::bump::BumpAllocator` uses it.
///
/// `SbrkHeap` tracks its own `lo`/`hi` bookkeeping from the addresses it has
/// actually been granted, rather than re-querying `sbrk(0)` on every call —
/// that would make it vulnerable to any other code in the process (the
/// system allocator included) nudging the program break between calls.
#[derive(Debug, Default)]
pub struct SbrkHeap {
  lo: Option<usize>,
  hi: Option<usize>,
}

impl SbrkHeap {
  pub fn new() -> Self {
    Self { lo: None, hi: None }
  }
}

impl HeapProvider for SbrkHeap {
  fn sbrk_like(&mut self, bytes: usize) -> Option<usize> {
    let raw = unsafe { sbrk(bytes as intptr_t) };
    if raw == usize::MAX as *mut c_void {
      return None;
    }

    let start = raw as usize;
    if self.lo.is_none() {
      self.lo = Some(start);
    }
    self.hi = Some(start + bytes);
    Some(start)
  }

  fn lo(&self) -> Option<usize> {
    self.lo
  }

  fn hi(&self) -> Option<usize> {
    self.hi
  }
}

#[cfg(test)]
pub(crate) mod test_support {
  use super::HeapProvider;

  /// An in-process provider backed by a boxed byte buffer, used by unit
  /// tests that need deterministic growth/failure without touching the
  /// real process break.
  pub struct FakeHeap {
    storage: Box<[u8]>,
    base: usize,
    granted: usize,
    fail_after: Option<usize>,
    grants: usize,
  }

  impl FakeHeap {
    pub fn new(capacity: usize) -> Self {
      let storage: Box<[u8]> = vec![0u8; capacity].into_boxed_slice();
      let base = storage.as_ptr() as usize;
      Self {
        storage,
        base,
        granted: 0,
        fail_after: None,
        grants: 0,
      }
    }

    /// Makes the `n`-th (1-indexed) call to `sbrk_like` fail and all calls
    /// after it as well, simulating a provider that has run out of room.
    pub fn fail_after(mut self, n: usize) -> Self {
      self.fail_after = Some(n);
      self
    }
  }

  impl HeapProvider for FakeHeap {
    fn sbrk_like(&mut self, bytes: usize) -> Option<usize> {
      self.grants += 1;
      if self.fail_after.is_some_and(|n| self.grants >= n) {
        return None;
      }

      if self.granted + bytes > self.storage.len() {
        return None;
      }

      let start = self.base + self.granted;
      self.granted += bytes;
      Some(start)
    }

    fn lo(&self) -> Option<usize> {
      if self.granted == 0 { None } else { Some(self.base) }
    }

    fn hi(&self) -> Option<usize> {
      if self.granted == 0 { None } else { Some(self.base + self.granted) }
    }
  }
}
