//! # tagalloc - An Explicit Free-List Memory Allocator
//!
//! This crate provides a general-purpose dynamic memory allocator built on
//! the classic CS:APP explicit free-list design: boundary-tagged blocks
//! with header/footer size+allocation tags, a doubly-linked free list
//! threaded through the payload of free blocks, first-fit placement, and
//! eager coalescing of physically adjacent free blocks.
//!
//! ## Overview
//!
//! ```text
//!   Explicit Free List Concept:
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                         ARENA                                       │
//!   │                                                                      │
//!   │   ┌──────┬──────┬──────┬──────┬──────┬──────┬─────────────────────┐  │
//!   │   │ Hdr  │ Used │ Hdr  │ Free │ Hdr  │ Used │    growable tail    │  │
//!   │   │ Ftr  │      │ Ftr  │(link)│ Ftr  │      │                     │  │
//!   │   └──────┴──────┴──────┴──────┴──────┴──────┴─────────────────────┘  │
//!   │                           ▲                                          │
//!   │                           └── reachable from the free list root      │
//!   └──────────────────────────────────────────────────────────────────────┘
//!
//!   Free blocks form a doubly-linked list (next/prev in the first two
//!   payload words); allocated blocks carry no list membership at all.
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   tagalloc
//!   ├── align      - word/double-word constants, block size adjustment
//!   ├── error      - AllocError, returned only by initialize()
//!   ├── provider   - HeapProvider trait + SbrkHeap (sbrk-backed) impl
//!   ├── arena      - owns the provider-granted byte region, offset primitives
//!   ├── block      - boundary-tag layout & arithmetic
//!   ├── freelist   - the explicit doubly-linked free list
//!   ├── placement  - find_fit / place (split, orphan-8, perfect-fit)
//!   ├── coalesce   - growth engine + four-case coalescing
//!   ├── checker    - read-only consistency-invariant observer
//!   └── allocator  - the public façade (Allocator / GenericAllocator)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tagalloc::Allocator;
//!
//! fn main() {
//!     let mut allocator = Allocator::new();
//!     allocator.initialize().unwrap();
//!
//!     let p = allocator.allocate(64).unwrap();
//!     unsafe { p.as_ptr().write(42) };
//!
//!     let p = allocator.reallocate(Some(p), 256).unwrap();
//!     allocator.free(p);
//!
//!     assert!(allocator.consistency_check());
//! }
//! ```
//!
//! ## How It Works
//!
//! Memory comes from a [`provider::HeapProvider`] — a monotonically
//! growable address region, modeled on `sbrk(2)`. Every block carries an
//! identical header and footer boundary tag (size, packed with an
//! allocation bit in the low order bit), which lets neighboring blocks be
//! located and merged in either direction without walking the whole heap.
//! Free blocks are additionally linked into an explicit doubly-linked list
//! so that placement only has to search *free* blocks, not every block in
//! the arena.
//!
//! All internal block and link addressing uses 4-byte offsets relative to
//! the arena's base rather than native pointers — see `SPEC_FULL.md` §3 for
//! why, and [`arena`] for the primitives this buys.
//!
//! ## Limitations
//!
//! - **Single-threaded only**: no synchronization primitives.
//! - **No heap shrink-back**: memory is never returned to the provider.
//! - **One arena per allocator**: no support for multiple independent heaps.
//! - **No hardening**: double-free and foreign-pointer misuse are undefined
//!   behavior, not detected at runtime (the [`checker`] module can surface
//!   the resulting inconsistency after the fact, in tests).
//!
//! ## Safety
//!
//! This crate is inherently unsafe as it deals with raw memory management.
//! Callers must uphold the pointer-provenance contract documented on
//! [`allocator::GenericAllocator::free`] and
//! [`allocator::GenericAllocator::reallocate`].

pub mod align;
mod allocator;
mod arena;
mod block;
mod checker;
mod coalesce;
pub mod error;
mod freelist;
mod placement;
pub mod provider;
mod trace;

pub use allocator::{Allocator, GenericAllocator};
pub use checker::Violation;
pub use error::AllocError;
pub use provider::{HeapProvider, SbrkHeap};
