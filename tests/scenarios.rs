//! End-to-end scenarios against the public façade — `spec.md` §8's
//! "End-to-end scenarios" table.
//!
//! Each test builds its own [`Allocator`], but `sbrk` moves one process-wide
//! program break, so these must run single-threaded: `cargo test
//! --test scenarios -- --test-threads=1`.

use tagalloc::Allocator;

fn new_allocator() -> Allocator {
  let mut allocator = Allocator::new();
  allocator.initialize().expect("provider refused the initial chunk");
  allocator
}

#[test]
fn scenario_1_two_frees_leave_a_single_free_block() {
  let mut allocator = new_allocator();

  let p1 = allocator.allocate(100).unwrap();
  let p2 = allocator.allocate(200).unwrap();
  allocator.free(p1);
  allocator.free(p2);

  assert!(allocator.consistency_check());
}

#[test]
fn scenario_2_realloc_preserves_payload() {
  let mut allocator = new_allocator();

  let p = allocator.allocate(8).unwrap();
  let pattern: [u8; 8] = [1, 2, 3, 4, 5, 6, 7, 8];
  unsafe { p.as_ptr().copy_from_nonoverlapping(pattern.as_ptr(), 8) };

  let q = allocator.reallocate(Some(p), 16).unwrap();
  let preserved = unsafe { std::slice::from_raw_parts(q.as_ptr(), 8) };
  assert_eq!(preserved, &pattern);
  assert!(allocator.consistency_check());
}

#[test]
fn scenario_3_many_small_allocs_merge_into_one_free_block() {
  let mut allocator = new_allocator();

  let ptrs: Vec<_> = (0..100).map(|_| allocator.allocate(24).unwrap()).collect();
  for p in ptrs {
    allocator.free(p);
  }

  assert!(allocator.consistency_check());
}

#[test]
fn scenario_4_lifo_first_fit_reuses_the_just_freed_block() {
  let mut allocator = new_allocator();

  let p = allocator.allocate(24).unwrap();
  let _q = allocator.allocate(24).unwrap();
  allocator.free(p);
  let r = allocator.allocate(24).unwrap();

  assert_eq!(r, p);
}

#[test]
fn scenario_5_large_requests_force_growth_in_address_order() {
  let mut allocator = new_allocator();

  let p = allocator.allocate(4088).unwrap();
  let q = allocator.allocate(4088).unwrap();

  assert!(p.as_ptr() < q.as_ptr());
}

#[test]
fn scenario_6_alloc_free_is_consistent() {
  let mut allocator = new_allocator();

  let p = allocator.allocate(16).unwrap();
  allocator.free(p);

  assert!(allocator.consistency_check());
}
