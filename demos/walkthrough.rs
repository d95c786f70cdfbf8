use std::mem::size_of;

use libc::sbrk;
use tagalloc::Allocator;

/// Waits until the user presses ENTER.
/// Useful when you want to inspect memory state with tools like `pmap`, `htop`,
/// `gdb`, or just visually track how allocations change the program break.
fn block_until_enter_pressed() {
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().lines().next();
}

/// Prints the current program break using `sbrk(0)`.
/// The program break is the upper boundary of the heap managed via brk/sbrk.
fn print_program_break(label: &str) {
  println!(
    "[{}] PID = {}, program break (sbrk(0)) = {:?}",
    label,
    std::process::id(),
    unsafe { sbrk(0) },
  );
}

fn main() {
  let mut allocator = Allocator::new();

  print_program_break("start");
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 0) Initialize: request the first chunk from the heap provider and
  //    format it as a single free block.
  // --------------------------------------------------------------------
  allocator.initialize().expect("heap provider refused the initial chunk");
  println!("\n[0] Initialized allocator");
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 1) Allocate space for a u32.
  // --------------------------------------------------------------------
  let first_block = allocator.allocate(size_of::<u32>()).expect("allocation failed");
  println!("\n[1] Allocate u32 -> {:?}", first_block);

  unsafe { first_block.cast::<u32>().write(0xDEADBEEF) };
  println!("[1] Value written to first_block = 0x{:X}", unsafe { first_block.cast::<u32>().read() });

  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 2) Allocate 12 bytes. Shows how the allocator handles "odd-sized"
  //    requests via the size adjustment rule.
  // --------------------------------------------------------------------
  let second_block = allocator.allocate(12).expect("allocation failed");
  println!("\n[2] Allocate [u8; 12] -> {:?}", second_block);
  unsafe { second_block.as_ptr().write_bytes(0xAB, 12) };
  println!("[2] Initialized second block with 0xAB");

  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 3) Allocate a u64 to observe double-word alignment.
  // --------------------------------------------------------------------
  let third_block = allocator.allocate(size_of::<u64>()).expect("allocation failed");
  println!("\n[3] Allocate u64 -> {:?}", third_block);
  unsafe { third_block.cast::<u64>().write(0x1122334455667788) };
  let addr_third = third_block.as_ptr() as usize;
  println!("[3] Address = {:#X}, addr % 8 = {}", addr_third, addr_third % 8);

  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 4) Free the first block, then immediately request a small block to
  //    confirm the explicit free list reuses it (LIFO, first-fit).
  // --------------------------------------------------------------------
  allocator.free(first_block);
  println!("\n[4] Freed first_block at {:?}", first_block);
  block_until_enter_pressed();

  let fourth_block = allocator.allocate(2).expect("allocation failed");
  println!("\n[5] Allocate [u8; 2] (check reuse of freed block)");
  println!(
    "[5] fourth_block == first_block? {}",
    if fourth_block == first_block {
      "Yes, the free list handed the block straight back"
    } else {
      "No, it allocated somewhere else"
    }
  );

  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 5) Grow the allocation in place, then watch the program break move
  //    when a request outgrows what the free list can satisfy.
  // --------------------------------------------------------------------
  let grown = allocator.reallocate(Some(second_block), 4096).expect("reallocation failed");
  println!("\n[6] Reallocated second_block {:?} -> {:?}", second_block, grown);

  print_program_break("before large alloc");
  let big_block = allocator.allocate(64 * 1024).expect("allocation failed");
  println!("\n[7] Allocate large 64 KiB block -> {:?}", big_block);
  print_program_break("after large alloc");

  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 6) Confirm the arena is still internally consistent after all of
  //    the above.
  // --------------------------------------------------------------------
  println!(
    "\n[8] consistency_check() = {}",
    allocator.consistency_check()
  );
  println!("End of walkthrough. Process will exit and the OS will reclaim all memory.");
}
