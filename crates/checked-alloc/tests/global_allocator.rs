//! `FailFastGlobal` installed as this test binary's global allocator.

use checked_alloc::collections::{string_from, vec_with_capacity};
use checked_alloc::FailFastGlobal;
use checked_alloc_test_utils::abort::{self, assert_aborted, stderr_of};

#[global_allocator]
static GLOBAL: FailFastGlobal = FailFastGlobal::system().with_label("global-test");

#[test]
fn ordinary_heap_use_is_unaffected() {
    let mut v: Vec<u32> = vec_with_capacity(4);
    v.extend(0..1000);
    assert_eq!(v.iter().sum::<u32>(), 499_500);

    let mut s = string_from("checked");
    s.push_str("-alloc");
    assert_eq!(s, "checked-alloc");

    let boxed = Box::new([7u8; 4096]);
    assert_eq!(boxed[4095], 7);

    let block = checked_alloc::allocate_zeroed(128);
    // SAFETY: zeroed allocation.
    assert!(unsafe { block.assume_init_ref() }.iter().all(|&b| b == 0));
}

#[test]
fn unsatisfiable_heap_request_aborts_with_label() {
    if abort::is_child() {
        // Representable as a layout, far beyond any address space.
        let v: Vec<u8> = Vec::with_capacity(isize::MAX as usize);
        std::hint::black_box(v);
        return;
    }
    let output = abort::run_child("unsatisfiable_heap_request_aborts_with_label");
    assert_aborted(&output);
    assert!(stderr_of(&output).contains("global-test: fatal: allocation of"));
}
