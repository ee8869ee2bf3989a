//! Exercises the Hook Manager's public runtime API directly, without going
//! through the instrumentation macro. Each test uses its own fabricated
//! address so tests can run concurrently against the one process-wide
//! manager without interfering with each other.

use std::os::raw::c_int;

use lltap::manager::manager;
use lltap::{HookPointer, HookType, LltapError};

extern "C" fn dummy_hook_a() {}
extern "C" fn dummy_hook_b() {}

fn fresh_name(tag: &str) -> String {
    format!("lltap_test_registry_{}", tag)
}

fn fake_hook(which: extern "C" fn()) -> HookPointer {
    unsafe { HookPointer::new(which as *const ()) }
}

#[test]
fn register_then_lookup_then_deregister_restores_null() {
    let name = fresh_name("roundtrip");
    let addr = 0x1000 as *const ();
    manager().add_target(&name, addr);

    let hook = fake_hook(dummy_hook_a);
    manager()
        .register_hook(&name, hook, HookType::Pre)
        .expect("known target must register");

    assert_eq!(manager().get_hook(addr, HookType::Pre), Some(hook));
    assert_eq!(manager().get_hook_bitmap(addr), HookType::Pre.bit());

    manager().deregister_hook(&name, HookType::Pre);
    assert_eq!(manager().get_hook(addr, HookType::Pre), None);
    assert_eq!(manager().get_hook_bitmap(addr), 0);
}

#[test]
fn bitmap_is_the_or_of_installed_kinds() {
    let name = fresh_name("bitmap");
    let addr = 0x2000 as *const ();
    manager().add_target(&name, addr);

    manager()
        .register_hook(&name, fake_hook(dummy_hook_a), HookType::Pre)
        .unwrap();
    manager()
        .register_hook(&name, fake_hook(dummy_hook_b), HookType::Post)
        .unwrap();

    let bitmap = manager().get_hook_bitmap(addr);
    assert_eq!(bitmap, HookType::Pre.bit() | HookType::Post.bit());
    assert!((0..=7).contains(&bitmap));
}

#[test]
fn registering_a_second_hook_of_one_kind_overwrites_the_first() {
    let name = fresh_name("overwrite");
    let addr = 0x3000 as *const ();
    manager().add_target(&name, addr);

    let first = fake_hook(dummy_hook_a);
    let second = fake_hook(dummy_hook_b);
    manager().register_hook(&name, first, HookType::Replace).unwrap();
    manager().register_hook(&name, second, HookType::Replace).unwrap();

    assert_eq!(manager().get_hook(addr, HookType::Replace), Some(second));
}

#[test]
fn unknown_name_fails_without_leaving_a_spurious_entry() {
    let name = fresh_name("unknown");
    let err = manager()
        .register_hook(&name, fake_hook(dummy_hook_a), HookType::Pre)
        .unwrap_err();
    assert_eq!(err, LltapError::UnknownTarget(name.clone()));

    // An address that was never registered under any name must never
    // appear in the registry just because a lookup by name failed.
    let never_registered_addr = 0x4242 as *const ();
    assert_eq!(manager().get_hook_bitmap(never_registered_addr), 0);
}

#[test]
fn deregistering_an_unknown_name_is_a_silent_no_op() {
    let name = fresh_name("deregister_unknown");
    manager().deregister_hook(&name, HookType::Pre);
}

#[test]
fn invalid_hook_type_is_rejected_by_the_ffi_decoder() {
    let raw: c_int = 3; // not one of 1, 2, 4
    let err = lltap::manager::decode_hook_type(raw, lltap::manager::manager().log_level())
        .unwrap_err();
    assert_eq!(err, LltapError::InvalidHookType(3));
}
