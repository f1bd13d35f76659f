// tests/unit_script_cache_test.rs

use bytes::Bytes;
use peridot::{Script, ScriptCache};

#[test]
fn test_sha1_is_computed_locally() {
    // Well-known digest of `return 1`.
    let script = Script::new("return 1");
    assert_eq!(script.sha1(), "e0e1f9fabfc9d4800c877a703b823ac0578ff831");
}

#[test]
fn test_registration_is_idempotent_and_resolvable() {
    let script_a = Script::new("return redis.call('GET', KEYS[1])");
    let script_b = Script::new("return redis.call('GET', KEYS[1])");
    assert_eq!(script_a.sha1(), script_b.sha1());
    assert_eq!(
        ScriptCache::global().get(script_a.sha1()),
        Some(Bytes::from("return redis.call('GET', KEYS[1])"))
    );
}

#[test]
fn test_forget_removes_only_the_local_entry() {
    let script = Script::new("return 'forget-me'");
    assert!(ScriptCache::global().contains(script.sha1()));
    script.forget();
    assert!(!ScriptCache::global().contains(script.sha1()));
}

#[test]
fn test_unknown_sha_handle_resolves_to_nothing() {
    let script = Script::from_sha1("00000000000000000000deadbeef000000000000");
    assert_eq!(ScriptCache::global().get(script.sha1()), None);
}
