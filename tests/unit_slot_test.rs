// tests/unit_slot_test.rs

use peridot::core::cluster::{SLOT_COUNT, key_hash_slot};

#[test]
fn test_slot_is_within_keyspace() {
    for key in ["", "a", "foo", "user:1000", "{}{}{}", "\u{1F980}"] {
        assert!(key_hash_slot(key.as_bytes()) < SLOT_COUNT);
    }
}

#[test]
fn test_known_slot_values() {
    // Reference values from the cluster specification's CRC16 (XMODEM).
    assert_eq!(key_hash_slot(b"foo"), 12182);
    assert_eq!(key_hash_slot(b"bar"), 5061);
    assert_eq!(key_hash_slot(b""), 0);
}

#[test]
fn test_hash_tag_restricts_hashing_to_tag_content() {
    assert_eq!(key_hash_slot(b"{user1000}.following"), key_hash_slot(b"user1000"));
    assert_eq!(
        key_hash_slot(b"{user1000}.followers"),
        key_hash_slot(b"{user1000}.following")
    );
}

#[test]
fn test_empty_hash_tag_hashes_whole_key() {
    // "{}" carries no tag content, so the whole key is hashed.
    assert_eq!(key_hash_slot(b"foo{}{bar}"), key_hash_slot(b"foo{}{bar}"));
    assert_ne!(key_hash_slot(b"foo{}{bar}"), key_hash_slot(b"bar"));
}

#[test]
fn test_only_first_tag_counts() {
    assert_eq!(key_hash_slot(b"foo{bar}{zap}"), key_hash_slot(b"bar"));
}

#[test]
fn test_unterminated_tag_hashes_whole_key() {
    assert_ne!(key_hash_slot(b"foo{bar"), key_hash_slot(b"bar"));
}
