#[cfg(test)]
mod __test__ {

  use crate::collapse::{content_hash, CollapseMap};
  use crate::entry::EntryPool;
  use crate::event::Severity;

  #[test]
  fn test_content_hash_is_stable_and_field_aware() {
    assert_eq!(content_hash("hello", "world"), content_hash("hello", "world"));
    assert_ne!(content_hash("ab", "c"), content_hash("a", "bc"));
    assert_ne!(content_hash("", "x"), content_hash("x", ""));

    let long = "a message that spans more than a few eight byte chunks";
    assert_ne!(content_hash(long, ""), content_hash(&long[1..], ""));
  }

  #[test]
  fn test_find_after_insert() {
    let mut pool = EntryPool::new();
    let mut map = CollapseMap::new();

    let id = pool.acquire("Connection lost", "at net::poll", Severity::Warning);
    map.insert(&pool, id);

    assert_eq!(map.find(&pool, "Connection lost", "at net::poll"), Some(id));
    assert_eq!(map.find(&pool, "Connection lost", ""), None);
    assert_eq!(map.len(), 1);
  }

  #[test]
  fn test_colliding_hashes_compare_content() {
    let mut pool = EntryPool::new();
    let mut map = CollapseMap::new();

    let first = pool.acquire("first", "", Severity::Info);
    let second = pool.acquire("second", "", Severity::Info);
    map.insert_hashed(42, first);
    map.insert_hashed(42, second);

    assert_eq!(map.find_hashed(&pool, 42, "second", ""), Some(second));
    assert_eq!(map.find_hashed(&pool, 42, "first", ""), Some(first));
    assert_eq!(map.find_hashed(&pool, 42, "third", ""), None);
    assert_eq!(map.len(), 2);
  }

  #[test]
  fn test_remove() {
    let mut pool = EntryPool::new();
    let mut map = CollapseMap::new();

    let id = pool.acquire("boom", "trace", Severity::Error);
    map.insert(&pool, id);

    assert!(map.remove(&pool, id));
    assert!(!map.remove(&pool, id));
    assert!(map.is_empty());
    assert_eq!(map.find(&pool, "boom", "trace"), None);
  }

  #[test]
  fn test_clear() {
    let mut pool = EntryPool::new();
    let mut map = CollapseMap::new();

    for i in 0..10 {
      let id = pool.acquire(&format!("message {}", i), "", Severity::Info);
      map.insert(&pool, id);
    }
    assert_eq!(map.len(), 10);

    map.clear();
    assert!(map.is_empty());
    assert_eq!(map.find(&pool, "message 3", ""), None);
  }
}
