//! Append-only text pool.
//!
//! Every string the scenario compiler keeps (names, adjectives, policy names,
//! unit names) lives in one growing byte buffer and is referenced by its byte
//! offset. Offset 0 holds a lone terminator and doubles as the null key, so a
//! default [`TextKey`] always decodes to the empty string.

use std::collections::HashMap;

/// Handle to a NUL-terminated run inside a [`TextPool`].
#[derive(Hash, Eq, PartialEq, Clone, Copy, Debug, Default, PartialOrd, Ord)]
pub struct TextKey(u32);

impl TextKey {
    pub const NULL: TextKey = TextKey(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub struct TextPool {
    text_data: Vec<u8>,
    /// Label lookup used by [`TextPool::find_or_add_key`].
    key_lookup: HashMap<String, TextKey>,
}

impl Default for TextPool {
    fn default() -> Self {
        Self::new()
    }
}

impl TextPool {
    pub fn new() -> Self {
        Self {
            text_data: vec![0],
            key_lookup: HashMap::new(),
        }
    }

    /// Bytes currently held, including the reserved null slot.
    pub fn len(&self) -> usize {
        self.text_data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text_data.len() <= 1
    }

    /// Appends `text` and a terminator. No deduplication.
    pub fn add_to_pool(&mut self, text: &str) -> TextKey {
        if text.is_empty() {
            return TextKey::NULL;
        }
        let start = self.text_data.len();
        self.text_data.extend_from_slice(text.as_bytes());
        self.text_data.push(0);
        TextKey(start as u32)
    }

    /// Appends `text`, then lowercases (ASCII) the bytes just written.
    pub fn add_to_pool_lowercase(&mut self, text: &str) -> TextKey {
        let key = self.add_to_pool(text);
        if !key.is_null() {
            let start = key.index();
            self.text_data[start..start + text.len()].make_ascii_lowercase();
        }
        key
    }

    /// Returns the key of an existing copy of `text` anywhere in the pool,
    /// appending only when there is none.
    ///
    /// This is a linear scan of the whole pool, so it is meant for small,
    /// bounded vocabularies (ideologies, policy names), not for bulk text.
    /// A match may be the tail of a longer string; that run is still exactly
    /// `text` followed by a terminator. Offset 0 is never searched, so a
    /// non-empty `text` never comes back as [`TextKey::NULL`].
    pub fn add_unique_to_pool(&mut self, text: &str) -> TextKey {
        if text.is_empty() {
            return TextKey::NULL;
        }
        let mut needle = Vec::with_capacity(text.len() + 1);
        needle.extend_from_slice(text.as_bytes());
        needle.push(0);

        match self.text_data[1..]
            .windows(needle.len())
            .position(|window| window == needle.as_slice())
        {
            Some(found) => TextKey(found as u32 + 1),
            None => self.add_to_pool(text),
        }
    }

    /// Decodes the run starting at `key` up to its terminator.
    pub fn to_string_view(&self, key: TextKey) -> &str {
        if key.is_null() {
            return "";
        }
        let Some(tail) = self.text_data.get(key.index()..) else {
            return "";
        };
        let run = match tail.iter().position(|&b| b == 0) {
            Some(end) => &tail[..end],
            None => tail,
        };
        std::str::from_utf8(run).unwrap_or_default()
    }

    /// Looks `text` up in the label table, adding it to the pool on a miss.
    pub fn find_or_add_key(&mut self, text: &str) -> TextKey {
        if let Some(&key) = self.key_lookup.get(text) {
            return key;
        }
        let key = self.add_to_pool(text);
        if !key.is_null() {
            self.key_lookup.insert(text.to_string(), key);
        }
        key
    }

    /// Label lookup without interning.
    pub fn lookup_key(&self, text: &str) -> Option<TextKey> {
        self.key_lookup.get(text).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_string_is_null_key() {
        let mut pool = TextPool::new();
        let before = pool.len();
        let key = pool.add_to_pool("");
        assert!(key.is_null());
        assert_eq!(pool.len(), before);
        assert_eq!(pool.to_string_view(TextKey::NULL), "");
    }

    #[test]
    fn test_plain_append_never_dedups() {
        let mut pool = TextPool::new();
        let a = pool.add_to_pool("_ADJ");
        let b = pool.add_to_pool("_ADJ");
        assert_ne!(a, b);
        assert_eq!(pool.to_string_view(a), pool.to_string_view(b));
    }

    #[test]
    fn test_keys_survive_growth() {
        let mut pool = TextPool::new();
        let first = pool.add_to_pool("France");
        for i in 0..10_000 {
            pool.add_to_pool(&format!("filler_{}", i));
        }
        assert_eq!(pool.to_string_view(first), "France");
    }

    #[test]
    fn test_unique_can_reuse_suffix_of_longer_entry() {
        let mut pool = TextPool::new();
        let long = pool.add_to_pool("pro_military");
        let size = pool.len();
        let short = pool.add_unique_to_pool("military");
        assert_eq!(pool.len(), size);
        assert_eq!(short.index(), long.index() + "pro_".len());
        assert_eq!(pool.to_string_view(short), "military");
    }

    #[test]
    fn test_unique_does_not_match_prefix() {
        let mut pool = TextPool::new();
        pool.add_to_pool("conservative");
        let key = pool.add_unique_to_pool("conserv");
        assert_eq!(pool.to_string_view(key), "conserv");
    }

    #[test]
    fn test_unique_with_embedded_nul_is_not_null() {
        let mut pool = TextPool::new();
        pool.add_to_pool("\0");
        let a = pool.add_unique_to_pool("\0");
        let b = pool.add_unique_to_pool("\0");
        assert!(!a.is_null());
        assert_eq!(a, b);
    }

    #[test]
    fn test_lowercase_only_touches_new_bytes() {
        let mut pool = TextPool::new();
        let upper = pool.add_to_pool("ENG");
        let lower = pool.add_to_pool_lowercase("ENG_Navy-1");
        assert_eq!(pool.to_string_view(upper), "ENG");
        assert_eq!(pool.to_string_view(lower), "eng_navy-1");
    }

    #[test]
    fn test_find_or_add_key_reuses_labels() {
        let mut pool = TextPool::new();
        let a = pool.find_or_add_key("coastal");
        let b = pool.find_or_add_key("coastal");
        assert_eq!(a, b);
        assert_eq!(pool.lookup_key("coastal"), Some(a));
        assert_eq!(pool.lookup_key("overseas"), None);
    }

    proptest! {
        #[test]
        fn prop_add_then_view_round_trips(s in "[^\\x00]{1,40}") {
            let mut pool = TextPool::new();
            pool.add_to_pool("padding");
            let key = pool.add_to_pool(&s);
            prop_assert_eq!(pool.to_string_view(key), s.as_str());
        }

        #[test]
        fn prop_unique_grows_at_most_once(s in "[^\\x00]{0,20}", others in proptest::collection::vec("[a-z]{1,8}", 0..8)) {
            let mut pool = TextPool::new();
            for o in &others {
                pool.add_to_pool(o);
            }
            let before = pool.len();
            let a = pool.add_unique_to_pool(&s);
            let b = pool.add_unique_to_pool(&s);
            prop_assert_eq!(a, b);
            prop_assert!(pool.len() <= before + s.len() + 1);
            prop_assert_eq!(pool.to_string_view(a), s.as_str());
        }

        #[test]
        fn prop_lowercase_folds_ascii_only(s in "[^\\x00]{1,40}") {
            let mut pool = TextPool::new();
            let key = pool.add_to_pool_lowercase(&s);
            prop_assert_eq!(pool.to_string_view(key), s.to_ascii_lowercase());
        }
    }
}
