//! Interned tokens and the 32-bit table indices used throughout the format.

use indexmap::IndexSet;
use std::sync::Arc;

/// A 32-bit handle into one of the tables (tokens, strings, paths, fields).
/// The sentinel `!0u32` means "invalid" / "no value".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Index(pub u32);

impl Index {
    pub const INVALID: Index = Index(u32::MAX);

    pub fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}

impl From<u32> for Index {
    fn from(v: u32) -> Self {
        Index(v)
    }
}

/// An immutable interned string. Equality is by content; the `TokenTable`
/// pools the underlying allocation so clones are cheap.
#[derive(Debug, Clone, Eq)]
pub struct Token(Arc<str>);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        *self.0 == *other.0
    }
}

impl std::hash::Hash for Token {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        (*self.0).hash(state)
    }
}

impl PartialOrd for Token {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Token {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        Token(Arc::from(s))
    }
}

impl From<String> for Token {
    fn from(s: String) -> Self {
        Token(Arc::from(s.as_str()))
    }
}

/// Interned token pool, built once while reading the TOKENS section and
/// read-only afterwards. Order-preserving so token-table round trips keep
/// their on-disk order.
#[derive(Debug, Default)]
pub struct TokenTable {
    tokens: IndexSet<Arc<str>>,
}

impl TokenTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, s: &str) -> Index {
        let (i, _) = self.tokens.insert_full(Arc::from(s));
        Index(i as u32)
    }

    pub fn get(&self, index: Index) -> Option<Token> {
        self.tokens.get_index(index.0 as usize).cloned().map(Token)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interns_preserve_insertion_order() {
        let mut table = TokenTable::new();
        let a = table.push("foo");
        let b = table.push("bar");
        assert_eq!(table.get(a).unwrap().as_str(), "foo");
        assert_eq!(table.get(b).unwrap().as_str(), "bar");
    }

    #[test]
    fn equality_is_by_content() {
        let t1: Token = "hello".into();
        let t2: Token = "hello".into();
        assert_eq!(t1, t2);
    }

    #[test]
    fn invalid_index_sentinel() {
        assert!(!Index::INVALID.is_valid());
        assert!(Index(0).is_valid());
    }
}
