use std::ops::Deref;

/// Immutable run of symbols, either the query or the database side of an alignment.
///
/// Symbols are compared as raw bytes, so any small alphabet (`ATGC`, amino acids, ...) works
/// as long as it is byte encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Sequence(Box<[u8]>);

impl Sequence {
    pub fn new(symbols: impl Into<Vec<u8>>) -> Self {
        Self(symbols.into().into_boxed_slice())
    }

    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Deref for Sequence {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for Sequence {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}

impl From<&[u8]> for Sequence {
    fn from(value: &[u8]) -> Self {
        Self::new(value)
    }
}

impl From<Vec<u8>> for Sequence {
    fn from(value: Vec<u8>) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Display for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}
