use crate::models::ProductId;
use std::collections::{HashMap, TryReserveError};
use std::hash::{BuildHasherDefault, Hasher};

/// Bucket count of the original chained table; only used by [`bucket_of`].
pub const BUCKET_COUNT: u32 = 100_003;

/// Longest key accepted by default, in bytes.
pub const MAX_KEY_LEN: usize = 14;

const DJB2_SEED: u32 = 5381;

// Fibonacci multiplier; spreads the 32-bit hash into the high bits `HashMap` tags on.
const SPREAD: u64 = 0x9E37_79B9_7F4A_7C15;

/// `hash * 33 + byte` over every byte, wrapping at 32 bits.
#[derive(Debug, Clone, Copy)]
pub struct Djb2Hasher {
    hash: u32,
}

impl Default for Djb2Hasher {
    fn default() -> Self {
        Self { hash: DJB2_SEED }
    }
}

impl Hasher for Djb2Hasher {
    fn finish(&self) -> u64 {
        (self.hash as u64).wrapping_mul(SPREAD)
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.hash = (self.hash << 5)
                .wrapping_add(self.hash)
                .wrapping_add(byte as u32);
        }
    }
}

impl hash32::Hasher for Djb2Hasher {
    fn finish32(&self) -> u32 {
        self.hash
    }
}

pub fn djb2(bytes: &[u8]) -> u32 {
    let mut hasher = Djb2Hasher::default();
    hasher.write(bytes);
    hash32::Hasher::finish32(&hasher)
}

pub fn bucket_of(key: &str) -> u32 {
    djb2(key.as_bytes()) % BUCKET_COUNT
}

#[derive(Debug)]
pub enum InternError {
    /// Key is longer than the table accepts. Keys are never truncated.
    TooLong { len: usize, max: usize },

    /// Every `ProductId` has been handed out.
    IdsExhausted,

    /// Growing the table failed.
    Alloc(TryReserveError),
}

impl std::fmt::Display for InternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InternError::TooLong { len, max } => {
                write!(f, "key of {} bytes exceeds the {} byte limit", len, max)
            }
            InternError::IdsExhausted => write!(f, "product id space exhausted"),
            InternError::Alloc(err) => write!(f, "failed to grow intern table: {}", err),
        }
    }
}

impl std::error::Error for InternError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InternError::Alloc(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TryReserveError> for InternError {
    fn from(err: TryReserveError) -> Self {
        InternError::Alloc(err)
    }
}

/// Maps short strings to dense ids in first-seen order.
///
/// Ids are never reused or removed, so `keys[id]` is always the string that
/// was assigned `id`.
#[derive(Debug)]
pub struct InternTable {
    ids: HashMap<Box<str>, ProductId, BuildHasherDefault<Djb2Hasher>>,
    keys: Vec<Box<str>>,
    max_key_len: usize,
}

impl Default for InternTable {
    fn default() -> Self {
        Self::new()
    }
}

impl InternTable {
    pub fn new() -> Self {
        Self::with_max_key_len(MAX_KEY_LEN)
    }

    pub fn with_max_key_len(max_key_len: usize) -> Self {
        Self {
            ids: HashMap::default(),
            keys: Vec::new(),
            max_key_len,
        }
    }

    pub fn intern(&mut self, key: &str) -> Result<ProductId, InternError> {
        if key.len() > self.max_key_len {
            return Err(InternError::TooLong {
                len: key.len(),
                max: self.max_key_len,
            });
        }
        if let Some(&id) = self.ids.get(key) {
            return Ok(id);
        }

        let id = ProductId::try_from(self.keys.len()).map_err(|_| InternError::IdsExhausted)?;
        self.ids.try_reserve(1)?;
        self.keys.try_reserve(1)?;

        let key: Box<str> = key.into();
        self.keys.push(key.clone());
        self.ids.insert(key, id);
        Ok(id)
    }

    pub fn get(&self, key: &str) -> Option<ProductId> {
        self.ids.get(key).copied()
    }

    pub fn resolve(&self, id: ProductId) -> Option<&str> {
        self.keys.get(id as usize).map(|key| &**key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn max_key_len(&self) -> usize {
        self.max_key_len
    }

    /// Entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = (ProductId, &str)> {
        self.keys
            .iter()
            .enumerate()
            .map(|(id, key)| (id as ProductId, &**key))
    }
}
