use std::fmt;
use uuid::Uuid;

/// A 24-character upper-case hex object identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    pub const LEN: usize = 24;

    pub fn from_bytes(bytes: &[u8; 12]) -> Self {
        Self(hex::encode_upper(bytes))
    }

    /// Accepts exactly 24 hex digits, normalizing to upper case.
    pub fn parse(s: &str) -> Option<Self> {
        if s.len() == Self::LEN && s.bytes().all(|b| b.is_ascii_hexdigit()) {
            Some(Self(s.to_ascii_uppercase()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of fresh object identifiers.
pub trait IdSource {
    fn next_id(&mut self) -> ObjectId;
}

/// 12 bytes of a v4 UUID per identifier. No state is kept between runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&mut self) -> ObjectId {
        let uuid = Uuid::new_v4();
        let mut bytes = [0u8; 12];
        bytes.copy_from_slice(&uuid.as_bytes()[..12]);
        ObjectId::from_bytes(&bytes)
    }
}

/// Deterministic identifiers: a fixed 8-digit prefix followed by a counter.
///
/// Useful for reproducible output in fixtures and tests.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: u32,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: u32) -> Self {
        Self { prefix, next: 1 }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new(0xFEED_0000)
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> ObjectId {
        let id = ObjectId(format!("{:08X}{:016X}", self.prefix, self.next));
        self.next += 1;
        id
    }
}
