//! Fixed-width classification keys and their ordering.
//!
//! A key is six ASCII characters, each a digit or the `*` wildcard. Keys with
//! at least one `*` form their own sub-catalogue (the wildcard universe) and
//! never mix with purely numeric keys during inference.

use crate::error::{HierarchyError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Width of every key, in characters
pub const KEY_WIDTH: usize = 6;

/// Deepest level a real key can reach (the synthetic root sits at 0)
pub const MAX_LEVEL: u8 = 6;

/// Identifier of the synthetic root. Cannot collide with a real key since
/// `-` is not a legal key character.
pub const ROOT_SENTINEL: &str = "------";

/// Six-character classification code
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key([u8; KEY_WIDTH]);

/// The two disjoint key populations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyUniverse {
    /// Digits only
    Numeric,
    /// Contains at least one `*`
    Wildcard,
}

impl Key {
    /// The synthetic root node's key
    pub const ROOT: Key = Key(*b"------");

    /// Parse a real (non-root) key. Rejects anything that is not exactly six
    /// digits or `*` characters.
    pub fn parse(raw: &str) -> Result<Self> {
        let bytes = raw.as_bytes();
        if bytes.len() != KEY_WIDTH {
            return Err(HierarchyError::invalid_input(format!(
                "key {raw:?} must be {KEY_WIDTH} ASCII characters, got {} bytes",
                bytes.len()
            )));
        }

        let mut out = [0u8; KEY_WIDTH];
        for (pos, &byte) in bytes.iter().enumerate() {
            if !(byte.is_ascii_digit() || byte == b'*') {
                let found = raw[pos..].chars().next().unwrap_or('?');
                return Err(HierarchyError::invalid_input(format!(
                    "key {raw:?} contains {found:?} at position {pos}"
                )));
            }
            out[pos] = byte;
        }

        Ok(Self(out))
    }

    pub fn as_str(&self) -> &str {
        // Only ASCII ever reaches the buffer.
        std::str::from_utf8(&self.0).unwrap_or(ROOT_SENTINEL)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_WIDTH] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        *self == Self::ROOT
    }

    pub fn is_wildcard(&self) -> bool {
        !self.is_root() && self.0.contains(&b'*')
    }

    pub fn universe(&self) -> KeyUniverse {
        if self.is_wildcard() {
            KeyUniverse::Wildcard
        } else {
            KeyUniverse::Numeric
        }
    }

    /// Integer value of an all-digit key
    pub fn numeric_value(&self) -> Option<u32> {
        if self.is_root() || self.is_wildcard() {
            return None;
        }
        self.as_str().parse().ok()
    }

    /// The key with trailing zeros removed; `000000` collapses to `"0"`.
    pub fn significant_prefix(&self) -> &str {
        let trimmed = self.as_str().trim_end_matches('0');
        if trimmed.is_empty() {
            &self.as_str()[..1]
        } else {
            trimmed
        }
    }
}

/// Position of the first character where two keys differ
pub fn first_difference(x: &Key, y: &Key) -> Option<usize> {
    x.0.iter().zip(y.0.iter()).position(|(a, b)| a != b)
}

/// Total order over keys.
///
/// Two numeric keys compare as integers. Otherwise characters are scanned
/// left to right; at the first differing position `*` ranks below any digit
/// and two digits compare naturally. The root sentinel sorts before all keys.
pub fn compare_keys(x: &Key, y: &Key) -> Ordering {
    match (x.is_root(), y.is_root()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        (false, false) => {}
    }

    if let (Some(a), Some(b)) = (x.numeric_value(), y.numeric_value()) {
        return a.cmp(&b);
    }

    for (a, b) in x.0.iter().zip(y.0.iter()) {
        if a == b {
            continue;
        }
        return match (*a == b'*', *b == b'*') {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => a.cmp(b),
        };
    }

    Ordering::Equal
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_keys(self, other)
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for Key {
    type Err = HierarchyError;

    /// Like [`Key::parse`], but also accepts the root sentinel.
    fn from_str(s: &str) -> Result<Self> {
        if s == ROOT_SENTINEL {
            Ok(Self::ROOT)
        } else {
            Self::parse(s)
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.as_str())
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Check that `keys` is strictly ascending under [`compare_keys`].
///
/// Strictness also rules out duplicates. The root sentinel is not accepted
/// as input.
pub fn validate_sorted(keys: &[Key]) -> Result<()> {
    if let Some(pos) = keys.iter().position(Key::is_root) {
        return Err(HierarchyError::invalid_input(format!(
            "root sentinel {ROOT_SENTINEL} is not a valid input key (position {pos})"
        )));
    }

    for (idx, pair) in keys.windows(2).enumerate() {
        match compare_keys(&pair[0], &pair[1]) {
            Ordering::Less => {}
            Ordering::Equal => {
                return Err(HierarchyError::invalid_input(format!(
                    "duplicate key {} at positions {} and {}",
                    pair[1],
                    idx,
                    idx + 1
                )));
            }
            Ordering::Greater => {
                return Err(HierarchyError::invalid_input(format!(
                    "keys not sorted: {} (position {}) precedes {} (position {})",
                    pair[0],
                    idx,
                    pair[1],
                    idx + 1
                )));
            }
        }
    }

    Ok(())
}

/// Which keys survive catalogue preparation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyFilter {
    /// Numeric keys at or above this value are summary keys outside the
    /// actual hierarchy and get dropped
    pub summary_floor: Option<u32>,

    /// Keys removed by hand
    pub exclude: Vec<Key>,

    /// Drop the whole wildcard universe
    pub drop_wildcards: bool,
}

impl KeyFilter {
    pub fn admits(&self, key: &Key) -> bool {
        if self.drop_wildcards && key.is_wildcard() {
            return false;
        }
        if let (Some(floor), Some(value)) = (self.summary_floor, key.numeric_value()) {
            if value >= floor {
                return false;
            }
        }
        !self.exclude.contains(key)
    }
}

/// Sorted, deduplicated key sequences, one per universe
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyPartition {
    wildcard: Vec<Key>,
    numeric: Vec<Key>,
}

impl KeyPartition {
    /// Accept two already sorted sequences. Fails if either is unsorted,
    /// has duplicates, or holds a key of the other universe.
    pub fn new(wildcard: Vec<Key>, numeric: Vec<Key>) -> Result<Self> {
        if let Some(key) = wildcard.iter().find(|k| !k.is_wildcard()) {
            return Err(HierarchyError::invalid_input(format!(
                "numeric key {key} in the wildcard sequence"
            )));
        }
        if let Some(key) = numeric.iter().find(|k| k.is_wildcard()) {
            return Err(HierarchyError::invalid_input(format!(
                "wildcard key {key} in the numeric sequence"
            )));
        }

        validate_sorted(&wildcard)?;
        validate_sorted(&numeric)?;

        Ok(Self { wildcard, numeric })
    }

    /// Split one already sorted list by universe, keeping the order within
    /// each universe, then validate as [`KeyPartition::new`] does.
    pub fn from_sorted_keys(keys: Vec<Key>) -> Result<Self> {
        let (wildcard, numeric) = keys.into_iter().partition(Key::is_wildcard);
        Self::new(wildcard, numeric)
    }

    /// Prepare raw key strings: drop blanks and the root placeholder, parse,
    /// filter, deduplicate, split by universe and sort.
    pub fn from_unsorted<I, S>(raw: I, filter: &KeyFilter) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique = BTreeSet::new();
        let mut dropped = 0usize;

        for item in raw {
            let text = item.as_ref().trim();
            if text.is_empty() || text == ROOT_SENTINEL {
                continue;
            }
            let key = Key::parse(text)?;
            if filter.admits(&key) {
                unique.insert(key);
            } else {
                dropped += 1;
            }
        }

        if dropped > 0 {
            log::debug!("Key filter dropped {dropped} keys");
        }

        let (wildcard, numeric) = unique.into_iter().partition(Key::is_wildcard);
        Ok(Self { wildcard, numeric })
    }

    pub fn wildcard(&self) -> &[Key] {
        &self.wildcard
    }

    pub fn numeric(&self) -> &[Key] {
        &self.numeric
    }

    pub fn len(&self) -> usize {
        self.wildcard.len() + self.numeric.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wildcard.is_empty() && self.numeric.is_empty()
    }
}
