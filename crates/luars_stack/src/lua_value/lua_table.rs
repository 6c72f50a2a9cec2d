// LuaTable - mutable mapping from Lua values to Lua values
// Used both as the script-level table type and as the storage of
// lexical scopes and closure upvalue sets.
use std::collections::HashMap;
use std::fmt;

use ahash::RandomState;
use smol_str::SmolStr;

use super::LuaValue;

/// Hashable projection of a [`LuaValue`] key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum TableKey {
    Boolean(bool),
    /// Normalised bit pattern (`-0.0` folds into `0.0`)
    Number(u64),
    String(SmolStr),
    /// Reference types hash by identity
    Ref(usize),
}

impl TableKey {
    fn from_value(key: &LuaValue) -> Result<Self, TableError> {
        match key {
            LuaValue::Nil => Err(TableError::NilIndex),
            LuaValue::Boolean(b) => Ok(TableKey::Boolean(*b)),
            LuaValue::Number(n) => {
                if n.is_nan() {
                    Err(TableError::NaNIndex)
                } else if *n == 0.0 {
                    Ok(TableKey::Number(0.0f64.to_bits()))
                } else {
                    Ok(TableKey::Number(n.to_bits()))
                }
            }
            LuaValue::String(s) => Ok(TableKey::String(s.clone())),
            other => match other.ref_address() {
                Some(addr) => Ok(TableKey::Ref(addr)),
                None => Err(TableError::NilIndex),
            },
        }
    }
}

/// Invalid table index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableError {
    NilIndex,
    NaNIndex,
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::NilIndex => write!(f, "table index is nil"),
            TableError::NaNIndex => write!(f, "table index is NaN"),
        }
    }
}

#[derive(Default)]
pub struct LuaTable {
    // The original key is kept next to the value so reference keys stay
    // alive as long as the entry does.
    entries: HashMap<TableKey, (LuaValue, LuaValue), RandomState>,
}

impl LuaTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
        }
    }

    /// Number of stored entries, including keys bound to nil.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True once `key` has been assigned, even if it was assigned nil.
    pub fn have_key(&self, key: &LuaValue) -> bool {
        match TableKey::from_value(key) {
            Ok(k) => self.entries.contains_key(&k),
            Err(_) => false,
        }
    }

    /// Value stored under `key`, nil when absent.
    pub fn get_value(&self, key: &LuaValue) -> LuaValue {
        match TableKey::from_value(key) {
            Ok(k) => self
                .entries
                .get(&k)
                .map(|(_, v)| v.clone())
                .unwrap_or_default(),
            Err(_) => LuaValue::Nil,
        }
    }

    /// Bind `key` to `value`. Nil values are stored, not removed.
    pub fn assign(&mut self, key: LuaValue, value: LuaValue) -> Result<(), TableError> {
        let k = TableKey::from_value(&key)?;
        self.entries.insert(k, (key, value));
        Ok(())
    }

    pub fn get_int(&self, i: i64) -> LuaValue {
        self.get_value(&LuaValue::Number(i as f64))
    }

    pub fn set_int(&mut self, i: i64, value: LuaValue) {
        let key = LuaValue::Number(i as f64);
        self.entries
            .insert(TableKey::Number((i as f64).to_bits()), (key, value));
    }

    /// Length of the sequence `t[1..n]` of non-nil values.
    pub fn border(&self) -> i64 {
        let mut n = 0;
        while !self.get_int(n + 1).is_nil() {
            n += 1;
        }
        n
    }

    /// Iterate over `(key, value)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&LuaValue, &LuaValue)> {
        self.entries.values().map(|(k, v)| (k, v))
    }
}
