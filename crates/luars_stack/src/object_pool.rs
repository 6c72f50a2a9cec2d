// Object pool - the value heap facade used by the VM ("data pool")
// Allocates tables and closures and interns name strings. Lifetime is
// reference counted: an object lives while any stack slot, scope-chain
// entry, table or closure still holds its handle.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use ahash::RandomState;
use smol_str::SmolStr;

use crate::lua_value::{LuaClosure, LuaFunction, LuaTable, LuaValue, TableRef};

/// String interner - identical names share one SmolStr allocation
pub struct StringInterner {
    set: HashSet<SmolStr, RandomState>,
}

impl StringInterner {
    pub fn new() -> Self {
        Self {
            set: HashSet::with_capacity_and_hasher(64, RandomState::new()),
        }
    }

    pub fn intern(&mut self, s: &str) -> SmolStr {
        if let Some(existing) = self.set.get(s) {
            return existing.clone();
        }
        let interned = SmolStr::new(s);
        self.set.insert(interned.clone());
        interned
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// Allocation counters, for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub tables_created: usize,
    pub closures_created: usize,
}

#[derive(Default)]
pub struct ObjectPool {
    strings: StringInterner,
    stats: PoolStats,
}

impl ObjectPool {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn nil(&self) -> LuaValue {
        LuaValue::Nil
    }

    #[inline(always)]
    pub fn number(&self, n: f64) -> LuaValue {
        LuaValue::Number(n)
    }

    pub fn create_string(&mut self, s: &str) -> LuaValue {
        LuaValue::String(self.strings.intern(s))
    }

    pub fn create_table(&mut self) -> TableRef {
        self.stats.tables_created += 1;
        Rc::new(RefCell::new(LuaTable::new()))
    }

    /// Instantiate `proto`. The closure gets a fresh upvalue table only when
    /// the prototype captures at least one name; the table starts empty and
    /// is filled by the caller.
    pub fn create_closure(&mut self, proto: Rc<LuaFunction>) -> Rc<LuaClosure> {
        self.stats.closures_created += 1;
        let upvalue_table = if proto.has_upvalues() {
            self.stats.tables_created += 1;
            Some(Rc::new(RefCell::new(LuaTable::with_capacity(
                proto.upvalue_names().len(),
            ))))
        } else {
            None
        };
        Rc::new(LuaClosure::new(proto, upvalue_table))
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    pub fn interned_strings(&self) -> usize {
        self.strings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lua_value::Chunk;

    #[test]
    fn interned_strings_are_shared() {
        let mut pool = ObjectPool::new();
        let a = pool.create_string("arg");
        let b = pool.create_string("arg");
        assert_eq!(a, b);
        assert_eq!(pool.interned_strings(), 1);
    }

    #[test]
    fn closures_get_independent_upvalue_tables() {
        let mut pool = ObjectPool::new();
        let proto = Rc::new(LuaFunction::new(Rc::new(Chunk::default()), ["x"]));
        let c1 = pool.create_closure(proto.clone());
        let c2 = pool.create_closure(proto);
        let t1 = c1.upvalue_table().unwrap();
        let t2 = c2.upvalue_table().unwrap();
        assert!(!Rc::ptr_eq(t1, t2));
        assert_eq!(pool.stats().closures_created, 2);
        assert_eq!(pool.stats().tables_created, 2);
    }

    #[test]
    fn closure_without_captures_has_no_upvalue_table() {
        let mut pool = ObjectPool::new();
        let proto = Rc::new(LuaFunction::new(
            Rc::new(Chunk::default()),
            Vec::<&str>::new(),
        ));
        assert!(pool.create_closure(proto).upvalue_table().is_none());
    }
}
