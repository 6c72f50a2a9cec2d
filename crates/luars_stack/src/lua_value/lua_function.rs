// Function prototypes and closures
use std::rc::Rc;

use smol_str::SmolStr;

use super::{Chunk, LuaValue, TableRef};

/// Compiled function body plus the names it captures from enclosing scopes.
///
/// Immutable once built; every `GenerateClosure` over the same prototype
/// produces a new [`LuaClosure`] with its own upvalue table.
pub struct LuaFunction {
    chunk: Rc<Chunk>,
    /// Captured names, in declaration order, without duplicates
    upvalue_names: Vec<LuaValue>,
    name: Option<SmolStr>,
}

impl LuaFunction {
    pub fn new<I, S>(chunk: Rc<Chunk>, upvalue_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        let mut names: Vec<LuaValue> = Vec::new();
        for name in upvalue_names {
            let value = LuaValue::String(name.into());
            if !names.contains(&value) {
                names.push(value);
            }
        }

        Self {
            chunk,
            upvalue_names: names,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<SmolStr>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[inline(always)]
    pub fn chunk(&self) -> &Rc<Chunk> {
        &self.chunk
    }

    pub fn upvalue_names(&self) -> &[LuaValue] {
        &self.upvalue_names
    }

    pub fn has_upvalues(&self) -> bool {
        !self.upvalue_names.is_empty()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// A prototype instantiated at runtime.
///
/// The upvalue table holds a copy of each captured name's value taken when
/// the closure was created. It belongs to this closure alone: later writes
/// to the enclosing scope are not seen here, and sibling closures built
/// from the same prototype never share it.
pub struct LuaClosure {
    proto: Rc<LuaFunction>,
    upvalue_table: Option<TableRef>,
}

impl LuaClosure {
    pub fn new(proto: Rc<LuaFunction>, upvalue_table: Option<TableRef>) -> Self {
        Self {
            proto,
            upvalue_table,
        }
    }

    #[inline(always)]
    pub fn proto(&self) -> &Rc<LuaFunction> {
        &self.proto
    }

    #[inline(always)]
    pub fn chunk(&self) -> &Rc<Chunk> {
        self.proto.chunk()
    }

    pub fn upvalue_table(&self) -> Option<&TableRef> {
        self.upvalue_table.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upvalue_names_are_deduplicated_in_order() {
        let proto = LuaFunction::new(Rc::new(Chunk::default()), ["b", "a", "b"]);
        let names: Vec<_> = proto
            .upvalue_names()
            .iter()
            .map(|v| v.to_string())
            .collect();
        assert_eq!(names, vec!["b", "a"]);
        assert!(proto.has_upvalues());
    }

    #[test]
    fn prototype_without_captures() {
        let proto = LuaFunction::new(Rc::new(Chunk::default()), Vec::<&str>::new()).with_name("f");
        assert!(!proto.has_upvalues());
        assert_eq!(proto.name(), Some("f"));
    }
}
