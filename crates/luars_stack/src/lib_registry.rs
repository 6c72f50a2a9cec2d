// Library registration system
// Registers native Rust functions into the global table before a run

use crate::lua_value::{CFunction, LuaValue};
use crate::lua_vm::LuaState;
use crate::stdlib;

/// Type for value initializers - functions that create values when the module loads
pub type ValueInitializer = fn(&mut LuaState) -> LuaValue;

/// Entry in a library module - can be a function or a value
pub enum LibraryEntry {
    Function(CFunction),
    Value(ValueInitializer),
}

/// A library module containing multiple functions and values.
/// The module named `_G` registers its entries directly as globals; any
/// other module becomes a global table under its own name.
pub struct LibraryModule {
    pub name: &'static str,
    pub entries: Vec<(&'static str, LibraryEntry)>,
}

impl LibraryModule {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Vec::new(),
        }
    }

    pub fn with_function(mut self, name: &'static str, func: CFunction) -> Self {
        self.entries.push((name, LibraryEntry::Function(func)));
        self
    }

    pub fn with_value(mut self, name: &'static str, value_init: ValueInitializer) -> Self {
        self.entries.push((name, LibraryEntry::Value(value_init)));
        self
    }
}

/// Registry for the native libraries, in registration order
pub struct LibraryRegistry {
    modules: Vec<LibraryModule>,
}

impl LibraryRegistry {
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    pub fn register(&mut self, module: LibraryModule) {
        self.modules.push(module);
    }

    /// Load all registered libraries into the global table
    pub fn load_all(&self, state: &mut LuaState) {
        for module in &self.modules {
            self.load_module(state, module);
        }
    }

    pub fn load_module(&self, state: &mut LuaState, module: &LibraryModule) {
        if module.name == "_G" {
            for (name, entry) in &module.entries {
                let value = entry_value(state, entry);
                state.set_global(name, value);
            }
            return;
        }

        let lib_table = state.pool_mut().create_table();
        for (name, entry) in &module.entries {
            let value = entry_value(state, entry);
            let key = state.pool_mut().create_string(name);
            // String keys are always valid
            let _ = lib_table.borrow_mut().assign(key, value);
        }
        state.set_global(module.name, LuaValue::Table(lib_table));
    }

    pub fn get_module(&self, name: &str) -> Option<&LibraryModule> {
        self.modules.iter().find(|m| m.name == name)
    }
}

impl Default for LibraryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn entry_value(state: &mut LuaState, entry: &LibraryEntry) -> LuaValue {
    match entry {
        LibraryEntry::Function(func) => LuaValue::cfunction(*func),
        LibraryEntry::Value(value_init) => value_init(state),
    }
}

/// Registry holding every library this runtime ships
pub fn create_standard_registry() -> LibraryRegistry {
    let mut registry = LibraryRegistry::new();
    registry.register(stdlib::basic::create_basic_lib());
    registry
}
