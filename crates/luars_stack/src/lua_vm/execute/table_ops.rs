// Variable resolution, table indexing and assignment
//
// Names are resolved to the *table* that owns them, pushed as a
// `[table, C(1)]` group; indexing then happens uniformly through
// GETTABLEVALUE / ASSIGN whether the name is a local, an upvalue or a
// global.

use crate::lua_value::LuaValue;
use crate::lua_vm::{LuaResult, LuaVM, StackValue};

impl LuaVM {
    /// GETLOCALTABLE: push the innermost scope
    pub(super) fn exec_get_local_table(&mut self) -> LuaResult<()> {
        let Some(scope) = self.nest_tables.last().cloned() else {
            return Err(self
                .state
                .internal_error("GETLOCALTABLE with an empty scope chain"));
        };
        self.state.push_single(LuaValue::Table(scope))
    }

    /// GETTABLE: push the table that resolves `name` for the current frame.
    ///
    /// Searches the frame's own scopes innermost first, then falls back to
    /// the callee's upvalue table. In the global frame the fallback is the
    /// global table, so an unknown name at top level reads as a global.
    pub(super) fn exec_get_table(&mut self, name: LuaValue) -> LuaResult<()> {
        if let Some(scope) = self.find_local_owner(&name)? {
            return self.state.push_single(LuaValue::Table(scope));
        }

        let callee = self.current_frame()?.callee.clone();
        let table = match &callee {
            LuaValue::Closure(closure) => match closure.upvalue_table() {
                Some(upvalues) => upvalues.clone(),
                None => {
                    return Err(self.state.internal_error(format!(
                        "name '{name}' is neither local nor captured by the running closure"
                    )));
                }
            },
            LuaValue::Nil => {
                let callee_tables = self.frame_scope_count()?;
                if callee_tables == 0 {
                    return Err(self
                        .state
                        .internal_error("global frame owns no scope"));
                }
                self.nest_tables[self.nest_tables.len() - callee_tables].clone()
            }
            other => {
                return Err(self.state.internal_error(format!(
                    "cannot resolve '{name}' inside a frame running a {}",
                    other.name()
                )));
            }
        };
        self.state.push_single(LuaValue::Table(table))
    }

    /// GETTABLEVALUE: replace a table handle with `table[key]`.
    ///
    /// Stack: `[table, C(1), (group, C(n)) x depth..., key]`. The table slot is
    /// found by walking back over `depth` value groups; it is overwritten in
    /// place with the looked-up value and the key is popped.
    pub(super) fn exec_get_table_value(&mut self, depth: usize) -> LuaResult<()> {
        let mut index: isize = -1;
        for _ in 0..depth {
            index -= 1;
            let (_, total) = self.state.counter_at(index)?;
            index -= total as isize;
        }

        // index - 1: the table handle's counter, index - 2: the table handle
        self.state.counter_at(index - 1)?;
        let table_value = self.state.value_at(index - 2)?;
        let key = self.state.value_at(-1)?;

        let LuaValue::Table(table) = &table_value else {
            return Err(self.state.error(format!(
                "attempt to index value from {}",
                table_value.name()
            )));
        };
        let value = table.borrow().get_value(&key);

        if let Some(slot) = self.state.stack.get_mut(index - 2) {
            *slot = StackValue::Value(value);
        }
        self.state.pop_slots(1)
    }

    /// ASSIGN: `[vals.., C(n), table, C(1), key]` -> `[vals.., C(n')]`.
    ///
    /// Takes the next unconsumed value of the exposed group and advances its
    /// `current`; once the group is exhausted the target receives nil.
    pub(super) fn exec_assign(&mut self) -> LuaResult<()> {
        let key = self.state.value_at(-1)?;
        self.state.counter_at(-2)?;
        self.state.pop_slots(2)?;
        let target = self.state.pop_value()?;

        let (current, total) = self.state.top_counter()?;
        let value = if current < total {
            let value = self
                .state
                .value_at(current as isize - total as isize - 1)?;
            if let Some(StackValue::Counter { current, .. }) = self.state.stack.top_mut() {
                *current += 1;
            }
            value
        } else {
            LuaValue::Nil
        };

        let LuaValue::Table(table) = &target else {
            return Err(self.state.error(format!(
                "attempt to index value from {}",
                target.name()
            )));
        };
        let assigned = table.borrow_mut().assign(key, value);
        assigned.map_err(|e| self.state.error(e.to_string()))
    }
}
