// Counter / multi-value protocol
// Every handler here rewrites value groups at the top of the operand stack.

use tracing::trace;

use crate::lua_value::LuaValue;
use crate::lua_vm::lua_limits::ARG_TABLE_NAME;
use crate::lua_vm::{InstructionParam, LuaResult, LuaVM, StackValue};

impl LuaVM {
    /// PUSH: value slot for a name or value operand, `C(n)` for a counter
    pub(super) fn exec_push(&mut self, param: &InstructionParam) -> LuaResult<()> {
        match param {
            InstructionParam::Name(v) | InstructionParam::Value(v) => {
                self.state.push_value(v.clone())
            }
            InstructionParam::Counter(total) => self.state.push_counter(*total),
            other => Err(self.state.internal_error(format!(
                "PUSH expects a name, value or counter operand, found {other:?}"
            ))),
        }
    }

    /// CLEANSTACK: drop the top counter together with its whole group
    pub(super) fn exec_clean_stack(&mut self) -> LuaResult<()> {
        let (_, total) = self.state.top_counter()?;
        self.state.pop_slots(total + 1)
    }

    /// RESETCOUNTER: make the top group exactly one value.
    /// An empty group becomes `nil`, a longer one keeps its first value.
    pub(super) fn exec_reset_counter(&mut self) -> LuaResult<()> {
        let (_, total) = self.state.top_counter()?;
        match total {
            1 => return Ok(()),
            0 => {
                self.state.pop_slots(1)?;
                self.state.push_value(LuaValue::Nil)?;
            }
            _ => {
                self.state.pop_slots(1)?;
                self.state.pop_slots(total - 1)?;
            }
        }
        self.state.push_counter(1)
    }

    /// DUPLICATECOUNTER: push a copy of the top group and a fresh counter
    /// over it; the original group stays below untouched
    pub(super) fn exec_duplicate_counter(&mut self) -> LuaResult<()> {
        let (_, total) = self.state.top_counter()?;
        let copy = match self.state.stack.absolute(-1 - total as isize) {
            Some(start) => self.state.stack.copy_range(start, total),
            None => None,
        };
        let Some(copy) = copy else {
            return Err(self.state.internal_error(format!(
                "DUPLICATECOUNTER: counter covers {total} values but the stack is shorter"
            )));
        };

        for slot in copy {
            self.state.push_slot(slot)?;
        }
        self.state.push_counter(total)
    }

    /// MERGECOUNTER: `[a.., C(m), b.., C(n)]` becomes `[a.., b.., C(m+n)]`
    pub(super) fn exec_merge_counter(&mut self) -> LuaResult<()> {
        let (_, upper) = self.state.top_counter()?;
        let lower_offset = -(upper as isize) - 2;
        let (_, lower) = self.state.counter_at(lower_offset)?;

        let Some(lower_index) = self.state.stack.absolute(lower_offset) else {
            return Err(self
                .state
                .internal_error("MERGECOUNTER: lower counter vanished"));
        };
        self.state.pop_slots(1)?;
        self.state.stack.remove(lower_index);

        trace!(lower, upper, "merge counters");
        self.state.push_counter(lower + upper)
    }

    /// GENERATEARGTABLE: copy the unconsumed values of the top group into a
    /// new table under keys 1.., mark the group exhausted, and bind the
    /// table to `arg` in the innermost scope
    pub(super) fn exec_generate_arg_table(&mut self) -> LuaResult<()> {
        let (current, total) = self.state.top_counter()?;

        let arg = self.state.pool.create_table();
        for (n, k) in (current..total).enumerate() {
            let value = self.state.value_at(-1 - (total - k) as isize)?;
            arg.borrow_mut().set_int(n as i64 + 1, value);
        }

        if let Some(StackValue::Counter { current, .. }) = self.state.stack.top_mut() {
            *current = total;
        }

        let Some(scope) = self.nest_tables.last().cloned() else {
            return Err(self
                .state
                .internal_error("GENERATEARGTABLE with an empty scope chain"));
        };
        let key = self.state.pool.create_string(ARG_TABLE_NAME);
        // A string key is always valid
        let _ = scope.borrow_mut().assign(key, LuaValue::Table(arg));
        Ok(())
    }
}
