// Runtime state the VM is bound to: operand stack, value heap, globals
// Native functions receive `&mut LuaState` and exchange arguments and
// results through the stack using the counter convention.

use tracing::warn;

use crate::lua_value::{LuaValue, TableRef};
use crate::lua_vm::lua_stack::{LuaStack, StackValue};
use crate::lua_vm::safe_option::SafeOption;
use crate::lua_vm::{LuaError, LuaResult};
use crate::object_pool::ObjectPool;

pub struct LuaState {
    /// Operand stack, shared by every frame of the run
    pub(crate) stack: LuaStack,

    /// Value heap facade
    pub(crate) pool: ObjectPool,

    /// The single global table, pushed as outermost scope by AddGlobalTable
    global: TableRef,

    /// Error message storage (lightweight error handling)
    pub(crate) error_msg: String,
}

impl LuaState {
    pub fn new(safe_option: &SafeOption) -> Self {
        let mut pool = ObjectPool::new();
        let global = pool.create_table();
        Self {
            stack: LuaStack::new(safe_option.max_stack_size),
            pool,
            global,
            error_msg: String::new(),
        }
    }

    // ============ Accessors ============

    #[inline(always)]
    pub fn stack(&self) -> &LuaStack {
        &self.stack
    }

    #[inline(always)]
    pub fn stack_mut(&mut self) -> &mut LuaStack {
        &mut self.stack
    }

    #[inline(always)]
    pub fn pool(&self) -> &ObjectPool {
        &self.pool
    }

    #[inline(always)]
    pub fn pool_mut(&mut self) -> &mut ObjectPool {
        &mut self.pool
    }

    pub fn global(&self) -> &TableRef {
        &self.global
    }

    pub fn set_global(&mut self, name: &str, value: LuaValue) {
        let key = self.pool.create_string(name);
        // A string key is always valid
        let _ = self.global.borrow_mut().assign(key, value);
    }

    pub fn get_global(&mut self, name: &str) -> LuaValue {
        let key = self.pool.create_string(name);
        self.global.borrow().get_value(&key)
    }

    // ============ Errors ============

    /// Record a user-visible runtime error
    #[cold]
    #[inline(never)]
    pub fn error(&mut self, msg: impl Into<String>) -> LuaError {
        self.error_msg = msg.into();
        LuaError::RuntimeError
    }

    /// Record a violated stack-shape or instruction-stream expectation
    #[cold]
    #[inline(never)]
    pub fn internal_error(&mut self, msg: impl Into<String>) -> LuaError {
        self.error_msg = msg.into();
        warn!(stack_len = self.stack.len(), "internal error: {}", self.error_msg);
        LuaError::InternalError
    }

    #[cold]
    #[inline(never)]
    pub fn stack_overflow(&mut self) -> LuaError {
        self.error_msg = "stack overflow".to_string();
        LuaError::StackOverflow
    }

    pub fn get_error_message(&self) -> &str {
        &self.error_msg
    }

    pub fn clear_error(&mut self) {
        self.error_msg.clear();
    }

    // ============ Checked stack access ============

    pub fn push_slot(&mut self, slot: StackValue) -> LuaResult<()> {
        if self.stack.push(slot) {
            Ok(())
        } else {
            Err(self.stack_overflow())
        }
    }

    #[inline]
    pub fn push_value(&mut self, value: LuaValue) -> LuaResult<()> {
        self.push_slot(StackValue::Value(value))
    }

    /// Push a fresh counter `C(total)` with nothing consumed
    #[inline]
    pub fn push_counter(&mut self, total: usize) -> LuaResult<()> {
        self.push_slot(StackValue::counter(total))
    }

    /// Push one value and its single-value counter
    pub fn push_single(&mut self, value: LuaValue) -> LuaResult<()> {
        self.push_value(value)?;
        self.push_counter(1)
    }

    pub fn pop_slots(&mut self, n: usize) -> LuaResult<()> {
        if self.stack.pop_n(n) {
            Ok(())
        } else {
            let len = self.stack.len();
            Err(self.internal_error(format!(
                "stack underflow: cannot pop {n} slots from a stack of {len}"
            )))
        }
    }

    /// `(current, total)` of the counter at `offset` (-1 = top)
    pub fn counter_at(&mut self, offset: isize) -> LuaResult<(usize, usize)> {
        match self.stack.get(offset).map(StackValue::as_counter) {
            Some(Some(counter)) => Ok(counter),
            Some(None) => Err(self.internal_error(format!(
                "expected a counter slot at stack offset {offset}, found a value"
            ))),
            None => Err(self.internal_error(format!(
                "expected a counter slot at stack offset {offset}, stack has {} slots",
                self.stack.len()
            ))),
        }
    }

    #[inline]
    pub fn top_counter(&mut self) -> LuaResult<(usize, usize)> {
        self.counter_at(-1)
    }

    /// Value at `offset` (-1 = top)
    pub fn value_at(&mut self, offset: isize) -> LuaResult<LuaValue> {
        match self.stack.get(offset).map(|slot| slot.as_value().cloned()) {
            Some(Some(value)) => Ok(value),
            Some(None) => Err(self.internal_error(format!(
                "expected a value slot at stack offset {offset}, found a counter"
            ))),
            None => Err(self.internal_error(format!(
                "expected a value slot at stack offset {offset}, stack has {} slots",
                self.stack.len()
            ))),
        }
    }

    pub fn pop_value(&mut self) -> LuaResult<LuaValue> {
        let value = self.value_at(-1)?;
        self.stack.pop();
        Ok(value)
    }

    pub fn pop_counter(&mut self) -> LuaResult<(usize, usize)> {
        let counter = self.top_counter()?;
        self.stack.pop();
        Ok(counter)
    }

    /// Pop the top counter and the whole group beneath it, returning the
    /// group's values bottom first.
    pub fn pop_group(&mut self) -> LuaResult<Vec<LuaValue>> {
        let (_, total) = self.top_counter()?;
        let mut values = Vec::with_capacity(total);
        for i in 0..total {
            values.push(self.value_at(-1 - total as isize + i as isize)?);
        }
        self.pop_slots(total + 1)?;
        Ok(values)
    }

    // ============ Native call convention ============

    /// Consume the call group `[callee, C(1), args..., C(n)]` and return the
    /// arguments in call order. For use inside native functions.
    pub fn take_args(&mut self) -> LuaResult<Vec<LuaValue>> {
        let args = self.pop_group()?;
        let (_, total) = self.top_counter()?;
        if total != 1 {
            return Err(self.internal_error(format!(
                "callee counter must cover exactly one value, found {total}"
            )));
        }
        self.pop_slots(2)?;
        Ok(args)
    }

    /// Push `values` as one group with its counter. For use inside native
    /// functions, after [`take_args`](Self::take_args).
    pub fn push_results(&mut self, values: Vec<LuaValue>) -> LuaResult<()> {
        let total = values.len();
        for value in values {
            self.push_value(value)?;
        }
        self.push_counter(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> LuaState {
        LuaState::new(&SafeOption::default())
    }

    #[test]
    fn pop_group_returns_values_in_push_order() {
        let mut state = state();
        state.push_value(LuaValue::number(1.0)).unwrap();
        state.push_value(LuaValue::number(2.0)).unwrap();
        state.push_counter(2).unwrap();
        let values = state.pop_group().unwrap();
        assert_eq!(values, vec![LuaValue::number(1.0), LuaValue::number(2.0)]);
        assert!(state.stack().is_empty());
    }

    #[test]
    fn take_args_consumes_callee_group() {
        let mut state = state();
        state.push_single(LuaValue::string("f")).unwrap();
        state.push_value(LuaValue::number(7.0)).unwrap();
        state.push_counter(1).unwrap();
        let args = state.take_args().unwrap();
        assert_eq!(args, vec![LuaValue::number(7.0)]);
        assert!(state.stack().is_empty());
    }

    #[test]
    fn counter_at_value_slot_is_internal_error() {
        let mut state = state();
        state.push_value(LuaValue::Nil).unwrap();
        assert_eq!(state.top_counter(), Err(LuaError::InternalError));
        assert!(state.get_error_message().contains("expected a counter slot"));
    }

    #[test]
    fn push_past_limit_overflows() {
        let mut state = LuaState::new(&SafeOption::default().with_max_stack_size(2));
        state.push_counter(0).unwrap();
        state.push_counter(0).unwrap();
        assert_eq!(state.push_counter(0), Err(LuaError::StackOverflow));
        assert_eq!(state.get_error_message(), "stack overflow");
    }

    #[test]
    fn globals_round_trip() {
        let mut state = state();
        state.set_global("answer", LuaValue::number(42.0));
        assert_eq!(state.get_global("answer"), LuaValue::number(42.0));
        assert!(state.get_global("missing").is_nil());
    }
}
