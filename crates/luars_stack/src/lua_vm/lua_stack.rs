// Operand stack - value slots interleaved with counter slots
//
// A counter slot C(total) says that the `total` slots directly beneath it
// form one logical multi-value group (call arguments, return values, the
// right-hand side of an assignment). `current` records how many of those
// values a sequential consumer has already taken.
//
// Layout example for `f(a, g())` just before Call:
//
//     [ f, C(1), a, g1, g2, C(3) ]
//                              ^ top
//
// Accessors here are raw and return Option; LuaState turns a miss into an
// internal error with a message.

use crate::lua_value::LuaValue;
use crate::lua_vm::lua_limits::BASIC_STACK_SIZE;

#[derive(Debug, Clone, PartialEq)]
pub enum StackValue {
    Value(LuaValue),
    Counter { current: usize, total: usize },
}

impl StackValue {
    #[inline(always)]
    pub fn counter(total: usize) -> Self {
        StackValue::Counter { current: 0, total }
    }

    pub fn as_value(&self) -> Option<&LuaValue> {
        match self {
            StackValue::Value(v) => Some(v),
            StackValue::Counter { .. } => None,
        }
    }

    /// `(current, total)` of a counter slot
    pub fn as_counter(&self) -> Option<(usize, usize)> {
        match self {
            StackValue::Counter { current, total } => Some((*current, *total)),
            StackValue::Value(_) => None,
        }
    }

    #[inline(always)]
    pub fn is_counter(&self) -> bool {
        matches!(self, StackValue::Counter { .. })
    }
}

pub struct LuaStack {
    slots: Vec<StackValue>,
    max_size: usize,
}

impl LuaStack {
    pub fn new(max_size: usize) -> Self {
        Self {
            slots: Vec::with_capacity(BASIC_STACK_SIZE.min(max_size)),
            max_size,
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Push a slot. Returns false (and leaves the stack untouched) when the
    /// stack is already at its maximum size.
    #[must_use]
    pub fn push(&mut self, slot: StackValue) -> bool {
        if self.slots.len() >= self.max_size {
            return false;
        }
        self.slots.push(slot);
        true
    }

    pub fn pop(&mut self) -> Option<StackValue> {
        self.slots.pop()
    }

    /// Drop the top `n` slots. Returns false if fewer than `n` exist.
    pub fn pop_n(&mut self, n: usize) -> bool {
        match self.slots.len().checked_sub(n) {
            Some(new_len) => {
                self.slots.truncate(new_len);
                true
            }
            None => false,
        }
    }

    pub fn truncate(&mut self, len: usize) {
        self.slots.truncate(len);
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    #[inline(always)]
    pub fn top(&self) -> Option<&StackValue> {
        self.slots.last()
    }

    #[inline(always)]
    pub fn top_mut(&mut self) -> Option<&mut StackValue> {
        self.slots.last_mut()
    }

    /// Absolute index of a top-relative offset (-1 is the top slot).
    #[inline(always)]
    pub fn absolute(&self, offset: isize) -> Option<usize> {
        if offset >= 0 {
            return None;
        }
        self.slots.len().checked_sub(offset.unsigned_abs())
    }

    pub fn get(&self, offset: isize) -> Option<&StackValue> {
        self.absolute(offset).and_then(|i| self.slots.get(i))
    }

    pub fn get_mut(&mut self, offset: isize) -> Option<&mut StackValue> {
        let index = self.absolute(offset)?;
        self.slots.get_mut(index)
    }

    /// Remove the slot at an absolute index, shifting everything above it down.
    pub fn remove(&mut self, index: usize) -> Option<StackValue> {
        (index < self.slots.len()).then(|| self.slots.remove(index))
    }

    /// Clone of the slots in `start..start + len` (absolute indices).
    pub fn copy_range(&self, start: usize, len: usize) -> Option<Vec<StackValue>> {
        self.slots.get(start..start + len).map(|s| s.to_vec())
    }

    /// Read-only view of all slots, bottom first.
    pub fn slots(&self) -> &[StackValue] {
        &self.slots
    }
}
