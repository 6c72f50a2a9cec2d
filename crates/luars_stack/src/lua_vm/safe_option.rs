use crate::lua_vm::lua_limits::{LUAI_MAXSTACK, MAX_CALL_DEPTH};

/// Resource limits for one VM instance
#[derive(Debug, Clone)]
pub struct SafeOption {
    /// Maximum number of operand stack slots
    pub max_stack_size: usize,
    /// Maximum number of simultaneously active call frames
    pub max_call_depth: usize,
}

impl Default for SafeOption {
    fn default() -> Self {
        Self {
            max_stack_size: LUAI_MAXSTACK,
            max_call_depth: MAX_CALL_DEPTH,
        }
    }
}

impl SafeOption {
    pub fn with_max_stack_size(mut self, max_stack_size: usize) -> Self {
        self.max_stack_size = max_stack_size;
        self
    }

    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }
}
