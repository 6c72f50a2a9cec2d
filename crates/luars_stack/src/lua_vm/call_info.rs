// CallInfo - saved execution context of one active call
// Pushed by Call (or AddGlobalTable), popped by Ret (or DelGlobalTable)

use std::rc::Rc;

use crate::lua_value::{Chunk, LuaValue};

#[derive(Clone)]
pub struct CallInfo {
    /// Segment to resume on return; `None` ends the run (global frame)
    pub caller_chunk: Option<Rc<Chunk>>,

    /// Offset of the instruction that created this frame.
    /// Execution resumes one past it.
    pub caller_pc: usize,

    /// The function being executed, `Nil` for the synthetic global frame
    pub callee: LuaValue,

    /// Number of trailing scope-chain entries pushed by this frame
    pub callee_tables: usize,
}

impl CallInfo {
    /// Frame for a script or native call
    pub fn new_call(caller_chunk: Rc<Chunk>, caller_pc: usize, callee: LuaValue) -> Self {
        Self {
            caller_chunk: Some(caller_chunk),
            caller_pc,
            callee,
            callee_tables: 0,
        }
    }

    /// Frame standing for the implicit main function; owns the global table
    pub fn new_global() -> Self {
        Self {
            caller_chunk: None,
            caller_pc: 0,
            callee: LuaValue::Nil,
            callee_tables: 1,
        }
    }

    #[inline(always)]
    pub fn is_global(&self) -> bool {
        self.callee.is_nil()
    }
}
