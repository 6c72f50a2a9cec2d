// Lua Virtual Machine
// Executes bootstrap segments on an explicit operand stack, scope chain
// and call stack. Script calls never recurse on the Rust stack: Call and
// Ret swap the active segment instead.
mod call_info;
mod execute;
mod lua_error;
pub mod lua_limits;
mod lua_stack;
mod lua_state;
mod opcode;
mod safe_option;

use std::rc::Rc;

use tracing::debug;

use crate::lib_registry;
use crate::lua_value::{Chunk, LuaValue, TableRef};
pub use call_info::CallInfo;
pub use execute::FrameAction;
pub use lua_error::LuaError;
pub use lua_stack::{LuaStack, StackValue};
pub use lua_state::LuaState;
pub use opcode::{Instruction, InstructionParam, OpCode};
pub use safe_option::SafeOption;

pub type LuaResult<T> = Result<T, LuaError>;

pub struct LuaVM {
    /// Operand stack, value heap and globals (the bound runtime state)
    pub(crate) state: LuaState,

    pub(crate) safe_option: SafeOption,

    /// Saved contexts of active calls, innermost last
    pub(crate) call_stack: Vec<CallInfo>,

    /// Scope chain (`nest_tables`): innermost scope last. Each frame owns
    /// its trailing `callee_tables` entries.
    pub(crate) nest_tables: Vec<TableRef>,

    /// Active segment; `None` once the program has returned
    pub(crate) code: Option<Rc<Chunk>>,

    /// Offset of the executing instruction in `code`
    pub(crate) pc: usize,

    /// One-instruction `Ret` segment, resumed after every native call
    pub(crate) native_func_ret: Rc<Chunk>,
}

impl LuaVM {
    /// Create a VM bound to a fresh runtime state (`Init`)
    pub fn new(safe_option: SafeOption) -> Self {
        let state = LuaState::new(&safe_option);
        Self::with_state(state, safe_option)
    }

    /// Bind a VM to an existing runtime state
    pub fn with_state(state: LuaState, safe_option: SafeOption) -> Self {
        let native_func_ret = Rc::new(Chunk::new(vec![Instruction::simple(OpCode::Ret)]));
        LuaVM {
            state,
            safe_option,
            call_stack: Vec::with_capacity(lua_limits::BASIC_CALL_STACK_SIZE),
            nest_tables: Vec::with_capacity(lua_limits::BASIC_SCOPE_CHAIN_SIZE),
            code: None,
            pc: 0,
            native_func_ret,
        }
    }

    /// Register the base library into the global table
    pub fn open_libs(&mut self) {
        lib_registry::create_standard_registry().load_all(&mut self.state);
    }

    /// Execute `chunk` to completion.
    ///
    /// On error the run is aborted: call stack, scope chain and operand
    /// stack are cleared and the message is available through
    /// [`get_error_message`](Self::get_error_message).
    pub fn run(&mut self, chunk: Rc<Chunk>) -> LuaResult<()> {
        if !self.call_stack.is_empty() {
            return Err(self
                .state
                .internal_error("run called while another run is active"));
        }
        self.state.clear_error();
        debug!(
            source = chunk.source_name.as_deref().unwrap_or("?"),
            instructions = chunk.len(),
            "run"
        );

        self.code = Some(chunk);
        self.pc = 0;
        let result = self.execute_loop();
        if result.is_err() {
            self.abort();
        }
        result
    }

    /// Run `chunk` and collect the value group it leaves on top of the
    /// operand stack (the program's return values). Returns an empty vector
    /// if the program leaves no group.
    pub fn execute(&mut self, chunk: Rc<Chunk>) -> LuaResult<Vec<LuaValue>> {
        self.run(chunk)?;
        if matches!(self.state.stack.top(), Some(StackValue::Counter { .. })) {
            self.state.pop_group()
        } else {
            Ok(Vec::new())
        }
    }

    // Drop everything the failed run left behind.
    fn abort(&mut self) {
        self.call_stack.clear();
        self.nest_tables.clear();
        self.state.stack.clear();
        self.code = None;
        self.pc = 0;
    }

    // ============ Host-facing accessors ============

    pub fn get_error_message(&self) -> &str {
        self.state.get_error_message()
    }

    pub fn state(&self) -> &LuaState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut LuaState {
        &mut self.state
    }

    pub fn set_global(&mut self, name: &str, value: LuaValue) {
        self.state.set_global(name, value);
    }

    pub fn get_global(&mut self, name: &str) -> LuaValue {
        self.state.get_global(name)
    }

    pub fn safe_option(&self) -> &SafeOption {
        &self.safe_option
    }

    /// Number of active call frames, the global frame included
    pub fn call_depth(&self) -> usize {
        self.call_stack.len()
    }

    /// Current length of the scope chain
    pub fn scope_depth(&self) -> usize {
        self.nest_tables.len()
    }

    /// Offset of the instruction executing (or last executed)
    pub fn pc(&self) -> usize {
        self.pc
    }

    // ============ Frame helpers ============

    pub(crate) fn current_frame(&mut self) -> LuaResult<&CallInfo> {
        if self.call_stack.is_empty() {
            return Err(self.state.internal_error("no active call frame"));
        }
        Ok(&self.call_stack[self.call_stack.len() - 1])
    }

    pub(crate) fn current_frame_mut(&mut self) -> LuaResult<&mut CallInfo> {
        if self.call_stack.is_empty() {
            return Err(self.state.internal_error("no active call frame"));
        }
        let last = self.call_stack.len() - 1;
        Ok(&mut self.call_stack[last])
    }

    /// Number of scope-chain entries owned by the current frame, checked
    /// against the chain length
    pub(crate) fn frame_scope_count(&mut self) -> LuaResult<usize> {
        let callee_tables = self.current_frame()?.callee_tables;
        if callee_tables > self.nest_tables.len() {
            let len = self.nest_tables.len();
            return Err(self.state.internal_error(format!(
                "frame owns {callee_tables} scopes but the scope chain holds {len}"
            )));
        }
        Ok(callee_tables)
    }

    /// Innermost scope of the current frame that already binds `key`.
    /// Scopes pushed by other frames are never searched.
    pub(crate) fn find_local_owner(&mut self, key: &LuaValue) -> LuaResult<Option<TableRef>> {
        let callee_tables = self.frame_scope_count()?;
        Ok(self
            .nest_tables
            .iter()
            .rev()
            .take(callee_tables)
            .find(|scope| scope.borrow().have_key(key))
            .cloned())
    }
}

impl Default for LuaVM {
    fn default() -> Self {
        Self::new(SafeOption::default())
    }
}
