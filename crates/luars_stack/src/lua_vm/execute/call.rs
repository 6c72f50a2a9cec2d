/// Function call and return
///
/// Neither CALL nor RET recurses on the Rust stack:
/// - CALL pushes a `CallInfo` recording where to resume, activates the
///   callee's segment at offset 0 and returns `FrameAction::Call`
/// - RET pops the frame, drops the scopes it pushed and restores the
///   caller's segment, returning `FrameAction::Return`
///
/// A native callee runs to completion inside CALL; the VM then activates
/// the one-instruction `Ret` segment so the return path is shared.
use tracing::debug;

use crate::lua_value::LuaValue;
use crate::lua_vm::{CallInfo, FrameAction, LuaResult, LuaVM};

impl LuaVM {
    /// CALL: `[callee, C(1), args.., C(n)]`
    pub(super) fn exec_call(&mut self) -> LuaResult<FrameAction> {
        let (_, nargs) = self.state.top_counter()?;
        let callee_counter = -2 - nargs as isize;
        let (_, callee_total) = self.state.counter_at(callee_counter)?;
        if callee_total != 1 {
            return Err(self.state.internal_error(format!(
                "CALL: callee counter must cover exactly one value, found {callee_total}"
            )));
        }
        let callee = self.state.value_at(callee_counter - 1)?;

        if self.call_stack.len() >= self.safe_option.max_call_depth {
            return Err(self.state.stack_overflow());
        }

        let Some(caller_chunk) = self.code.clone() else {
            return Err(self.state.internal_error("CALL without an active segment"));
        };

        match callee {
            LuaValue::Closure(closure) => {
                debug!(
                    function = closure.proto().name().unwrap_or("?"),
                    nargs,
                    depth = self.call_stack.len() + 1,
                    "call"
                );
                self.code = Some(closure.chunk().clone());
                self.call_stack.push(CallInfo::new_call(
                    caller_chunk,
                    self.pc,
                    LuaValue::Closure(closure),
                ));
                self.pc = 0;
                Ok(FrameAction::Call)
            }
            LuaValue::CFunction(f) => {
                debug!(nargs, depth = self.call_stack.len() + 1, "native call");
                self.call_stack.push(CallInfo::new_call(
                    caller_chunk,
                    self.pc,
                    LuaValue::CFunction(f),
                ));
                f(&mut self.state)?;
                self.code = Some(self.native_func_ret.clone());
                self.pc = 0;
                Ok(FrameAction::Call)
            }
            other => Err(self
                .state
                .error(format!("attempt to call {}", other.name()))),
        }
    }

    /// RET: pop the current frame and resume its caller.
    /// Results stay on the operand stack for the caller to consume.
    pub(super) fn exec_return(&mut self) -> LuaResult<FrameAction> {
        let callee_tables = self.frame_scope_count()?;
        let Some(frame) = self.call_stack.pop() else {
            return Err(self.state.internal_error("RET without an active call frame"));
        };

        let remaining = self.nest_tables.len() - callee_tables;
        self.nest_tables.truncate(remaining);
        debug!(
            depth = self.call_stack.len(),
            scopes = remaining,
            "return"
        );

        self.code = frame.caller_chunk;
        self.pc = frame.caller_pc;
        Ok(FrameAction::Return)
    }
}
