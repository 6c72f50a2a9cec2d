// Scope entry and exit
use tracing::debug;

use crate::lua_vm::{CallInfo, LuaResult, LuaVM};

impl LuaVM {
    /// ADDLOCALTABLE: open a block scope owned by the current frame
    pub(super) fn exec_add_local_table(&mut self) -> LuaResult<()> {
        let scope = self.state.pool.create_table();
        self.current_frame_mut()?.callee_tables += 1;
        self.nest_tables.push(scope);
        debug!(scopes = self.nest_tables.len(), "enter block scope");
        Ok(())
    }

    /// DELLOCALTABLE: close the innermost block scope
    pub(super) fn exec_del_local_table(&mut self) -> LuaResult<()> {
        if self.frame_scope_count()? == 0 {
            return Err(self
                .state
                .internal_error("DELLOCALTABLE: current frame owns no scope"));
        }
        self.current_frame_mut()?.callee_tables -= 1;
        self.nest_tables.pop();
        debug!(scopes = self.nest_tables.len(), "leave block scope");
        Ok(())
    }

    /// ADDGLOBALTABLE: enter the implicit main function
    pub(super) fn exec_add_global_table(&mut self) -> LuaResult<()> {
        if self.call_stack.len() >= self.safe_option.max_call_depth {
            return Err(self.state.stack_overflow());
        }
        self.nest_tables.push(self.state.global().clone());
        self.call_stack.push(CallInfo::new_global());
        debug!(depth = self.call_stack.len(), "enter global frame");
        Ok(())
    }

    /// DELGLOBALTABLE: leave the implicit main function
    pub(super) fn exec_del_global_table(&mut self) -> LuaResult<()> {
        match self.call_stack.last() {
            Some(frame) if frame.is_global() => {}
            _ => {
                return Err(self
                    .state
                    .internal_error("DELGLOBALTABLE outside the global frame"));
            }
        }
        let callee_tables = self.frame_scope_count()?;
        self.call_stack.pop();
        let remaining = self.nest_tables.len() - callee_tables;
        self.nest_tables.truncate(remaining);
        debug!(depth = self.call_stack.len(), "leave global frame");
        Ok(())
    }
}
