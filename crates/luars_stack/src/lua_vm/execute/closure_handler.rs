// Closure instantiation and upvalue capture
//
// Captured values are copied into the new closure's own upvalue table when
// the closure is created. Later writes to the enclosing variable are not
// visible through the closure, and closures built from the same prototype
// never share their tables.

use tracing::debug;

use crate::lua_value::{LuaValue, TableRef};
use crate::lua_vm::{LuaResult, LuaVM};

impl LuaVM {
    /// GENERATECLOSURE: instantiate `proto` and push it as a single value
    pub(super) fn exec_generate_closure(&mut self, proto: LuaValue) -> LuaResult<()> {
        let LuaValue::Function(proto) = proto else {
            return Err(self.state.internal_error(format!(
                "GENERATECLOSURE expects a function prototype, found {}",
                proto.name()
            )));
        };

        let closure = self.state.pool.create_closure(proto);
        if let Some(upvalues) = closure.upvalue_table() {
            for name in closure.proto().upvalue_names() {
                let owner = self.upvalue_key_owner_table(name)?;
                let value = owner.borrow().get_value(name);
                // Names are strings, always valid keys
                let _ = upvalues.borrow_mut().assign(name.clone(), value);
            }
            debug!(
                function = closure.proto().name().unwrap_or("?"),
                captured = closure.proto().upvalue_names().len(),
                "closure created"
            );
        }

        self.state.push_single(LuaValue::Closure(closure))
    }

    /// Table owning `name` as seen from the current frame.
    ///
    /// The frame's own scopes are searched innermost first. Inside a closure
    /// the name must otherwise be one of its captured upvalues. In the
    /// global frame an unknown name is created as a nil global in the
    /// frame's outermost scope.
    pub(crate) fn upvalue_key_owner_table(&mut self, name: &LuaValue) -> LuaResult<TableRef> {
        if let Some(scope) = self.find_local_owner(name)? {
            return Ok(scope);
        }

        let callee = self.current_frame()?.callee.clone();
        match &callee {
            LuaValue::Closure(closure) => match closure.upvalue_table() {
                Some(upvalues) if upvalues.borrow().have_key(name) => Ok(upvalues.clone()),
                _ => Err(self.state.internal_error(format!(
                    "captured name '{name}' is not visible from the enclosing function"
                ))),
            },
            LuaValue::Nil => {
                let callee_tables = self.frame_scope_count()?;
                if callee_tables == 0 {
                    return Err(self.state.internal_error("global frame owns no scope"));
                }
                let global = self.nest_tables[self.nest_tables.len() - callee_tables].clone();
                let assigned = global.borrow_mut().assign(name.clone(), LuaValue::Nil);
                assigned.map_err(|e| self.state.error(e.to_string()))?;
                Ok(global)
            }
            other => Err(self.state.internal_error(format!(
                "cannot capture '{name}' inside a frame running a {}",
                other.name()
            ))),
        }
    }
}
