// Test module organization
pub mod test_basic;
pub mod test_counters;
pub mod test_scopes;

use std::rc::Rc;

use crate::lua_value::{Chunk, ChunkBuilder, LuaFunction, LuaValue};
use crate::lua_vm::{LuaVM, OpCode, SafeOption};

/// VM with the base library loaded
pub(crate) fn new_vm() -> LuaVM {
    let mut vm = LuaVM::new(SafeOption::default());
    vm.open_libs();
    vm
}

/// Chunk builder for a program run inside the global frame
pub(crate) fn program() -> ChunkBuilder {
    ChunkBuilder::new().source_name("test").op(OpCode::AddGlobalTable)
}

/// `name = <top group>` then drop the group
pub(crate) fn store(builder: ChunkBuilder, name: &str) -> ChunkBuilder {
    builder
        .get_table(name)
        .push_name(name)
        .op(OpCode::Assign)
        .op(OpCode::CleanStack)
}

/// `local name = <top group>` in the innermost scope, then drop the group
pub(crate) fn store_local(builder: ChunkBuilder, name: &str) -> ChunkBuilder {
    builder
        .op(OpCode::GetLocalTable)
        .push_name(name)
        .op(OpCode::Assign)
        .op(OpCode::CleanStack)
}

/// Prototype whose body binds `params` from the argument group, optionally
/// collects the rest into `arg`, then runs `body` (which must end in Ret).
pub(crate) fn function(
    params: &[&str],
    varargs: bool,
    upvalues: &[&str],
    body: impl FnOnce(ChunkBuilder) -> ChunkBuilder,
) -> Rc<LuaFunction> {
    let mut builder = ChunkBuilder::new().op(OpCode::AddLocalTable);
    for param in params {
        builder = builder
            .op(OpCode::GetLocalTable)
            .push_name(*param)
            .op(OpCode::Assign);
    }
    if varargs {
        builder = builder.op(OpCode::GenerateArgTable);
    }
    builder = builder.op(OpCode::CleanStack).op(OpCode::CleanStack);
    let chunk: Rc<Chunk> = body(builder).build_rc();
    Rc::new(LuaFunction::new(chunk, upvalues.iter().copied()))
}

pub(crate) fn num(n: f64) -> LuaValue {
    LuaValue::number(n)
}
