// Lua stack VM
// Executes compiled bootstrap segments on an operand stack with
// counter-delimited value groups, a scope chain of tables and an explicit
// call stack.

#[cfg(test)]
mod test;

pub mod lib_registry;
pub mod lua_value;
pub mod lua_vm;
pub mod object_pool;
pub mod stdlib;

pub use lib_registry::LibraryRegistry;
pub use lua_value::{
    CFunction, Chunk, ChunkBuilder, LuaClosure, LuaFunction, LuaTable, LuaValue, TableRef,
};
pub use lua_vm::{
    Instruction, InstructionParam, LuaError, LuaResult, LuaState, LuaVM, OpCode, SafeOption,
    StackValue,
};
pub use object_pool::ObjectPool;
