// Native libraries registered by `LuaVM::open_libs`

pub mod basic;
