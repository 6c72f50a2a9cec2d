// Basic library (_G global functions)
// Implements: print, type, tostring, rawlen, newtable
//
// Every function follows the native call convention: it consumes the
// call group with `take_args` and leaves exactly one result group.

use std::io::Write;

use crate::lib_registry::LibraryModule;
use crate::lua_value::{LuaValue, format_number};
use crate::lua_vm::{LuaResult, LuaState};

pub fn create_basic_lib() -> LibraryModule {
    LibraryModule::new("_G")
        .with_function("print", lua_print)
        .with_function("type", lua_type)
        .with_function("tostring", lua_tostring)
        .with_function("rawlen", lua_rawlen)
        .with_function("newtable", lua_newtable)
}

/// Text `print` writes for `args`: `tostring` of each, tab separated
pub fn print_line(args: &[LuaValue]) -> String {
    let mut line = String::new();
    for (i, value) in args.iter().enumerate() {
        if i > 0 {
            line.push('\t');
        }
        write_value(value, &mut line);
    }
    line
}

fn write_value(value: &LuaValue, buf: &mut String) {
    match value {
        LuaValue::Number(n) => format_number(*n, buf),
        LuaValue::String(s) => buf.push_str(s),
        other => buf.push_str(&other.to_string()),
    }
}

/// print(...) - Print values to stdout
fn lua_print(state: &mut LuaState) -> LuaResult<()> {
    let args = state.take_args()?;
    let line = print_line(&args);

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = writeln!(stdout, "{line}") {
        return Err(state.error(format!("print: {e}")));
    }
    state.push_results(Vec::new())
}

/// type(v) - Return the type of a value as a string
fn lua_type(state: &mut LuaState) -> LuaResult<()> {
    let args = state.take_args()?;
    let Some(value) = args.first() else {
        return Err(state.error("bad argument #1 to 'type' (value expected)"));
    };
    let name = state.pool_mut().create_string(value.type_name());
    state.push_results(vec![name])
}

/// tostring(v) - Convert a value to its string form
fn lua_tostring(state: &mut LuaState) -> LuaResult<()> {
    let args = state.take_args()?;
    let Some(value) = args.first() else {
        return Err(state.error("bad argument #1 to 'tostring' (value expected)"));
    };
    let mut text = String::new();
    write_value(value, &mut text);
    state.push_results(vec![LuaValue::string(text)])
}

/// rawlen(v) - Length of a table (its border) or a string, in bytes
fn lua_rawlen(state: &mut LuaState) -> LuaResult<()> {
    let args = state.take_args()?;
    let len = match args.first() {
        Some(LuaValue::Table(table)) => table.borrow().border() as f64,
        Some(LuaValue::String(s)) => s.len() as f64,
        _ => {
            return Err(state.error("table or string expected"));
        }
    };
    state.push_results(vec![LuaValue::number(len)])
}

/// newtable() - A fresh empty table, the runtime form of `{}`
fn lua_newtable(state: &mut LuaState) -> LuaResult<()> {
    state.take_args()?;
    let table = state.pool_mut().create_table();
    state.push_results(vec![LuaValue::Table(table)])
}
