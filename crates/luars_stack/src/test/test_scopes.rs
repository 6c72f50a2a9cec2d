// Scope chain: block scopes, frame isolation and global fallback
use super::{function, new_vm, num, program, store, store_local};
use crate::lua_value::LuaValue;
use crate::lua_vm::{LuaError, OpCode};

#[test]
fn test_block_local_disappears_after_scope() {
    // do local z = 1 end ; return z
    let mut vm = new_vm();
    let chunk = program().op(OpCode::AddLocalTable).push_single(1.0);
    let chunk = store_local(chunk, "z")
        .op(OpCode::DelLocalTable)
        .load_name("z")
        .op(OpCode::Ret)
        .build_rc();

    assert_eq!(vm.execute(chunk).unwrap(), vec![LuaValue::Nil]);
    assert!(vm.get_global("z").is_nil());
}

#[test]
fn test_inner_local_shadows_outer() {
    // local v = 1 ; do local v = 2 ; r1 = v end ; return r1, v
    let mut vm = new_vm();
    let chunk = program().op(OpCode::AddLocalTable).push_single(1.0);
    let chunk = store_local(chunk, "v")
        .op(OpCode::AddLocalTable)
        .push_single(2.0);
    let chunk = store_local(chunk, "v").load_name("v");
    let chunk = store(chunk, "r1")
        .op(OpCode::DelLocalTable)
        .load_name("r1")
        .load_name("v")
        .op(OpCode::MergeCounter)
        .op(OpCode::Ret)
        .build_rc();

    assert_eq!(vm.execute(chunk).unwrap(), vec![num(2.0), num(1.0)]);
    assert_eq!(vm.get_global("r1"), num(2.0));
}

#[test]
fn test_assignment_updates_owning_scope() {
    // local v = 1 ; do v = 5 end ; return v
    let mut vm = new_vm();
    let chunk = program().op(OpCode::AddLocalTable).push_single(1.0);
    let chunk = store_local(chunk, "v")
        .op(OpCode::AddLocalTable)
        .push_single(5.0);
    let chunk = store(chunk, "v")
        .op(OpCode::DelLocalTable)
        .load_name("v")
        .op(OpCode::Ret)
        .build_rc();

    assert_eq!(vm.execute(chunk).unwrap(), vec![num(5.0)]);
    assert!(vm.get_global("v").is_nil());
}

#[test]
fn test_callee_cannot_see_caller_locals() {
    // local secret = 1 ; peek() reads `secret` without capturing it
    let mut vm = new_vm();
    let peek = function(&[], false, &[], |b| b.load_name("secret").op(OpCode::Ret));
    let chunk = program().op(OpCode::AddLocalTable).push_single(1.0);
    let chunk = store_local(chunk, "secret");
    let chunk = store(chunk.closure(peek), "peek")
        .load_name("peek")
        .push_counter(0)
        .op(OpCode::Call)
        .op(OpCode::Ret)
        .build_rc();

    assert_eq!(vm.execute(chunk), Err(LuaError::InternalError));
    assert!(vm.get_error_message().contains("secret"));
}

#[test]
fn test_callee_reads_captured_global() {
    let mut vm = new_vm();
    let peek = function(&[], false, &["shared"], |b| {
        b.load_name("shared").op(OpCode::Ret)
    });
    let chunk = store(program().push_single(8.0), "shared");
    let chunk = store(chunk.closure(peek), "peek")
        .load_name("peek")
        .push_counter(0)
        .op(OpCode::Call)
        .op(OpCode::Ret)
        .build_rc();

    assert_eq!(vm.execute(chunk).unwrap(), vec![num(8.0)]);
}

#[test]
fn test_globals_survive_between_runs() {
    let mut vm = new_vm();
    let first = store(program().push_single(3.0), "kept")
        .op(OpCode::DelGlobalTable)
        .build_rc();
    vm.run(first).unwrap();

    let second = program().load_name("kept").op(OpCode::Ret).build_rc();
    assert_eq!(vm.execute(second).unwrap(), vec![num(3.0)]);
}
