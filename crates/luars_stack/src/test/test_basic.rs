// End-to-end programs and the base library
use super::{new_vm, num, program, store_local};
use crate::lua_value::LuaValue;
use crate::lua_vm::OpCode;

#[test]
fn test_table_field_round_trip() {
    // local t = {} ; t.x = 5 ; return t.x
    let mut vm = new_vm();
    let chunk = program()
        .op(OpCode::AddLocalTable)
        .load_name("newtable")
        .push_counter(0)
        .op(OpCode::Call);
    let chunk = store_local(chunk, "t")
        .push_single(5.0)
        .load_name("t")
        .push_value("x")
        .op(OpCode::Assign)
        .op(OpCode::CleanStack)
        .load_name("t")
        .push_value("x")
        .get_table_value(0)
        .op(OpCode::Ret)
        .build_rc();

    assert_eq!(vm.execute(chunk).unwrap(), vec![num(5.0)]);
    assert_eq!(vm.call_depth(), 0);
    assert_eq!(vm.scope_depth(), 0);
    assert!(vm.state().stack().is_empty());
    assert!(vm.get_global("t").is_nil());
}

#[test]
fn test_index_with_key_groups_between() {
    // t[k] where the table handle sits below an extra value group
    let mut vm = new_vm();
    let chunk = program()
        .load_name("newtable")
        .push_counter(0)
        .op(OpCode::Call);
    let chunk = store_local(chunk, "t")
        .push_single("hit")
        .load_name("t")
        .push_value(1.0)
        .op(OpCode::Assign)
        .op(OpCode::CleanStack)
        .load_name("t")
        .push_single(0.0)
        .push_value(1.0)
        .get_table_value(1)
        .op(OpCode::CleanStack)
        .op(OpCode::Ret)
        .build_rc();

    assert_eq!(vm.execute(chunk).unwrap(), vec![LuaValue::string("hit")]);
}

#[test]
fn test_type_and_tostring() {
    let mut vm = new_vm();
    let chunk = program()
        .load_name("type")
        .push_single(1.0)
        .op(OpCode::Call)
        .load_name("tostring")
        .push_single(2.5)
        .op(OpCode::Call)
        .op(OpCode::MergeCounter)
        .load_name("type")
        .load_name("print")
        .op(OpCode::Call)
        .op(OpCode::MergeCounter)
        .op(OpCode::Ret)
        .build_rc();

    assert_eq!(
        vm.execute(chunk).unwrap(),
        vec![
            LuaValue::string("number"),
            LuaValue::string("2.5"),
            LuaValue::string("function"),
        ]
    );
}

#[test]
fn test_print_returns_no_values() {
    let mut vm = new_vm();
    let chunk = program()
        .load_name("print")
        .push_value("hello")
        .push_value(1.0)
        .push_counter(2)
        .op(OpCode::Call)
        .op(OpCode::Ret)
        .build_rc();

    assert_eq!(vm.execute(chunk).unwrap(), Vec::<LuaValue>::new());
    assert!(vm.state().stack().is_empty());
}

#[test]
fn test_disassemble_lists_every_instruction() {
    let chunk = program().load_name("x").op(OpCode::Ret).build();
    let text = chunk.disassemble();
    assert!(text.starts_with("chunk <test> (5 instructions)"));
    assert!(text.contains("ADDGLOBALTABLE"));
    assert!(text.contains("GETTABLEVALUE"));
    assert_eq!(text.lines().count(), 6);
}
