// Tests for the counter / multi-value protocol
use proptest::prelude::*;

use super::{new_vm, num, program, store_local};
use crate::lua_value::{ChunkBuilder, LuaValue};
use crate::lua_vm::{OpCode, StackValue};

fn push_group(mut builder: ChunkBuilder, values: &[f64]) -> ChunkBuilder {
    for v in values {
        builder = builder.push_value(*v);
    }
    builder.push_counter(values.len())
}

#[test]
fn test_clean_stack_drops_whole_group() {
    let mut vm = new_vm();
    let chunk = push_group(ChunkBuilder::new(), &[1.0])
        .push_value(2.0)
        .push_value(3.0)
        .push_counter(2)
        .op(OpCode::CleanStack)
        .build_rc();
    assert_eq!(vm.execute(chunk).unwrap(), vec![num(1.0)]);
    assert!(vm.state().stack().is_empty());
}

#[test]
fn test_reset_counter_pads_empty_group_with_nil() {
    let mut vm = new_vm();
    let chunk = ChunkBuilder::new()
        .push_counter(0)
        .op(OpCode::ResetCounter)
        .build_rc();
    assert_eq!(vm.execute(chunk).unwrap(), vec![LuaValue::Nil]);
}

#[test]
fn test_reset_counter_keeps_first_value() {
    let mut vm = new_vm();
    let chunk = push_group(ChunkBuilder::new(), &[1.0, 2.0, 3.0])
        .op(OpCode::ResetCounter)
        .build_rc();
    assert_eq!(vm.execute(chunk).unwrap(), vec![num(1.0)]);
    assert!(vm.state().stack().is_empty());
}

#[test]
fn test_duplicate_counter_leaves_original_below() {
    let mut vm = new_vm();
    let chunk = push_group(ChunkBuilder::new(), &[1.0, 2.0])
        .op(OpCode::DuplicateCounter)
        .build_rc();
    assert_eq!(vm.execute(chunk).unwrap(), vec![num(1.0), num(2.0)]);

    let slots = vm.state().stack().slots();
    assert_eq!(slots.len(), 3);
    assert_eq!(slots[0], StackValue::Value(num(1.0)));
    assert_eq!(slots[2].as_counter(), Some((0, 2)));
}

#[test]
fn test_extra_targets_receive_nil() {
    // local a, b, c = 1, 2
    let mut vm = new_vm();
    let mut builder = push_group(program(), &[1.0, 2.0]);
    for name in ["a", "b", "c"] {
        builder = builder
            .op(OpCode::GetLocalTable)
            .push_name(name)
            .op(OpCode::Assign);
    }
    let chunk = builder
        .op(OpCode::CleanStack)
        .load_name("c")
        .load_name("b")
        .op(OpCode::MergeCounter)
        .op(OpCode::Ret)
        .build_rc();
    assert_eq!(vm.execute(chunk).unwrap(), vec![LuaValue::Nil, num(2.0)]);
}

#[test]
fn test_local_round_trip_leaves_no_state() {
    // local x = 1 ; return x
    let mut vm = new_vm();
    let chunk = store_local(push_group(program(), &[1.0]), "x")
        .load_name("x")
        .op(OpCode::Ret)
        .build_rc();
    assert_eq!(vm.execute(chunk).unwrap(), vec![num(1.0)]);
    assert_eq!(vm.scope_depth(), 0);
    assert_eq!(vm.call_depth(), 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_merge_counter_concatenates_groups(
        lower in prop::collection::vec(-1e6f64..1e6, 0..8),
        upper in prop::collection::vec(-1e6f64..1e6, 0..8),
    ) {
        let mut vm = new_vm();
        let builder = push_group(ChunkBuilder::new(), &lower);
        let chunk = push_group(builder, &upper)
            .op(OpCode::MergeCounter)
            .build_rc();

        let expected: Vec<LuaValue> = lower.iter().chain(upper.iter()).map(|v| num(*v)).collect();
        prop_assert_eq!(vm.execute(chunk).unwrap(), expected);
        prop_assert!(vm.state().stack().is_empty());
    }

    #[test]
    fn prop_assignment_takes_values_in_order(
        values in prop::collection::vec(-1e6f64..1e6, 0..6),
        targets in 1usize..6,
    ) {
        let mut vm = new_vm();
        let mut builder = push_group(program(), &values);
        for i in 0..targets {
            builder = builder
                .op(OpCode::GetLocalTable)
                .push_name(format!("v{i}"))
                .op(OpCode::Assign);
        }
        builder = builder.op(OpCode::CleanStack).load_name("v0");
        for i in 1..targets {
            builder = builder.load_name(format!("v{i}")).op(OpCode::MergeCounter);
        }
        let chunk = builder.op(OpCode::Ret).build_rc();

        let expected: Vec<LuaValue> = (0..targets)
            .map(|i| values.get(i).map_or(LuaValue::Nil, |v| num(*v)))
            .collect();
        prop_assert_eq!(vm.execute(chunk).unwrap(), expected);
        prop_assert!(vm.state().stack().is_empty());
    }
}
