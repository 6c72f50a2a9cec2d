// Chunk - one immutable instruction buffer ("bootstrap segment")
// A chunk is the top-level program, one function body, or the synthetic
// single-Ret segment the VM resumes through after a native call.
use std::fmt::Write;
use std::rc::Rc;

use smol_str::SmolStr;

use super::{LuaFunction, LuaValue};
use crate::lua_vm::{Instruction, InstructionParam, OpCode};

#[derive(Default)]
pub struct Chunk {
    pub code: Vec<Instruction>,
    pub source_name: Option<String>,
}

impl Chunk {
    pub fn new(code: Vec<Instruction>) -> Self {
        Self {
            code,
            source_name: None,
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    #[inline(always)]
    pub fn get(&self, pc: usize) -> Option<&Instruction> {
        self.code.get(pc)
    }

    /// Render the chunk as one instruction per line.
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        let source = self.source_name.as_deref().unwrap_or("?");
        let _ = writeln!(out, "chunk <{}> ({} instructions)", source, self.code.len());
        for (pc, instr) in self.code.iter().enumerate() {
            let line = instr.to_string();
            let _ = writeln!(out, "  [{:>4}] {}", pc, line.trim_end());
        }
        out
    }
}

/// Fluent builder for instruction streams.
///
/// ```
/// use luars_stack::{ChunkBuilder, OpCode};
///
/// let chunk = ChunkBuilder::new()
///     .op(OpCode::AddGlobalTable)
///     .push_counter(0)
///     .op(OpCode::Ret)
///     .build();
/// assert_eq!(chunk.len(), 3);
/// ```
#[derive(Default)]
pub struct ChunkBuilder {
    code: Vec<Instruction>,
    source_name: Option<String>,
}

impl ChunkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }

    pub fn instr(mut self, instr: Instruction) -> Self {
        self.code.push(instr);
        self
    }

    /// Operand-less instruction
    pub fn op(self, op: OpCode) -> Self {
        self.instr(Instruction::simple(op))
    }

    pub fn push_name(self, name: impl Into<SmolStr>) -> Self {
        self.instr(Instruction::new(
            OpCode::Push,
            InstructionParam::Name(LuaValue::String(name.into())),
        ))
    }

    pub fn push_value(self, value: impl Into<LuaValue>) -> Self {
        self.instr(Instruction::new(
            OpCode::Push,
            InstructionParam::Value(value.into()),
        ))
    }

    /// `Push` of a value followed by its single-value counter.
    pub fn push_single(self, value: impl Into<LuaValue>) -> Self {
        self.push_value(value).push_counter(1)
    }

    pub fn push_counter(self, total: usize) -> Self {
        self.instr(Instruction::new(
            OpCode::Push,
            InstructionParam::Counter(total),
        ))
    }

    pub fn get_table(self, name: impl Into<SmolStr>) -> Self {
        self.instr(Instruction::new(
            OpCode::GetTable,
            InstructionParam::Name(LuaValue::String(name.into())),
        ))
    }

    pub fn get_table_value(self, counter_index: usize) -> Self {
        self.instr(Instruction::new(
            OpCode::GetTableValue,
            InstructionParam::CounterIndex(counter_index),
        ))
    }

    /// `name` resolved to its value: `GetTable name; Push name; GetTableValue 0`.
    pub fn load_name(self, name: impl Into<SmolStr>) -> Self {
        let name = name.into();
        self.get_table(name.clone()).push_name(name).get_table_value(0)
    }

    pub fn closure(self, proto: Rc<LuaFunction>) -> Self {
        self.instr(Instruction::new(
            OpCode::GenerateClosure,
            InstructionParam::Value(LuaValue::Function(proto)),
        ))
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn build(self) -> Chunk {
        Chunk {
            code: self.code,
            source_name: self.source_name,
        }
    }

    pub fn build_rc(self) -> Rc<Chunk> {
        Rc::new(self.build())
    }
}
