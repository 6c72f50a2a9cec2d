/*----------------------------------------------------------------------
  Instruction format

  Every instruction is an opcode plus one operand ("param A"):

    Name          symbolic key (a string value), used by GetTable/Push
    Value         immediate value, used by Push/GenerateClosure
    Counter       literal group size, used by Push to emit C(n)
    CounterIndex  number of value groups between a table handle and its
                  key, used by GetTableValue

  Instructions are immutable once a Chunk is built.
----------------------------------------------------------------------*/

use std::fmt;

use super::OpCode;
use crate::lua_value::LuaValue;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum InstructionParam {
    #[default]
    None,
    Name(LuaValue),
    Value(LuaValue),
    Counter(usize),
    CounterIndex(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub op: OpCode,
    pub param: InstructionParam,
}

impl Instruction {
    #[inline(always)]
    pub fn new(op: OpCode, param: InstructionParam) -> Self {
        Self { op, param }
    }

    /// Instruction without operand
    #[inline(always)]
    pub fn simple(op: OpCode) -> Self {
        Self {
            op,
            param: InstructionParam::None,
        }
    }

    #[inline(always)]
    pub fn get_opcode(&self) -> OpCode {
        self.op
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<18}", self.op.name())?;
        match &self.param {
            InstructionParam::None => Ok(()),
            InstructionParam::Name(name) => write!(f, "name {name}"),
            InstructionParam::Value(LuaValue::String(s)) => write!(f, "value {s:?}"),
            InstructionParam::Value(v) => write!(f, "value {v}"),
            InstructionParam::Counter(n) => write!(f, "counter {n}"),
            InstructionParam::CounterIndex(n) => write!(f, "depth {n}"),
        }
    }
}
