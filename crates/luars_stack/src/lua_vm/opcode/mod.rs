mod instruction;

pub use instruction::{Instruction, InstructionParam};

/// Complete opcode set of the stack machine.
///
/// Stack notation in the comments: `C(n)` is a counter slot covering the
/// `n` value slots directly beneath it, the rightmost item is the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    // Table access
    Assign = 0,    // [vals.., C(n), table, C(1), key] -> [vals.., C(n)]; table[key] := next val or nil
    GetLocalTable, // push innermost scope, C(1)
    GetTable,      // push scope owning Name (or upvalue table), C(1)
    GetTableValue, // table slot := table[key]; pop key

    // Counter / multi-value protocol
    Push,             // push Name | Value | C(n)
    CleanStack,       // pop C(n) and its n values
    MergeCounter,     // [a.., C(m), b.., C(n)] -> [a.., b.., C(m+n)]
    ResetCounter,     // truncate / pad the top group to exactly one value
    DuplicateCounter, // copy the top group and its counter
    GenerateArgTable, // scope["arg"] := { unconsumed values of the top group }

    // Functions
    GenerateClosure, // push closure(Value), C(1); snapshot upvalues
    Call,            // [callee, C(1), args.., C(n)]
    Ret,             // return to caller, release the frame's scopes

    // Scopes
    AddLocalTable,
    DelLocalTable,
    AddGlobalTable,
    DelGlobalTable,
}

impl OpCode {
    pub const COUNT: usize = OpCode::DelGlobalTable as usize + 1;

    const ALL: [OpCode; OpCode::COUNT] = [
        OpCode::Assign,
        OpCode::GetLocalTable,
        OpCode::GetTable,
        OpCode::GetTableValue,
        OpCode::Push,
        OpCode::CleanStack,
        OpCode::MergeCounter,
        OpCode::ResetCounter,
        OpCode::DuplicateCounter,
        OpCode::GenerateArgTable,
        OpCode::GenerateClosure,
        OpCode::Call,
        OpCode::Ret,
        OpCode::AddLocalTable,
        OpCode::DelLocalTable,
        OpCode::AddGlobalTable,
        OpCode::DelGlobalTable,
    ];

    /// Decode an opcode byte
    pub fn from_u8(byte: u8) -> Option<OpCode> {
        Self::ALL.get(byte as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            OpCode::Assign => "ASSIGN",
            OpCode::GetLocalTable => "GETLOCALTABLE",
            OpCode::GetTable => "GETTABLE",
            OpCode::GetTableValue => "GETTABLEVALUE",
            OpCode::Push => "PUSH",
            OpCode::CleanStack => "CLEANSTACK",
            OpCode::MergeCounter => "MERGECOUNTER",
            OpCode::ResetCounter => "RESETCOUNTER",
            OpCode::DuplicateCounter => "DUPLICATECOUNTER",
            OpCode::GenerateArgTable => "GENERATEARGTABLE",
            OpCode::GenerateClosure => "GENERATECLOSURE",
            OpCode::Call => "CALL",
            OpCode::Ret => "RET",
            OpCode::AddLocalTable => "ADDLOCALTABLE",
            OpCode::DelLocalTable => "DELLOCALTABLE",
            OpCode::AddGlobalTable => "ADDGLOBALTABLE",
            OpCode::DelGlobalTable => "DELGLOBALTABLE",
        }
    }
}
