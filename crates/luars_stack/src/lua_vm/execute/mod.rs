/*----------------------------------------------------------------------
  Dispatch loop

  Fetches one instruction at a time from the active segment and hands it
  to its handler. Handlers report how control continues:

    Continue  advance to the next instruction of the same segment
    Call      a new segment was activated at offset 0
    Return    the caller's segment was restored at the Call offset;
              execution resumes one past it

  A segment swap never recurses: the outer 'startfunc loop simply
  reloads the active segment. The run ends when Ret of the global frame
  clears the active segment, or when the program segment is exhausted
  with no frame left.
----------------------------------------------------------------------*/

mod call;
mod closure_handler;
mod counter_ops;
mod scope_ops;
mod table_ops;

use tracing::trace;

use crate::lua_value::LuaValue;
use crate::lua_vm::{Instruction, InstructionParam, LuaResult, LuaVM, OpCode};

/// How the dispatch loop continues after an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameAction {
    Continue,
    Call,
    Return,
}

impl LuaVM {
    pub(crate) fn execute_loop(&mut self) -> LuaResult<()> {
        'startfunc: loop {
            let Some(code) = self.code.clone() else {
                return Ok(());
            };

            loop {
                let Some(instr) = code.get(self.pc) else {
                    return self.finish_segment();
                };
                trace!(pc = self.pc, depth = self.call_stack.len(), "{}", instr);

                match self.dispatch(instr)? {
                    FrameAction::Continue => self.pc += 1,
                    FrameAction::Call => continue 'startfunc,
                    FrameAction::Return => {
                        self.pc += 1;
                        continue 'startfunc;
                    }
                }
            }
        }
    }

    fn dispatch(&mut self, instr: &Instruction) -> LuaResult<FrameAction> {
        match instr.op {
            OpCode::Assign => self.exec_assign()?,
            OpCode::CleanStack => self.exec_clean_stack()?,
            OpCode::GetLocalTable => self.exec_get_local_table()?,
            OpCode::GetTable => {
                let name = self.name_operand(instr)?;
                self.exec_get_table(name)?
            }
            OpCode::GetTableValue => {
                let depth = self.counter_index_operand(instr)?;
                self.exec_get_table_value(depth)?
            }
            OpCode::Push => self.exec_push(&instr.param)?,
            OpCode::GenerateClosure => {
                let proto = self.value_operand(instr)?;
                self.exec_generate_closure(proto)?
            }
            OpCode::Ret => return self.exec_return(),
            OpCode::GenerateArgTable => self.exec_generate_arg_table()?,
            OpCode::MergeCounter => self.exec_merge_counter()?,
            OpCode::ResetCounter => self.exec_reset_counter()?,
            OpCode::DuplicateCounter => self.exec_duplicate_counter()?,
            OpCode::Call => return self.exec_call(),
            OpCode::AddLocalTable => self.exec_add_local_table()?,
            OpCode::DelLocalTable => self.exec_del_local_table()?,
            OpCode::AddGlobalTable => self.exec_add_global_table()?,
            OpCode::DelGlobalTable => self.exec_del_global_table()?,
        }
        Ok(FrameAction::Continue)
    }

    // The active segment ran out of instructions.
    fn finish_segment(&mut self) -> LuaResult<()> {
        match self.call_stack.last() {
            None => {
                self.code = None;
                Ok(())
            }
            Some(frame) if frame.is_global() => Err(self.state.internal_error(
                "program ended while the global frame is still active",
            )),
            Some(_) => Err(self
                .state
                .internal_error("function body ended without Ret")),
        }
    }

    // ============ Operand decoding ============

    fn name_operand(&mut self, instr: &Instruction) -> LuaResult<LuaValue> {
        match &instr.param {
            InstructionParam::Name(name) => Ok(name.clone()),
            other => Err(self.bad_operand(instr.op, "a name", other)),
        }
    }

    fn value_operand(&mut self, instr: &Instruction) -> LuaResult<LuaValue> {
        match &instr.param {
            InstructionParam::Value(value) => Ok(value.clone()),
            other => Err(self.bad_operand(instr.op, "a value", other)),
        }
    }

    fn counter_index_operand(&mut self, instr: &Instruction) -> LuaResult<usize> {
        match &instr.param {
            InstructionParam::CounterIndex(depth) => Ok(*depth),
            other => Err(self.bad_operand(instr.op, "a counter index", other)),
        }
    }

    #[cold]
    fn bad_operand(
        &mut self,
        op: OpCode,
        expected: &str,
        found: &InstructionParam,
    ) -> crate::lua_vm::LuaError {
        self.state.internal_error(format!(
            "{} expects {} operand, found {:?}",
            op.name(),
            expected,
            found
        ))
    }
}
