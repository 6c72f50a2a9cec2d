//! VM limits and initial capacities.
//!
//! All magic numbers that control VM behavior are collected here.

// ===== Stack =====

/// Initial capacity of the operand stack.
pub const BASIC_STACK_SIZE: usize = 64;

/// Default maximum operand stack size (number of slots).
pub const LUAI_MAXSTACK: usize = 1_000_000;

// ===== Calls =====

/// Default maximum call nesting depth, the synthetic global frame included.
pub const MAX_CALL_DEPTH: usize = 200;

/// Initial capacity of the call stack.
pub const BASIC_CALL_STACK_SIZE: usize = 16;

// ===== Scopes =====

/// Initial capacity of the scope chain.
pub const BASIC_SCOPE_CHAIN_SIZE: usize = 16;

/// Name under which `GenerateArgTable` stores the vararg table.
pub const ARG_TABLE_NAME: &str = "arg";
