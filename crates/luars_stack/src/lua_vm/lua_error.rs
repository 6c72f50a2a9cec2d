/// Lightweight error enum - only 1 byte!
/// The message lives in `LuaState::error_msg`, see `LuaVM::get_error_message`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LuaError {
    /// User-visible runtime error (bad index, bad call target, bad key)
    RuntimeError,
    /// Malformed instruction stream or corrupted stack shape
    InternalError,
    /// Operand stack or call depth limit exceeded
    StackOverflow,
}

impl std::fmt::Display for LuaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LuaError::RuntimeError => write!(f, "Runtime Error"),
            LuaError::InternalError => write!(f, "Internal Error"),
            LuaError::StackOverflow => write!(f, "Stack Overflow"),
        }
    }
}

impl std::error::Error for LuaError {}
