// LuaValue - closed tagged union over every runtime datum the VM handles
// Scalars are stored inline, reference types are shared Rc handles
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use smol_str::SmolStr;

use super::{LuaClosure, LuaFunction, LuaTable, format_number};
use crate::lua_vm::{LuaResult, LuaState};

/// Native function signature.
///
/// A native function is invoked with its call group on top of the operand
/// stack (`[callee, C(1), args..., C(n)]`) and must leave its results as
/// one value group (`[results..., C(m)]`) in place of that call group.
/// See [`LuaState::take_args`] and [`LuaState::push_results`].
pub type CFunction = fn(&mut LuaState) -> LuaResult<()>;

/// Shared, mutable table handle.
pub type TableRef = Rc<RefCell<LuaTable>>;

#[derive(Clone, Default)]
pub enum LuaValue {
    #[default]
    Nil,
    Boolean(bool),
    Number(f64),
    String(SmolStr),
    Table(TableRef),
    /// Function prototype, the operand of `GenerateClosure`.
    Function(Rc<LuaFunction>),
    /// Instantiated script function with its own upvalue table.
    Closure(Rc<LuaClosure>),
    CFunction(CFunction),
}

/// Value kind tag (for pattern matching without borrowing the payload)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LuaValueKind {
    Nil,
    Boolean,
    Number,
    String,
    Table,
    Function,
    Closure,
    CFunction,
}

impl LuaValue {
    // ============ Constructors ============

    #[inline(always)]
    pub fn nil() -> Self {
        LuaValue::Nil
    }

    #[inline(always)]
    pub fn boolean(b: bool) -> Self {
        LuaValue::Boolean(b)
    }

    #[inline(always)]
    pub fn number(n: f64) -> Self {
        LuaValue::Number(n)
    }

    pub fn string(s: impl Into<SmolStr>) -> Self {
        LuaValue::String(s.into())
    }

    pub fn table(t: LuaTable) -> Self {
        LuaValue::Table(Rc::new(RefCell::new(t)))
    }

    pub fn function(f: LuaFunction) -> Self {
        LuaValue::Function(Rc::new(f))
    }

    #[inline(always)]
    pub fn cfunction(f: CFunction) -> Self {
        LuaValue::CFunction(f)
    }

    // ============ Type queries ============

    pub fn kind(&self) -> LuaValueKind {
        match self {
            LuaValue::Nil => LuaValueKind::Nil,
            LuaValue::Boolean(_) => LuaValueKind::Boolean,
            LuaValue::Number(_) => LuaValueKind::Number,
            LuaValue::String(_) => LuaValueKind::String,
            LuaValue::Table(_) => LuaValueKind::Table,
            LuaValue::Function(_) => LuaValueKind::Function,
            LuaValue::Closure(_) => LuaValueKind::Closure,
            LuaValue::CFunction(_) => LuaValueKind::CFunction,
        }
    }

    /// Lua type name, as returned by `type()`.
    pub fn type_name(&self) -> &'static str {
        match self {
            LuaValue::Nil => "nil",
            LuaValue::Boolean(_) => "boolean",
            LuaValue::Number(_) => "number",
            LuaValue::String(_) => "string",
            LuaValue::Table(_) => "table",
            LuaValue::Function(_) | LuaValue::Closure(_) | LuaValue::CFunction(_) => "function",
        }
    }

    /// Human-readable description used in runtime error messages.
    /// Unlike [`type_name`](Self::type_name) it tells the three function
    /// representations apart.
    pub fn name(&self) -> &'static str {
        match self {
            LuaValue::Function(_) => "function prototype",
            LuaValue::CFunction(_) => "native function",
            other => other.type_name(),
        }
    }

    #[inline(always)]
    pub fn is_nil(&self) -> bool {
        matches!(self, LuaValue::Nil)
    }

    /// Everything except `nil` and `false` is truthy.
    #[inline(always)]
    pub fn is_truthy(&self) -> bool {
        !matches!(self, LuaValue::Nil | LuaValue::Boolean(false))
    }

    // ============ Payload accessors ============

    pub fn as_number(&self) -> Option<f64> {
        match self {
            LuaValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            LuaValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&TableRef> {
        match self {
            LuaValue::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Rc<LuaFunction>> {
        match self {
            LuaValue::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_closure(&self) -> Option<&Rc<LuaClosure>> {
        match self {
            LuaValue::Closure(c) => Some(c),
            _ => None,
        }
    }

    /// Identity pointer for reference types, `None` for scalars.
    pub(crate) fn ref_address(&self) -> Option<usize> {
        match self {
            LuaValue::Table(t) => Some(Rc::as_ptr(t) as *const () as usize),
            LuaValue::Function(f) => Some(Rc::as_ptr(f) as *const () as usize),
            LuaValue::Closure(c) => Some(Rc::as_ptr(c) as *const () as usize),
            LuaValue::CFunction(f) => Some(*f as usize),
            _ => None,
        }
    }
}

impl From<bool> for LuaValue {
    fn from(b: bool) -> Self {
        LuaValue::Boolean(b)
    }
}

impl From<f64> for LuaValue {
    fn from(n: f64) -> Self {
        LuaValue::Number(n)
    }
}

impl From<&str> for LuaValue {
    fn from(s: &str) -> Self {
        LuaValue::String(SmolStr::new(s))
    }
}

impl From<TableRef> for LuaValue {
    fn from(t: TableRef) -> Self {
        LuaValue::Table(t)
    }
}

// Scalars compare by value, reference types by identity.
impl PartialEq for LuaValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (LuaValue::Nil, LuaValue::Nil) => true,
            (LuaValue::Boolean(a), LuaValue::Boolean(b)) => a == b,
            (LuaValue::Number(a), LuaValue::Number(b)) => a == b,
            (LuaValue::String(a), LuaValue::String(b)) => a == b,
            (LuaValue::Table(a), LuaValue::Table(b)) => Rc::ptr_eq(a, b),
            (LuaValue::Function(a), LuaValue::Function(b)) => Rc::ptr_eq(a, b),
            (LuaValue::Closure(a), LuaValue::Closure(b)) => Rc::ptr_eq(a, b),
            (LuaValue::CFunction(a), LuaValue::CFunction(b)) => *a as usize == *b as usize,
            _ => false,
        }
    }
}

impl fmt::Debug for LuaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LuaValue::Nil => write!(f, "nil"),
            LuaValue::Boolean(b) => write!(f, "{b}"),
            LuaValue::Number(n) => write!(f, "{n}"),
            LuaValue::String(s) => write!(f, "{s:?}"),
            LuaValue::Table(t) => write!(f, "table({:p})", Rc::as_ptr(t)),
            LuaValue::Function(p) => write!(f, "proto({:p})", Rc::as_ptr(p)),
            LuaValue::Closure(c) => write!(f, "closure({:p})", Rc::as_ptr(c)),
            LuaValue::CFunction(_) => write!(f, "cfunction"),
        }
    }
}

impl fmt::Display for LuaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LuaValue::Nil => f.write_str("nil"),
            LuaValue::Boolean(b) => write!(f, "{b}"),
            LuaValue::Number(n) => {
                let mut buf = String::new();
                format_number(*n, &mut buf);
                f.write_str(&buf)
            }
            LuaValue::String(s) => f.write_str(s),
            LuaValue::Table(t) => write!(f, "table: {:p}", Rc::as_ptr(t)),
            LuaValue::Function(p) => write!(f, "function: {:p}", Rc::as_ptr(p)),
            LuaValue::Closure(c) => write!(f, "function: {:p}", Rc::as_ptr(c)),
            LuaValue::CFunction(func) => write!(f, "function: builtin: {:#x}", *func as usize),
        }
    }
}
