// Value model shared by the VM, the object pool and native functions
// Reference types are Rc handles; the VM never owns values exclusively
mod chunk;
mod lua_function;
mod lua_table;
mod lua_value;

pub use chunk::{Chunk, ChunkBuilder};
pub use lua_function::{LuaClosure, LuaFunction};
pub use lua_table::{LuaTable, TableError};
pub use lua_value::{CFunction, LuaValue, LuaValueKind, TableRef};

/// Append the Lua textual form of a number to `buf`.
/// Integral values print without a fractional part ("5", not "5.0").
pub fn format_number(n: f64, buf: &mut String) {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        let mut itoa_buf = itoa::Buffer::new();
        buf.push_str(itoa_buf.format(n as i64));
    } else if n.is_nan() {
        buf.push_str(if n.is_sign_negative() { "-nan" } else { "nan" });
    } else if n.is_infinite() {
        buf.push_str(if n > 0.0 { "inf" } else { "-inf" });
    } else {
        buf.push_str(&n.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::format_number;

    fn fmt(n: f64) -> String {
        let mut s = String::new();
        format_number(n, &mut s);
        s
    }

    #[test]
    fn integral_numbers_have_no_fraction() {
        assert_eq!(fmt(5.0), "5");
        assert_eq!(fmt(-12.0), "-12");
        assert_eq!(fmt(0.0), "0");
    }

    #[test]
    fn fractional_and_special_numbers() {
        assert_eq!(fmt(1.5), "1.5");
        assert_eq!(fmt(f64::INFINITY), "inf");
        assert_eq!(fmt(f64::NEG_INFINITY), "-inf");
    }
}
