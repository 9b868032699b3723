//! Primitive routine names, indexed by the primitive number used as the
//! `d` operand of a `CALL` to `PB`.

/// Names of the 29 primitive slots. Index 0 is unused (never a valid
/// primitive number) and carries the placeholder name `"0"`, matching the
/// original implementation's table.
pub const PRIMITIVE_NAMES: [&str; 29] = [
    "0", "id", "not", "and", "or", "succ", "pred", "neg", "add", "sub", "mult", "div", "mod",
    "lt", "le", "ge", "gt", "eq", "ne", "eol", "eof", "get", "put", "geteol", "puteol", "getint",
    "putint", "new", "dispose",
];

/// Look up the name of primitive `index`, if it is in range `1..=28`.
#[must_use]
pub fn primitive_name(index: u8) -> Option<&'static str> {
    PRIMITIVE_NAMES.get(index as usize).copied().filter(|_| (1..=28).contains(&index))
}
