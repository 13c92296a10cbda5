use crate::*;
use std::fmt;

impl ModuleLocation {
    pub fn new(parts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        ModuleLocation(parts.into_iter().map(Into::into).collect())
    }
    /// `module::name`
    pub fn def(&self, name: impl Into<String>) -> DefinitionLocation {
        DefinitionLocation { module: self.clone(), name: name.into() }
    }
}

impl DefinitionLocation {
    pub fn new(
        module: impl IntoIterator<Item = impl Into<String>>, name: impl Into<String>,
    ) -> Self {
        ModuleLocation::new(module).def(name)
    }
}

impl fmt::Display for ModuleLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

impl fmt::Display for DefinitionLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.module, self.name)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            | Literal::Bool(value) => write!(f, "{}", value),
            | Literal::Byte(value) => write!(f, "{}b", value),
            | Literal::Short(value) => write!(f, "{}s", value),
            | Literal::Int(value) => write!(f, "{}", value),
            | Literal::Long(value) => write!(f, "{}l", value),
            | Literal::Float(value) => write!(f, "{:?}f", value),
            | Literal::Double(value) => write!(f, "{:?}d", value),
            | Literal::String(value) => write!(f, "{:?}", value),
        }
    }
}

impl Var {
    pub fn new(name: impl Into<String>, level: usize) -> Self {
        Var { name: name.into(), level }
    }
}

/// Keep `a-z`, `0-9`, `_` and `-`; every other byte becomes `.` followed by
/// the byte in base 36.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' => out.push(byte as char),
            | _ => {
                out.push('.');
                out.push_str(&radix36(byte));
            }
        }
    }
    out
}

fn radix36(mut n: u8) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    digits.iter().rev().map(|&d| d as char).collect()
}
