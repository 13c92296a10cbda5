//! The target instruction set: named data stacks in storage `mcx:`, two
//! scratch score registers, and plain or guarded function calls.
//!
//! Every instruction renders to the command text it stands for.

pub use crate::{Literal, Registry};

use derive_more::From;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// the storage every data stack lives in
pub const STORAGE: &str = "mcx:";
/// the objective of the scratch score registers
pub const OBJECTIVE: &str = "mcx";

/* ------------------------------- Stack Kind ------------------------------- */

/// A primitive storage kind; each one has its own runtime stack.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum StackKind {
    End,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
    ByteArray,
    IntArray,
    LongArray,
    List,
    Compound,
}

impl StackKind {
    pub const ALL: [StackKind; 13] = [
        StackKind::End,
        StackKind::Byte,
        StackKind::Short,
        StackKind::Int,
        StackKind::Long,
        StackKind::Float,
        StackKind::Double,
        StackKind::String,
        StackKind::ByteArray,
        StackKind::IntArray,
        StackKind::LongArray,
        StackKind::List,
        StackKind::Compound,
    ];
    /// the name of the stack inside the storage
    pub fn id(self) -> &'static str {
        match self {
            | StackKind::End => "end",
            | StackKind::Byte => "byte",
            | StackKind::Short => "short",
            | StackKind::Int => "int",
            | StackKind::Long => "long",
            | StackKind::Float => "float",
            | StackKind::Double => "double",
            | StackKind::String => "string",
            | StackKind::ByteArray => "byte_array",
            | StackKind::IntArray => "int_array",
            | StackKind::LongArray => "long_array",
            | StackKind::List => "list",
            | StackKind::Compound => "compound",
        }
    }
    pub fn index(self) -> usize {
        self as usize
    }
}

/* ----------------------------------- Nbt ---------------------------------- */

/// A constant data value, rendered as SNBT.
#[derive(Clone, Debug, PartialEq)]
pub enum Nbt {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    ByteArray(Vec<i8>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    List(Vec<Nbt>),
    Compound(IndexMap<String, Nbt>),
}

impl From<&Literal> for Nbt {
    fn from(lit: &Literal) -> Self {
        match lit {
            | Literal::Bool(value) => Nbt::Byte(*value as i8),
            | Literal::Byte(value) => Nbt::Byte(*value),
            | Literal::Short(value) => Nbt::Short(*value),
            | Literal::Int(value) => Nbt::Int(*value),
            | Literal::Long(value) => Nbt::Long(*value),
            | Literal::Float(value) => Nbt::Float(*value),
            | Literal::Double(value) => Nbt::Double(*value),
            | Literal::String(value) => Nbt::String(value.clone()),
        }
    }
}

/* ---------------------------------- Path ---------------------------------- */

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathNode {
    Index(i32),
    Key(String),
}

/// `int[-1]`, `compound[-2].key`: a location inside a stack
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataPath {
    pub stack: StackKind,
    pub nodes: Vec<PathNode>,
}

impl DataPath {
    /// the stack itself, as an append target
    pub fn stack(stack: StackKind) -> Self {
        DataPath { stack, nodes: Vec::new() }
    }
    /// a slot of the stack, relative to its top when negative
    pub fn slot(stack: StackKind, index: i32) -> Self {
        DataPath { stack, nodes: vec![PathNode::Index(index)] }
    }
    pub fn index(mut self, index: i32) -> Self {
        self.nodes.push(PathNode::Index(index));
        self
    }
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.nodes.push(PathNode::Key(key.into()));
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Source {
    Value(Nbt),
    From(DataPath),
}

/* -------------------------------- Register -------------------------------- */

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Register {
    /// results of conditions, pattern tests and dispatch tags
    R0,
    /// scratch for comparisons
    R1,
}

/// `min..max`, either side may be open
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct ScoreRange {
    pub min: Option<i32>,
    pub max: Option<i32>,
}

impl ScoreRange {
    pub fn exactly(value: i32) -> Self {
        ScoreRange { min: Some(value), max: Some(value) }
    }
    pub fn between(min: i32, max: i32) -> Self {
        ScoreRange { min: Some(min), max: Some(max) }
    }
    pub fn at_least(min: i32) -> Self {
        ScoreRange { min: Some(min), max: None }
    }
    pub fn at_most(max: i32) -> Self {
        ScoreRange { min: None, max: Some(max) }
    }
    pub fn contains(&self, value: i32) -> bool {
        self.min.is_none_or(|min| min <= value) && self.max.is_none_or(|max| value <= max)
    }
}

/* ------------------------------- Instruction ------------------------------ */

#[derive(Clone, Debug, PartialEq)]
pub enum Instruction {
    /// `data modify storage mcx: <target> append <source>`
    Append { target: DataPath, source: Source },
    /// `data modify storage mcx: <target> set <source>`
    Set { target: DataPath, source: Source },
    /// `data remove storage mcx: <target>`
    Remove { target: DataPath },
    /// `scoreboard players set <register> mcx <value>`
    SetScore { register: Register, value: i32 },
    /// `execute store result score <register> mcx run data get storage mcx: <path>`
    StoreScore { register: Register, path: DataPath },
    /// `execute store result storage mcx: <path> byte 1 run scoreboard players get <register> mcx`
    StoreData { path: DataPath, register: Register },
    /// `execute if|unless score <register> mcx matches <range> run <then>`
    IfScore { negated: bool, register: Register, range: ScoreRange, then: Box<Instruction> },
    /// `function <location>`
    Call(ResourceLocation),
    /// `# <text>`
    Comment(String),
    Raw(String),
}

/* -------------------------------- Location -------------------------------- */

/// `namespace:path`
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ResourceLocation {
    pub namespace: String,
    pub path: String,
}

impl ResourceLocation {
    pub fn new(namespace: impl Into<String>, path: impl Into<String>) -> Self {
        ResourceLocation { namespace: namespace.into(), path: path.into() }
    }
}

/* ---------------------------------- Json ---------------------------------- */

/// A literal data tree handed to the serialization layer.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Json {
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Array(Vec<Json>),
    Object(IndexMap<String, Json>),
}

/* -------------------------------- Definition ------------------------------ */

#[derive(From, Clone, Debug, PartialEq)]
pub enum Definition {
    Function(Function),
    Json(JsonResource),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub location: ResourceLocation,
    pub instructions: Vec<Instruction>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct JsonResource {
    pub registry: Registry,
    pub location: ResourceLocation,
    pub body: Json,
}

impl Definition {
    pub fn location(&self) -> &ResourceLocation {
        match self {
            | Definition::Function(Function { location, .. })
            | Definition::Json(JsonResource { location, .. }) => location,
        }
    }
}

/* --------------------------------- Display -------------------------------- */

impl fmt::Display for StackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

fn is_bare(key: &str) -> bool {
    !key.is_empty()
        && key.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+'))
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            | '"' => f.write_str("\\\"")?,
            | '\\' => f.write_str("\\\\")?,
            | c => write!(f, "{}", c)?,
        }
    }
    f.write_str("\"")
}

fn write_key(f: &mut fmt::Formatter<'_>, key: &str) -> fmt::Result {
    if is_bare(key) { f.write_str(key) } else { write_quoted(f, key) }
}

fn write_seq<T>(
    f: &mut fmt::Formatter<'_>, open: &str, items: &[T],
    item: impl Fn(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
) -> fmt::Result {
    f.write_str(open)?;
    for (i, it) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        item(f, it)?;
    }
    f.write_str("]")
}

impl fmt::Display for Nbt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            | Nbt::Byte(value) => write!(f, "{}b", value),
            | Nbt::Short(value) => write!(f, "{}s", value),
            | Nbt::Int(value) => write!(f, "{}", value),
            | Nbt::Long(value) => write!(f, "{}l", value),
            | Nbt::Float(value) => write!(f, "{:?}f", value),
            | Nbt::Double(value) => write!(f, "{:?}d", value),
            | Nbt::String(value) => write_quoted(f, value),
            | Nbt::ByteArray(values) => write_seq(f, "[B;", values, |f, v| write!(f, "{}b", v)),
            | Nbt::IntArray(values) => write_seq(f, "[I;", values, |f, v| write!(f, "{}", v)),
            | Nbt::LongArray(values) => write_seq(f, "[L;", values, |f, v| write!(f, "{}l", v)),
            | Nbt::List(values) => write_seq(f, "[", values, |f, v| write!(f, "{}", v)),
            | Nbt::Compound(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write_key(f, key)?;
                    write!(f, ":{}", value)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl fmt::Display for DataPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stack.id())?;
        for node in &self.nodes {
            match node {
                | PathNode::Index(index) => write!(f, "[{}]", index)?,
                | PathNode::Key(key) => {
                    f.write_str(".")?;
                    write_key(f, key)?
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            | Source::Value(value) => write!(f, "value {}", value),
            | Source::From(path) => write!(f, "from storage {} {}", STORAGE, path),
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            | Register::R0 => f.write_str("#0"),
            | Register::R1 => f.write_str("#1"),
        }
    }
}

impl fmt::Display for ScoreRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(min) = self.min {
            write!(f, "{}", min)?;
        }
        f.write_str("..")?;
        if let Some(max) = self.max {
            write!(f, "{}", max)?;
        }
        Ok(())
    }
}

impl fmt::Display for ResourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            | Instruction::Append { target, source } => {
                write!(f, "data modify storage {} {} append {}", STORAGE, target, source)
            }
            | Instruction::Set { target, source } => {
                write!(f, "data modify storage {} {} set {}", STORAGE, target, source)
            }
            | Instruction::Remove { target } => {
                write!(f, "data remove storage {} {}", STORAGE, target)
            }
            | Instruction::SetScore { register, value } => {
                write!(f, "scoreboard players set {} {} {}", register, OBJECTIVE, value)
            }
            | Instruction::StoreScore { register, path } => write!(
                f,
                "execute store result score {} {} run data get storage {} {}",
                register, OBJECTIVE, STORAGE, path
            ),
            | Instruction::StoreData { path, register } => write!(
                f,
                "execute store result storage {} {} byte 1 run scoreboard players get {} {}",
                STORAGE, path, register, OBJECTIVE
            ),
            | Instruction::IfScore { negated, register, range, then } => write!(
                f,
                "execute {} score {} {} matches {} run {}",
                if *negated { "unless" } else { "if" },
                register,
                OBJECTIVE,
                range,
                then
            ),
            | Instruction::Call(location) => write!(f, "function {}", location),
            | Instruction::Comment(text) => write!(f, "# {}", text),
            | Instruction::Raw(text) => f.write_str(text),
        }
    }
}
