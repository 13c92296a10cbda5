//! A reference machine for packed functions.
//!
//! It runs instructions over the same storage layout the target uses: one
//! data stack per kind, the two scratch registers, and calls by location.
//! Builtins are supplied as native functions over the stacks.

use mcx_syntax::packed::*;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MachineError {
    #[error("no function at `{0}`")]
    UnknownFunction(ResourceLocation),
    #[error("no data at `{0}`")]
    NoData(DataPath),
    #[error("`{0}` does not hold a number")]
    NotANumber(DataPath),
    #[error("`{0}` cannot hold the value")]
    Mismatch(DataPath),
    #[error("ran out of fuel")]
    OutOfFuel,
}

pub type Result<T> = std::result::Result<T, MachineError>;

pub type Native = fn(&mut Machine) -> Result<()>;

pub struct Machine {
    functions: HashMap<ResourceLocation, Vec<Instruction>>,
    natives: HashMap<ResourceLocation, Native>,
    stacks: HashMap<StackKind, Vec<Nbt>>,
    scores: HashMap<Register, i32>,
    /// raw commands in the order they ran
    pub commands: Vec<String>,
    fuel: usize,
}

impl Machine {
    pub fn new(definitions: &[Definition]) -> Self {
        let functions = (definitions.iter())
            .filter_map(|definition| match definition {
                | Definition::Function(Function { location, instructions }) => {
                    Some((location.clone(), instructions.clone()))
                }
                | Definition::Json(_) => None,
            })
            .collect();
        Machine {
            functions,
            natives: HashMap::new(),
            stacks: HashMap::new(),
            scores: HashMap::new(),
            commands: Vec::new(),
            fuel: 100_000,
        }
    }

    /// Natives for the integer prelude under `namespace`.
    pub fn with_prelude(mut self, namespace: &str) -> Self {
        let natives: [(&str, Native); 5] = [
            ("int_add", |m| m.int2(|a, b| Nbt::Int(a.wrapping_add(b)))),
            ("int_sub", |m| m.int2(|a, b| Nbt::Int(a.wrapping_sub(b)))),
            ("int_mul", |m| m.int2(|a, b| Nbt::Int(a.wrapping_mul(b)))),
            ("int_eq", |m| m.int2(|a, b| Nbt::Byte((a == b) as i8))),
            ("int_lt", |m| m.int2(|a, b| Nbt::Byte((a < b) as i8))),
        ];
        for (name, native) in natives {
            let location = ResourceLocation::new(namespace, format!("prelude/{}", name));
            self.natives.insert(location, native);
        }
        self
    }

    fn int2(&mut self, op: impl Fn(i32, i32) -> Nbt) -> Result<()> {
        let b = self.pop_int()?;
        let a = self.pop_int()?;
        let result = op(a, b);
        let kind = match result {
            | Nbt::Byte(_) => StackKind::Byte,
            | _ => StackKind::Int,
        };
        self.push(kind, result);
        Ok(())
    }

    fn pop_int(&mut self) -> Result<i32> {
        let path = DataPath::slot(StackKind::Int, -1);
        match self.stack_mut(StackKind::Int).pop() {
            | Some(Nbt::Int(value)) => Ok(value),
            | Some(_) => Err(MachineError::NotANumber(path)),
            | None => Err(MachineError::NoData(path)),
        }
    }

    /* --------------------------------- State -------------------------------- */

    pub fn stack(&self, kind: StackKind) -> &[Nbt] {
        self.stacks.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    fn stack_mut(&mut self, kind: StackKind) -> &mut Vec<Nbt> {
        self.stacks.entry(kind).or_default()
    }

    pub fn push(&mut self, kind: StackKind, value: Nbt) {
        self.stack_mut(kind).push(value)
    }

    pub fn score(&self, register: Register) -> i32 {
        self.scores.get(&register).copied().unwrap_or(0)
    }

    /// The total number of slots over all stacks.
    pub fn depth(&self) -> usize {
        self.stacks.values().map(Vec::len).sum()
    }

    /* ------------------------------- Execution ------------------------------ */

    pub fn call(&mut self, location: &ResourceLocation) -> Result<()> {
        if let Some(native) = self.natives.get(location).copied() {
            return native(self);
        }
        let instructions = (self.functions.get(location))
            .cloned()
            .ok_or_else(|| MachineError::UnknownFunction(location.clone()))?;
        for instruction in &instructions {
            self.exec(instruction)?;
        }
        Ok(())
    }

    pub fn exec(&mut self, instruction: &Instruction) -> Result<()> {
        self.fuel = self.fuel.checked_sub(1).ok_or(MachineError::OutOfFuel)?;
        match instruction {
            | Instruction::Append { target, source } => {
                let value = self.source(source)?;
                if target.nodes.is_empty() {
                    self.push(target.stack, value);
                } else {
                    match self.get_mut(target)? {
                        | Nbt::List(elements) => elements.push(value),
                        | _ => Err(MachineError::Mismatch(target.clone()))?,
                    }
                }
            }
            | Instruction::Set { target, source } => {
                let value = self.source(source)?;
                self.set(target, value)?;
            }
            | Instruction::Remove { target } => self.remove(target)?,
            | Instruction::SetScore { register, value } => {
                self.scores.insert(*register, *value);
            }
            | Instruction::StoreScore { register, path } => {
                let value = match self.get(path)? {
                    | Nbt::Byte(value) => *value as i32,
                    | Nbt::Short(value) => *value as i32,
                    | Nbt::Int(value) => *value,
                    | Nbt::Long(value) => *value as i32,
                    | _ => Err(MachineError::NotANumber(path.clone()))?,
                };
                self.scores.insert(*register, value);
            }
            | Instruction::StoreData { path, register } => {
                let value = Nbt::Byte(self.score(*register) as i8);
                self.set(path, value)?;
            }
            | Instruction::IfScore { negated, register, range, then } => {
                if range.contains(self.score(*register)) != *negated {
                    self.exec(then)?;
                }
            }
            | Instruction::Call(location) => self.call(location)?,
            | Instruction::Comment(_) => {}
            | Instruction::Raw(command) => self.commands.push(command.clone()),
        }
        Ok(())
    }

    fn source(&self, source: &Source) -> Result<Nbt> {
        match source {
            | Source::Value(value) => Ok(value.clone()),
            | Source::From(path) => self.get(path).cloned(),
        }
    }

    /* --------------------------------- Paths -------------------------------- */

    fn slot_index(len: usize, index: i32) -> Option<usize> {
        let position = if index < 0 { len as i64 + index as i64 } else { index as i64 };
        (0..len as i64).contains(&position).then_some(position as usize)
    }

    fn get(&self, path: &DataPath) -> Result<&Nbt> {
        let missing = || MachineError::NoData(path.clone());
        let [PathNode::Index(index), nodes @ ..] = path.nodes.as_slice() else {
            return Err(missing());
        };
        let stack = self.stack(path.stack);
        let mut nbt = &stack[Self::slot_index(stack.len(), *index).ok_or_else(missing)?];
        for node in nodes {
            nbt = match (nbt, node) {
                | (Nbt::Compound(entries), PathNode::Key(key)) => entries.get(key).ok_or_else(missing)?,
                | (Nbt::List(elements), PathNode::Index(index)) => {
                    &elements[Self::slot_index(elements.len(), *index).ok_or_else(missing)?]
                }
                | _ => return Err(missing()),
            };
        }
        Ok(nbt)
    }

    fn get_mut(&mut self, path: &DataPath) -> Result<&mut Nbt> {
        let missing = || MachineError::NoData(path.clone());
        let [PathNode::Index(index), nodes @ ..] = path.nodes.as_slice() else {
            return Err(missing());
        };
        let stack = self.stack_mut(path.stack);
        let position = Self::slot_index(stack.len(), *index).ok_or_else(missing)?;
        let mut nbt = &mut stack[position];
        for node in nodes {
            nbt = match (nbt, node) {
                | (Nbt::Compound(entries), PathNode::Key(key)) => {
                    entries.get_mut(key).ok_or_else(missing)?
                }
                | (Nbt::List(elements), PathNode::Index(index)) => {
                    let position = Self::slot_index(elements.len(), *index).ok_or_else(missing)?;
                    &mut elements[position]
                }
                | _ => return Err(missing()),
            };
        }
        Ok(nbt)
    }

    /// The path without its last node, and that node.
    fn split(path: &DataPath) -> Result<(DataPath, &PathNode)> {
        match path.nodes.split_last() {
            | Some((last, parent)) if !parent.is_empty() => {
                Ok((DataPath { stack: path.stack, nodes: parent.to_vec() }, last))
            }
            | _ => Err(MachineError::Mismatch(path.clone())),
        }
    }

    fn set(&mut self, path: &DataPath, value: Nbt) -> Result<()> {
        if path.nodes.len() == 1 {
            *self.get_mut(path)? = value;
            return Ok(());
        }
        let (parent, last) = Self::split(path)?;
        let mismatch = || MachineError::Mismatch(path.clone());
        match (self.get_mut(&parent)?, last, value) {
            | (Nbt::Compound(entries), PathNode::Key(key), value) => {
                entries.insert(key.clone(), value);
            }
            | (Nbt::List(elements), PathNode::Index(index), value) => {
                let position = Self::slot_index(elements.len(), *index).ok_or_else(mismatch)?;
                elements[position] = value;
            }
            | (Nbt::ByteArray(elements), PathNode::Index(index), Nbt::Byte(value)) => {
                let position = Self::slot_index(elements.len(), *index).ok_or_else(mismatch)?;
                elements[position] = value;
            }
            | (Nbt::IntArray(elements), PathNode::Index(index), Nbt::Int(value)) => {
                let position = Self::slot_index(elements.len(), *index).ok_or_else(mismatch)?;
                elements[position] = value;
            }
            | (Nbt::LongArray(elements), PathNode::Index(index), Nbt::Long(value)) => {
                let position = Self::slot_index(elements.len(), *index).ok_or_else(mismatch)?;
                elements[position] = value;
            }
            | _ => return Err(mismatch()),
        }
        Ok(())
    }

    fn remove(&mut self, path: &DataPath) -> Result<()> {
        let missing = || MachineError::NoData(path.clone());
        if let [PathNode::Index(index)] = path.nodes.as_slice() {
            let stack = self.stack_mut(path.stack);
            let position = Self::slot_index(stack.len(), *index).ok_or_else(missing)?;
            stack.remove(position);
            return Ok(());
        }
        let (parent, last) = Self::split(path)?;
        match (self.get_mut(&parent)?, last) {
            | (Nbt::Compound(entries), PathNode::Key(key)) => {
                entries.shift_remove(key).ok_or_else(missing)?;
            }
            | (Nbt::List(elements), PathNode::Index(index)) => {
                let position = Self::slot_index(elements.len(), *index).ok_or_else(missing)?;
                elements.remove(position);
            }
            | _ => return Err(missing()),
        }
        Ok(())
    }
}
