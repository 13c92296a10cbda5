//! Generate target functions from lifted definitions.
//!
//! Values live on one data stack per [`StackKind`]. While emitting a
//! function the packer keeps a [`Stacks`] model of what every slot holds,
//! so that variables become relative reads and every push is matched by a
//! drop before the function returns.

use crate::{err::*, json::pack_json, location::pack_location, stack::Stacks};
use mcx_syntax::{
    lifted::{self as ls, Annotation},
    packed::{self as ps, DataPath, Instruction, Nbt, Register, ScoreRange, Source, StackKind},
    *,
};

#[derive(Clone, Debug)]
pub struct PackOptions {
    /// namespace of every emitted location
    pub namespace: String,
    /// interleave comments describing the stack traffic
    pub debug: bool,
}

impl Default for PackOptions {
    fn default() -> Self {
        PackOptions { namespace: "minecraft".to_string(), debug: false }
    }
}

/* --------------------------------- Packer --------------------------------- */

pub struct Packer<'a> {
    options: &'a PackOptions,
    stacks: Stacks,
    instructions: Vec<Instruction>,
}

impl<'a> Packer<'a> {
    pub fn new(options: &'a PackOptions) -> Self {
        Packer { options, stacks: Stacks::new(), instructions: Vec::new() }
    }

    /// Builtins have no body to emit.
    pub fn pack(self, definition: &ls::Definition) -> Result<Option<ps::Definition>> {
        match definition {
            | ls::Definition::Function(function) => Ok(Some(self.pack_function(function)?.into())),
            | ls::Definition::Builtin(_) => Ok(None),
            | ls::Definition::Resource(ls::Resource { registry, name, body, .. }) => {
                Ok(Some(
                    ps::JsonResource {
                        registry: *registry,
                        location: pack_location(&self.options.namespace, name),
                        body: pack_json(body)?,
                    }
                    .into(),
                ))
            }
        }
    }

    fn pack_function(mut self, function: &ls::Function) -> Result<ps::Function> {
        log::debug!("packing {}", function.name);
        self.comment(|| format!("function {}", function.name));
        // the caller has already pushed the argument
        for kind in function.binder.ty.erase() {
            self.stacks.push(kind);
        }
        let mut frame = Vec::new();
        self.bind(&function.binder, &mut frame)?;
        self.pack_term(&function.body)?;
        let result = function.result.erase();
        let kept = function.has(Annotation::NoDrop) || function.binder.has(Annotation::NoDrop);
        if !kept {
            for kind in frame.iter().rev() {
                self.drop(*kind, &result)?;
            }
        }
        let mut expected = if kept { frame } else { Vec::new() };
        expected.extend(result);
        self.check_shape(&function.name, &expected)?;
        if let Some(value) = function.restore {
            self.emit(Instruction::SetScore { register: Register::R0, value });
        }
        Ok(ps::Function {
            location: pack_location(&self.options.namespace, &function.name),
            instructions: self.instructions,
        })
    }

    fn check_shape(&self, name: &DefinitionLocation, expected: &[StackKind]) -> Result<()> {
        for kind in StackKind::ALL {
            let expected = expected.iter().filter(|k| **k == kind).count();
            let found = self.stacks.len(kind);
            if expected != found {
                let location = name.to_string();
                return Err(PackError::ShapeMismatch { location, kind, expected, found });
            }
        }
        Ok(())
    }

    /* ------------------------------ Emission ------------------------------ */

    fn emit(&mut self, instruction: Instruction) {
        self.instructions.push(instruction)
    }

    fn comment(&mut self, text: impl FnOnce() -> String) {
        if self.options.debug {
            self.emit(Instruction::Comment(text()))
        }
    }

    /// `End` slots carry no data and are tracked without instructions.
    fn push(&mut self, kind: StackKind, source: Source) {
        if kind != StackKind::End {
            self.comment(|| format!("push {}", kind));
            self.emit(Instruction::Append { target: DataPath::stack(kind), source });
        }
        self.stacks.push(kind);
    }

    /// Removes the topmost slot of `kind` lying under `keeps`.
    fn drop(&mut self, kind: StackKind, keeps: &[StackKind]) -> Result<()> {
        let index = -1 - keeps.iter().filter(|k| **k == kind).count() as i32;
        self.remove(kind, index, keeps)
    }

    fn remove(&mut self, kind: StackKind, index: i32, keeps: &[StackKind]) -> Result<()> {
        self.stacks.remove(kind, index)?;
        if kind != StackKind::End {
            self.comment(|| {
                let keeps: Vec<_> = keeps.iter().map(|kind| kind.id()).collect();
                format!("drop {} under [{}]", kind, keeps.join(", "))
            });
            self.emit(Instruction::Remove { target: DataPath::slot(kind, index) });
        }
        Ok(())
    }

    /// Forgets slots a callee has already consumed.
    fn forget(&mut self, kinds: &[StackKind]) -> Result<()> {
        for kind in kinds.iter().rev() {
            self.stacks.remove(*kind, -1)?;
        }
        Ok(())
    }

    /// The single slot kind a value must fit in to be stored inside another.
    fn single(ty: &ls::Type, what: &str) -> Result<StackKind> {
        match ty.erase().as_slice() {
            | [kind] if *kind != StackKind::End => Ok(*kind),
            | _ => Err(PackError::Unsupported(format!("{} spanning several slots", what))),
        }
    }

    /* -------------------------------- Term -------------------------------- */

    fn pack_term(&mut self, term: &ls::Term) -> Result<()> {
        match &term.kind {
            | ls::TermKind::Lit(lit) => {
                let kind = Self::single(&term.ty, "literal")?;
                self.push(kind, Source::Value(Nbt::from(lit)));
            }
            | ls::TermKind::Array(ArrayOf { kind: array, elements }) => {
                let kind = Self::single(&term.ty, "array")?;
                let constants: Vec<Option<Nbt>> =
                    elements.iter().map(|element| constant(*array, element)).collect();
                let shell = match array {
                    | ArrayKind::Byte => Nbt::ByteArray(
                        (constants.iter())
                            .map(|c| if let Some(Nbt::Byte(v)) = c { *v } else { 0 })
                            .collect(),
                    ),
                    | ArrayKind::Int => Nbt::IntArray(
                        (constants.iter())
                            .map(|c| if let Some(Nbt::Int(v)) = c { *v } else { 0 })
                            .collect(),
                    ),
                    | ArrayKind::Long => Nbt::LongArray(
                        (constants.iter())
                            .map(|c| if let Some(Nbt::Long(v)) = c { *v } else { 0 })
                            .collect(),
                    ),
                };
                self.push(kind, Source::Value(shell));
                for (index, element) in elements.iter().enumerate() {
                    if constants[index].is_some() {
                        continue;
                    }
                    let element_kind = Self::single(&element.ty, "array element")?;
                    self.pack_term(element)?;
                    self.emit(Instruction::Set {
                        target: DataPath::slot(kind, -1).index(index as i32),
                        source: Source::From(DataPath::slot(element_kind, -1)),
                    });
                    self.drop(element_kind, &[])?;
                }
            }
            | ls::TermKind::List(ListOf(elements)) => {
                self.push(StackKind::List, Source::Value(Nbt::List(Vec::new())));
                for element in elements {
                    let kind = Self::single(&element.ty, "list element")?;
                    self.pack_term(element)?;
                    let shell = if kind == StackKind::List { -2 } else { -1 };
                    self.emit(Instruction::Append {
                        target: DataPath::slot(StackKind::List, shell),
                        source: Source::From(DataPath::slot(kind, -1)),
                    });
                    self.drop(kind, &[])?;
                }
            }
            | ls::TermKind::Compound(CompoundOf(elements)) => {
                self.push(StackKind::Compound, Source::Value(Nbt::Compound(Default::default())));
                for (key, element) in elements {
                    let kind = Self::single(&element.ty, "compound field")?;
                    self.pack_term(element)?;
                    let shell = if kind == StackKind::Compound { -2 } else { -1 };
                    self.emit(Instruction::Set {
                        target: DataPath::slot(StackKind::Compound, shell).key(key.clone()),
                        source: Source::From(DataPath::slot(kind, -1)),
                    });
                    self.drop(kind, &[])?;
                }
            }
            | ls::TermKind::Ref(_) => Err(PackError::Unsupported("boxed values".to_string()))?,
            | ls::TermKind::Tuple(TupleOf(elements)) => {
                for element in elements {
                    self.pack_term(element)?;
                }
            }
            | ls::TermKind::Closure(ls::Closure { tag, captures }) => {
                let record = [("_".to_string(), Nbt::Int(*tag as i32))].into_iter().collect();
                self.push(StackKind::Compound, Source::Value(Nbt::Compound(record)));
                for capture in captures {
                    if capture.ty.erase() == [StackKind::End] {
                        continue;
                    }
                    let kind = Self::single(&capture.ty, "captured variable")?;
                    let index = (self.stacks.find(kind, capture.level, 0, 1))
                        .ok_or_else(|| PackError::UnresolvedVariable(capture.name.clone()))?;
                    self.emit(Instruction::Set {
                        target: DataPath::slot(StackKind::Compound, -1).key(capture.name.clone()),
                        source: Source::From(DataPath::slot(kind, index)),
                    });
                }
            }
            | ls::TermKind::If(ls::Branch { condition, arg, then_name, else_name }) => {
                self.pack_term(condition)?;
                self.emit(Instruction::StoreScore {
                    register: Register::R0,
                    path: DataPath::slot(StackKind::Byte, -1),
                });
                self.drop(StackKind::Byte, &[])?;
                // one argument serves both calls: only one of them fires
                self.pack_term(arg)?;
                let then = pack_location(&self.options.namespace, then_name);
                let els = pack_location(&self.options.namespace, else_name);
                self.emit(Instruction::IfScore {
                    negated: false,
                    register: Register::R0,
                    range: ScoreRange::at_least(1),
                    then: Box::new(Instruction::Call(then)),
                });
                self.emit(Instruction::IfScore {
                    negated: false,
                    register: Register::R0,
                    range: ScoreRange::at_most(0),
                    then: Box::new(Instruction::Call(els)),
                });
                self.forget(&arg.ty.erase())?;
                for kind in term.ty.erase() {
                    self.stacks.push(kind);
                }
            }
            | ls::TermKind::Let(Let { binder, init, body }) => {
                self.pack_term(init)?;
                let mut frame = Vec::new();
                self.bind(binder, &mut frame)?;
                self.pack_term(body)?;
                if binder.has(Annotation::NoDrop) {
                    for var in binders(binder) {
                        self.stacks.release(var.level);
                    }
                } else {
                    let result = body.ty.erase();
                    for kind in frame.iter().rev() {
                        self.drop(*kind, &result)?;
                    }
                }
            }
            | ls::TermKind::Var(Var { name, level }) => {
                let kinds = term.ty.erase();
                for (i, kind) in kinds.iter().enumerate() {
                    let occurrence = kinds[..i].iter().filter(|k| *k == kind).count();
                    let arity = kinds.iter().filter(|k| *k == kind).count();
                    let index = (self.stacks.find(*kind, *level, occurrence, arity))
                        .ok_or_else(|| PackError::UnresolvedVariable(name.clone()))?;
                    self.push(*kind, Source::From(DataPath::slot(*kind, index)));
                }
            }
            | ls::TermKind::Run(Run { name, arg }) => {
                self.pack_term(arg)?;
                self.emit(Instruction::Call(pack_location(&self.options.namespace, name)));
                // the callee consumes its argument
                self.forget(&arg.ty.erase())?;
                for kind in term.ty.erase() {
                    self.stacks.push(kind);
                }
            }
            | ls::TermKind::Is(Is { scrutinee, scrutineer }) => {
                self.pack_term(scrutinee)?;
                self.emit(Instruction::SetScore { register: Register::R0, value: 1 });
                self.test(scrutineer)?;
                self.push(StackKind::Byte, Source::Value(Nbt::Byte(0)));
                self.emit(Instruction::StoreData {
                    path: DataPath::slot(StackKind::Byte, -1),
                    register: Register::R0,
                });
            }
            | ls::TermKind::Command(Command(text)) => {
                self.comment(|| "command".to_string());
                self.emit(Instruction::Raw(text.clone()));
                for kind in term.ty.erase() {
                    self.stacks.push(kind);
                }
            }
        }
        Ok(())
    }

    /* ------------------------------- Pattern ------------------------------ */

    /// Binds the value on top of the stacks to the variables of `pattern`.
    /// `frame` collects the slots left behind, which the binding scope has
    /// to drop once it is done.
    fn bind(&mut self, pattern: &ls::Pattern, frame: &mut Vec<StackKind>) -> Result<()> {
        match &pattern.kind {
            | ls::PatternKind::Var(Var { level, .. }) => {
                for kind in pattern.ty.erase().into_iter().rev() {
                    self.stacks.claim(kind, *level)?;
                    frame.push(kind);
                }
                // claimed back to front
                let start = frame.len() - pattern.ty.erase().len();
                frame[start..].reverse();
            }
            | ls::PatternKind::IntOf(_) | ls::PatternKind::IntRangeOf(_, _) => {
                self.remove_free(StackKind::Int)?;
            }
            | ls::PatternKind::Drop => {
                for kind in pattern.ty.erase().into_iter().rev() {
                    self.remove_free(kind)?;
                }
            }
            | ls::PatternKind::TupleOf(TupleOf(elements)) => {
                let mut frames = Vec::new();
                for element in elements.iter().rev() {
                    let mut inner = Vec::new();
                    self.bind(element, &mut inner)?;
                    frames.push(inner);
                }
                frame.extend(frames.into_iter().rev().flatten());
            }
            | ls::PatternKind::CompoundOf(CompoundOf(fields)) => {
                let record = self.stacks.last_free(StackKind::Compound)?;
                for (key, field) in fields {
                    let kind = Self::single(&field.ty, "compound field")?;
                    let index = self.stacks.relative(StackKind::Compound, record);
                    let path = DataPath::slot(StackKind::Compound, index).key(key.clone());
                    self.push(kind, Source::From(path));
                    self.bind(field, frame)?;
                }
                let index = self.stacks.relative(StackKind::Compound, record);
                self.remove(StackKind::Compound, index, &[])?;
            }
            | ls::PatternKind::ListOf(_) => {
                Err(PackError::Unsupported("list patterns in code".to_string()))?
            }
        }
        Ok(())
    }

    fn remove_free(&mut self, kind: StackKind) -> Result<()> {
        let position = self.stacks.last_free(kind)?;
        let index = self.stacks.relative(kind, position);
        self.remove(kind, index, &[])
    }

    /// Consumes the scrutinee on top of the stacks, clearing `#0` when it
    /// does not match.
    fn test(&mut self, pattern: &ls::Pattern) -> Result<()> {
        let guard = |range: ScoreRange| Instruction::IfScore {
            negated: true,
            register: Register::R1,
            range,
            then: Box::new(Instruction::SetScore { register: Register::R0, value: 0 }),
        };
        match &pattern.kind {
            | ls::PatternKind::IntOf(value) => {
                self.emit(Instruction::StoreScore {
                    register: Register::R1,
                    path: DataPath::slot(StackKind::Int, -1),
                });
                self.drop(StackKind::Int, &[])?;
                self.emit(guard(ScoreRange::exactly(*value)));
            }
            | ls::PatternKind::IntRangeOf(min, max) => {
                self.emit(Instruction::StoreScore {
                    register: Register::R1,
                    path: DataPath::slot(StackKind::Int, -1),
                });
                self.drop(StackKind::Int, &[])?;
                self.emit(guard(ScoreRange::between(*min, *max)));
            }
            | ls::PatternKind::TupleOf(TupleOf(elements)) => {
                for element in elements.iter().rev() {
                    self.test(element)?;
                }
            }
            | ls::PatternKind::Var(_) | ls::PatternKind::Drop => {
                for kind in pattern.ty.erase().into_iter().rev() {
                    self.drop(kind, &[])?;
                }
            }
            | ls::PatternKind::ListOf(_) | ls::PatternKind::CompoundOf(_) => Err(
                PackError::Unsupported("structured patterns in a test".to_string()),
            )?,
        }
        Ok(())
    }
}

/// The element itself when it is a literal of the array's element kind.
fn constant(kind: ArrayKind, element: &ls::Term) -> Option<Nbt> {
    let ls::TermKind::Lit(lit) = &element.kind else { return None };
    match (kind, lit) {
        | (ArrayKind::Byte, Literal::Byte(_))
        | (ArrayKind::Byte, Literal::Bool(_))
        | (ArrayKind::Int, Literal::Int(_))
        | (ArrayKind::Long, Literal::Long(_)) => Some(Nbt::from(lit)),
        | _ => None,
    }
}

fn binders(pattern: &ls::Pattern) -> Vec<&Var> {
    match &pattern.kind {
        | ls::PatternKind::Var(var) => vec![var],
        | ls::PatternKind::IntOf(_) | ls::PatternKind::IntRangeOf(_, _) | ls::PatternKind::Drop => {
            Vec::new()
        }
        | ls::PatternKind::ListOf(ListOf(elements))
        | ls::PatternKind::TupleOf(TupleOf(elements)) => elements.iter().flat_map(binders).collect(),
        | ls::PatternKind::CompoundOf(CompoundOf(fields)) => {
            fields.values().flat_map(binders).collect()
        }
    }
}

/// Pack one lifted definition.
pub fn pack(options: &PackOptions, definition: &ls::Definition) -> Result<Option<ps::Definition>> {
    Packer::new(options).pack(definition)
}
