//! The formatter traits.

#[impl_tools::autoimpl(for<T: trait + ?Sized> &T, &mut T, Box<T>, std::rc::Rc<T>, std::sync::Arc<T>)]
pub trait Ugly<'a, Fmter> {
    fn ugly(&self, f: &'a Fmter) -> String;
}

use pretty::RcDoc;

#[impl_tools::autoimpl(for<T: trait + ?Sized> &T, &mut T, Box<T>, std::rc::Rc<T>, std::sync::Arc<T>)]
pub trait Pretty<'a, Fmter> {
    fn pretty(&self, f: &'a Fmter) -> RcDoc<'a>;
}

/// Renders the IRs; they carry everything they need, so it holds no state.
#[derive(Clone, Copy, Debug, Default)]
pub struct Formatter;

impl Formatter {
    pub fn new() -> Self {
        Formatter
    }
}

fn join<'a, T: Ugly<'a, Formatter>>(f: &'a Formatter, items: &[T]) -> String {
    items.iter().map(|item| item.ugly(f)).collect::<Vec<_>>().join(", ")
}

fn join_keyed<'a, T: Ugly<'a, Formatter>>(
    f: &'a Formatter, items: &indexmap::IndexMap<String, T>,
) -> String {
    items.iter().map(|(key, item)| format!("{}: {}", key, item.ugly(f))).collect::<Vec<_>>().join(", ")
}

fn array_prefix(kind: crate::ArrayKind) -> &'static str {
    match kind {
        | crate::ArrayKind::Byte => "B",
        | crate::ArrayKind::Int => "I",
        | crate::ArrayKind::Long => "L",
    }
}

/* ---------------------------------- Typed --------------------------------- */

mod typed {
    use super::*;
    use crate::typed::*;

    fn refined<T: std::fmt::Display>(name: &str, value: &Option<T>) -> String {
        match value {
            | Some(value) => format!("{}({})", name, value),
            | None => name.to_string(),
        }
    }

    impl<'a> Ugly<'a, Formatter> for Type {
        fn ugly(&self, f: &'a Formatter) -> String {
            match self {
                | Type::Bool(value) => refined("bool", value),
                | Type::Byte(value) => refined("byte", value),
                | Type::Short(value) => refined("short", value),
                | Type::Int(value) => refined("int", value),
                | Type::Long(value) => refined("long", value),
                | Type::Float(value) => refined("float", value),
                | Type::Double(value) => refined("double", value),
                | Type::String(value) => refined("string", &value.as_ref().map(|s| format!("{:?}", s))),
                | Type::Array(kind) => format!("[{};]", array_prefix(*kind)),
                | Type::List(element) => format!("[{}]", element.ugly(f)),
                | Type::Compound(elements) => format!("{{{}}}", join_keyed(f, elements)),
                | Type::Ref(element) => format!("&{}", element.ugly(f)),
                | Type::Tuple(elements) => format!("({})", join(f, elements)),
                | Type::Fun(param, result) => format!("fun({}) -> {}", param.ugly(f), result.ugly(f)),
                | Type::Union(elements) => {
                    format!("union{{{}}}", elements.iter().map(|t| t.ugly(f)).collect::<Vec<_>>().join(" | "))
                }
                | Type::Code(element) => format!("code {}", element.ugly(f)),
                | Type::Var(var) => var.name.clone(),
                | Type::Run(name) => name.to_string(),
                | Type::Hole(Hole) => "_".to_string(),
            }
        }
    }

    impl<'a> Ugly<'a, Formatter> for Pattern {
        fn ugly(&self, f: &'a Formatter) -> String {
            match &self.kind {
                | PatternKind::IntOf(value) => format!("{}", value),
                | PatternKind::IntRangeOf(min, max) => format!("{}..{}", min, max),
                | PatternKind::ListOf(ListOf(elements)) => format!("[{}]", join(f, elements)),
                | PatternKind::CompoundOf(CompoundOf(elements)) => {
                    format!("{{{}}}", join_keyed(f, elements))
                }
                | PatternKind::TupleOf(TupleOf(elements)) => format!("({})", join(f, elements)),
                | PatternKind::Var(Var { name, level }) => format!("{}@{}", name, level),
                | PatternKind::Drop => "_".to_string(),
                | PatternKind::Hole(Hole) => "?".to_string(),
            }
        }
    }

    impl<'a> Ugly<'a, Formatter> for Term {
        fn ugly(&self, f: &'a Formatter) -> String {
            match &self.kind {
                | TermKind::Lit(lit) => lit.to_string(),
                | TermKind::Array(ArrayOf { kind, elements }) => {
                    format!("[{}; {}]", array_prefix(*kind), join(f, elements))
                }
                | TermKind::List(ListOf(elements)) => format!("[{}]", join(f, elements)),
                | TermKind::Compound(CompoundOf(elements)) => format!("{{{}}}", join_keyed(f, elements)),
                | TermKind::Ref(RefOf(element)) => format!("&{}", element.ugly(f)),
                | TermKind::Tuple(TupleOf(elements)) => format!("({})", join(f, elements)),
                | TermKind::Fun(FunOf { binder, body }) => {
                    format!("\\{} -> {}", binder.ugly(f), body.ugly(f))
                }
                | TermKind::Apply(Apply { operator, arg }) => {
                    format!("{}({})", operator.ugly(f), arg.ugly(f))
                }
                | TermKind::If(If { condition, then_clause, else_clause }) => format!(
                    "if {} then {} else {}",
                    condition.ugly(f),
                    then_clause.ugly(f),
                    else_clause.ugly(f)
                ),
                | TermKind::Let(Let { binder, init, body }) => {
                    format!("let {} = {}; {}", binder.ugly(f), init.ugly(f), body.ugly(f))
                }
                | TermKind::Var(Var { name, level }) => format!("{}@{}", name, level),
                | TermKind::Run(Run { name, arg }) => format!("{}({})", name, arg.ugly(f)),
                | TermKind::Is(Is { scrutinee, scrutineer }) => {
                    format!("{} is {}", scrutinee.ugly(f), scrutineer.ugly(f))
                }
                | TermKind::Command(Command(command)) => format!("/{}", command),
                | TermKind::Code(CodeOf(element)) => format!("`{}", element.ugly(f)),
                | TermKind::Splice(Splice(element)) => format!("${}", element.ugly(f)),
                | TermKind::Hole(Hole) => "?".to_string(),
            }
        }
    }
}

/* --------------------------------- Lifted --------------------------------- */

mod lifted {
    use super::*;
    use crate::lifted::*;

    impl<'a> Ugly<'a, Formatter> for Type {
        fn ugly(&self, f: &'a Formatter) -> String {
            match self {
                | Type::Bool => "bool".to_string(),
                | Type::Byte => "byte".to_string(),
                | Type::Short => "short".to_string(),
                | Type::Int => "int".to_string(),
                | Type::Long => "long".to_string(),
                | Type::Float => "float".to_string(),
                | Type::Double => "double".to_string(),
                | Type::String => "string".to_string(),
                | Type::Array(kind) => format!("[{};]", array_prefix(*kind)),
                | Type::List(element) => format!("[{}]", element.ugly(f)),
                | Type::Compound(elements) => format!("{{{}}}", join_keyed(f, elements)),
                | Type::Ref(element) => format!("&{}", element.ugly(f)),
                | Type::Tuple(elements) => format!("({})", join(f, elements)),
                | Type::Fun(param, result) => format!("fun({}) -> {}", param.ugly(f), result.ugly(f)),
                | Type::Union(elements) => format!("union{{{}}}", join(f, elements)),
            }
        }
    }

    impl<'a> Ugly<'a, Formatter> for Pattern {
        fn ugly(&self, f: &'a Formatter) -> String {
            match &self.kind {
                | PatternKind::IntOf(value) => format!("{}", value),
                | PatternKind::IntRangeOf(min, max) => format!("{}..{}", min, max),
                | PatternKind::ListOf(ListOf(elements)) => format!("[{}]", join(f, elements)),
                | PatternKind::CompoundOf(CompoundOf(elements)) => {
                    format!("{{{}}}", join_keyed(f, elements))
                }
                | PatternKind::TupleOf(TupleOf(elements)) => format!("({})", join(f, elements)),
                | PatternKind::Var(Var { name, level }) => format!("{}@{}", name, level),
                | PatternKind::Drop => "_".to_string(),
            }
        }
    }

    impl<'a> Ugly<'a, Formatter> for Term {
        fn ugly(&self, f: &'a Formatter) -> String {
            match &self.kind {
                | TermKind::Lit(lit) => lit.to_string(),
                | TermKind::Array(ArrayOf { kind, elements }) => {
                    format!("[{}; {}]", array_prefix(*kind), join(f, elements))
                }
                | TermKind::List(ListOf(elements)) => format!("[{}]", join(f, elements)),
                | TermKind::Compound(CompoundOf(elements)) => format!("{{{}}}", join_keyed(f, elements)),
                | TermKind::Ref(RefOf(element)) => format!("&{}", element.ugly(f)),
                | TermKind::Tuple(TupleOf(elements)) => format!("({})", join(f, elements)),
                | TermKind::Closure(Closure { tag, captures }) => {
                    let captures = captures
                        .iter()
                        .map(|Capture { name, level, .. }| format!(", {}: {}@{}", name, name, level))
                        .collect::<String>();
                    format!("{{_: {}{}}}", tag, captures)
                }
                | TermKind::If(Branch { condition, arg, then_name, else_name }) => {
                    let (condition, arg) = (condition.ugly(f), arg.ugly(f));
                    format!("if {} then {}({}) else {}({})", condition, then_name, arg, else_name, arg)
                }
                | TermKind::Let(Let { binder, init, body }) => {
                    format!("let {} = {}; {}", binder.ugly(f), init.ugly(f), body.ugly(f))
                }
                | TermKind::Var(Var { name, level }) => format!("{}@{}", name, level),
                | TermKind::Run(Run { name, arg }) => format!("{}({})", name, arg.ugly(f)),
                | TermKind::Is(Is { scrutinee, scrutineer }) => {
                    format!("{} is {}", scrutinee.ugly(f), scrutineer.ugly(f))
                }
                | TermKind::Command(Command(command)) => format!("/{}", command),
            }
        }
    }

    impl<'a> Ugly<'a, Formatter> for Definition {
        fn ugly(&self, f: &'a Formatter) -> String {
            match self {
                | Definition::Function(Function { name, binder, result, body, restore, .. }) => {
                    let restore = match restore {
                        | Some(restore) => format!(" restore {}", restore),
                        | None => String::new(),
                    };
                    format!(
                        "function {}({}) -> {}{} = {}",
                        name,
                        binder.ugly(f),
                        result.ugly(f),
                        restore,
                        body.ugly(f)
                    )
                }
                | Definition::Builtin(Builtin { name, param, result, .. }) => {
                    format!("builtin {}({}) -> {}", name, param.ugly(f), result.ugly(f))
                }
                | Definition::Resource(Resource { name, registry, body, .. }) => {
                    format!("{} {} = {}", registry.dir(), name, body.ugly(f))
                }
            }
        }
    }
}

/* --------------------------------- Packed --------------------------------- */

mod packed {
    use super::*;
    use crate::packed::*;

    impl<'a> Pretty<'a, Formatter> for Definition {
        fn pretty(&self, _f: &'a Formatter) -> RcDoc<'a> {
            match self {
                | Definition::Function(Function { location, instructions }) => {
                    let body = RcDoc::intersperse(
                        instructions.iter().map(|instruction| RcDoc::text(instruction.to_string())),
                        RcDoc::hardline(),
                    );
                    RcDoc::text(format!("function {} {{", location))
                        .append(RcDoc::hardline().append(body).nest(2))
                        .append(RcDoc::hardline())
                        .append(RcDoc::text("}"))
                }
                | Definition::Json(JsonResource { registry, location, body }) => {
                    RcDoc::text(format!("{} {} = {:?}", registry.dir(), location, body))
                }
            }
        }
    }
}
