use crate::{location::pack_location, pack::PackOptions};
use mcx_lift::{FunctionTable, dispatch};
use mcx_syntax::packed::{self as ps, DataPath, Instruction, Register, ScoreRange, StackKind};

/// The function every application calls: it reads the tag of the closure
/// on top of the compound stack and jumps to the matching body. Each body
/// restores `#0` to its own tag on exit, so later guards stay quiet.
pub fn pack_dispatch(options: &PackOptions, table: &FunctionTable) -> ps::Definition {
    let mut instructions = vec![Instruction::StoreScore {
        register: Register::R0,
        path: DataPath::slot(StackKind::Compound, -1).key("_"),
    }];
    for (tag, name) in table.iter() {
        instructions.push(Instruction::IfScore {
            negated: false,
            register: Register::R0,
            range: ScoreRange::exactly(tag as i32),
            then: Box::new(Instruction::Call(pack_location(&options.namespace, name))),
        });
    }
    log::debug!("dispatching over {} closures", table.len());
    ps::Function { location: pack_location(&options.namespace, &dispatch()), instructions }.into()
}
