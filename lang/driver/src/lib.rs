//! A minimal build pipeline for mcx: every definition of a compilation
//! unit is staged, lifted and packed on its own, and a definition that
//! fails in any phase is reported and left out without affecting the rest.

#![allow(clippy::style)]

pub mod conf;
pub mod err;


pub use conf::Conf;
pub use err::*;

use mcx_dynamics::{Builtins, prelude};
use mcx_lift::FunctionTable;
use mcx_pack::{PackOptions, pack, pack_dispatch};
use mcx_staging::Stager;
use mcx_syntax::{
    DefinitionLocation,
    fmt::{Formatter, Pretty},
    lifted as ls, packed as ps, typed as ts,
};
use rayon::prelude::*;

/// Everything a build produces.
#[derive(Debug, Default)]
pub struct Build {
    /// packed definitions in input order, the dispatcher last
    pub definitions: Vec<ps::Definition>,
    /// closure bodies by tag
    pub table: FunctionTable,
    /// definitions left out, with the reason
    pub errors: Vec<(DefinitionLocation, BuildError)>,
}

impl Build {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Every packed definition, one block each, in build order.
    pub fn render(&self) -> String {
        let f = Formatter::new();
        let mut buf = String::new();
        for definition in &self.definitions {
            // writing into a `String` cannot fail
            let _ = definition.pretty(&f).render_fmt(100, &mut buf);
            buf.push('\n');
        }
        buf
    }
}

pub struct Driver<'a> {
    pub conf: Conf,
    pub builtins: &'a Builtins,
}

impl Default for Driver<'static> {
    fn default() -> Self {
        Driver::new(Conf::default())
    }
}

impl Driver<'static> {
    pub fn new(conf: Conf) -> Self {
        Driver { conf, builtins: prelude() }
    }
}

impl<'a> Driver<'a> {
    pub fn with_builtins<'b>(self, builtins: &'b Builtins) -> Driver<'b> {
        Driver { conf: self.conf, builtins }
    }

    pub fn build(&self, definitions: &ts::Definitions) -> Build {
        let mut build = Build::default();

        // staging
        let stager =
            Stager::new(definitions, self.builtins).with_unfold_limit(self.conf.unfold_limit);
        let staged = (definitions.0.values().collect::<Vec<_>>())
            .into_par_iter()
            .map(|definition| (definition.name().clone(), stager.stage(definition)))
            .collect::<Vec<_>>();
        let staged = staged
            .into_iter()
            .filter_map(|(name, res)| res.map_err(|err| build.fail(name, err.into())).ok().flatten())
            .collect::<ts::Definitions>();
        log::debug!("{} of {} definitions staged", staged.0.len(), definitions.0.len());

        // lifting appends to the table, one definition at a time
        let mut lifted: Vec<ls::Definition> = Vec::new();
        for definition in staged.0.values() {
            match mcx_lift::lift(&staged, &mut build.table, definition) {
                | Ok(definitions) => lifted.extend(definitions),
                | Err(err) => build.fail(definition.name().clone(), err.into()),
            }
        }

        // packing
        let options: PackOptions = self.conf.pack_options();
        let packed = (lifted.par_iter())
            .map(|definition| (definition.name().clone(), pack(&options, definition)))
            .collect::<Vec<_>>();
        for (name, res) in packed {
            match res {
                | Ok(Some(definition)) => build.definitions.push(definition),
                | Ok(None) => {}
                | Err(err) => build.fail(name, err.into()),
            }
        }
        build.definitions.push(pack_dispatch(&options, &build.table));
        build
    }
}

impl Build {
    fn fail(&mut self, name: DefinitionLocation, err: BuildError) {
        if err.is_invariant_violation() {
            log::error!("dropping {}: {} (compiler defect)", name, err);
        } else {
            log::error!("dropping {}: {}", name, err);
        }
        self.errors.push((name, err));
    }
}
