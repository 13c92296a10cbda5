//! Shared tooling for the mcx integration tests.

#![allow(clippy::style)]

pub use mcx_syntax::build;
pub mod machine;

pub mod utils {
    use crate::machine::Machine;
    use mcx_driver::{Build, Conf, Driver};
    use mcx_syntax::{packed::*, typed::Definitions};

    pub fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Builds the program, insisting that every definition makes it through.
    pub fn build(definitions: &Definitions) -> Build {
        let build = Driver::new(Conf::default()).build(definitions);
        for (name, err) in &build.errors {
            eprintln!("{}: {}", name, err);
        }
        assert!(build.is_ok(), "the program failed to build");
        build
    }

    /// Runs `main::<name>` on an argument already laid out on the stacks.
    pub fn run(build: &Build, name: &str, args: &[(StackKind, Nbt)]) -> Machine {
        let mut machine = Machine::new(&build.definitions).with_prelude("minecraft");
        for (kind, value) in args {
            machine.push(*kind, value.clone());
        }
        let location = ResourceLocation::new("minecraft", format!("main/{}", name));
        if let Err(err) = machine.call(&location) {
            panic!("{} failed: {}", location, err);
        }
        machine
    }
}

/// Builds the program and checks what one function leaves on the stacks.
#[macro_export]
macro_rules! runs_to {
    ($name:ident, $program:expr, $entry:expr, [$($arg:expr),*], $kind:expr, $expected:expr) => {
        #[test]
        fn $name() {
            $crate::utils::init();
            let build = $crate::utils::build(&$program);
            let machine = $crate::utils::run(&build, $entry, &[$($arg),*]);
            assert_eq!(machine.stack($kind), &[$expected]);
            assert_eq!(machine.depth(), 1, "only the result is left");
        }
    };
}
