use mcx_syntax::DefinitionLocation;

/// The well-known definition every application of a function value calls.
pub fn dispatch() -> DefinitionLocation {
    DefinitionLocation::new(["mcx"], "dispatch")
}

/// Every closure body lifted so far; the index of an entry is the runtime
/// tag of its closures.
#[derive(Clone, Debug, Default)]
pub struct FunctionTable {
    closures: Vec<DefinitionLocation>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn len(&self) -> usize {
        self.closures.len()
    }
    pub fn is_empty(&self) -> bool {
        self.closures.is_empty()
    }
    pub fn get(&self, tag: usize) -> Option<&DefinitionLocation> {
        self.closures.get(tag)
    }
    /// `(tag, body)` pairs in tag order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &DefinitionLocation)> {
        self.closures.iter().enumerate()
    }
    pub(crate) fn commit(&mut self, closures: Vec<DefinitionLocation>) {
        self.closures.extend(closures);
    }
}
