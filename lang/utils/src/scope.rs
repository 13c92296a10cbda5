//! Scopes are ordered, append-only sequences of bindings indexed by level.
//!
//! Entering a binder region appends; leaving it truncates back to the length
//! observed on entry. Nothing is ever removed from the middle.

#[derive(Clone, Debug)]
pub struct Scope<T>(Vec<T>);

impl<T> Scope<T> {
    pub fn new() -> Self {
        Scope(Vec::new())
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    /// Append a binding; its level is the length before the call.
    pub fn bind(&mut self, item: T) -> usize {
        self.0.push(item);
        self.0.len() - 1
    }
    pub fn get(&self, level: usize) -> Option<&T> {
        self.0.get(level)
    }
    /// The level of the innermost binding satisfying `pred`.
    pub fn position_last(&self, pred: impl Fn(&T) -> bool) -> Option<usize> {
        self.0.iter().rposition(pred)
    }
    /// Run `f`, then drop every binding `f` appended.
    pub fn restoring<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = self.0.len();
        let res = f(self);
        self.0.truncate(saved);
        res
    }
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }
}

impl<T> Default for Scope<T> {
    fn default() -> Self {
        Scope::new()
    }
}

impl<T> FromIterator<T> for Scope<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Scope(iter.into_iter().collect())
    }
}

impl<'a, T> IntoIterator for &'a Scope<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
