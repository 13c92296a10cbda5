use std::cell::RefCell;

/// A compute-once cell holding either a suspended computation or its result.
///
/// `force_with` runs the suspension at most once on success and hands out clones
/// of the cached result afterwards. A computation that fails is put back so a
/// later `force_with` may retry it. Re-entering the cell while it is being forced
/// is reported through `on_cycle` instead of panicking on a double borrow.
pub struct Memo<S, T> {
    state: RefCell<MemoState<S, T>>,
}

enum MemoState<S, T> {
    Suspended(S),
    Forcing,
    Forced(T),
}

impl<S, T> Memo<S, T> {
    pub fn suspended(suspension: S) -> Self {
        Self { state: RefCell::new(MemoState::Suspended(suspension)) }
    }
    pub fn forced(value: T) -> Self {
        Self { state: RefCell::new(MemoState::Forced(value)) }
    }
    pub fn is_forced(&self) -> bool {
        matches!(&*self.state.borrow(), MemoState::Forced(_))
    }
}

impl<S: Clone, T: Clone> Memo<S, T> {
    /// Get the cached value, or run `compute` on the suspension and cache its result.
    pub fn force_with<E>(
        &self, compute: impl FnOnce(S) -> Result<T, E>, on_cycle: impl FnOnce() -> E,
    ) -> Result<T, E> {
        if let MemoState::Forced(value) = &*self.state.borrow() {
            return Ok(value.clone());
        }
        let state = std::mem::replace(&mut *self.state.borrow_mut(), MemoState::Forcing);
        match state {
            | MemoState::Forced(_) => unreachable!(),
            | MemoState::Forcing => Err(on_cycle()),
            | MemoState::Suspended(suspension) => match compute(suspension.clone()) {
                | Ok(value) => {
                    *self.state.borrow_mut() = MemoState::Forced(value.clone());
                    Ok(value)
                }
                | Err(err) => {
                    *self.state.borrow_mut() = MemoState::Suspended(suspension);
                    Err(err)
                }
            },
        }
    }
    /// Peek at the cached value without forcing.
    pub fn get(&self) -> Option<T> {
        match &*self.state.borrow() {
            | MemoState::Forced(value) => Some(value.clone()),
            | MemoState::Suspended(_) | MemoState::Forcing => None,
        }
    }
}

impl<S, T: std::fmt::Debug> std::fmt::Debug for Memo<S, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &*self.state.borrow() {
            | MemoState::Suspended(_) => f.write_str("<suspended>"),
            | MemoState::Forcing => f.write_str("<forcing>"),
            | MemoState::Forced(value) => value.fmt(f),
        }
    }
}
