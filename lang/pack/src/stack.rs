//! The compile-time picture of the runtime data stacks.
//!
//! Each stack is modelled slot by slot: a slot is either an anonymous
//! intermediate value or bound to a variable (by level). Relative indices
//! follow the target's convention, `-1` being the top.

use crate::err::*;
use mcx_syntax::packed::StackKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    Free,
    Bound(usize),
}

#[derive(Clone, Debug, Default)]
pub struct Stacks {
    slots: [Vec<Slot>; StackKind::ALL.len()],
}

impl Stacks {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn slots(&self, kind: StackKind) -> &[Slot] {
        &self.slots[kind.index()]
    }
    pub fn len(&self, kind: StackKind) -> usize {
        self.slots(kind).len()
    }
    pub fn push(&mut self, kind: StackKind) {
        self.slots[kind.index()].push(Slot::Free)
    }
    fn absolute(&self, kind: StackKind, index: i32) -> Result<usize> {
        let position = self.len(kind) as i64 + index as i64;
        if index < 0 && position >= 0 {
            Ok(position as usize)
        } else {
            Err(PackError::StackUnderflow(kind))
        }
    }
    pub fn relative(&self, kind: StackKind, position: usize) -> i32 {
        position as i32 - self.len(kind) as i32
    }
    pub fn remove(&mut self, kind: StackKind, index: i32) -> Result<Slot> {
        let position = self.absolute(kind, index)?;
        Ok(self.slots[kind.index()].remove(position))
    }
    /// The topmost anonymous slot of a kind.
    pub fn last_free(&self, kind: StackKind) -> Result<usize> {
        self.slots(kind)
            .iter()
            .rposition(|slot| *slot == Slot::Free)
            .ok_or(PackError::StackUnderflow(kind))
    }
    /// Binds the topmost anonymous slot of a kind.
    pub fn claim(&mut self, kind: StackKind, level: usize) -> Result<()> {
        let position = self.last_free(kind)?;
        self.slots[kind.index()][position] = Slot::Bound(level);
        Ok(())
    }
    /// Forgets every binding of a level; the slots stay in place.
    pub fn release(&mut self, level: usize) {
        for stack in &mut self.slots {
            for slot in stack.iter_mut().filter(|slot| **slot == Slot::Bound(level)) {
                *slot = Slot::Free;
            }
        }
    }
    /// The relative index of the `occurrence`-th of the `arity` slots a
    /// variable holds on one stack. Only the latest binding of the level
    /// counts.
    pub fn find(
        &self, kind: StackKind, level: usize, occurrence: usize, arity: usize,
    ) -> Option<i32> {
        let positions: Vec<usize> = (self.slots(kind).iter().enumerate())
            .filter(|(_, slot)| **slot == Slot::Bound(level))
            .map(|(position, _)| position)
            .collect();
        let first = positions.len().checked_sub(arity)?;
        let position = *positions.get(first + occurrence)?;
        Some(self.relative(kind, position))
    }
}
