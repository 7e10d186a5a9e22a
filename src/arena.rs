// pylex - an incremental, versioned lexer for Python source code.
// Copyright (C) 2025 The pylex authors.
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later
// version.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along with
// this program.  If not, see <http://www.gnu.org/licenses/>.

//! Slot arena backing token and line storage.
//!
//! Tokens and lines link to each other with handles instead of pointers, so
//! unlinking and freeing a slot turns any stale handle lookup into a `None`
//! rather than a use after free.

/// Vec-backed arena with a free list.  Handles are plain `u32` slot indices;
/// the typed wrappers live with the containers that use them.
#[derive(Debug)]
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<u32>,
}

// derived Default would demand T: Default
impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn alloc(&mut self, value: T) -> u32 {
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx as usize] = Some(value);
                idx
            }
            None => {
                self.slots.push(Some(value));
                (self.slots.len() - 1) as u32
            }
        }
    }

    /// Frees a slot, returning its value.  Freeing an empty slot is a caller
    /// bookkeeping bug.
    pub(crate) fn free(&mut self, idx: u32) -> T {
        let value = self.slots[idx as usize]
            .take()
            .unwrap_or_else(|| panic!("arena slot {idx} already freed"));
        self.free.push(idx);
        value
    }

    pub(crate) fn get(&self, idx: u32) -> Option<&T> {
        self.slots.get(idx as usize).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, idx: u32) -> Option<&mut T> {
        self.slots.get_mut(idx as usize).and_then(Option::as_mut)
    }

    /// Number of live slots.
    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}

#[cfg(test)]
mod test {
    use super::Arena;

    #[test]
    fn test_alloc_free_reuse() {
        let mut arena = Arena::new();
        let a = arena.alloc("a");
        let b = arena.alloc("b");
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(a), Some(&"a"));
        assert_eq!(arena.free(a), "a");
        assert_eq!(arena.get(a), None);
        assert_eq!(arena.len(), 1);
        let c = arena.alloc("c");
        assert_eq!(c, a, "freed slot is reused");
        assert_eq!(arena.get(b), Some(&"b"));
        assert_eq!(arena.get(c), Some(&"c"));
    }

    #[test]
    #[should_panic(expected = "already freed")]
    fn test_double_free_panics() {
        let mut arena = Arena::new();
        let a = arena.alloc(1u32);
        arena.free(a);
        arena.free(a);
    }
}
