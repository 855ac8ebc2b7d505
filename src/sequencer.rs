//! The 4-state row-group cycle.
//!
//! | state | A | B | rows lit     |
//! |-------|---|---|--------------|
//! | 0     | 0 | 0 | 1, 5, 9, 13  |
//! | 1     | 1 | 0 | 2, 6, 10, 14 |
//! | 2     | 0 | 1 | 3, 7, 11, 15 |
//! | 3     | 1 | 1 | 4, 8, 12, 16 |

use bitfield::bitfield;

use crate::geometry::ROW_GROUPS;

bitfield! {
    /// Levels of the two row-select lines.
    ///
    /// The bit layout is as follows:
    /// - Bit 1: Row-select B
    /// - Bit 0: Row-select A
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[repr(transparent)]
    pub struct RowSelect(u8);
    impl Debug;
    /// Level of row-select line A
    pub a, set_a: 0;
    /// Level of row-select line B
    pub b, set_b: 1;
}

impl RowSelect {
    /// Line levels that light row group `state`.
    #[must_use]
    pub const fn for_state(state: u8) -> Self {
        Self(state & 0b11)
    }

    /// The row group these lines select.
    #[must_use]
    pub const fn state(&self) -> u8 {
        self.0 & 0b11
    }

    /// The (1-based) panel rows lit by this selection.
    #[must_use]
    pub const fn rows(&self) -> [u8; 4] {
        let first = self.state() + 1;
        [first, first + 4, first + 8, first + 12]
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for RowSelect {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "RowSelect {{ a: {}, b: {} }}", self.a(), self.b());
    }
}

/// Cyclic row-group sequencer, `0 → 1 → 2 → 3 → 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowSequencer {
    state: u8,
}

impl RowSequencer {
    /// Create a sequencer at row group 0.
    #[must_use]
    pub const fn new() -> Self {
        Self { state: 0 }
    }

    /// Current row group.
    #[must_use]
    pub const fn state(&self) -> u8 {
        self.state
    }

    /// Row-select levels for the current row group.
    #[must_use]
    pub const fn select(&self) -> RowSelect {
        RowSelect::for_state(self.state)
    }

    /// Rows lit by the current row group.
    #[must_use]
    pub const fn rows(&self) -> [u8; 4] {
        self.select().rows()
    }

    /// Move to the next row group and return its row-select levels.
    pub fn advance(&mut self) -> RowSelect {
        self.state = (self.state + 1) % ROW_GROUPS as u8;
        self.select()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for RowSequencer {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "RowSequencer {{ state: {} }}", self.state);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec::Vec;

    use super::*;

    #[test]
    fn test_initial_state() {
        let seq = RowSequencer::new();
        assert_eq!(seq.state(), 0);
        assert_eq!(seq.rows(), [1, 5, 9, 13]);
        assert_eq!(RowSequencer::default(), seq);
    }

    #[test]
    fn test_row_select_table() {
        let expected = [(false, false), (true, false), (false, true), (true, true)];
        for (state, (a, b)) in expected.into_iter().enumerate() {
            let select = RowSelect::for_state(state as u8);
            assert_eq!((select.a(), select.b()), (a, b), "state {state}");
        }
    }

    #[test]
    fn test_row_select_rows() {
        assert_eq!(RowSelect::for_state(0).rows(), [1, 5, 9, 13]);
        assert_eq!(RowSelect::for_state(1).rows(), [2, 6, 10, 14]);
        assert_eq!(RowSelect::for_state(2).rows(), [3, 7, 11, 15]);
        assert_eq!(RowSelect::for_state(3).rows(), [4, 8, 12, 16]);
    }

    #[test]
    fn test_row_select_setters() {
        let mut select = RowSelect::default();
        select.set_b(true);
        assert_eq!(select.state(), 2);
        select.set_a(true);
        assert_eq!(select.state(), 3);
        assert_eq!(select, RowSelect::for_state(3));
    }

    #[test]
    fn test_advance_returns_new_state_select() {
        let mut seq = RowSequencer::new();
        assert_eq!(seq.advance(), RowSelect::for_state(1));
        assert_eq!(seq.advance(), RowSelect::for_state(2));
        assert_eq!(seq.advance(), RowSelect::for_state(3));
        assert_eq!(seq.advance(), RowSelect::for_state(0));
    }

    #[test]
    fn test_period_four_without_drift() {
        let mut seq = RowSequencer::new();
        let n = 400;
        let mut visited = Vec::with_capacity(n);
        for _ in 0..n {
            visited.push(seq.state());
            seq.advance();
        }
        let expected: Vec<u8> = [0u8, 1, 2, 3].iter().copied().cycle().take(n).collect();
        assert_eq!(visited, expected);
        assert_eq!(seq.state(), 0);
    }
}
