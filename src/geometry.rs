//! Byte offsets that map the multiplexed sub-rows onto the framebuffer.
//!
//! The framebuffer stores the 16 panel rows one after another, each row being
//! `rowsize = total_panels * 4` bytes wide. A row group `s` (0..4) lights the
//! rows `s`, `s + 4`, `s + 8` and `s + 12`, so the four sub-rows of a group are
//! found at `base`, `base + row1`, `base + row2` and `base + row3` with
//! `base = rowsize * s`.
//!
//! The four sub-row shift registers are daisy-chained, which means the byte
//! for the bottom sub-row must be shifted first: every column byte `i` of a
//! group is sent as `[row3, row2, row1, row0]`.

use crate::{PANEL_ROW_BYTES, PIXELS_DOWN};

/// Number of multiplexed row groups on a panel.
pub const ROW_GROUPS: usize = 4;

/// Precomputed row-plane offsets for a given number of chained panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowPlanes {
    rowsize: usize,
    row1: usize,
    row2: usize,
    row3: usize,
}

impl RowPlanes {
    /// Compute the offsets for `total_panels` chained panels.
    #[must_use]
    pub const fn new(total_panels: usize) -> Self {
        let rowsize = total_panels * PANEL_ROW_BYTES;
        let rows_per_plane = PIXELS_DOWN / ROW_GROUPS;
        Self {
            rowsize,
            row1: rowsize * rows_per_plane,
            row2: rowsize * rows_per_plane * 2,
            row3: rowsize * rows_per_plane * 3,
        }
    }

    /// Bytes per panel row across all chained panels.
    #[must_use]
    pub const fn rowsize(&self) -> usize {
        self.rowsize
    }

    /// Offsets of the second, third and fourth sub-row of a group.
    #[must_use]
    pub const fn offsets(&self) -> (usize, usize, usize) {
        (self.row1, self.row2, self.row3)
    }

    /// Byte offset of the first sub-row for row group `state`.
    #[must_use]
    pub const fn base(&self, state: u8) -> usize {
        self.rowsize * state as usize
    }

    /// Number of bytes shifted out for one row group.
    #[must_use]
    pub const fn bytes_per_scan(&self) -> usize {
        self.rowsize * ROW_GROUPS
    }

    /// Framebuffer indices for one refresh of row group `state`, in wire order.
    ///
    /// Each item holds the four indices for column byte `i`, ordered
    /// `[base+i+row3, base+i+row2, base+i+row1, base+i]`.
    pub fn scan_indices(&self, state: u8) -> impl Iterator<Item = [usize; 4]> + '_ {
        let base = self.base(state);
        (0..self.rowsize).map(move |i| {
            let col = base + i;
            [col + self.row3, col + self.row2, col + self.row1, col]
        })
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec::Vec;

    use super::*;
    use crate::compute_buffer_size;

    #[test]
    fn test_single_panel_offsets() {
        let planes = RowPlanes::new(1);
        assert_eq!(planes.rowsize(), 4);
        assert_eq!(planes.offsets(), (16, 32, 48));
        assert_eq!(planes.bytes_per_scan(), 16);
    }

    #[test]
    fn test_offsets_match_shift_formulas() {
        for total in 1..=8 {
            let planes = RowPlanes::new(total);
            let (row1, row2, row3) = planes.offsets();
            assert_eq!(row1, total << 4);
            assert_eq!(row2, total << 5);
            assert_eq!(row3, ((total << 2) * 3) << 2);
        }
    }

    #[test]
    fn test_offsets_are_multiples_of_rowsize() {
        for total in 1..=8 {
            let planes = RowPlanes::new(total);
            let (row1, row2, row3) = planes.offsets();
            assert_eq!(row1 % planes.rowsize(), 0);
            assert_eq!(row2 % planes.rowsize(), 0);
            assert_eq!(row3 % planes.rowsize(), 0);
        }
    }

    #[test]
    fn test_base() {
        let planes = RowPlanes::new(2);
        assert_eq!(planes.base(0), 0);
        assert_eq!(planes.base(1), 8);
        assert_eq!(planes.base(3), 24);
    }

    #[test]
    fn test_scan_indices_state_zero() {
        let planes = RowPlanes::new(1);
        let indices: Vec<[usize; 4]> = planes.scan_indices(0).collect();
        assert_eq!(
            indices,
            [[48, 32, 16, 0], [49, 33, 17, 1], [50, 34, 18, 2], [51, 35, 19, 3]]
        );
    }

    #[test]
    fn test_scan_indices_state_three() {
        let planes = RowPlanes::new(1);
        let first = planes.scan_indices(3).next();
        assert_eq!(first, Some([60, 44, 28, 12]));
    }

    #[test]
    fn test_scan_covers_buffer_exactly_once() {
        for (wide, high) in [(1, 1), (2, 1), (2, 2), (3, 1)] {
            let size = compute_buffer_size(wide, high);
            let planes = RowPlanes::new(wide * high);
            let mut seen = Vec::new();
            seen.resize(size, 0u8);
            for state in 0..ROW_GROUPS as u8 {
                for group in planes.scan_indices(state) {
                    for index in group {
                        assert!(index < size);
                        seen[index] += 1;
                    }
                }
            }
            assert!(seen.iter().all(|&n| n == 1));
        }
    }
}
