/// Number of entries in the row start address table.
const ROW_TABLE_LEN: usize = 4;

/// Display geometry and the mapping from (column, row) to DDRAM address.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Geometry {
    cols: u8,
    rows: u8,
}

impl Geometry {
    pub const fn new(cols: u8, rows: u8) -> Self {
        Self { cols, rows }
    }

    pub const fn cols(&self) -> u8 {
        self.cols
    }

    pub const fn rows(&self) -> u8 {
        self.rows
    }

    /// DDRAM start address of each row. Rows 2 and 3 continue rows 0 and 1 after `cols` characters,
    /// which is how 4 line displays are wired.
    pub const fn row_offsets(&self) -> [u8; ROW_TABLE_LEN] {
        [0x00, 0x40, self.cols, 0x40u8.wrapping_add(self.cols)]
    }

    /// Clamps a zero-indexed row. Only rows strictly greater than the row count are pulled back to
    /// the last row; a row equal to the row count passes through unchanged.
    pub const fn clamp_row(&self, row: u8) -> u8 {
        if row > self.rows {
            self.rows.saturating_sub(1)
        } else {
            row
        }
    }

    /// DDRAM address for a zero-indexed column and row. The column is not range checked.
    pub fn ddram_address(&self, col: u8, row: u8) -> u8 {
        let offsets = self.row_offsets();
        let row = self.clamp_row(row) as usize;
        // rows past the table use the last entry
        let offset = offsets
            .get(row)
            .copied()
            .unwrap_or(offsets[ROW_TABLE_LEN - 1]);
        col.wrapping_add(offset)
    }
}
