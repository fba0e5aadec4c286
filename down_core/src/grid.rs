//! # Sheet Grid
//!
//! The editable table at the heart of the form: one row per garment panel,
//! one column per size, every cell stored as the text the user entered.
//! Numeric meaning is applied lazily via [`crate::parse`], so a half-filled
//! grid is always a legal state.
//!
//! Grid coordinates for block pastes mirror the on-screen table: row 0 is
//! the size header row, data rows start at 1; column 0 is the panel name,
//! column 1 the quantity, columns 2.. the size areas.
//!
//! ## Example
//!
//! ```rust
//! use down_core::grid::SheetGrid;
//!
//! let mut grid = SheetGrid::default();
//! grid.set_size_name(0, "s").unwrap();
//! grid.set_panel_name(0, "body").unwrap();
//! grid.set_quantity(0, "2").unwrap();
//! grid.set_area(0, 0, "10.5").unwrap();
//!
//! assert_eq!(grid.sizes()[0], "S");
//! assert_eq!(grid.area_totals()[0], 21.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::clipboard;
use crate::errors::{AllocError, AllocResult};
use crate::parse;

/// Panel rows in a fresh grid
pub const DEFAULT_PANEL_ROWS: usize = 10;

/// Size columns in a fresh grid
pub const DEFAULT_SIZE_COLUMNS: usize = 8;

/// Largest quantity a cell accepts
pub const MAX_QUANTITY: u32 = 9;

/// Largest sewing area a cell accepts
pub const MAX_AREA: f64 = 9999.0;

/// Decimal places allowed in an area cell
pub const AREA_DECIMALS: usize = 2;

/// One garment panel row: name, quantity, and one area cell per size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelRow {
    /// Panel name, stored trimmed and uppercased (e.g., "BODY", "SLEEVE")
    pub name: String,

    /// Quantity per garment, as entered
    pub quantity: String,

    /// Sewing area per size column, as entered
    pub areas: Vec<String>,
}

impl PanelRow {
    fn empty(size_count: usize) -> Self {
        PanelRow {
            name: String::new(),
            quantity: String::new(),
            areas: vec![String::new(); size_count],
        }
    }

    /// True when every cell of the row is empty
    pub fn is_blank(&self) -> bool {
        self.name.is_empty()
            && self.quantity.is_empty()
            && self.areas.iter().all(|a| a.is_empty())
    }
}

/// Outcome of a block paste.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PasteReport {
    /// Cells written
    pub applied: usize,
    /// Cells rejected by the per-column rules
    pub skipped: usize,
    /// Panel rows added to fit the block
    pub added_rows: usize,
    /// Size columns added to fit the block
    pub added_columns: usize,
}

/// The editable panel/size grid.
///
/// Invariants: every row has exactly one area cell per size column, and
/// non-empty size names are unique. Mutations that would break either are
/// rejected; everything else is stored as entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetGrid {
    sizes: Vec<String>,
    panels: Vec<PanelRow>,
}

impl Default for SheetGrid {
    fn default() -> Self {
        SheetGrid::new(DEFAULT_PANEL_ROWS, DEFAULT_SIZE_COLUMNS)
    }
}

impl SheetGrid {
    /// Create an empty grid with the given dimensions.
    pub fn new(panel_rows: usize, size_columns: usize) -> Self {
        SheetGrid {
            sizes: vec![String::new(); size_columns],
            panels: (0..panel_rows).map(|_| PanelRow::empty(size_columns)).collect(),
        }
    }

    /// Size column headers, in column order. Entries may be empty.
    pub fn sizes(&self) -> &[String] {
        &self.sizes
    }

    /// Panel rows, in row order.
    pub fn panels(&self) -> &[PanelRow] {
        &self.panels
    }

    pub fn size_count(&self) -> usize {
        self.sizes.len()
    }

    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }

    /// Named size columns, in column order (what a base-size selector
    /// offers).
    pub fn available_sizes(&self) -> Vec<String> {
        self.sizes.iter().filter(|s| !s.is_empty()).cloned().collect()
    }

    /// Find the column of a named size.
    pub fn size_column(&self, name: &str) -> Option<usize> {
        if name.is_empty() {
            return None;
        }
        self.sizes.iter().position(|s| s == name)
    }

    /// Rename a size column. Names are trimmed and uppercased; a non-empty
    /// name that collides with another column is rejected and the column
    /// keeps its previous name.
    pub fn set_size_name(&mut self, col: usize, name: &str) -> AllocResult<()> {
        self.check_size_col(col)?;
        let normalized = name.trim().to_uppercase();
        if !normalized.is_empty() {
            let duplicate = self
                .sizes
                .iter()
                .enumerate()
                .any(|(i, s)| i != col && *s == normalized);
            if duplicate {
                return Err(AllocError::duplicate_size(normalized));
            }
        }
        self.sizes[col] = normalized;
        Ok(())
    }

    /// Set a panel name (trimmed, uppercased).
    pub fn set_panel_name(&mut self, row: usize, name: &str) -> AllocResult<()> {
        self.check_panel_row(row)?;
        self.panels[row].name = name.trim().to_uppercase();
        Ok(())
    }

    /// Set a quantity cell. The text is stored as entered (trimmed);
    /// interpretation happens at computation time.
    pub fn set_quantity(&mut self, row: usize, text: &str) -> AllocResult<()> {
        self.check_panel_row(row)?;
        self.panels[row].quantity = text.trim().to_string();
        Ok(())
    }

    /// Set an area cell. The text is stored as entered (trimmed).
    pub fn set_area(&mut self, row: usize, col: usize, text: &str) -> AllocResult<()> {
        self.check_panel_row(row)?;
        self.check_size_col(col)?;
        self.panels[row].areas[col] = text.trim().to_string();
        Ok(())
    }

    /// Per-size sums of `quantity × area` for the entry table's TOTAL row.
    ///
    /// A quantity cell outside 1..=9 counts as 1 and an unparseable area as
    /// 0, so the row stays meaningful while the grid is half-filled.
    pub fn area_totals(&self) -> Vec<f64> {
        let mut totals = vec![0.0; self.sizes.len()];
        for panel in &self.panels {
            let qty = parse::quantity_or_one(&panel.quantity) as f64;
            for (col, area) in panel.areas.iter().enumerate() {
                totals[col] += qty * parse::number(area);
            }
        }
        totals
    }

    /// Resize the grid, preserving overlapping cells. New cells are empty.
    pub fn resize(&mut self, panel_rows: usize, size_columns: usize) -> AllocResult<()> {
        if panel_rows == 0 {
            return Err(AllocError::invalid_input(
                "panel_rows",
                panel_rows.to_string(),
                "Grid needs at least one panel row",
            ));
        }
        if size_columns == 0 {
            return Err(AllocError::invalid_input(
                "size_columns",
                size_columns.to_string(),
                "Grid needs at least one size column",
            ));
        }
        self.sizes.resize(size_columns, String::new());
        for panel in &mut self.panels {
            panel.areas.resize(size_columns, String::new());
        }
        if panel_rows < self.panels.len() {
            self.panels.truncate(panel_rows);
        } else {
            while self.panels.len() < panel_rows {
                self.panels.push(PanelRow::empty(size_columns));
            }
        }
        Ok(())
    }

    /// Clear everything back to the default empty grid.
    pub fn reset(&mut self) {
        *self = SheetGrid::default();
    }

    /// Paste a block of cells with its top-left corner at (`start_row`,
    /// `start_col`) in table coordinates (see module docs). The grid grows
    /// to fit; cells that fail the per-column rules are skipped and the
    /// rest of the block still applies.
    ///
    /// A single-column block aimed at the header row is transposed first,
    /// so a size list copied vertically from a spreadsheet lands across the
    /// size columns.
    pub fn paste_block(&mut self, start_row: usize, start_col: usize, block: &[Vec<String>]) -> PasteReport {
        let mut report = PasteReport::default();
        if block.is_empty() {
            return report;
        }

        let flattened;
        let block: &[Vec<String>] = if start_row == 0 {
            match clipboard::flatten_single_column(block) {
                Some(row) => {
                    flattened = vec![row];
                    &flattened
                }
                None => block,
            }
        } else {
            block
        };

        // Grow to fit the block footprint
        let last_row = start_row + block.len() - 1;
        let last_col = block
            .iter()
            .map(|row| start_col + row.len().saturating_sub(1))
            .max()
            .unwrap_or(start_col);
        if last_row >= 1 && last_row > self.panels.len() {
            report.added_rows = last_row - self.panels.len();
        }
        if last_col >= 2 && last_col - 1 > self.sizes.len() {
            report.added_columns = last_col - 1 - self.sizes.len();
        }
        let target_rows = self.panels.len() + report.added_rows;
        let target_cols = self.sizes.len() + report.added_columns;
        // Growth cannot fail: both dimensions only ever increase
        let _ = self.resize(target_rows.max(1), target_cols.max(1));

        for (r, row) in block.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if self.paste_cell(start_row + r, start_col + c, cell) {
                    report.applied += 1;
                } else {
                    report.skipped += 1;
                }
            }
        }
        report
    }

    /// Apply one pasted cell; returns whether it was written.
    fn paste_cell(&mut self, row: usize, col: usize, text: &str) -> bool {
        let text = text.trim();
        if row == 0 {
            // Header row: only size columns are editable
            if col < 2 {
                return false;
            }
            return self.set_size_name(col - 2, text).is_ok();
        }
        let panel = row - 1;
        match col {
            0 => self.set_panel_name(panel, text).is_ok(),
            1 => {
                // Pasting never clears a quantity; only 1..=9 lands
                match parse::quantity(text) {
                    Some(q) if (1..=MAX_QUANTITY).contains(&q) => {
                        self.set_quantity(panel, text).is_ok()
                    }
                    _ => false,
                }
            }
            _ => {
                // A pasted area lands when it parses as a number; the
                // 0..=9999 two-decimal rule gates typed entry only
                if text.parse::<f64>().is_err() {
                    return false;
                }
                self.set_area(panel, col - 2, text).is_ok()
            }
        }
    }

    fn check_panel_row(&self, row: usize) -> AllocResult<()> {
        if row >= self.panels.len() {
            return Err(AllocError::invalid_input(
                "row",
                row.to_string(),
                format!("Grid has {} panel rows", self.panels.len()),
            ));
        }
        Ok(())
    }

    fn check_size_col(&self, col: usize) -> AllocResult<()> {
        if col >= self.sizes.len() {
            return Err(AllocError::invalid_input(
                "column",
                col.to_string(),
                format!("Grid has {} size columns", self.sizes.len()),
            ));
        }
        Ok(())
    }
}

/// Entry rule for a quantity cell: empty, or an integer 1..=9.
pub fn quantity_cell_ok(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return true;
    }
    matches!(parse::quantity(text), Some(q) if (1..=MAX_QUANTITY).contains(&q))
}

/// Entry rule for an area cell: empty, or a number 0..=9999 with at most
/// two decimal places.
pub fn area_cell_ok(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return true;
    }
    let value = match text.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => return false,
    };
    if !(0.0..=MAX_AREA).contains(&value) {
        return false;
    }
    if let Some(dot) = text.find('.') {
        let decimals = text[dot + 1..]
            .bytes()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if decimals > AREA_DECIMALS {
            return false;
        }
    }
    true
}

/// Format a cell of the entry table's TOTAL row: two decimals always,
/// zero included.
pub fn format_area_total(total: f64) -> String {
    format!("{:.2}", total)
}
