//! # Down Fill Allocation Calculation
//!
//! Distributes a total fill weight across every panel and size of a garment,
//! proportionally to sewing area, normalized against one selected base size.
//!
//! For base column `b`, input weight `W` and a valid panel `p` with quantity
//! `q_p` and per-size areas `a[p][s]`:
//!
//! ```text
//! total_base_area = Σ_p (q_p × a[p][b])
//! per_piece(p, s) = (W / total_base_area) × (q_p × a[p][s]) / q_p
//! column_total(s) = Σ_p per_piece(p, s) × q_p
//! ```
//!
//! The division by `q_p` makes each value the weight of a single piece; the
//! column totals multiply back by quantity. The base column total therefore
//! equals `W` whenever `total_base_area > 0`.
//!
//! ## Example
//!
//! ```rust
//! use down_core::allocation::{calculate, AllocationInput};
//! use down_core::grid::PanelRow;
//!
//! let input = AllocationInput {
//!     sizes: vec!["M".to_string(), "L".to_string()],
//!     panels: vec![PanelRow {
//!         name: "BODY".to_string(),
//!         quantity: "2".to_string(),
//!         areas: vec!["10".to_string(), "5".to_string()],
//!     }],
//!     base_size: "M".to_string(),
//!     down_weight_g: 100.0,
//!     garment_weight_g: 0.0,
//! };
//!
//! let result = calculate(&input).unwrap();
//! assert!((result.panels[0].down_per_piece_g[1] - 25.0).abs() < 1e-9);
//! assert!((result.down_totals_g[0] - 100.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{AllocError, AllocResult};
use crate::grid::PanelRow;
use crate::parse;

/// Input snapshot for one allocation run.
///
/// Quantity and area cells stay as entered; lenient parsing happens inside
/// [`calculate`]. A panel participates only when its quantity parses as an
/// integer ≥ 1 — everything else on the row is display text.
///
/// ## JSON Example
///
/// ```json
/// {
///   "sizes": ["S", "M", "L"],
///   "panels": [
///     { "name": "BODY", "quantity": "2", "areas": ["9.5", "10", "10.5"] },
///     { "name": "SLEEVE", "quantity": "2", "areas": ["4", "4.25", "4.5"] }
///   ],
///   "base_size": "M",
///   "down_weight_g": 150.0,
///   "garment_weight_g": 480.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationInput {
    /// Size column headers, in column order (entries may be empty)
    pub sizes: Vec<String>,

    /// Panel rows, in row order
    pub panels: Vec<PanelRow>,

    /// The normalization base; must match a non-empty size header
    pub base_size: String,

    /// Total down weight to distribute, grams
    pub down_weight_g: f64,

    /// Total garment weight to distribute, grams; 0 disables garment rows
    pub garment_weight_g: f64,
}

impl AllocationInput {
    /// Validate input parameters.
    pub fn validate(&self) -> AllocResult<()> {
        if self.base_size.is_empty() {
            return Err(AllocError::missing_field("base_size"));
        }
        if self.base_column().is_none() {
            return Err(AllocError::size_not_found(self.base_size.clone()));
        }
        for (field, grams) in [
            ("down_weight_g", self.down_weight_g),
            ("garment_weight_g", self.garment_weight_g),
        ] {
            if !grams.is_finite() || grams < 0.0 {
                return Err(AllocError::invalid_input(
                    field,
                    grams.to_string(),
                    "Weight must be a non-negative number",
                ));
            }
        }
        for (row, panel) in self.panels.iter().enumerate() {
            if panel.areas.len() != self.sizes.len() {
                return Err(AllocError::invalid_input(
                    format!("panels[{}].areas", row),
                    panel.areas.len().to_string(),
                    format!("Expected one area cell per size column ({})", self.sizes.len()),
                ));
            }
        }
        Ok(())
    }

    /// Column index of the base size.
    pub fn base_column(&self) -> Option<usize> {
        if self.base_size.is_empty() {
            return None;
        }
        self.sizes.iter().position(|s| *s == self.base_size)
    }
}

/// Allocation for one valid panel row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelAllocation {
    /// Row index in the input grid
    pub row: usize,

    /// Panel name (may be empty)
    pub name: String,

    /// Parsed quantity per garment
    pub quantity: u32,

    /// Down grams for a single piece, per size column
    pub down_per_piece_g: Vec<f64>,

    /// Garment grams for a single piece, per size column
    pub garment_per_piece_g: Vec<f64>,
}

/// Results from an allocation run.
///
/// Panels with an invalid quantity are absent; `row` ties each entry back to
/// the input grid. All per-piece values are 0 when `total_base_area` is 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationResult {
    /// Size column headers, echoed from the input
    pub sizes: Vec<String>,

    /// Column index of the base size (for highlighting)
    pub base_column: usize,

    /// Σ quantity × base-size area over valid panels
    pub total_base_area: f64,

    /// Echoed input weight, grams
    pub down_weight_g: f64,

    /// Echoed input weight, grams
    pub garment_weight_g: f64,

    /// One entry per valid panel, in row order
    pub panels: Vec<PanelAllocation>,

    /// Per-size down totals (per-piece × quantity summed over panels)
    pub down_totals_g: Vec<f64>,

    /// Per-size garment totals; all 0 when `garment_weight_g` is 0
    pub garment_totals_g: Vec<f64>,
}

impl AllocationResult {
    /// True when a distribution was actually computed.
    pub fn has_distribution(&self) -> bool {
        self.total_base_area > 0.0
    }

    /// True when garment rows carry values worth rendering.
    pub fn has_garment_weights(&self) -> bool {
        self.garment_weight_g > 0.0 && self.has_distribution()
    }

    /// Down total of the base column; equals the input weight whenever a
    /// distribution was computed.
    pub fn base_down_total_g(&self) -> f64 {
        self.down_totals_g[self.base_column]
    }
}

/// Run the allocation.
///
/// This is a pure function of its input snapshot. Unparseable area cells
/// count as zero; rows whose quantity does not parse to an integer ≥ 1 are
/// excluded entirely, including from `total_base_area`.
///
/// # Errors
///
/// * `MissingField` / `SizeNotFound` - no usable base size
/// * `InvalidInput` - negative or non-finite weight, ragged panel row
pub fn calculate(input: &AllocationInput) -> AllocResult<AllocationResult> {
    input.validate()?;

    let base_column = input
        .base_column()
        .ok_or_else(|| AllocError::size_not_found(input.base_size.clone()))?;
    let size_count = input.sizes.len();

    // ===== Denominator =====
    let mut total_base_area = 0.0;
    for panel in &input.panels {
        if let Some(qty) = valid_quantity(panel) {
            total_base_area += qty as f64 * parse::number(&panel.areas[base_column]);
        }
    }

    // ===== Per-panel distribution =====
    let mut panels = Vec::new();
    let mut down_totals_g = vec![0.0; size_count];
    let mut garment_totals_g = vec![0.0; size_count];

    for (row, panel) in input.panels.iter().enumerate() {
        let quantity = match valid_quantity(panel) {
            Some(q) => q,
            None => continue,
        };
        let qty = quantity as f64;

        let mut down_per_piece_g = vec![0.0; size_count];
        let mut garment_per_piece_g = vec![0.0; size_count];

        // A panel with no base-size area receives nothing at any size
        let base_sewing_area = qty * parse::number(&panel.areas[base_column]);
        if total_base_area > 0.0 && base_sewing_area > 0.0 {
            for (col, area_text) in panel.areas.iter().enumerate() {
                let sewing_area = qty * parse::number(area_text);
                if sewing_area <= 0.0 {
                    continue;
                }
                down_per_piece_g[col] = (input.down_weight_g / total_base_area) * sewing_area / qty;
                if input.garment_weight_g > 0.0 {
                    garment_per_piece_g[col] =
                        (input.garment_weight_g / total_base_area) * sewing_area / qty;
                }
            }
        }

        for col in 0..size_count {
            down_totals_g[col] += down_per_piece_g[col] * qty;
            garment_totals_g[col] += garment_per_piece_g[col] * qty;
        }

        panels.push(PanelAllocation {
            row,
            name: panel.name.clone(),
            quantity,
            down_per_piece_g,
            garment_per_piece_g,
        });
    }

    Ok(AllocationResult {
        sizes: input.sizes.clone(),
        base_column,
        total_base_area,
        down_weight_g: input.down_weight_g,
        garment_weight_g: input.garment_weight_g,
        panels,
        down_totals_g,
        garment_totals_g,
    })
}

/// Quantity of a participating panel: digits parsing to an integer ≥ 1.
fn valid_quantity(panel: &PanelRow) -> Option<u32> {
    parse::quantity(&panel.quantity).filter(|q| *q >= 1)
}

/// Format a per-piece weight cell: two decimals, empty when zero.
pub fn format_weight(grams: f64) -> String {
    if grams == 0.0 {
        String::new()
    } else {
        format!("{:.2}", grams)
    }
}

/// Format a column total: whole grams.
pub fn format_total(grams: f64) -> String {
    format!("{:.0}", grams)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel(name: &str, quantity: &str, areas: &[&str]) -> PanelRow {
        PanelRow {
            name: name.to_string(),
            quantity: quantity.to_string(),
            areas: areas.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Two-panel jacket over three sizes, base M, down 150 g
    fn test_input() -> AllocationInput {
        AllocationInput {
            sizes: vec!["S".to_string(), "M".to_string(), "L".to_string()],
            panels: vec![
                panel("BODY", "2", &["9.5", "10", "10.5"]),
                panel("SLEEVE", "2", &["4", "5", "6"]),
            ],
            base_size: "M".to_string(),
            down_weight_g: 150.0,
            garment_weight_g: 0.0,
        }
    }

    #[test]
    fn test_single_panel_worked_example() {
        // Base-size area 10, qty 2, down weight 100: a size with area 5
        // receives 100 * (2*5) / (10*2) / 2 = 25 per piece
        let input = AllocationInput {
            sizes: vec!["M".to_string(), "L".to_string()],
            panels: vec![panel("BODY", "2", &["10", "5"])],
            base_size: "M".to_string(),
            down_weight_g: 100.0,
            garment_weight_g: 0.0,
        };
        let result = calculate(&input).unwrap();

        assert!((result.total_base_area - 20.0).abs() < 1e-9);
        assert!((result.panels[0].down_per_piece_g[0] - 50.0).abs() < 1e-9);
        assert!((result.panels[0].down_per_piece_g[1] - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_base_column_total_equals_input_weight() {
        let result = calculate(&test_input()).unwrap();

        // total_base_area = 2*10 + 2*5 = 30
        assert!((result.total_base_area - 30.0).abs() < 1e-9);
        assert!((result.base_down_total_g() - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_column_totals_multiply_back_by_quantity() {
        let result = calculate(&test_input()).unwrap();

        for col in 0..result.sizes.len() {
            let expected: f64 = result
                .panels
                .iter()
                .map(|p| p.down_per_piece_g[col] * p.quantity as f64)
                .sum();
            assert!((result.down_totals_g[col] - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_distribution_proportional_to_area() {
        let result = calculate(&test_input()).unwrap();
        let body = &result.panels[0];

        // 150/30 = 5 grams per unit area
        assert!((body.down_per_piece_g[0] - 47.5).abs() < 1e-9);
        assert!((body.down_per_piece_g[1] - 50.0).abs() < 1e-9);
        assert!((body.down_per_piece_g[2] - 52.5).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_quantity_rows_fully_excluded() {
        let mut input = test_input();
        input.panels.push(panel("HOOD", "", &["3", "3", "3"]));
        input.panels.push(panel("POCKET", "x", &["2", "2", "2"]));
        input.panels.push(panel("COLLAR", "0", &["1", "1", "1"]));

        let result = calculate(&input).unwrap();

        // Same denominator as without the junk rows, identity intact
        assert!((result.total_base_area - 30.0).abs() < 1e-9);
        assert!((result.base_down_total_g() - 150.0).abs() < 1e-9);
        assert_eq!(result.panels.len(), 2);
        assert_eq!(result.panels[0].row, 0);
        assert_eq!(result.panels[1].row, 1);
    }

    #[test]
    fn test_unparseable_area_counts_as_zero() {
        let mut input = test_input();
        input.panels[1].areas[0] = "n/a".to_string();

        let result = calculate(&input).unwrap();
        assert_eq!(result.panels[1].down_per_piece_g[0], 0.0);
        // Other sizes still receive weight
        assert!(result.panels[1].down_per_piece_g[2] > 0.0);
    }

    #[test]
    fn test_zero_total_base_area_yields_zeros() {
        let mut input = test_input();
        for p in &mut input.panels {
            p.areas[1] = String::new();
        }

        let result = calculate(&input).unwrap();
        assert!(!result.has_distribution());
        assert_eq!(result.panels.len(), 2);
        assert!(result.panels.iter().all(|p| p.down_per_piece_g.iter().all(|v| *v == 0.0)));
        assert!(result.down_totals_g.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_panel_without_base_area_gets_nothing() {
        let mut input = test_input();
        input.panels[1].areas[1] = "0".to_string();

        let result = calculate(&input).unwrap();
        let sleeve = &result.panels[1];
        assert!(sleeve.down_per_piece_g.iter().all(|v| *v == 0.0));

        // The body still receives the full weight at the base size
        assert!((result.base_down_total_g() - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_garment_weight_disabled_at_zero() {
        let result = calculate(&test_input()).unwrap();
        assert!(!result.has_garment_weights());
        assert!(result.panels.iter().all(|p| p.garment_per_piece_g.iter().all(|v| *v == 0.0)));
        assert!(result.garment_totals_g.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_garment_weight_follows_same_ratios() {
        let mut input = test_input();
        input.garment_weight_g = 480.0;

        let result = calculate(&input).unwrap();
        assert!(result.has_garment_weights());
        assert!((result.garment_totals_g[result.base_column] - 480.0).abs() < 1e-9);

        let body = &result.panels[0];
        let ratio = input.garment_weight_g / input.down_weight_g;
        for col in 0..result.sizes.len() {
            assert!((body.garment_per_piece_g[col] - body.down_per_piece_g[col] * ratio).abs() < 1e-9);
        }
    }

    #[test]
    fn test_unknown_base_size_rejected() {
        let mut input = test_input();
        input.base_size = "XXL".to_string();
        assert_eq!(
            calculate(&input).unwrap_err(),
            AllocError::size_not_found("XXL")
        );

        input.base_size = String::new();
        assert_eq!(
            calculate(&input).unwrap_err().error_code(),
            "MISSING_FIELD"
        );
    }

    #[test]
    fn test_bad_weights_rejected() {
        let mut input = test_input();
        input.down_weight_g = -10.0;
        assert_eq!(calculate(&input).unwrap_err().error_code(), "INVALID_INPUT");

        let mut input = test_input();
        input.garment_weight_g = f64::NAN;
        assert!(calculate(&input).is_err());
    }

    #[test]
    fn test_ragged_row_rejected() {
        let mut input = test_input();
        input.panels[0].areas.pop();
        assert_eq!(calculate(&input).unwrap_err().error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_serialization_roundtrip() {
        let input = test_input();
        let json = serde_json::to_string_pretty(&input).unwrap();
        let roundtrip: AllocationInput = serde_json::from_str(&json).unwrap();
        assert_eq!(input, roundtrip);

        let result = calculate(&input).unwrap();
        let json = serde_json::to_string_pretty(&result).unwrap();
        assert!(json.contains("down_totals_g"));
        let roundtrip: AllocationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, roundtrip);
    }

    #[test]
    fn test_format_weight_cells() {
        assert_eq!(format_weight(0.0), "");
        assert_eq!(format_weight(25.0), "25.00");
        assert_eq!(format_weight(47.125), "47.12");
        assert_eq!(format_weight(0.004), "0.00");
    }

    #[test]
    fn test_format_totals_round_half_to_even() {
        assert_eq!(format_total(0.0), "0");
        assert_eq!(format_total(149.6), "150");
        assert_eq!(format_total(2.5), "2");
        assert_eq!(format_total(3.5), "4");
    }
}
