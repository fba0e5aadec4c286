//! # Sheet Data Structures
//!
//! The `Sheet` struct is the root container for one allocation form.
//! Sheets serialize to `.daf` files as human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! Sheet
//! ├── meta: SheetMetadata (version, timestamps)
//! ├── order: OrderInfo (date, buyer, style, season, stage)
//! ├── weights: FillWeights (down, garment, approx grams)
//! ├── base_size: Option<String>
//! └── grid: SheetGrid (panel rows × size columns)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use down_core::sheet::Sheet;
//!
//! let mut sheet = Sheet::new();
//! sheet.grid.set_size_name(0, "M").unwrap();
//! sheet.set_base_size(Some("M")).unwrap();
//!
//! let json = serde_json::to_string_pretty(&sheet).unwrap();
//! assert!(json.contains("\"base_size\": \"M\""));
//! ```

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::allocation::AllocationInput;
use crate::errors::{AllocError, AllocResult};
use crate::grid::SheetGrid;

/// Current schema version for .daf files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root sheet container.
///
/// This is the top-level struct that gets serialized to `.daf` files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    /// Sheet metadata (version, timestamps)
    pub meta: SheetMetadata,

    /// Order header fields shown at the top of the form
    pub order: OrderInfo,

    /// Input weights in grams
    pub weights: FillWeights,

    /// Selected base size; always one of `grid.available_sizes()` or `None`
    pub base_size: Option<String>,

    /// The editable panel/size grid
    pub grid: SheetGrid,
}

impl Sheet {
    /// Create a fresh sheet: today's date, empty 10×8 grid, zero weights.
    pub fn new() -> Self {
        let now = Utc::now();
        Sheet {
            meta: SheetMetadata {
                version: SCHEMA_VERSION.to_string(),
                created: now,
                modified: now,
            },
            order: OrderInfo::default(),
            weights: FillWeights::default(),
            base_size: None,
            grid: SheetGrid::default(),
        }
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    /// Set the buyer name (stored uppercased).
    pub fn set_buyer(&mut self, buyer: &str) {
        self.order.buyer = buyer.trim().to_uppercase();
        self.touch();
    }

    /// Set the style number (stored uppercased).
    pub fn set_style_number(&mut self, style_number: &str) {
        self.order.style_number = style_number.trim().to_uppercase();
        self.touch();
    }

    /// Select the base size, or clear it with `None`.
    ///
    /// The name must be one of the grid's named size columns.
    pub fn set_base_size(&mut self, name: Option<&str>) -> AllocResult<()> {
        match name {
            None => {
                self.base_size = None;
            }
            Some(raw) => {
                let normalized = raw.trim().to_uppercase();
                if self.grid.size_column(&normalized).is_none() {
                    return Err(AllocError::size_not_found(normalized));
                }
                self.base_size = Some(normalized);
            }
        }
        self.touch();
        Ok(())
    }

    /// Drop the base-size selection if its column was renamed or removed.
    ///
    /// Returns `true` when the selection was cleared.
    pub fn reconcile_base_size(&mut self) -> bool {
        let stale = self
            .base_size
            .as_deref()
            .is_some_and(|name| self.grid.size_column(name).is_none());
        if stale {
            self.base_size = None;
            self.touch();
        }
        stale
    }

    /// Reset the form: fresh header, zero weights, no base size, default
    /// grid. The creation timestamp is preserved.
    pub fn reset(&mut self) {
        self.order = OrderInfo::default();
        self.weights = FillWeights::default();
        self.base_size = None;
        self.grid.reset();
        self.touch();
    }

    /// Build the engine input snapshot for the current state.
    ///
    /// Fails with `MissingField` when no base size is selected.
    pub fn allocation_input(&self) -> AllocResult<AllocationInput> {
        let base_size = self
            .base_size
            .clone()
            .ok_or_else(|| AllocError::missing_field("base_size"))?;
        Ok(AllocationInput {
            sizes: self.grid.sizes().to_vec(),
            panels: self.grid.panels().to_vec(),
            base_size,
            down_weight_g: self.weights.down_g,
            garment_weight_g: self.weights.garment_g,
        })
    }
}

impl Default for Sheet {
    fn default() -> Self {
        Sheet::new()
    }
}

/// Sheet metadata stored in the file header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    /// When the sheet was created
    pub created: DateTime<Utc>,

    /// When the sheet was last modified
    pub modified: DateTime<Utc>,
}

/// Order header fields at the top of the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderInfo {
    /// Order date
    pub date: NaiveDate,

    /// Buyer name (uppercased)
    pub buyer: String,

    /// Style number (uppercased)
    pub style_number: String,

    /// Fashion season
    pub season: Option<Season>,

    /// Sample/production stage
    pub stage: Option<GarmentStage>,
}

impl Default for OrderInfo {
    fn default() -> Self {
        OrderInfo {
            date: Local::now().date_naive(),
            buyer: String::new(),
            style_number: String::new(),
            season: None,
            stage: None,
        }
    }
}

/// Input weights in grams. `approx_g` is a reference note on the form and
/// does not enter the computation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FillWeights {
    /// Down (insulation fiber) weight to distribute
    pub down_g: f64,

    /// Garment weight to distribute with the same ratios
    pub garment_g: f64,

    /// Approximate finished weight, informational only
    pub approx_g: f64,
}

/// Fashion seasons offered by the order header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    #[serde(rename = "SS")]
    SpringSummer,
    #[serde(rename = "AW")]
    AutumnWinter,
    #[serde(rename = "SP")]
    Spring,
    #[serde(rename = "FW")]
    FallWinter,
}

impl Season {
    /// All season variants for UI selection
    pub const ALL: [Season; 4] = [
        Season::SpringSummer,
        Season::AutumnWinter,
        Season::Spring,
        Season::FallWinter,
    ];

    /// Get the code string shown on the form (e.g., "SS")
    pub fn code(&self) -> &'static str {
        match self {
            Season::SpringSummer => "SS",
            Season::AutumnWinter => "AW",
            Season::Spring => "SP",
            Season::FallWinter => "FW",
        }
    }

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> AllocResult<Self> {
        match s.trim().to_uppercase().replace([' ', '/', '-'], "").as_str() {
            "SS" | "SPRINGSUMMER" => Ok(Season::SpringSummer),
            "AW" | "AUTUMNWINTER" => Ok(Season::AutumnWinter),
            "SP" | "SPRING" => Ok(Season::Spring),
            "FW" | "FALLWINTER" => Ok(Season::FallWinter),
            _ => Err(AllocError::invalid_input("season", s, "Unknown season code")),
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Season::SpringSummer => "Spring/Summer",
            Season::AutumnWinter => "Autumn/Winter",
            Season::Spring => "Spring",
            Season::FallWinter => "Fall/Winter",
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Sample and production stages offered by the order header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GarmentStage {
    #[serde(rename = "SIZE SET")]
    SizeSet,
    #[serde(rename = "P TEST SAMPLE")]
    PTestSample,
    #[serde(rename = "FIT SAMPLE")]
    FitSample,
    #[serde(rename = "PP SAMPLE")]
    PpSample,
    #[serde(rename = "DEVELOPMENT")]
    Development,
    #[serde(rename = "PHOTO SAMPLE")]
    PhotoSample,
    #[serde(rename = "SHIPMENT SAMPLE")]
    ShipmentSample,
    #[serde(rename = "BULK")]
    Bulk,
    #[serde(rename = "SMS SAMPLE")]
    SmsSample,
}

impl GarmentStage {
    /// All stage variants for UI selection
    pub const ALL: [GarmentStage; 9] = [
        GarmentStage::SizeSet,
        GarmentStage::PTestSample,
        GarmentStage::FitSample,
        GarmentStage::PpSample,
        GarmentStage::Development,
        GarmentStage::PhotoSample,
        GarmentStage::ShipmentSample,
        GarmentStage::Bulk,
        GarmentStage::SmsSample,
    ];

    /// Get the label shown on the form (e.g., "PP SAMPLE")
    pub fn code(&self) -> &'static str {
        match self {
            GarmentStage::SizeSet => "SIZE SET",
            GarmentStage::PTestSample => "P TEST SAMPLE",
            GarmentStage::FitSample => "FIT SAMPLE",
            GarmentStage::PpSample => "PP SAMPLE",
            GarmentStage::Development => "DEVELOPMENT",
            GarmentStage::PhotoSample => "PHOTO SAMPLE",
            GarmentStage::ShipmentSample => "SHIPMENT SAMPLE",
            GarmentStage::Bulk => "BULK",
            GarmentStage::SmsSample => "SMS SAMPLE",
        }
    }

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> AllocResult<Self> {
        match s.trim().to_uppercase().replace([' ', '_', '-'], "").as_str() {
            "SIZESET" => Ok(GarmentStage::SizeSet),
            "PTESTSAMPLE" | "PTEST" => Ok(GarmentStage::PTestSample),
            "FITSAMPLE" | "FIT" => Ok(GarmentStage::FitSample),
            "PPSAMPLE" | "PP" => Ok(GarmentStage::PpSample),
            "DEVELOPMENT" | "DEV" => Ok(GarmentStage::Development),
            "PHOTOSAMPLE" | "PHOTO" => Ok(GarmentStage::PhotoSample),
            "SHIPMENTSAMPLE" | "SHIPMENT" => Ok(GarmentStage::ShipmentSample),
            "BULK" => Ok(GarmentStage::Bulk),
            "SMSSAMPLE" | "SMS" => Ok(GarmentStage::SmsSample),
            _ => Err(AllocError::invalid_input("stage", s, "Unknown stage label")),
        }
    }
}

impl std::fmt::Display for GarmentStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
