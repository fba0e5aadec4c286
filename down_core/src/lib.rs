//! # down_core - Down Fill Allocation Engine
//!
//! `down_core` is the computational heart of DownAlloc, a form tool garment
//! factories use to distribute a total down (insulation fiber) weight across
//! the panels and sizes of a garment. All inputs and outputs are
//! JSON-serializable, so front ends, files, and tests share one data path.
//!
//! ## Design Philosophy
//!
//! - **Stateless engine**: allocation is a pure function of an input snapshot
//! - **Cells stay text**: the grid stores what was typed; numbers exist only
//!   inside a computation, with lenient parsing in one place
//! - **JSON-First**: all types implement Serialize/Deserialize
//! - **Rich Errors**: structured error types, not just strings
//!
//! ## Quick Start
//!
//! ```rust
//! use down_core::sheet::Sheet;
//! use down_core::allocation::calculate;
//!
//! let mut sheet = Sheet::new();
//! sheet.grid.set_size_name(0, "M").unwrap();
//! sheet.grid.set_size_name(1, "L").unwrap();
//! sheet.grid.set_quantity(0, "2").unwrap();
//! sheet.grid.set_area(0, 0, "10").unwrap();
//! sheet.grid.set_area(0, 1, "5").unwrap();
//! sheet.set_base_size(Some("M")).unwrap();
//! sheet.weights.down_g = 100.0;
//!
//! let result = calculate(&sheet.allocation_input().unwrap()).unwrap();
//! assert!((result.panels[0].down_per_piece_g[1] - 25.0).abs() < 1e-9);
//! ```
//!
//! ## Modules
//!
//! - [`sheet`] - The allocation form: header, weights, base size, grid
//! - [`grid`] - Panel rows × size columns of text cells, paste and resize
//! - [`allocation`] - The proportional distribution engine
//! - [`parse`] - Lenient numeric interpretation of cell text
//! - [`history`] - Bounded undo/redo over grid snapshots
//! - [`clipboard`] - TSV block encode/decode
//! - [`settings`] - Factory name/location persistence
//! - [`file_io`] - Sheet files with atomic saves and version checks
//! - [`logging`] - Rolling file-log bootstrap
//! - [`errors`] - Structured error types

pub mod allocation;
pub mod clipboard;
pub mod errors;
pub mod file_io;
pub mod grid;
pub mod history;
pub mod logging;
pub mod parse;
pub mod settings;
pub mod sheet;

// Re-export commonly used types at crate root for convenience
pub use allocation::{calculate, AllocationInput, AllocationResult};
pub use errors::{AllocError, AllocResult};
pub use file_io::{load_sheet, save_sheet};
pub use grid::SheetGrid;
pub use history::EditHistory;
pub use settings::{FactoryInfo, SettingsStore};
pub use sheet::{Sheet, SheetMetadata};
