//! # DownAlloc CLI Application
//!
//! Terminal front end for the down fill allocation form. Interactive prompt
//! loop on stdin/stdout; takes no command-line arguments.
//!
//! The loop drives the full library surface: edit the form header and grid,
//! paste TSV blocks copied from a spreadsheet, compute and render the
//! allocation tables, undo and redo grid edits, save/load `.daf` sheets, and
//! maintain the factory settings shown on every form.

use std::io::{self, BufRead, Write};
use std::path::Path;

use chrono::NaiveDate;

use down_core::allocation::{calculate, format_total, format_weight, AllocationResult};
use down_core::errors::AllocError;
use down_core::grid::{area_cell_ok, format_area_total, quantity_cell_ok, SheetGrid};
use down_core::history::EditHistory;
use down_core::settings::{FactoryInfo, SettingsStore};
use down_core::sheet::{GarmentStage, Season, Sheet};
use down_core::{clipboard, load_sheet, logging, save_sheet};

fn main() {
    let log_setup = logging::default_log_dir()
        .and_then(|dir| logging::init_logging(logging::default_log_level(), &dir));
    if let Err(e) = log_setup {
        eprintln!("Warning: file logging disabled: {}", e);
    }
    log::info!("down_cli started");

    println!("DownAlloc - Down Fill Allocation Form");
    println!("=====================================");
    println!();

    let (store, factory) = open_settings();
    let mut app = App {
        sheet: Sheet::new(),
        history: EditHistory::default(),
        factory,
        store,
    };
    app.first_run_setup();
    app.run();

    log::info!("down_cli exiting");
    println!("Goodbye.");
}

/// Open the settings store and read the stored factory info. Either step may
/// fail (no config dir, corrupt file); the session continues with defaults.
fn open_settings() -> (Option<SettingsStore>, FactoryInfo) {
    let store = match SettingsStore::open_default() {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Warning: {}", e);
            return (None, FactoryInfo::default());
        }
    };
    let factory = match store.load() {
        Ok(factory) => factory,
        Err(e) => {
            eprintln!("Warning: could not read factory settings: {}", e);
            FactoryInfo::default()
        }
    };
    (Some(store), factory)
}

struct App {
    sheet: Sheet,
    history: EditHistory<SheetGrid>,
    factory: FactoryInfo,
    /// None when the platform exposes no config directory
    store: Option<SettingsStore>,
}

impl App {
    /// Prompt for factory details the first time the tool runs.
    fn first_run_setup(&mut self) {
        if self.factory.is_configured() {
            return;
        }
        println!("First run: enter the factory details shown on every form.");
        let name = prompt("  Factory name: ");
        if name.is_empty() {
            println!("  Skipped; set it later from the settings menu.");
            return;
        }
        self.factory.name = name;
        self.factory.location = prompt("  Factory location: ");
        self.persist_factory();
        println!();
    }

    fn run(&mut self) {
        loop {
            println!();
            print_menu();
            let choice = match menu_choice() {
                Some(choice) => choice,
                None => break,
            };
            println!();
            match choice.as_str() {
                "1" => self.show_form(),
                "2" => self.edit_header(),
                "3" => self.edit_weights(),
                "4" => self.set_base(),
                "5" => self.edit_sizes(),
                "6" => self.edit_panel(),
                "7" => self.paste_block(),
                "8" => self.compute(),
                "9" => self.undo(),
                "10" => self.redo(),
                "11" => self.save(),
                "12" => self.load(),
                "13" => self.reset(),
                "14" => self.factory_settings(),
                "q" | "Q" => break,
                "" => {}
                other => println!("  Unknown choice: {}", other),
            }
        }
    }

    /// Run a grid mutation with undo bookkeeping: the prior state is
    /// recorded only when the grid actually changed, and a base-size
    /// selection orphaned by the edit is cleared.
    fn edit_grid<R>(&mut self, f: impl FnOnce(&mut SheetGrid) -> R) -> R {
        let before = self.sheet.grid.clone();
        let outcome = f(&mut self.sheet.grid);
        if self.sheet.grid != before {
            self.history.record(before);
            self.sheet.touch();
        }
        if self.sheet.reconcile_base_size() {
            println!("  Note: base size selection was cleared.");
        }
        outcome
    }

    fn show_form(&self) {
        let order = &self.sheet.order;
        let weights = &self.sheet.weights;
        println!("═══════════════════════════════════════════════");
        println!("  DOWN FILL ALLOCATION FORM");
        if self.factory.is_configured() {
            if self.factory.location.is_empty() {
                println!("  {}", self.factory.name);
            } else {
                println!("  {} ({})", self.factory.name, self.factory.location);
            }
        }
        println!("═══════════════════════════════════════════════");
        println!(
            "  Date:  {}    Season: {}    Stage: {}",
            order.date,
            order.season.map(|s| s.code()).unwrap_or("-"),
            order.stage.map(|s| s.code()).unwrap_or("-"),
        );
        println!(
            "  Buyer: {}    Style: {}",
            or_dash(&order.buyer),
            or_dash(&order.style_number)
        );
        println!(
            "  Down weight: {} g    Garment weight: {} g    Approx: {} g",
            weights.down_g, weights.garment_g, weights.approx_g
        );
        println!(
            "  Base size: {}",
            self.sheet.base_size.as_deref().unwrap_or("-")
        );
        println!();
        self.print_entry_table();
    }

    /// The entry table: cells as typed, plus the quantity × area TOTAL row.
    fn print_entry_table(&self) {
        let grid = &self.sheet.grid;
        let totals = grid.area_totals();
        let base_col = self
            .sheet
            .base_size
            .as_deref()
            .and_then(|name| grid.size_column(name));

        let name_w = grid
            .panels()
            .iter()
            .map(|p| p.name.len())
            .chain(["PANEL".len(), "TOTAL".len()])
            .max()
            .unwrap_or(5);
        let mut col_w = Vec::with_capacity(grid.size_count());
        for (c, name) in grid.sizes().iter().enumerate() {
            let mut w = header_label(name, Some(c) == base_col).len().max(6);
            for panel in grid.panels() {
                w = w.max(panel.areas[c].len());
            }
            w = w.max(format_area_total(totals[c]).len());
            col_w.push(w);
        }

        print!("  {:>3}  {:<nw$}  {:>3}", "ROW", "PANEL", "QTY", nw = name_w);
        for (c, name) in grid.sizes().iter().enumerate() {
            print!("  {:>w$}", header_label(name, Some(c) == base_col), w = col_w[c]);
        }
        println!();

        for (r, panel) in grid.panels().iter().enumerate() {
            print!(
                "  {:>3}  {:<nw$}  {:>3}",
                r + 1,
                panel.name,
                panel.quantity,
                nw = name_w
            );
            for (c, area) in panel.areas.iter().enumerate() {
                print!("  {:>w$}", area, w = col_w[c]);
            }
            println!();
        }

        print!("  {:>3}  {:<nw$}  {:>3}", "", "TOTAL", "", nw = name_w);
        for (c, total) in totals.iter().enumerate() {
            print!("  {:>w$}", format_area_total(*total), w = col_w[c]);
        }
        println!();
    }

    fn edit_header(&mut self) {
        let input = prompt(&format!("  Date (YYYY-MM-DD) [{}]: ", self.sheet.order.date));
        if !input.is_empty() {
            match NaiveDate::parse_from_str(&input, "%Y-%m-%d") {
                Ok(date) => {
                    self.sheet.order.date = date;
                    self.sheet.touch();
                }
                Err(_) => println!(
                    "  Warning: not a valid date, keeping {}.",
                    self.sheet.order.date
                ),
            }
        }

        let input = prompt(&format!("  Buyer [{}]: ", or_dash(&self.sheet.order.buyer)));
        if !input.is_empty() {
            self.sheet.set_buyer(&input);
        }

        let input = prompt(&format!(
            "  Style number [{}]: ",
            or_dash(&self.sheet.order.style_number)
        ));
        if !input.is_empty() {
            self.sheet.set_style_number(&input);
        }

        let seasons: Vec<&str> = Season::ALL.iter().map(|s| s.code()).collect();
        println!("  Seasons: {}", seasons.join(", "));
        let input = prompt(&format!(
            "  Season [{}] (- clears): ",
            self.sheet.order.season.map(|s| s.code()).unwrap_or("-")
        ));
        if input == "-" {
            self.sheet.order.season = None;
            self.sheet.touch();
        } else if !input.is_empty() {
            match Season::from_str_flexible(&input) {
                Ok(season) => {
                    self.sheet.order.season = Some(season);
                    self.sheet.touch();
                }
                Err(e) => print_warning(&e),
            }
        }

        let stages: Vec<&str> = GarmentStage::ALL.iter().map(|s| s.code()).collect();
        println!("  Stages: {}", stages.join(", "));
        let input = prompt(&format!(
            "  Stage [{}] (- clears): ",
            self.sheet.order.stage.map(|s| s.code()).unwrap_or("-")
        ));
        if input == "-" {
            self.sheet.order.stage = None;
            self.sheet.touch();
        } else if !input.is_empty() {
            match GarmentStage::from_str_flexible(&input) {
                Ok(stage) => {
                    self.sheet.order.stage = Some(stage);
                    self.sheet.touch();
                }
                Err(e) => print_warning(&e),
            }
        }
    }

    fn edit_weights(&mut self) {
        let before = self.sheet.weights;
        let down = prompt_f64("  Down weight (g)", before.down_g);
        let garment = prompt_f64("  Garment weight (g)", before.garment_g);
        let approx = prompt_f64("  Approx weight (g)", before.approx_g);
        self.sheet.weights.down_g = accept_weight("down", down, before.down_g);
        self.sheet.weights.garment_g = accept_weight("garment", garment, before.garment_g);
        self.sheet.weights.approx_g = accept_weight("approx", approx, before.approx_g);
        if self.sheet.weights != before {
            self.sheet.touch();
        }
    }

    fn set_base(&mut self) {
        let sizes = self.sheet.grid.available_sizes();
        if sizes.is_empty() {
            println!("  Name a size column first (menu 5).");
            return;
        }
        println!("  Sizes: {}", sizes.join(", "));
        let input = prompt(&format!(
            "  Base size [{}] (- clears): ",
            self.sheet.base_size.as_deref().unwrap_or("-")
        ));
        if input.is_empty() {
            return;
        }
        if input == "-" {
            if self.sheet.set_base_size(None).is_ok() {
                println!("  Base size cleared.");
            }
            return;
        }
        match self.sheet.set_base_size(Some(&input)) {
            Ok(()) => println!(
                "  Base size set to {}.",
                self.sheet.base_size.as_deref().unwrap_or("-")
            ),
            Err(e) => print_warning(&e),
        }
    }

    fn edit_sizes(&mut self) {
        for (i, name) in self.sheet.grid.sizes().iter().enumerate() {
            println!("    {:>2}: {}", i + 1, or_dash(name));
        }
        let col = prompt_usize("  Column number", 1);
        if col == 0 || col > self.sheet.grid.size_count() {
            println!("  No such column.");
            return;
        }
        let current = self.sheet.grid.sizes()[col - 1].clone();
        let input = prompt(&format!("  Size name [{}] (- clears): ", or_dash(&current)));
        if input.is_empty() {
            return;
        }
        let name = if input == "-" { String::new() } else { input };
        if let Err(e) = self.edit_grid(|grid| grid.set_size_name(col - 1, &name)) {
            print_warning(&e);
            println!("  Keeping previous name '{}'.", or_dash(&current));
        }
    }

    fn edit_panel(&mut self) {
        let row = prompt_usize("  Row number", 1);
        if row == 0 || row > self.sheet.grid.panel_count() {
            println!("  No such row.");
            return;
        }
        let row = row - 1;
        let sizes: Vec<String> = self.sheet.grid.sizes().to_vec();
        let current = self.sheet.grid.panels()[row].clone();

        let outcome = self.edit_grid(|grid| {
            let input = prompt(&format!(
                "  Panel name [{}] (- clears): ",
                or_dash(&current.name)
            ));
            if input == "-" {
                grid.set_panel_name(row, "")?;
            } else if !input.is_empty() {
                grid.set_panel_name(row, &input)?;
            }

            let input = prompt(&format!(
                "  Quantity [{}] (- clears): ",
                or_dash(&current.quantity)
            ));
            if input == "-" {
                grid.set_quantity(row, "")?;
            } else if !input.is_empty() {
                if quantity_cell_ok(&input) {
                    grid.set_quantity(row, &input)?;
                } else {
                    println!(
                        "  Warning: quantity must be an integer 1-9, keeping '{}'.",
                        or_dash(&current.quantity)
                    );
                }
            }

            for (col, size) in sizes.iter().enumerate() {
                let label = if size.is_empty() {
                    format!("column {}", col + 1)
                } else {
                    size.clone()
                };
                let input = prompt(&format!(
                    "  Area {} [{}] (- clears): ",
                    label,
                    or_dash(&current.areas[col])
                ));
                if input == "-" {
                    grid.set_area(row, col, "")?;
                } else if !input.is_empty() {
                    if area_cell_ok(&input) {
                        grid.set_area(row, col, &input)?;
                    } else {
                        println!(
                            "  Warning: area must be 0-9999 with at most 2 decimals, keeping '{}'.",
                            or_dash(&current.areas[col])
                        );
                    }
                }
            }
            Ok::<(), AllocError>(())
        });
        if let Err(e) = outcome {
            report_error(&e);
        }
    }

    fn paste_block(&mut self) {
        println!("  Coordinates match the table: row 0 is the size header row and");
        println!("  data rows start at 1; column 0 is the panel name, column 1 the");
        println!("  quantity, columns 2 and up are the size areas.");
        let row = prompt_usize("  Start row", 1);
        let col = prompt_usize("  Start column", 0);
        println!("  Enter TSV lines, '.' alone ends:");
        let mut lines: Vec<String> = Vec::new();
        while let Some(line) = read_line_raw() {
            if line.trim() == "." {
                break;
            }
            lines.push(line);
        }
        let block = clipboard::decode(&lines.join("\n"));
        if block.is_empty() {
            println!("  Nothing pasted.");
            return;
        }
        let report = self.edit_grid(|grid| grid.paste_block(row, col, &block));
        println!(
            "  Applied {} cells, skipped {} ({} rows and {} columns added).",
            report.applied, report.skipped, report.added_rows, report.added_columns
        );
    }

    fn compute(&self) {
        let input = match self.sheet.allocation_input() {
            Ok(input) => input,
            Err(AllocError::MissingField { .. }) => {
                println!("  Select a base size first (menu 4).");
                return;
            }
            Err(e) => {
                report_error(&e);
                return;
            }
        };
        match calculate(&input) {
            Ok(result) => {
                log::info!(
                    "Allocation computed: total_base_area={:.2}, panels={}",
                    result.total_base_area,
                    result.panels.len()
                );
                print_allocation(&result);
            }
            Err(e) => report_error(&e),
        }
    }

    fn undo(&mut self) {
        match self.history.undo(self.sheet.grid.clone()) {
            Some(previous) => {
                self.sheet.grid = previous;
                self.sheet.touch();
                if self.sheet.reconcile_base_size() {
                    println!("  Note: base size selection was cleared.");
                }
                println!("  Grid edit undone.");
            }
            None => println!("  Nothing to undo."),
        }
    }

    fn redo(&mut self) {
        match self.history.redo(self.sheet.grid.clone()) {
            Some(next) => {
                self.sheet.grid = next;
                self.sheet.touch();
                if self.sheet.reconcile_base_size() {
                    println!("  Note: base size selection was cleared.");
                }
                println!("  Grid edit redone.");
            }
            None => println!("  Nothing to redo."),
        }
    }

    fn save(&self) {
        let path = prompt_or("  Save to", "sheet.daf");
        match save_sheet(&self.sheet, Path::new(&path)) {
            Ok(()) => println!("  Saved {}.", path),
            Err(e) => report_error(&e),
        }
    }

    fn load(&mut self) {
        let path = prompt_or("  Load from", "sheet.daf");
        match load_sheet(Path::new(&path)) {
            Ok(sheet) => {
                self.sheet = sheet;
                self.history.clear();
                if self.sheet.reconcile_base_size() {
                    println!("  Note: base size selection was cleared.");
                }
                println!(
                    "  Loaded {} (style {}).",
                    path,
                    or_dash(&self.sheet.order.style_number)
                );
            }
            Err(e) => report_error(&e),
        }
    }

    fn reset(&mut self) {
        let confirm = prompt("  Reset the whole form? [y/N]: ");
        if !confirm.eq_ignore_ascii_case("y") {
            println!("  Reset cancelled.");
            return;
        }
        let before = self.sheet.grid.clone();
        self.sheet.reset();
        if self.sheet.grid != before {
            self.history.record(before);
        }
        println!("  Form reset.");
    }

    fn factory_settings(&mut self) {
        println!("  Factory name:     {}", or_dash(&self.factory.name));
        println!("  Factory location: {}", or_dash(&self.factory.location));
        let name = prompt("  New name (empty keeps): ");
        if !name.is_empty() {
            self.factory.name = name;
        }
        let location = prompt("  New location (empty keeps): ");
        if !location.is_empty() {
            self.factory.location = location;
        }
        self.persist_factory();
    }

    fn persist_factory(&self) {
        match &self.store {
            Some(store) => match store.save(&self.factory) {
                Ok(()) => println!("  Settings saved."),
                Err(e) => report_error(&e),
            },
            None => println!("  No config directory; settings kept for this session only."),
        }
    }
}

fn print_allocation(result: &AllocationResult) {
    println!("═══════════════════════════════════════════════");
    println!("  ALLOCATION RESULTS");
    println!("═══════════════════════════════════════════════");
    println!(
        "  Total base area: {:.2} (base size {})",
        result.total_base_area, result.sizes[result.base_column]
    );
    if !result.has_distribution() {
        println!("  Total base area is zero; all values are zero.");
    }
    println!();
    println!(
        "  Down per piece, grams (input {} g):",
        format_total(result.down_weight_g)
    );
    print_result_table(result, false);
    if result.has_garment_weights() {
        println!();
        println!(
            "  Garment per piece, grams (input {} g):",
            format_total(result.garment_weight_g)
        );
        print_result_table(result, true);
    }
}

/// One result table: a row per valid panel, a TOTAL row in whole grams, the
/// base-size header marked with `*`.
fn print_result_table(result: &AllocationResult, garment: bool) {
    let totals = if garment {
        &result.garment_totals_g
    } else {
        &result.down_totals_g
    };

    let name_w = result
        .panels
        .iter()
        .map(|p| p.name.len())
        .chain(["PANEL".len(), "TOTAL".len()])
        .max()
        .unwrap_or(5);
    let mut col_w = Vec::with_capacity(result.sizes.len());
    for (c, name) in result.sizes.iter().enumerate() {
        let mut w = header_label(name, c == result.base_column).len().max(6);
        for panel in &result.panels {
            let value = if garment {
                panel.garment_per_piece_g[c]
            } else {
                panel.down_per_piece_g[c]
            };
            w = w.max(format_weight(value).len());
        }
        w = w.max(format_total(totals[c]).len());
        col_w.push(w);
    }

    print!("  {:<nw$}  {:>5}", "PANEL", "QTY", nw = name_w);
    for (c, name) in result.sizes.iter().enumerate() {
        print!("  {:>w$}", header_label(name, c == result.base_column), w = col_w[c]);
    }
    println!();

    for panel in &result.panels {
        print!(
            "  {:<nw$}  {:>5}",
            panel.name,
            format!("1X{}", panel.quantity),
            nw = name_w
        );
        for c in 0..result.sizes.len() {
            let value = if garment {
                panel.garment_per_piece_g[c]
            } else {
                panel.down_per_piece_g[c]
            };
            print!("  {:>w$}", format_weight(value), w = col_w[c]);
        }
        println!();
    }

    print!("  {:<nw$}  {:>5}", "TOTAL", "", nw = name_w);
    for c in 0..result.sizes.len() {
        print!("  {:>w$}", format_total(totals[c]), w = col_w[c]);
    }
    println!();
}

fn print_menu() {
    println!("═════════════════ MENU ═════════════════");
    println!("   1) Show form");
    println!("   2) Edit order header");
    println!("   3) Edit weights");
    println!("   4) Set base size");
    println!("   5) Edit size names");
    println!("   6) Edit panel row");
    println!("   7) Paste TSV block");
    println!("   8) Compute allocation");
    println!("   9) Undo grid edit");
    println!("  10) Redo grid edit");
    println!("  11) Save sheet");
    println!("  12) Load sheet");
    println!("  13) Reset form");
    println!("  14) Factory settings");
    println!("   q) Quit");
}

fn menu_choice() -> Option<String> {
    print!("Choice: ");
    io::stdout().flush().ok()?;
    read_line_raw().map(|line| line.trim().to_string())
}

/// Read one line from stdin; `None` on EOF or I/O error. Only the trailing
/// newline is stripped, so TSV cells keep their tabs.
fn read_line_raw() -> Option<String> {
    let mut input = String::new();
    match io::stdin().lock().read_line(&mut input) {
        Ok(0) => None,
        Ok(_) => Some(input.trim_end_matches(['\r', '\n']).to_string()),
        Err(_) => None,
    }
}

fn prompt(label: &str) -> String {
    print!("{}", label);
    if io::stdout().flush().is_err() {
        return String::new();
    }
    read_line_raw()
        .map(|line| line.trim().to_string())
        .unwrap_or_default()
}

fn prompt_or(label: &str, default: &str) -> String {
    let input = prompt(&format!("{} [{}]: ", label, default));
    if input.is_empty() {
        default.to_string()
    } else {
        input
    }
}

fn prompt_f64(label: &str, default: f64) -> f64 {
    prompt(&format!("{} [{}]: ", label, default))
        .parse()
        .unwrap_or(default)
}

fn prompt_usize(label: &str, default: usize) -> usize {
    prompt(&format!("{} [{}]: ", label, default))
        .parse()
        .unwrap_or(default)
}

fn accept_weight(label: &str, value: f64, current: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        println!(
            "  Warning: {} weight must be a non-negative number, keeping {}.",
            label, current
        );
        current
    }
}

fn header_label(name: &str, base: bool) -> String {
    let shown = if name.is_empty() { "-" } else { name };
    if base {
        format!("{}*", shown)
    } else {
        shown.to_string()
    }
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}

fn print_warning(e: &AllocError) {
    println!("  Warning: {}", e);
}

fn report_error(e: &AllocError) {
    eprintln!("Error: {}", e);
    if let Ok(json) = serde_json::to_string_pretty(e) {
        eprintln!("Error JSON:");
        eprintln!("{}", json);
    }
}
