//! `formulary view` - the results table from the terminal.

use std::path::PathBuf;

use clap::Args;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use formulary_recon::money::{fixed2, percent};
use formulary_recon::{Page, ReconConfig, SavingsRecord, SortDirection, SortKey, Tab, ViewQuery};

use crate::recon::load_and_reconcile;
use crate::{CliError, Inputs};

#[derive(Args, Debug, Clone)]
pub struct ViewArgs {
    #[command(flatten)]
    pub inputs: Inputs,

    /// Which drugs to list: all, matches, teamsters or wellcentra
    #[arg(long, default_value = "all")]
    pub tab: Tab,

    /// Case-insensitive substring of the drug name
    #[arg(long)]
    pub search: Option<String>,

    /// Sort column (drugName, teamstersCost, wellcentraPrice, totalSavings,
    /// savingsPercent, patientSavings, planSavings)
    #[arg(long, default_value = "drugName")]
    pub sort: SortKey,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,

    /// Page to show (1-based)
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Rows per page (default from config, 50 without one)
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Drop drugs whose present side has a zero representative price
    /// (off by default; the web results table always applied this filter)
    #[arg(long)]
    pub hide_zero_prices: bool,

    /// Write the full filtered, sorted list to a CSV file
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,
}

impl ViewArgs {
    pub fn query(&self, config: &ReconConfig) -> ViewQuery {
        let direction = if self.desc { SortDirection::Desc } else { SortDirection::Asc };
        ViewQuery {
            tab: self.tab,
            hide_zero_prices: self.hide_zero_prices,
            search: self.search.clone(),
            sort: Some((self.sort, direction)),
            page: self.page,
            page_size: self.page_size.unwrap_or(config.view.page_size),
        }
    }
}

pub fn cmd_view(config: &ReconConfig, args: ViewArgs) -> Result<(), CliError> {
    let query = args.query(config);
    // Reject bad paging before touching the inputs
    query
        .page(&[])
        .map_err(|e| CliError::usage(e.to_string()))?;

    let result = load_and_reconcile(config, &args.inputs)?;
    let page = query
        .page(&result.drugs_with_savings)
        .map_err(|e| CliError::usage(e.to_string()))?;

    if let Some(ref path) = args.csv {
        let rows = query.apply(&result.drugs_with_savings);
        formulary_io::export_view_csv(&rows, path)
            .map_err(|e| CliError::output(format!("cannot write CSV: {e}")))?;
        eprintln!("wrote {} ({} drugs)", path.display(), rows.len());
    }

    println!("{}", render_page(&page));
    println!("{}", footer(&page));
    Ok(())
}

fn footer(page: &Page<'_>) -> String {
    format!(
        "page {} of {} ({} drug{})",
        page.page,
        page.total_pages.max(1),
        page.total_items,
        if page.total_items == 1 { "" } else { "s" },
    )
}

pub fn render_page(page: &Page<'_>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        header_cell("Drug Name"),
        header_cell("Match"),
        header_cell("Teamsters Cost"),
        header_cell("Wellcentra Price"),
        header_cell("Total Savings"),
        header_cell("Savings %"),
        header_cell("Patient Savings"),
        header_cell("Plan Savings"),
    ]);
    for index in 2..8 {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }

    for record in &page.items {
        table.add_row(row_cells(record));
    }
    table
}

fn row_cells(record: &SavingsRecord) -> Vec<Cell> {
    let name = Cell::new(&record.drug_name);
    if !record.has_match {
        let side = if record.is_teamsters_only() { "Teamsters only" } else { "Wellcentra only" };
        let mut cells = vec![name, dim_cell(side)];
        cells.extend((0..6).map(|_| dim_cell("-")));
        return cells;
    }
    vec![
        name,
        Cell::new("yes").fg(Color::Green),
        Cell::new(fixed2(record.teamsters_cost)),
        Cell::new(fixed2(record.wellcentra_price)),
        savings_cell(record.total_savings, fixed2(record.total_savings)),
        savings_cell(record.savings_percent, percent(record.savings_percent)),
        Cell::new(fixed2(record.patient_savings)),
        Cell::new(fixed2(record.plan_savings)),
    ]
}

fn savings_cell(value: f64, text: String) -> Cell {
    if value < 0.0 {
        Cell::new(text).fg(Color::Red)
    } else {
        Cell::new(text).fg(Color::Green).add_attribute(Attribute::Bold)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).fg(Color::Cyan).add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
