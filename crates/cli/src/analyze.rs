//! `formulary analyze` - exploratory cross-formulary report.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use formulary_recon::analytics::{analyze, AnalyticsReport};
use formulary_recon::money::{fixed2, percent};
use formulary_recon::ReconConfig;

use crate::recon::load_and_reconcile;
use crate::{CliError, Inputs};

pub fn cmd_analyze(config: &ReconConfig, inputs: &Inputs, json_output: bool, top: usize) -> Result<(), CliError> {
    let result = load_and_reconcile(config, inputs)?;
    let report = analyze(&result);

    if json_output {
        let json_str = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::output(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
        return Ok(());
    }

    print_report(&report, top);
    Ok(())
}

fn print_report(report: &AnalyticsReport, top: usize) {
    println!(
        "Coverage: {} of drugs matched ({} compared)",
        percent(report.coverage_percent),
        report.cost_comparisons.len(),
    );
    println!("Average savings: {}", percent(report.average_savings_percent));
    if !report.source_countries.is_empty() {
        println!("Sourced from: {}", report.source_countries.join(", "));
    }

    let top_rows = report.top_savings(top);
    if !top_rows.is_empty() {
        println!("\nTop {} savings opportunities", top_rows.len());
        let mut table = styled_table(
            &["Drug Name", "Teamsters Cost", "Wellcentra Price", "Savings", "Savings %", "NDC Match", "Source"],
            &[1, 2, 3, 4],
        );
        for c in top_rows {
            table.add_row(vec![
                Cell::new(&c.drug_name),
                Cell::new(fixed2(c.teamsters_cost)),
                Cell::new(fixed2(c.wellcentra_price)),
                Cell::new(fixed2(c.savings)),
                Cell::new(percent(c.savings_percent)),
                Cell::new(if c.ndc_match { "yes" } else { "no" }),
                Cell::new(c.source_country.as_deref().unwrap_or("-")),
            ]);
        }
        println!("{table}");
    }

    if !report.ndc_matches.is_empty() {
        println!("\nNDC matches ({})", report.ndc_matches.len());
        let mut table = styled_table(&["NDC", "Teamsters Name", "Wellcentra Name"], &[]);
        for m in &report.ndc_matches {
            table.add_row(vec![
                Cell::new(&m.ndc),
                Cell::new(&m.teamsters_drug_name),
                Cell::new(&m.wellcentra_drug_name),
            ]);
        }
        println!("{table}");
    }

    if !report.base_name_matches.is_empty() {
        println!("\nBase-name matches ({})", report.base_name_matches.len());
        let mut table = styled_table(
            &["Base Name", "Teamsters Names", "Wellcentra Names", "Sample Savings", "Savings %"],
            &[3, 4],
        );
        for m in &report.base_name_matches {
            table.add_row(vec![
                Cell::new(&m.base_name),
                Cell::new(m.teamsters_names.join("\n")),
                Cell::new(m.wellcentra_names.join("\n")),
                Cell::new(fixed2(m.savings)),
                Cell::new(percent(m.savings_percent)),
            ]);
        }
        println!("{table}");
    }

    if !report.wac_awp.is_empty() {
        println!(
            "\nWAC vs AWP ({} drugs, average {})",
            report.wac_awp.len(),
            percent(report.average_wac_awp_percent()),
        );
        let mut table = styled_table(&["Drug Name", "WAC", "AWP", "Difference", "Difference %"], &[1, 2, 3, 4]);
        for r in &report.wac_awp {
            table.add_row(vec![
                Cell::new(&r.drug_name),
                Cell::new(fixed2(r.wac_price)),
                Cell::new(fixed2(r.awp)),
                Cell::new(fixed2(r.difference)),
                Cell::new(percent(r.difference_percent)),
            ]);
        }
        println!("{table}");
    }
}

/// Header row in bold cyan; `numeric` columns are right-aligned.
fn styled_table(headers: &[&str], numeric: &[usize]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).fg(Color::Cyan).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );
    for &index in numeric {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
    table
}
