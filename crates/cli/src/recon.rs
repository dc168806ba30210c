//! `formulary reconcile` and `formulary validate`.

use std::path::{Path, PathBuf};

use tracing::info;

use formulary_io::xlsx::summary_rows;
use formulary_recon::{reconcile_with, RawRecord, ReconConfig, ReconResult};

use crate::{CliError, Inputs};

fn load_side(label: &str, path: &Path, sheet: Option<&str>) -> Result<Vec<RawRecord>, CliError> {
    formulary_io::load_sheet_records(path, sheet).map_err(|e| {
        let err = CliError::input(format!("cannot load {label} formulary: {e}"));
        match e {
            formulary_io::IoError::UnsupportedExtension { .. } => {
                err.with_hint("convert the file to csv, xlsx or json")
            }
            _ => err,
        }
    })
}

/// Load both inputs and run the engine.
pub fn load_and_reconcile(config: &ReconConfig, inputs: &Inputs) -> Result<ReconResult, CliError> {
    let sheet = inputs.sheet.as_deref();
    let teamsters = load_side("Teamsters", &inputs.teamsters, sheet)?;
    let wellcentra = load_side("Wellcentra", &inputs.wellcentra, sheet)?;
    info!(
        teamsters_rows = teamsters.len(),
        wellcentra_rows = wellcentra.len(),
        "loaded formularies"
    );
    Ok(reconcile_with(config, &teamsters, &wellcentra))
}

pub fn cmd_reconcile(
    config: &ReconConfig,
    inputs: &Inputs,
    json_output: bool,
    output_file: Option<PathBuf>,
    export_file: Option<PathBuf>,
) -> Result<(), CliError> {
    let result = load_and_reconcile(config, inputs)?;

    if let Some(ref path) = output_file {
        formulary_io::write_json(&result, path)
            .map_err(|e| CliError::output(format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if let Some(ref path) = export_file {
        formulary_io::export_workbook(&result, path)
            .map_err(|e| CliError::output(format!("cannot write workbook: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        let json_str = formulary_io::to_json_string(&result)
            .map_err(|e| CliError::output(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    }

    // Human summary to stderr
    print_summary(&result);
    Ok(())
}

fn print_summary(result: &ReconResult) {
    let meta = &result.meta;
    eprintln!(
        "{}: kept {} of {} Teamsters rows, {} of {} Wellcentra rows",
        meta.config_name,
        meta.teamsters_retained,
        meta.teamsters_rows,
        meta.wellcentra_retained,
        meta.wellcentra_rows,
    );
    let rows = summary_rows(&result.summary);
    let width = rows.iter().map(|(metric, _)| metric.len()).max().unwrap_or(0);
    for (metric, value) in rows {
        eprintln!("  {metric:<width$}  {value}");
    }
}

pub fn cmd_validate(config_path: &Path) -> Result<(), CliError> {
    let config = ReconConfig::load(config_path).map_err(|e| CliError::config(e.to_string()))?;
    eprintln!(
        "valid: '{}' (Teamsters: \"{}\" priced by \"{}\"; Wellcentra: \"{}\" priced by \"{}\"; page size {})",
        config.name,
        config.teamsters.drug_name,
        config.teamsters.price,
        config.wellcentra.drug_name,
        config.wellcentra.price,
        config.view.page_size,
    );
    Ok(())
}
