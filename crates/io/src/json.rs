// JSON import and result export

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde_json::Value;

use formulary_recon::{RawRecord, ReconResult};

use crate::error::{IoError, Result};

/// Load a top-level array of objects.
pub fn load(path: &Path) -> Result<Vec<RawRecord>> {
    let text = std::fs::read_to_string(path).map_err(|e| IoError::io(path, e))?;
    let value: Value = serde_json::from_str(&text)?;

    let Value::Array(items) = value else {
        return Err(IoError::shape(path, "expected a top-level JSON array of objects"));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Value::Object(map) => Ok(map),
            other => Err(IoError::shape(
                path,
                format!("element {idx} is {}, expected an object", kind(&other)),
            )),
        })
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Pretty-printed result, key order preserved.
pub fn to_json_string(result: &ReconResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

pub fn write_json(result: &ReconResult, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| IoError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, result)?;
    writer.write_all(b"\n").map_err(|e| IoError::io(path, e))?;
    writer.flush().map_err(|e| IoError::io(path, e))?;
    Ok(())
}
