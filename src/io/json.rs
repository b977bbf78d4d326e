use crate::error::{Error, Result};
use crate::value::Value;
use std::fs::{File, create_dir_all};
use std::io::{BufWriter, Write};
use std::path::Path;

fn json_error(e: serde_json::Error) -> Error {
    Error::resource(format!("serialize JSON: {e}"), None)
}

/// Convert a value to a `serde_json::Value`.
pub fn to_json(value: &Value) -> Result<serde_json::Value> {
    serde_json::to_value(value).map_err(json_error)
}

/// Compact JSON text for a value.
pub fn to_json_string(value: &Value) -> Result<String> {
    serde_json::to_string(value).map_err(json_error)
}

/// Write a value as pretty JSON, creating parent directories as needed.
pub fn write_json(path: impl AsRef<Path>, value: &Value) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent)
            .map_err(|e| Error::resource(format!("mkdir -p {}", parent.display()), Some(e)))?;
    }
    let f = File::create(path)
        .map_err(|e| Error::resource(format!("create {}", path.display()), Some(e)))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, value).map_err(json_error)?;
    w.write_all(b"\n")?;
    w.flush()?;
    Ok(())
}
