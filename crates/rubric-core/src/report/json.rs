use crate::errors::EvalError;
use serde::Serialize;
use std::path::Path;

pub fn to_stdout<T: Serialize>(value: &T) -> Result<(), EvalError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| EvalError::internal(format!("failed to encode report: {}", e)))?;
    println!("{}", json);
    Ok(())
}

pub fn write_json<T: Serialize>(value: &T, out: &Path) -> Result<(), EvalError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| EvalError::internal(format!("failed to encode report: {}", e)))?;
    std::fs::write(out, json)
        .map_err(|e| EvalError::storage(format!("failed to write {}: {}", out.display(), e)))?;
    Ok(())
}
