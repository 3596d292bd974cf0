use super::{sort_window, ResultStore};
use crate::errors::EvalError;
use crate::model::EvaluationResult;
use chrono::{DateTime, Utc};
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::Mutex;

/// One evaluation result per line. Good enough to carry analytics across
/// CLI invocations; a real deployment plugs its own `ResultStore` in here.
pub struct JsonlStore {
    path: PathBuf,
    // Serializes appends so concurrent batch writers cannot interleave lines.
    write_lock: Mutex<()>,
}

impl JsonlStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl ResultStore for JsonlStore {
    fn save(&self, result: &EvaluationResult) -> Result<(), EvalError> {
        let line = serde_json::to_string(result)
            .map_err(|e| EvalError::storage(format!("failed to encode result: {}", e)))?;
        let _guard = self.write_lock.lock().unwrap();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                EvalError::storage(format!("failed to open {}: {}", self.path.display(), e))
            })?;
        writeln!(file, "{}", line)
            .map_err(|e| EvalError::storage(format!("failed to append result: {}", e)))?;
        Ok(())
    }

    fn query_by_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<EvaluationResult>, EvalError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let file = std::fs::File::open(&self.path).map_err(|e| {
            EvalError::storage(format!("failed to open {}: {}", self.path.display(), e))
        })?;

        let mut hits = Vec::new();
        for (no, line) in BufReader::new(file).lines().enumerate() {
            let line =
                line.map_err(|e| EvalError::storage(format!("read error at line {}: {}", no + 1, e)))?;
            if line.trim().is_empty() {
                continue;
            }
            let result: EvaluationResult = serde_json::from_str(&line).map_err(|e| {
                EvalError::storage(format!(
                    "{}:{}: malformed result row: {}",
                    self.path.display(),
                    no + 1,
                    e
                ))
            })?;
            if result.meta.evaluated_at >= start && result.meta.evaluated_at < end {
                hits.push(result);
            }
        }
        sort_window(&mut hits);
        Ok(hits)
    }
}
