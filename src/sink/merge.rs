//! Concatenate result files that share the same header.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::ScrapeError;

/// Write every input into `output`, keeping only the first input's header line.
/// Returns the number of data lines written.
pub fn merge_result_files(output: &Path, inputs: &[impl AsRef<Path>]) -> Result<usize, ScrapeError> {
    if inputs.is_empty() {
        return Err(ScrapeError::Configuration(
            "merge needs at least one input file".to_string(),
        ));
    }
    let out = File::create(output).map_err(|e| {
        ScrapeError::Configuration(format!("cannot create {}: {e}", output.display()))
    })?;
    let mut out = BufWriter::new(out);
    let mut rows = 0_usize;
    for (i, input) in inputs.iter().enumerate() {
        let input = input.as_ref();
        let file = File::open(input).map_err(|e| {
            ScrapeError::Configuration(format!("cannot read {}: {e}", input.display()))
        })?;
        for (n, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| ScrapeError::io(input, e))?;
            if n == 0 {
                if i == 0 {
                    writeln!(out, "{line}").map_err(|e| ScrapeError::io(output, e))?;
                }
                continue;
            }
            if line.trim().is_empty() {
                continue;
            }
            writeln!(out, "{line}").map_err(|e| ScrapeError::io(output, e))?;
            rows += 1;
        }
        log::info!("Merged {}", input.display());
    }
    out.flush().map_err(|e| ScrapeError::io(output, e))?;
    Ok(rows)
}
