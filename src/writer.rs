//! Persist the run ledger, once per run, as a CSV table and a JSON array.

use crate::ledger::RunLedger;
use crate::Result;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

/// Write `job_applications_<stamp>.csv` and `.json` under `dir` and return
/// both paths.
pub fn save_results(ledger: &RunLedger, dir: &Path, run_stamp: &str) -> Result<(PathBuf, PathBuf)> {
    let csv_path = dir.join(format!("job_applications_{run_stamp}.csv"));
    let json_path = dir.join(format!("job_applications_{run_stamp}.json"));

    save_to_csv(ledger, &csv_path)?;
    save_to_json(ledger, &json_path)?;

    info!(csv = %csv_path.display(), json = %json_path.display(), "results saved");
    Ok((csv_path, json_path))
}

pub fn save_to_csv(ledger: &RunLedger, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);

    for record in ledger.records() {
        writer.serialize(record)?;
    }

    writer.flush()?;
    Ok(())
}

pub fn save_to_json(ledger: &RunLedger, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, ledger.records())?;
    Ok(())
}
