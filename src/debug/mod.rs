//! Debug bundle writer for inspecting the active configuration and datasets.

use std::fs::{create_dir_all, File};
use std::path::PathBuf;

use chrono::Local;
use serde_json::json;

use crate::app::pipeline::DatasetSummary;
use crate::domain::AppConfig;
use crate::error::AppError;

/// Write a timestamped JSON bundle under `debug/` and return its path.
pub fn write_debug_bundle(
    config: &AppConfig,
    summary: &DatasetSummary,
) -> Result<PathBuf, AppError> {
    let dir = PathBuf::from("debug");
    create_dir_all(&dir)
        .map_err(|e| AppError::runtime(format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("hexastat_debug_{ts}.json"));

    let bundle = json!({
        "tool": "hexastat",
        "generated": Local::now().to_rfc3339(),
        "config": {
            "data_dir": config.data_dir,
            "sample": config.sample,
            "year": config.year,
            "election": config.election.display_name(),
            "top_n": config.top_n,
        },
        "datasets": summary,
    });

    let file = File::create(&path)
        .map_err(|e| AppError::runtime(format!("Failed to create debug file: {e}")))?;
    serde_json::to_writer_pretty(file, &bundle)
        .map_err(|e| AppError::runtime(format!("Failed to write debug bundle: {e}")))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::Datasets;

    #[test]
    fn bundle_is_valid_json() {
        let config = AppConfig {
            sample: true,
            ..AppConfig::default()
        };
        let ds = Datasets::load(&config).unwrap();
        let path = write_debug_bundle(&config, &ds.summary()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["tool"], "hexastat");
        assert_eq!(parsed["config"]["year"], 2022);
        assert!(parsed["datasets"]["communes"].as_u64().unwrap() > 0);

        let _ = std::fs::remove_file(&path);
    }
}
