//! Saving and loading benchmark reports.
//!
//! Supports both JSON (human-readable) and bincode (efficient binary) formats.

use crate::error::{BenchError, Result};
use crate::results::McpResults;
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

/// Save format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    /// JSON format (human-readable, larger).
    Json,
    /// Bincode format (binary, compact).
    Bincode,
}

impl SaveFormat {
    /// Determine format from file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("bin") | Some("bincode") => SaveFormat::Bincode,
            _ => SaveFormat::Json,
        }
    }
}

/// Timestamped report path under `dir`, e.g. `mcp_results_20260101_120000.json`.
pub fn default_results_path(dir: &Path, now: DateTime<Local>) -> PathBuf {
    dir.join(format!("mcp_results_{}.json", now.format("%Y%m%d_%H%M%S")))
}

/// Save a report, choosing the format from the extension.
pub fn save_results(report: &McpResults, path: &Path) -> Result<()> {
    save_results_with_format(report, path, SaveFormat::from_path(path))
}

/// Save a report with a specific format.
///
/// Reports with non-finite statistics are rejected before anything is written.
/// The data goes to a sibling temporary file first and is renamed over
/// `path`, so readers never see a half-written report.
pub fn save_results_with_format(report: &McpResults, path: &Path, format: SaveFormat) -> Result<()> {
    if let Some(metric) = report.non_finite_metric() {
        return Err(BenchError::Serialization(format!(
            "{} is not a finite number",
            metric
        )));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| BenchError::io(parent, e))?;
        }
    }

    let data = match format {
        SaveFormat::Json => serde_json::to_string_pretty(report)
            .map_err(|e| BenchError::Serialization(e.to_string()))?
            .into_bytes(),
        SaveFormat::Bincode => bincode::serde::encode_to_vec(report, bincode::config::standard())
            .map_err(|e| BenchError::Serialization(e.to_string()))?,
    };

    let tmp = temp_path(path);
    fs::write(&tmp, &data).map_err(|e| BenchError::io(&tmp, e))?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(BenchError::io(path, e));
    }

    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Load a report, choosing the format from the extension.
pub fn load_results(path: &Path) -> Result<McpResults> {
    let data = fs::read(path).map_err(|e| BenchError::io(path, e))?;

    match SaveFormat::from_path(path) {
        SaveFormat::Json => serde_json::from_slice(&data)
            .map_err(|e| BenchError::Serialization(e.to_string())),
        SaveFormat::Bincode => {
            let (report, _): (McpResults, usize) =
                bincode::serde::decode_from_slice(&data, bincode::config::standard())
                    .map_err(|e| BenchError::Serialization(e.to_string()))?;
            Ok(report)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accumulator::{RunState, TurnSamples};
    use crate::scoring::{PairwiseVerdict, Preference, SimilarityScore};
    use crate::testing::score;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn report() -> McpResults {
        let mut state = RunState::new();
        for (i, preference) in [Preference::FirstBetter, Preference::Tie, Preference::SecondBetter]
            .into_iter()
            .enumerate()
        {
            state.message_count += 1;
            state.commit(TurnSamples {
                candidate_semantic: SimilarityScore::from_precision_recall(0.1 + 0.2 * i as f64, 0.7),
                baseline_semantic: SimilarityScore::from_precision_recall(1.0 / 3.0, 0.25),
                candidate_judge: score(4.0 + i as f64 / 7.0),
                baseline_judge: score(3.0),
                verdict: PairwiseVerdict::uniform(preference),
                candidate_first: i % 2 == 0,
            });
        }
        state.sessions_completed = 2;
        state.sessions_failed = 1;
        McpResults::aggregate(&state, "2026-10-19T12:00:00+00:00", 3)
    }

    #[test]
    fn test_json_reproduces_report() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/results.json");

        let original = report();
        save_results(&original, &path).unwrap();

        assert_eq!(load_results(&path).unwrap(), original);
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_bincode_reproduces_report() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.bin");

        let original = report();
        save_results(&original, &path).unwrap();

        assert_eq!(load_results(&path).unwrap(), original);
    }

    #[test]
    fn test_overwrite_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.json");
        fs::write(&path, "stale").unwrap();

        save_results(&report(), &path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"pairwise_results\""));
    }

    #[test]
    fn test_unwritable_path_is_an_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();

        let result = save_results(&report(), &blocker.join("results.json"));
        assert!(matches!(result, Err(BenchError::Io { .. })));
    }

    #[test]
    fn test_non_finite_report_is_not_written() {
        let mut state = RunState::new();
        state.message_count = 1;
        state.commit(TurnSamples {
            candidate_semantic: SimilarityScore::from_precision_recall(0.5, 0.5),
            baseline_semantic: SimilarityScore {
                precision: f64::NAN,
                recall: 0.5,
                f1: 0.5,
            },
            candidate_judge: score(4.0),
            baseline_judge: score(3.0),
            verdict: PairwiseVerdict::uniform(Preference::Tie),
            candidate_first: true,
        });
        let bad = McpResults::aggregate(&state, "t", 1);
        assert_eq!(
            bad.non_finite_metric().as_deref(),
            Some("baseline_results.semantic_precision")
        );

        let dir = TempDir::new().unwrap();
        for name in ["results.json", "results.bin"] {
            let path = dir.path().join(name);
            let result = save_results(&bad, &path);
            assert!(matches!(result, Err(BenchError::Serialization(_))), "{}", name);
            assert!(!path.exists());
            assert!(!temp_path(&path).exists());
        }

        assert_eq!(report().non_finite_metric(), None);
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(SaveFormat::from_path(Path::new("r.json")), SaveFormat::Json);
        assert_eq!(SaveFormat::from_path(Path::new("r.bin")), SaveFormat::Bincode);
        assert_eq!(SaveFormat::from_path(Path::new("r.bincode")), SaveFormat::Bincode);
        assert_eq!(SaveFormat::from_path(Path::new("r")), SaveFormat::Json);
    }

    #[test]
    fn test_default_results_path() {
        let now = Local.with_ymd_and_hms(2026, 10, 19, 8, 5, 3).unwrap();
        let path = default_results_path(Path::new("results"), now);
        assert_eq!(path, PathBuf::from("results/mcp_results_20261019_080503.json"));
    }

    #[test]
    fn test_load_nonexistent() {
        assert!(load_results(Path::new("/nonexistent/results.json")).is_err());
    }
}
