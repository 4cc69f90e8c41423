//! Append-only CSV log of finished tests.

use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::HistoryError;
use crate::passage::Language;
use crate::session::SessionResult;

/// One row of the results log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub date: String,
    pub language: String,
    pub passage_chars: usize,
    pub elapsed_secs: f64,
    pub wpm: f64,
    pub accuracy: f64,
    pub positional_accuracy: f64,
    pub end_reason: String,
}

impl ResultRecord {
    pub fn from_result(result: &SessionResult, language: Language) -> Self {
        let round2 = |v: f64| (v * 100.0).round() / 100.0;
        Self {
            date: result.finished_at.to_rfc3339(),
            language: language.to_string().to_lowercase(),
            passage_chars: result.passage.chars().count(),
            elapsed_secs: round2(result.score.elapsed_secs),
            wpm: round2(result.score.wpm),
            accuracy: round2(result.score.accuracy),
            positional_accuracy: round2(result.score.positional_accuracy),
            end_reason: result.reason.to_string(),
        }
    }
}

/// Aggregate over every logged test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistorySummary {
    pub sessions: usize,
    pub best_wpm: f64,
    pub mean_wpm: f64,
    pub wpm_std_dev: f64,
}

#[derive(Debug, Clone)]
pub struct ResultsLog {
    path: PathBuf,
}

impl ResultsLog {
    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &ResultRecord) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // a fresh file needs the header row
        let needs_header = !self.path.exists();

        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;
        Ok(())
    }

    /// Every logged test, oldest first. A missing log is an empty history.
    pub fn records(&self) -> Result<Vec<ResultRecord>, HistoryError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let records = reader.deserialize().collect::<Result<Vec<ResultRecord>, _>>()?;
        Ok(records)
    }

    pub fn summary(&self) -> Result<Option<HistorySummary>, HistoryError> {
        let wpms: Vec<f64> = self.records()?.iter().map(|r| r.wpm).collect();
        Ok(summarize(&wpms))
    }
}

fn summarize(wpms: &[f64]) -> Option<HistorySummary> {
    if wpms.is_empty() {
        return None;
    }

    let count = wpms.len() as f64;
    let mean = wpms.iter().sum::<f64>() / count;
    let variance = wpms.iter().map(|w| (w - mean) * (w - mean)).sum::<f64>() / count;

    Some(HistorySummary {
        sessions: wpms.len(),
        best_wpm: wpms.iter().copied().fold(f64::MIN, f64::max),
        mean_wpm: mean,
        wpm_std_dev: variance.sqrt(),
    })
}
