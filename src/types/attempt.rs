//! Attempt records and timing statistics.
//!
//! Every attempt the scheduler makes is appended to an [`AttemptLog`] in
//! strict attempt order. Entries are only removed by an explicit clear.

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};

/// One fill-and-submit attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// The password candidate submitted.
    pub candidate: String,

    /// When the attempt started.
    #[serde(with = "system_time_millis")]
    pub started_at: SystemTime,

    /// Time the form driver took, in milliseconds.
    pub duration_ms: f64,
}

impl AttemptRecord {
    pub fn new(candidate: impl Into<String>, started_at: SystemTime, elapsed: Duration) -> Self {
        Self {
            candidate: candidate.into(),
            started_at,
            duration_ms: elapsed.as_secs_f64() * 1000.0,
        }
    }
}

/// Summary of the attempt log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttemptStats {
    pub count: usize,
    pub mean_duration_ms: f64,
    pub min_duration_ms: f64,
    pub max_duration_ms: f64,
    /// Attempts per second between the first and the last start time.
    pub attempts_per_sec: f64,
}

/// Append-only log of attempts.
#[derive(Debug, Clone, Default)]
pub struct AttemptLog {
    records: Vec<AttemptRecord>,
}

impl AttemptLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record.
    pub fn push(&mut self, record: AttemptRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the most recent attempt.
    pub fn last(&self) -> Option<&AttemptRecord> {
        self.records.last()
    }

    pub fn records(&self) -> &[AttemptRecord] {
        &self.records
    }

    /// Clears all records.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Computes timing statistics over the whole log.
    pub fn stats(&self) -> AttemptStats {
        let (first, last) = match (self.records.first(), self.records.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return AttemptStats::default(),
        };

        let count = self.records.len();
        let total: f64 = self.records.iter().map(|r| r.duration_ms).sum();
        let min = self
            .records
            .iter()
            .map(|r| r.duration_ms)
            .fold(f64::INFINITY, f64::min);
        let max = self
            .records
            .iter()
            .map(|r| r.duration_ms)
            .fold(f64::NEG_INFINITY, f64::max);

        let span = last
            .started_at
            .duration_since(first.started_at)
            .unwrap_or(Duration::ZERO)
            .as_secs_f64();
        let attempts_per_sec = if count > 1 && span > 0.0 {
            (count - 1) as f64 / span
        } else {
            0.0
        };

        AttemptStats {
            count,
            mean_duration_ms: total / count as f64,
            min_duration_ms: min,
            max_duration_ms: max,
            attempts_per_sec,
        }
    }
}

/// Serializes SystemTime as milliseconds since the Unix epoch.
mod system_time_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    pub fn serialize<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let duration = time.duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO);
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(UNIX_EPOCH + Duration::from_millis(millis))
    }
}
