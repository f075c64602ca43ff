use std::collections::BTreeMap;

use serde::Serialize;

use super::plan::RunKey;
use crate::error::SimError;
use crate::ising::analysis::mean_and_std;

/// Scalar output of a successful run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    /// Signed magnetization per site
    pub magnetization: f64,
    /// Time steps executed before termination
    pub steps: usize,
}

/// Result slot of a single run
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(Sample),
    Failed(SimError),
}

impl RunOutcome {
    pub fn magnetization(&self) -> Option<f64> {
        match self {
            RunOutcome::Completed(sample) => Some(sample.magnetization),
            RunOutcome::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RunOutcome::Failed(_))
    }
}

/// Table entry: the run's temperature together with its outcome
#[derive(Debug, Clone, PartialEq)]
pub struct SweepEntry {
    pub temperature: f64,
    pub outcome: RunOutcome,
}

/// Flat, serializable view of one table entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepRecord {
    pub temperature_index: usize,
    pub sample_index: usize,
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magnetization: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SimError>,
}

/// Aggregate of all samples taken at one temperature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureSummary {
    pub temperature_index: usize,
    pub temperature: f64,
    pub completed: usize,
    pub failed: usize,
    /// Mean signed magnetization, `None` when nothing completed
    pub mean_magnetization: Option<f64>,
    pub mean_abs_magnetization: Option<f64>,
    pub std_magnetization: Option<f64>,
}

/// Results of a sweep keyed by (temperature index, sample index)
///
/// Entries are keyed, never appended by position, so the order in which
/// runs finished has no influence on the table.
#[derive(Debug, Clone, Default)]
pub struct SweepTable {
    entries: BTreeMap<RunKey, SweepEntry>,
    /// Runs that were never started because the sweep got cancelled
    pub skipped: usize,
    pub cancelled: bool,
}

impl SweepTable {
    pub(crate) fn from_entries(entries: BTreeMap<RunKey, SweepEntry>, skipped: usize, cancelled: bool) -> Self {
        Self {
            entries,
            skipped,
            cancelled,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, temperature_index: usize, sample_index: usize) -> Option<&SweepEntry> {
        self.entries.get(&RunKey {
            temperature_index,
            sample_index,
        })
    }

    /// All entries in key order
    pub fn entries(&self) -> impl Iterator<Item = (&RunKey, &SweepEntry)> {
        self.entries.iter()
    }

    /// `(temperature, magnetization)` of every completed run
    pub fn completed(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.entries
            .values()
            .filter_map(|entry| entry.outcome.magnetization().map(|m| (entry.temperature, m)))
    }

    /// Failed runs with their errors
    pub fn failures(&self) -> impl Iterator<Item = (RunKey, f64, &SimError)> + '_ {
        self.entries.iter().filter_map(|(key, entry)| match &entry.outcome {
            RunOutcome::Failed(err) => Some((*key, entry.temperature, err)),
            RunOutcome::Completed(_) => None,
        })
    }

    pub fn completed_count(&self) -> usize {
        self.entries.values().filter(|e| !e.outcome.is_failed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.entries.values().filter(|e| e.outcome.is_failed()).count()
    }

    /// Magnetizations as a `temperature × sample` grid; holes are runs that
    /// failed or never ran
    pub fn magnetization_grid(&self) -> Vec<Vec<Option<f64>>> {
        let Some(n_temps) = self.entries.keys().map(|k| k.temperature_index + 1).max() else {
            return Vec::new();
        };
        let n_samples = self
            .entries
            .keys()
            .map(|k| k.sample_index + 1)
            .max()
            .unwrap_or(0);

        let mut grid = vec![vec![None; n_samples]; n_temps];
        for (key, entry) in &self.entries {
            grid[key.temperature_index][key.sample_index] = entry.outcome.magnetization();
        }
        grid
    }

    /// Per-temperature statistics, ordered by temperature index
    pub fn summaries(&self) -> Vec<TemperatureSummary> {
        let mut grouped: BTreeMap<usize, (f64, Vec<f64>, usize)> = BTreeMap::new();
        for (key, entry) in &self.entries {
            let slot = grouped
                .entry(key.temperature_index)
                .or_insert_with(|| (entry.temperature, Vec::new(), 0));
            match entry.outcome {
                RunOutcome::Completed(sample) => slot.1.push(sample.magnetization),
                RunOutcome::Failed(_) => slot.2 += 1,
            }
        }

        grouped
            .into_iter()
            .map(|(temperature_index, (temperature, mags, failed))| {
                let stats = mean_and_std(&mags);
                let abs: Vec<f64> = mags.iter().map(|m| m.abs()).collect();
                TemperatureSummary {
                    temperature_index,
                    temperature,
                    completed: mags.len(),
                    failed,
                    mean_magnetization: stats.map(|(mean, _)| mean),
                    mean_abs_magnetization: mean_and_std(&abs).map(|(mean, _)| mean),
                    std_magnetization: stats.map(|(_, std)| std),
                }
            })
            .collect()
    }

    /// Flat records for handing the data to a plotting tool
    pub fn records(&self) -> Vec<SweepRecord> {
        self.entries
            .iter()
            .map(|(key, entry)| {
                let (magnetization, steps, error) = match &entry.outcome {
                    RunOutcome::Completed(sample) => (Some(sample.magnetization), Some(sample.steps), None),
                    RunOutcome::Failed(err) => (None, None, Some(err.clone())),
                };
                SweepRecord {
                    temperature_index: key.temperature_index,
                    sample_index: key.sample_index,
                    temperature: entry.temperature,
                    magnetization,
                    steps,
                    error,
                }
            })
            .collect()
    }
}
