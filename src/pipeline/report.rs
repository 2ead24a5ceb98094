//! Rendering of a completed run.

use crate::batch::ResourceId;
use crate::config::ExecutionMode;
use crate::pipeline::{FetchOutcome, ProcessedResult};
use std::fmt;
use std::time::Duration;

/// Everything one driver run produced, index-aligned with the batch.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub mode: ExecutionMode,
    pub ids: Vec<ResourceId>,
    pub outcomes: Vec<FetchOutcome>,
    pub processed: Vec<ProcessedResult>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Whether two runs produced the same outcomes and results, ignoring timing.
    pub fn agrees_with(&self, other: &BatchReport) -> bool {
        self.ids == other.ids && self.outcomes == other.outcomes && self.processed == other.processed
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Fetched data:")?;
        for (i, outcome) in self.outcomes.iter().enumerate() {
            writeln!(f, "URL {}: {}", i + 1, outcome)?;
        }

        writeln!(f)?;
        writeln!(f, "Processed data:")?;
        for (i, result) in self.processed.iter().enumerate() {
            writeln!(f, "URL {}: Length {}", i + 1, result)?;
        }

        writeln!(f)?;
        write!(f, "Total time taken: {:.2} seconds", self.elapsed.as_secs_f64())
    }
}

/// Sequential baseline next to the concurrent run of the same batch.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub sequential: BatchReport,
    pub concurrent: BatchReport,
}

impl Comparison {
    /// How many times faster the concurrent run was.
    pub fn speedup(&self) -> f64 {
        let concurrent = self.concurrent.elapsed.as_secs_f64();
        if concurrent > 0.0 {
            self.sequential.elapsed.as_secs_f64() / concurrent
        } else {
            0.0
        }
    }

    pub fn consistent(&self) -> bool {
        self.sequential.agrees_with(&self.concurrent)
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Sequential ===")?;
        writeln!(f, "{}", self.sequential)?;
        writeln!(f)?;
        writeln!(f, "=== Concurrent ===")?;
        writeln!(f, "{}", self.concurrent)?;
        writeln!(f)?;
        write!(
            f,
            "Speedup: {:.1}x ({:.2}s -> {:.2}s)",
            self.speedup(),
            self.sequential.elapsed.as_secs_f64(),
            self.concurrent.elapsed.as_secs_f64()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use serde_json::json;

    fn report(elapsed: Duration) -> BatchReport {
        BatchReport {
            mode: ExecutionMode::Concurrent,
            ids: vec!["a".into(), "b".into()],
            outcomes: vec![
                FetchOutcome::Success(json!([1, 2])),
                FetchOutcome::Failure(FetchError::HttpStatus(404)),
            ],
            processed: vec![2, 0],
            elapsed,
        }
    }

    #[test]
    fn test_report_rendering() {
        let rendered = report(Duration::from_millis(1234)).to_string();
        let expected = "Fetched data:\n\
                        URL 1: [1,2]\n\
                        URL 2: None\n\
                        \n\
                        Processed data:\n\
                        URL 1: Length 2\n\
                        URL 2: Length 0\n\
                        \n\
                        Total time taken: 1.23 seconds";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_report_counts() {
        let report = report(Duration::ZERO);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
    }

    #[test]
    fn test_comparison() {
        let comparison = Comparison {
            sequential: BatchReport {
                mode: ExecutionMode::Sequential,
                ..report(Duration::from_secs(6))
            },
            concurrent: report(Duration::from_secs(2)),
        };

        assert!(comparison.consistent());
        assert!((comparison.speedup() - 3.0).abs() < f64::EPSILON);
        assert!(comparison.to_string().contains("Speedup: 3.0x"));
    }
}
