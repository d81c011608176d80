//! Human-readable solve reports and benchmark summaries
//!
//! Reports are appended to instance files after the weights line, where the
//! instance reader ignores them.

use crate::error::Result;
use crate::solver::Solution;
use qtg_core::{relative_gap, Bitstring, ClassicalSolution};
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// One solve compared against optional classical references
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkReport {
    pub value: i64,
    pub selection: Bitstring,
    pub exact: Option<ClassicalSolution>,
    pub greedy: Option<ClassicalSolution>,
    pub elapsed: Option<Duration>,
}

impl BenchmarkReport {
    pub fn new(solution: &Solution) -> Self {
        Self {
            value: solution.value,
            selection: solution.selection.clone(),
            exact: None,
            greedy: None,
            elapsed: None,
        }
    }

    pub fn with_exact(mut self, exact: ClassicalSolution) -> Self {
        self.exact = Some(exact);
        self
    }

    pub fn with_greedy(mut self, greedy: ClassicalSolution) -> Self {
        self.greedy = Some(greedy);
        self
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = Some(elapsed);
        self
    }

    /// Gap to the exact optimum in percent
    pub fn exact_gap(&self) -> Option<f64> {
        self.exact.as_ref().map(|s| relative_gap(s.value, self.value))
    }

    /// Gap to the greedy value in percent; negative when QAOA beats greedy
    pub fn greedy_gap(&self) -> Option<f64> {
        self.greedy.as_ref().map(|s| relative_gap(s.value, self.value))
    }
}

fn write_block(f: &mut fmt::Formatter<'_>, title: &str, value: i64, selection: &Bitstring) -> fmt::Result {
    writeln!(f, "{}", title)?;
    writeln!(f, "Best Value:  {}", value)?;
    writeln!(f, "Best Solution: {}", selection)
}

impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_block(f, "QTG-QAOA solution:", self.value, &self.selection)?;
        if let (Some(exact), Some(gap)) = (&self.exact, self.exact_gap()) {
            writeln!(f)?;
            write_block(f, "Classical solution (exhaustive):", exact.value, &exact.selection)?;
            writeln!(f, "Gap: {:.2}%", gap)?;
        }
        if let (Some(greedy), Some(gap)) = (&self.greedy, self.greedy_gap()) {
            writeln!(f)?;
            write_block(f, "Greedy solution:", greedy.value, &greedy.selection)?;
            writeln!(f, "Gap: {:.2}%", gap)?;
        }
        if let Some(elapsed) = self.elapsed {
            writeln!(f)?;
            writeln!(f, "QTG-QAOA execution time: {:.2} minutes", elapsed.as_secs_f64() / 60.0)?;
        }
        Ok(())
    }
}

/// Appends reports to a text file
pub struct ResultSink;

impl ResultSink {
    /// Append `report` to `path`, creating the file if needed
    pub fn append<P: AsRef<Path>>(path: P, report: &BenchmarkReport) -> Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        write!(file, "\n{}", report)?;
        Ok(())
    }
}

/// Averages over several benchmark runs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BenchmarkSummary {
    runs: usize,
    exact_gap_total: f64,
    exact_runs: usize,
    greedy_gap_total: f64,
    greedy_runs: usize,
    elapsed_total: Duration,
}

impl BenchmarkSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, report: &BenchmarkReport) {
        self.runs += 1;
        if let Some(gap) = report.exact_gap() {
            self.exact_gap_total += gap;
            self.exact_runs += 1;
        }
        if let Some(gap) = report.greedy_gap() {
            self.greedy_gap_total += gap;
            self.greedy_runs += 1;
        }
        if let Some(elapsed) = report.elapsed {
            self.elapsed_total += elapsed;
        }
    }

    pub fn runs(&self) -> usize {
        self.runs
    }

    pub fn average_exact_gap(&self) -> Option<f64> {
        (self.exact_runs > 0).then(|| self.exact_gap_total / self.exact_runs as f64)
    }

    pub fn average_greedy_gap(&self) -> Option<f64> {
        (self.greedy_runs > 0).then(|| self.greedy_gap_total / self.greedy_runs as f64)
    }

    pub fn average_elapsed(&self) -> Duration {
        if self.runs == 0 {
            return Duration::ZERO;
        }
        self.elapsed_total / self.runs as u32
    }
}

impl fmt::Display for BenchmarkSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Number of Experiments: {}", self.runs)?;
        if let Some(gap) = self.average_exact_gap() {
            writeln!(f, "Average Exact Gap: {:.2}%", gap)?;
        }
        if let Some(gap) = self.average_greedy_gap() {
            writeln!(f, "Average Greedy Gap: {:.2}%", gap)?;
        }
        write!(
            f,
            "Average QTG-QAOA Execution Time: {:.2} minutes",
            self.average_elapsed().as_secs_f64() / 60.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bits(s: &str) -> Bitstring {
        s.parse().unwrap()
    }

    fn report(value: i64) -> BenchmarkReport {
        BenchmarkReport {
            value,
            selection: bits("110"),
            exact: None,
            greedy: None,
            elapsed: None,
        }
    }

    #[test]
    fn test_gaps() {
        let r = report(27)
            .with_exact(ClassicalSolution {
                value: 30,
                selection: bits("001"),
            })
            .with_greedy(ClassicalSolution {
                value: 20,
                selection: bits("010"),
            });
        assert_relative_eq!(r.exact_gap().unwrap(), 10.0, epsilon = 1e-12);
        assert_relative_eq!(r.greedy_gap().unwrap(), -35.0, epsilon = 1e-12);
        assert_eq!(report(5).exact_gap(), None);
    }

    #[test]
    fn test_report_text() {
        let text = report(30)
            .with_greedy(ClassicalSolution {
                value: 30,
                selection: bits("001"),
            })
            .to_string();
        assert!(text.starts_with("QTG-QAOA solution:\nBest Value:  30\nBest Solution: 110\n"));
        assert!(text.contains("\nGreedy solution:\nBest Value:  30\nBest Solution: 001\nGap: 0.00%\n"));
        assert!(!text.contains("exhaustive"));
    }

    #[test]
    fn test_summary_averages() {
        let mut summary = BenchmarkSummary::new();
        let exact = |v| ClassicalSolution {
            value: v,
            selection: bits("001"),
        };
        summary.record(&report(30).with_exact(exact(30)).with_elapsed(Duration::from_secs(60)));
        summary.record(&report(15).with_exact(exact(30)).with_elapsed(Duration::from_secs(120)));
        assert_eq!(summary.runs(), 2);
        assert_relative_eq!(summary.average_exact_gap().unwrap(), 25.0, epsilon = 1e-12);
        assert_eq!(summary.average_greedy_gap(), None);
        assert_eq!(summary.average_elapsed(), Duration::from_secs(90));
        assert!(summary.to_string().contains("Average Exact Gap: 25.00%"));
    }
}
