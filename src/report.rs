use crate::analysis::{Analysis, DataSufficiency, ParseSample};
use crate::problem::Operator;
use crate::record::ProblemResult;
use std::fmt;

/// Plain-text view of an analysis, for the terminal
pub struct Report<'a> {
    pub analysis: &'a Analysis,
    pub results: &'a [ProblemResult],
    pub top_numbers: usize,
    pub recent_problems: usize,
    pub min_total_results: usize,
}

impl<'a> Report<'a> {
    pub fn new(analysis: &'a Analysis, results: &'a [ProblemResult]) -> Self {
        Self {
            analysis,
            results,
            top_numbers: 10,
            recent_problems: 20,
            min_total_results: 10,
        }
    }

    pub fn with_min_total_results(mut self, min_total_results: usize) -> Self {
        self.min_total_results = min_total_results;
        self
    }

    pub fn with_limits(mut self, top_numbers: usize, recent_problems: usize) -> Self {
        self.top_numbers = top_numbers;
        self.recent_problems = recent_problems;
        self
    }

    fn write_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== Data Summary ==")?;
        writeln!(f, "Total Problems Tracked: {}", self.analysis.total_results)?;
        match self.analysis.sufficiency {
            DataSufficiency::Empty => {
                writeln!(f, "No data found! Make sure to play some games first.")
            }
            DataSufficiency::Insufficient => writeln!(
                f,
                "Need at least {} problems for analysis",
                self.min_total_results
            ),
            DataSufficiency::Limited => writeln!(f, "More data will improve accuracy"),
            DataSufficiency::Good => writeln!(f, "Good amount of data collected"),
        }
    }

    fn write_operators(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n== Operations ==")?;
        writeln!(
            f,
            "{:<16}{:>7}{:>16}{:>9}{:>9}",
            "Operation", "Count", "Avg Time (ms)", "Min", "Max"
        )?;

        let mut any = false;
        for op in Operator::ALL {
            let Some(bucket) = self.analysis.by_operator.get(&op) else {
                continue;
            };
            let Some(avg) = bucket.average() else {
                continue;
            };
            any = true;
            writeln!(
                f,
                "{:<16}{:>7}{:>16.0}{:>9.0}{:>9.0}",
                op.name(),
                bucket.count,
                avg,
                bucket.min,
                bucket.max
            )?;
        }
        if !any {
            writeln!(f, "No operations found - check problem format")?;
        }
        Ok(())
    }

    fn write_numbers(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n== Slowest Numbers ==")?;
        writeln!(f, "{:<8}{:>7}{:>16}", "Number", "Count", "Avg Time (ms)")?;
        for (number, bucket) in self.analysis.slowest_operands(self.top_numbers) {
            writeln!(
                f,
                "{:<8}{:>7}{:>16.0}",
                number,
                bucket.count,
                bucket.average().unwrap_or(0.0)
            )?;
        }
        Ok(())
    }

    fn write_patterns(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.analysis.diagnostics;
        writeln!(f, "\n== Patterns ==")?;
        writeln!(f, "Total Problems: {}", d.total_problems)?;
        writeln!(f, "Multiplication Problems: {}", d.multiplication_problems)?;
        writeln!(f, "Division Problems: {}", d.division_problems)?;
        writeln!(f, "Subtraction with Borrow: {}", d.subtraction_with_borrow)?;
        writeln!(f, "Unmatched Problems: {}", d.unmatched_problems)?;

        if self.analysis.by_pattern.is_empty() {
            writeln!(f, "No patterns detected! Check the sample problems below.")?;
        } else {
            writeln!(f, "{:<32}{:>7}{:>12}", "Pattern", "Count", "Avg Time")?;
            for (key, bucket) in &self.analysis.by_pattern {
                writeln!(
                    f,
                    "{:<32}{:>7}{:>10.0}ms",
                    key.label(),
                    bucket.count,
                    bucket.average().unwrap_or(0.0)
                )?;
            }
        }

        if !d.samples.is_empty() {
            writeln!(f, "Sample problems analyzed:")?;
            for sample in &d.samples {
                match sample {
                    ParseSample::Parsed { problem, tokens } => {
                        writeln!(f, "  {} --> Op: \"{}\"", problem, tokens.normalized_glyph())?
                    }
                    ParseSample::NoMatch { problem } => writeln!(f, "  {problem} --> NO MATCH!")?,
                }
            }
        }
        Ok(())
    }

    fn write_recent(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n== Recent Problems ==")?;
        if self.results.is_empty() {
            return writeln!(f, "No problems tracked yet");
        }
        for r in self.results.iter().rev().take(self.recent_problems) {
            writeln!(f, "  {} --> {:.0}ms", r.problem, r.time.round())?;
        }
        Ok(())
    }

    fn write_findings(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n== Analysis ==")?;
        if let Some(spot) = &self.analysis.slowest_operator {
            writeln!(
                f,
                "Slowest Operation: {} (avg {:.0} ms)",
                spot.group.name(),
                spot.average
            )?;
        }
        if let Some(spot) = &self.analysis.trouble_number {
            writeln!(f, "Trouble Number: {} (avg {:.0} ms)", spot.group, spot.average)?;
        }
        match &self.analysis.trouble_pattern {
            Some(spot) => writeln!(
                f,
                "Specific Weakness: {} (avg {:.0} ms)",
                spot.group.label(),
                spot.average
            ),
            None => writeln!(f, "Not enough data for pattern analysis."),
        }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_summary(f)?;
        if self.analysis.sufficiency == DataSufficiency::Empty {
            return Ok(());
        }
        self.write_operators(f)?;
        self.write_numbers(f)?;
        self.write_patterns(f)?;
        self.write_recent(f)?;
        self.write_findings(f)
    }
}
