use crate::problem::{parse, tokenize, Operator, ParsedProblem, ProblemTokens};
use crate::record::ProblemResult;
use crate::training::TrainingGoal;
use itertools::Itertools;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;

/// Table facts worth drilling individually
pub const FACT_RANGE: RangeInclusive<u32> = 2..=12;

/// Below this many results the history counts as "limited"
const GOOD_DATA_THRESHOLD: usize = 50;

const MAX_SAMPLES: usize = 10;
const MAX_NO_MATCH_SAMPLES: usize = 5;

/// Running timing totals for one group of problems
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatBucket {
    pub count: u32,
    pub total_time: f64,
    pub min: f64,
    pub max: f64,
}

impl StatBucket {
    pub fn record(&mut self, time: f64) {
        if self.count == 0 {
            self.min = time;
            self.max = time;
        } else {
            self.min = self.min.min(time);
            self.max = self.max.max(time);
        }
        self.count += 1;
        self.total_time += time;
    }

    pub fn average(&self) -> Option<f64> {
        match self.count {
            0 => None,
            count => Some(self.total_time / count as f64),
        }
    }
}

/// Structural weakness a problem can belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PatternKey {
    /// Multiplication involving this factor
    Multiplication(u32),
    /// Division by this divisor
    Division(u32),
    SubtractionBorrow,
}

impl PatternKey {
    /// Legacy string form: `*_7`, `/_4`, `sub_borrow`
    pub fn key(&self) -> String {
        match self {
            PatternKey::Multiplication(n) => format!("*_{n}"),
            PatternKey::Division(n) => format!("/_{n}"),
            PatternKey::SubtractionBorrow => "sub_borrow".to_string(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            PatternKey::Multiplication(n) => format!("{} with {n}s", Operator::Multiply.name()),
            PatternKey::Division(n) => format!("{} with {n}s", Operator::Divide.name()),
            PatternKey::SubtractionBorrow => "Subtraction (with Borrowing)".to_string(),
        }
    }
}

impl fmt::Display for PatternKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Pattern buckets a parsed problem contributes to (zero, one or two).
///
/// A square such as `7 × 7` contributes to `*_7` twice.
pub fn pattern_keys(problem: &ParsedProblem) -> Vec<PatternKey> {
    match problem.operator {
        Operator::Multiply => [problem.operand1, problem.operand2]
            .into_iter()
            .filter(|n| FACT_RANGE.contains(n))
            .map(PatternKey::Multiplication)
            .collect(),
        Operator::Divide if FACT_RANGE.contains(&problem.operand2) => {
            vec![PatternKey::Division(problem.operand2)]
        }
        Operator::Subtract if problem.needs_borrow() => vec![PatternKey::SubtractionBorrow],
        _ => Vec::new(),
    }
}

/// The slowest group that has enough samples to be trusted
#[derive(Debug, Clone, PartialEq)]
pub struct TroubleSpot<K> {
    pub group: K,
    pub average: f64,
    pub count: u32,
}

/// Arg-max of average time over buckets with at least `min_occurrences`
/// entries. On a tie the first bucket in iteration order is kept.
pub fn select_trouble_spot<'a, K, I>(buckets: I, min_occurrences: u32) -> Option<TroubleSpot<K>>
where
    K: Clone + 'a,
    I: IntoIterator<Item = (&'a K, &'a StatBucket)>,
{
    let mut slowest: Option<TroubleSpot<K>> = None;

    for (group, bucket) in buckets {
        if bucket.count < min_occurrences {
            continue;
        }
        let Some(average) = bucket.average() else {
            continue;
        };
        if slowest.as_ref().map_or(true, |s| average > s.average) {
            slowest = Some(TroubleSpot {
                group: group.clone(),
                average,
                count: bucket.count,
            });
        }
    }

    slowest
}

/// One bucket per operator, all four always present
pub fn group_by_operator(results: &[ProblemResult]) -> BTreeMap<Operator, StatBucket> {
    let mut stats: BTreeMap<Operator, StatBucket> = Operator::ALL
        .into_iter()
        .map(|op| (op, StatBucket::default()))
        .collect();

    for result in results {
        if let Some(parsed) = parse(&result.problem) {
            stats.entry(parsed.operator).or_default().record(result.time);
        }
    }

    stats
}

/// Each result counts once toward each of its two operands
pub fn group_by_operand(results: &[ProblemResult]) -> BTreeMap<u32, StatBucket> {
    let mut stats: BTreeMap<u32, StatBucket> = BTreeMap::new();

    for result in results {
        let Some(tokens) = tokenize(&result.problem) else {
            continue;
        };
        for operand in tokens.operands() {
            stats.entry(operand).or_default().record(result.time);
        }
    }

    stats
}

pub fn group_by_pattern(results: &[ProblemResult]) -> BTreeMap<PatternKey, StatBucket> {
    let mut stats: BTreeMap<PatternKey, StatBucket> = BTreeMap::new();

    for result in results {
        let Some(parsed) = parse(&result.problem) else {
            continue;
        };
        for key in pattern_keys(&parsed) {
            stats.entry(key).or_default().record(result.time);
        }
    }

    stats
}

/// How the parser saw one problem
#[derive(Debug, Clone, PartialEq)]
pub enum ParseSample {
    Parsed {
        problem: String,
        tokens: ProblemTokens,
    },
    NoMatch {
        problem: String,
    },
}

/// Counters explaining what the pattern grouping matched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatternDiagnostics {
    pub total_problems: usize,
    pub multiplication_problems: usize,
    pub division_problems: usize,
    pub subtraction_with_borrow: usize,
    pub unmatched_problems: usize,
    pub samples: Vec<ParseSample>,
}

pub fn diagnose_patterns(results: &[ProblemResult]) -> PatternDiagnostics {
    let mut diagnostics = PatternDiagnostics {
        total_problems: results.len(),
        ..Default::default()
    };

    for result in results {
        let Some(tokens) = tokenize(&result.problem) else {
            diagnostics.unmatched_problems += 1;
            if diagnostics.samples.len() < MAX_NO_MATCH_SAMPLES {
                diagnostics.samples.push(ParseSample::NoMatch {
                    problem: result.problem.clone(),
                });
            }
            continue;
        };

        if diagnostics.samples.len() < MAX_SAMPLES {
            diagnostics.samples.push(ParseSample::Parsed {
                problem: result.problem.clone(),
                tokens,
            });
        }

        match parse(&result.problem) {
            Some(p) if p.operator == Operator::Multiply => diagnostics.multiplication_problems += 1,
            Some(p) if p.operator == Operator::Divide => diagnostics.division_problems += 1,
            Some(p) if p.needs_borrow() => diagnostics.subtraction_with_borrow += 1,
            _ => {}
        }
    }

    diagnostics
}

/// Thresholds for an analysis pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Below this many results no trouble spot is reported at all
    pub min_total_results: usize,
    pub operator_min_occurrences: u32,
    pub number_min_occurrences: u32,
    pub pattern_min_occurrences: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_total_results: 10,
            operator_min_occurrences: 1,
            number_min_occurrences: 3,
            pattern_min_occurrences: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSufficiency {
    Empty,
    Insufficient,
    Limited,
    Good,
}

impl DataSufficiency {
    pub fn assess(total_results: usize, min_total_results: usize) -> Self {
        if total_results == 0 {
            DataSufficiency::Empty
        } else if total_results < min_total_results {
            DataSufficiency::Insufficient
        } else if total_results < GOOD_DATA_THRESHOLD {
            DataSufficiency::Limited
        } else {
            DataSufficiency::Good
        }
    }

    pub fn allows_analysis(self) -> bool {
        matches!(self, DataSufficiency::Limited | DataSufficiency::Good)
    }
}

/// Full analysis of a result history snapshot
#[derive(Debug, Clone)]
pub struct Analysis {
    pub total_results: usize,
    pub sufficiency: DataSufficiency,
    pub by_operator: BTreeMap<Operator, StatBucket>,
    pub by_operand: BTreeMap<u32, StatBucket>,
    pub by_pattern: BTreeMap<PatternKey, StatBucket>,
    pub diagnostics: PatternDiagnostics,
    pub slowest_operator: Option<TroubleSpot<Operator>>,
    pub trouble_number: Option<TroubleSpot<u32>>,
    pub trouble_pattern: Option<TroubleSpot<PatternKey>>,
}

impl Analysis {
    /// Only the pattern trouble spot is ever acted on
    pub fn training_goal(&self) -> Option<TrainingGoal> {
        self.trouble_pattern
            .as_ref()
            .map(|spot| TrainingGoal::from(spot.group))
    }

    /// Operands ordered by average time, slowest first
    pub fn slowest_operands(&self, limit: usize) -> Vec<(u32, StatBucket)> {
        self.by_operand
            .iter()
            .map(|(n, bucket)| (*n, *bucket))
            .sorted_by(|a, b| {
                let a_avg = a.1.average().unwrap_or(0.0);
                let b_avg = b.1.average().unwrap_or(0.0);
                b_avg.partial_cmp(&a_avg).unwrap_or(std::cmp::Ordering::Equal)
            })
            .take(limit)
            .collect()
    }
}

/// Aggregate every grouping and pick trouble spots when there is enough data
pub fn analyze(results: &[ProblemResult], config: &AnalysisConfig) -> Analysis {
    let sufficiency = DataSufficiency::assess(results.len(), config.min_total_results);

    let by_operator = group_by_operator(results);
    let by_operand = group_by_operand(results);
    let by_pattern = group_by_pattern(results);

    let (slowest_operator, trouble_number, trouble_pattern) = if sufficiency.allows_analysis() {
        (
            select_trouble_spot(&by_operator, config.operator_min_occurrences),
            select_trouble_spot(&by_operand, config.number_min_occurrences),
            select_trouble_spot(&by_pattern, config.pattern_min_occurrences),
        )
    } else {
        (None, None, None)
    };

    Analysis {
        total_results: results.len(),
        sufficiency,
        by_operator,
        by_operand,
        by_pattern,
        diagnostics: diagnose_patterns(results),
        slowest_operator,
        trouble_number,
        trouble_pattern,
    }
}
