use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// When a problem was solved, as the recorder reported it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    /// Milliseconds since the Unix epoch
    Millis(i64),
    /// Any other number a recorder wrote, e.g. `1697712345678.0`
    Number(f64),
    Text(String),
}

impl Timestamp {
    pub fn now() -> Self {
        Timestamp::from(Local::now())
    }
}

impl From<DateTime<Local>> for Timestamp {
    fn from(dt: DateTime<Local>) -> Self {
        Timestamp::Text(dt.to_rfc3339())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Millis(ms) => write!(f, "{ms}"),
            Timestamp::Number(n) => write!(f, "{n}"),
            Timestamp::Text(text) => f.write_str(text),
        }
    }
}

/// A single solved problem as captured from the game page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemResult {
    pub problem: String,
    /// Solve time in milliseconds
    pub time: f64,
    pub timestamp: Timestamp,
}

impl ProblemResult {
    pub fn new(problem: impl Into<String>, time: f64, timestamp: Timestamp) -> Self {
        Self {
            problem: problem.into(),
            time,
            timestamp,
        }
    }

    /// Stamped with the current local time
    pub fn now(problem: impl Into<String>, time: f64) -> Self {
        Self::new(problem, time, Timestamp::now())
    }

    /// Solve times must be finite and not negative
    pub fn has_valid_time(&self) -> bool {
        is_valid_time(self.time)
    }
}

pub fn is_valid_time(time: f64) -> bool {
    time.is_finite() && time >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_numeric_and_text_timestamps() {
        let json = r#"[
            {"problem": "5 × 7", "time": 1234.5, "timestamp": 1697712345678},
            {"problem": "12 ÷ 3", "time": 800, "timestamp": "2024-01-02T03:04:05.000Z"}
        ]"#;

        let results: Vec<ProblemResult> = serde_json::from_str(json).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].timestamp, Timestamp::Millis(1697712345678));
        assert_eq!(results[0].time, 1234.5);
        assert_eq!(
            results[1].timestamp,
            Timestamp::Text("2024-01-02T03:04:05.000Z".to_string())
        );
        assert_eq!(results[1].time, 800.0);
    }

    #[test]
    fn test_deserialize_fractional_timestamps() {
        let json = r#"[
            {"problem": "5 × 7", "time": 1234.5, "timestamp": 1697712345678.0},
            {"problem": "6 × 7", "time": 900, "timestamp": 1.7e12}
        ]"#;

        let results: Vec<ProblemResult> = serde_json::from_str(json).unwrap();

        assert_eq!(results[0].timestamp, Timestamp::Number(1697712345678.0));
        assert_eq!(results[0].timestamp.to_string(), "1697712345678");
        assert_eq!(results[1].timestamp.to_string(), "1700000000000");

        let back: Timestamp =
            serde_json::from_str(&serde_json::to_string(&results[0].timestamp).unwrap()).unwrap();
        assert_eq!(back, results[0].timestamp);
    }

    #[test]
    fn test_valid_times() {
        assert!(ProblemResult::now("2 + 2", 0.0).has_valid_time());
        assert!(ProblemResult::now("2 + 2", 812.5).has_valid_time());
        assert!(!ProblemResult::now("2 + 2", -5.0).has_valid_time());
        assert!(!ProblemResult::now("2 + 2", f64::NAN).has_valid_time());
        assert!(!ProblemResult::now("2 + 2", f64::INFINITY).has_valid_time());
    }

    #[test]
    fn test_timestamp_display() {
        assert_eq!(Timestamp::Millis(42).to_string(), "42");
        assert_eq!(Timestamp::Number(42.5).to_string(), "42.5");
        assert_eq!(Timestamp::Text("today".into()).to_string(), "today");
    }

    #[test]
    fn test_now_is_rfc3339() {
        let result = ProblemResult::now("2 + 2", 100.0);
        match result.timestamp {
            Timestamp::Text(text) => assert!(DateTime::parse_from_rfc3339(&text).is_ok()),
            other => panic!("expected a text timestamp, got {other:?}"),
        }
    }
}
