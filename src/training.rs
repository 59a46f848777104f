use crate::analysis::PatternKey;
use crate::problem::Operator;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What the next session should drill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrainingGoal {
    MultiplicationFact(u32),
    DivisionFact(u32),
    Borrow,
    General(Operator),
}

impl TrainingGoal {
    /// Legacy string key: `*_7`, `/_4`, `sub_borrow`, or a bare operator symbol
    pub fn key(&self) -> String {
        match self {
            TrainingGoal::MultiplicationFact(n) => PatternKey::Multiplication(*n).key(),
            TrainingGoal::DivisionFact(n) => PatternKey::Division(*n).key(),
            TrainingGoal::Borrow => PatternKey::SubtractionBorrow.key(),
            TrainingGoal::General(op) => op.symbol().to_string(),
        }
    }

    /// Inverse of [`TrainingGoal::key`]; anything else is `None`
    pub fn from_key(key: &str) -> Option<Self> {
        if key == "sub_borrow" {
            return Some(TrainingGoal::Borrow);
        }

        if let Some((op, number)) = key.split_once('_') {
            let number: u32 = number.parse().ok()?;
            return match op {
                "*" => Some(TrainingGoal::MultiplicationFact(number)),
                "/" => Some(TrainingGoal::DivisionFact(number)),
                _ => None,
            };
        }

        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
            (Some(symbol), None) => Operator::from_symbol(symbol).map(TrainingGoal::General),
            _ => None,
        }
    }

    pub fn training_type(&self) -> TrainingType {
        match *self {
            TrainingGoal::MultiplicationFact(number) => TrainingType::SpecificNumber {
                operation: Operator::Multiply,
                number,
            },
            TrainingGoal::DivisionFact(number) => TrainingType::SpecificNumber {
                operation: Operator::Divide,
                number,
            },
            TrainingGoal::Borrow => TrainingType::Borrow,
            TrainingGoal::General(operation) => TrainingType::General { operation },
        }
    }

    pub fn label(&self) -> String {
        match self {
            TrainingGoal::MultiplicationFact(n) => PatternKey::Multiplication(*n).label(),
            TrainingGoal::DivisionFact(n) => PatternKey::Division(*n).label(),
            TrainingGoal::Borrow => PatternKey::SubtractionBorrow.label(),
            TrainingGoal::General(op) => op.name().to_string(),
        }
    }
}

impl fmt::Display for TrainingGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl From<PatternKey> for TrainingGoal {
    fn from(key: PatternKey) -> Self {
        match key {
            PatternKey::Multiplication(n) => TrainingGoal::MultiplicationFact(n),
            PatternKey::Division(n) => TrainingGoal::DivisionFact(n),
            PatternKey::SubtractionBorrow => TrainingGoal::Borrow,
        }
    }
}

/// Persisted shape of a training goal, stored next to its key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrainingType {
    SpecificNumber { operation: Operator, number: u32 },
    Borrow,
    General { operation: Operator },
}

impl TrainingType {
    /// A specific-number goal for `+` or `-` has no fact drill and is
    /// treated as general training for that operator.
    pub fn goal(&self) -> TrainingGoal {
        match *self {
            TrainingType::SpecificNumber {
                operation: Operator::Multiply,
                number,
            } => TrainingGoal::MultiplicationFact(number),
            TrainingType::SpecificNumber {
                operation: Operator::Divide,
                number,
            } => TrainingGoal::DivisionFact(number),
            TrainingType::SpecificNumber { operation, .. } => TrainingGoal::General(operation),
            TrainingType::Borrow => TrainingGoal::Borrow,
            TrainingType::General { operation } => TrainingGoal::General(operation),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_vocabulary() {
        let goals = [
            (TrainingGoal::MultiplicationFact(7), "*_7"),
            (TrainingGoal::DivisionFact(12), "/_12"),
            (TrainingGoal::Borrow, "sub_borrow"),
            (TrainingGoal::General(Operator::Add), "+"),
            (TrainingGoal::General(Operator::Divide), "/"),
        ];

        for (goal, key) in goals {
            assert_eq!(goal.key(), key);
            assert_eq!(TrainingGoal::from_key(key), Some(goal));
        }
    }

    #[test]
    fn test_from_key_rejects_unknown() {
        for key in ["", "x", "*_", "*_seven", "+_3", "sub", "borrow", "**", "%"] {
            assert_eq!(TrainingGoal::from_key(key), None, "{key} should not parse");
        }
    }

    #[test]
    fn test_training_type_json() {
        let json =
            serde_json::to_value(TrainingGoal::MultiplicationFact(7).training_type()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "specific_number", "operation": "*", "number": 7})
        );

        let json = serde_json::to_value(TrainingGoal::Borrow.training_type()).unwrap();
        assert_eq!(json, serde_json::json!({"type": "borrow"}));

        let json = serde_json::to_value(TrainingGoal::General(Operator::Subtract).training_type())
            .unwrap();
        assert_eq!(json, serde_json::json!({"type": "general", "operation": "-"}));
    }

    #[test]
    fn test_training_type_goal() {
        for goal in [
            TrainingGoal::MultiplicationFact(3),
            TrainingGoal::DivisionFact(9),
            TrainingGoal::Borrow,
            TrainingGoal::General(Operator::Multiply),
        ] {
            assert_eq!(goal.training_type().goal(), goal);
        }

        let odd = TrainingType::SpecificNumber {
            operation: Operator::Add,
            number: 4,
        };
        assert_eq!(odd.goal(), TrainingGoal::General(Operator::Add));
    }

    #[test]
    fn test_from_pattern_key() {
        assert_eq!(
            TrainingGoal::from(PatternKey::Division(6)),
            TrainingGoal::DivisionFact(6)
        );
        assert_eq!(TrainingGoal::Borrow.label(), "Subtraction (with Borrowing)");
    }
}
