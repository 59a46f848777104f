use crate::problem::Operator;
use crate::training::TrainingGoal;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const DEFAULT_BORROW_SAMPLE_SIZE: usize = 30;

/// Which optional controls the game's setup form offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormCapabilities {
    /// Free-text field taking a comma separated problem list
    pub custom_problems: bool,
    /// Min/max number fields
    pub number_range: bool,
}

impl Default for FormCapabilities {
    fn default() -> Self {
        Self {
            custom_problems: true,
            number_range: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnabledOperations {
    pub add: bool,
    pub subtract: bool,
    pub multiply: bool,
    pub divide: bool,
}

impl EnabledOperations {
    pub fn only(op: Operator) -> Self {
        let mut ops = Self::default();
        match op {
            Operator::Add => ops.add = true,
            Operator::Subtract => ops.subtract = true,
            Operator::Multiply => ops.multiply = true,
            Operator::Divide => ops.divide = true,
        }
        ops
    }

    pub fn is_enabled(&self, op: Operator) -> bool {
        match op {
            Operator::Add => self.add,
            Operator::Subtract => self.subtract,
            Operator::Multiply => self.multiply,
            Operator::Divide => self.divide,
        }
    }

    pub fn enabled(&self) -> Vec<Operator> {
        Operator::ALL
            .into_iter()
            .filter(|op| self.is_enabled(*op))
            .collect()
    }
}

/// Extra material for the session beyond the operation toggles
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Practice {
    #[default]
    None,
    CustomProblems {
        problems: Vec<String>,
    },
    Range {
        min: u32,
        max: u32,
    },
}

/// Settings for a fresh game, decided without touching the host page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub operations: EnabledOperations,
    pub practice: Practice,
}

impl SessionConfig {
    /// Value for the custom problem field
    pub fn custom_field_value(&self) -> Option<String> {
        match &self.practice {
            Practice::CustomProblems { problems } => Some(problems.join(", ")),
            _ => None,
        }
    }

    /// True when nothing would be enabled
    pub fn is_noop(&self) -> bool {
        self.operations.enabled().is_empty() && self.practice == Practice::None
    }
}

/// `n × i` and `i × n` for every table fact 2..=12
pub fn multiplication_drill(n: u32) -> Vec<String> {
    (2..=12)
        .flat_map(|i| [format!("{n} × {i}"), format!("{i} × {n}")])
        .collect()
}

/// `(n·i) ÷ n` for i in 1..=12
pub fn division_drill(n: u32) -> Vec<String> {
    (1..=12)
        .map(|i| format!("{} ÷ {n}", n.saturating_mul(i)))
        .collect()
}

/// Every two-digit subtraction whose ones column needs a borrow, as
/// `(minuend, subtrahend)` with the subtrahend one ten lower
pub fn borrow_candidates() -> Vec<(u32, u32)> {
    let mut pairs = Vec::new();
    for tens in 2..=9u32 {
        for ones1 in 0..=4u32 {
            for ones2 in (ones1 + 1)..=9 {
                let minuend = tens * 10 + ones1;
                let subtrahend = (tens - 1) * 10 + ones2;
                if subtrahend > 0 && minuend > subtrahend {
                    pairs.push((minuend, subtrahend));
                }
            }
        }
    }
    pairs
}

/// Random subset of [`borrow_candidates`]; unseeded, so only the candidate
/// set is stable between calls
pub fn borrow_drill(sample_size: usize) -> Vec<String> {
    let candidates = borrow_candidates();
    let mut rng = rand::thread_rng();
    candidates
        .choose_multiple(&mut rng, sample_size)
        .map(|(a, b)| format!("{a} - {b}"))
        .collect()
}

/// Translate a training goal into concrete game settings.
///
/// Exactly one operation is enabled. Practice material depends on which
/// form controls exist: multiplication falls back to a number range when
/// there is no custom field, division and borrow practice fall back to the
/// plain toggle.
pub fn build_session_config(
    goal: &TrainingGoal,
    capabilities: FormCapabilities,
    borrow_sample_size: usize,
) -> SessionConfig {
    match *goal {
        TrainingGoal::MultiplicationFact(n) => {
            let practice = if capabilities.custom_problems {
                Practice::CustomProblems {
                    problems: multiplication_drill(n),
                }
            } else if capabilities.number_range {
                Practice::Range {
                    min: n.saturating_sub(2).max(2),
                    max: n.saturating_add(2).min(12),
                }
            } else {
                Practice::None
            };
            info!("Set up multiplication training for {}", n);
            SessionConfig {
                operations: EnabledOperations::only(Operator::Multiply),
                practice,
            }
        }
        TrainingGoal::DivisionFact(n) => {
            let practice = if capabilities.custom_problems {
                Practice::CustomProblems {
                    problems: division_drill(n),
                }
            } else {
                Practice::None
            };
            info!("Set up division training for {}", n);
            SessionConfig {
                operations: EnabledOperations::only(Operator::Divide),
                practice,
            }
        }
        TrainingGoal::Borrow => {
            let practice = if capabilities.custom_problems {
                Practice::CustomProblems {
                    problems: borrow_drill(borrow_sample_size),
                }
            } else {
                Practice::None
            };
            info!("Set up borrowing practice");
            SessionConfig {
                operations: EnabledOperations::only(Operator::Subtract),
                practice,
            }
        }
        TrainingGoal::General(op) => {
            info!("Set up general training for {}", op);
            SessionConfig {
                operations: EnabledOperations::only(op),
                practice: Practice::None,
            }
        }
    }
}

/// Same as [`build_session_config`] for a legacy key string. Unknown keys give
/// an all-disabled config rather than an error.
pub fn build_session_config_for_key(
    key: &str,
    capabilities: FormCapabilities,
    borrow_sample_size: usize,
) -> SessionConfig {
    match TrainingGoal::from_key(key) {
        Some(goal) => build_session_config(&goal, capabilities, borrow_sample_size),
        None => {
            warn!("Unrecognized training goal {:?}, leaving every operation off", key);
            SessionConfig::default()
        }
    }
}

/// The host page's game setup controls
pub trait GameForm {
    /// False when the operation checkboxes could not be found
    fn has_operation_controls(&self) -> bool;
    fn capabilities(&self) -> FormCapabilities;
    fn set_operation(&mut self, op: Operator, enabled: bool);
    fn set_custom_problems(&mut self, value: &str);
    fn set_range(&mut self, min: u32, max: u32);
    /// Press the start button; false when there is none
    fn start(&mut self) -> bool;
}

/// Write a session config into the form and start the game.
///
/// Returns false and changes nothing when the operation controls are missing.
pub fn apply_session_config<F: GameForm>(config: &SessionConfig, form: &mut F) -> bool {
    if !form.has_operation_controls() {
        info!("Controls not found");
        return false;
    }

    for op in Operator::ALL {
        form.set_operation(op, false);
    }
    for op in config.operations.enabled() {
        form.set_operation(op, true);
    }

    let capabilities = form.capabilities();
    match &config.practice {
        Practice::CustomProblems { .. } if capabilities.custom_problems => {
            if let Some(value) = config.custom_field_value() {
                form.set_custom_problems(&value);
            }
        }
        Practice::Range { min, max } if capabilities.number_range => form.set_range(*min, *max),
        _ => {}
    }

    if form.start() {
        info!("Auto-started game");
    }
    true
}

/// Plain-data picture of the setup form, for hosts that apply it themselves
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    pub add: bool,
    pub sub: bool,
    pub mul: bool,
    pub div: bool,
    pub custom: Option<String>,
    pub min: Option<u32>,
    pub max: Option<u32>,
    pub start: bool,
    #[serde(skip)]
    capabilities: Option<FormCapabilities>,
}

impl FormState {
    pub fn new(capabilities: FormCapabilities) -> Self {
        Self {
            capabilities: Some(capabilities),
            ..Default::default()
        }
    }
}

impl GameForm for FormState {
    fn has_operation_controls(&self) -> bool {
        true
    }

    fn capabilities(&self) -> FormCapabilities {
        self.capabilities.unwrap_or_default()
    }

    fn set_operation(&mut self, op: Operator, enabled: bool) {
        match op {
            Operator::Add => self.add = enabled,
            Operator::Subtract => self.sub = enabled,
            Operator::Multiply => self.mul = enabled,
            Operator::Divide => self.div = enabled,
        }
    }

    fn set_custom_problems(&mut self, value: &str) {
        self.custom = Some(value.to_string());
    }

    fn set_range(&mut self, min: u32, max: u32) {
        self.min = Some(min);
        self.max = Some(max);
    }

    fn start(&mut self) -> bool {
        self.start = true;
        true
    }
}
