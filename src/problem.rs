use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// First integer, one non-space non-digit glyph, second integer.
/// ASCII digits only so every capture fits `str::parse`.
static PROBLEM_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"([0-9]+)\s*([^\s0-9])\s*([0-9]+)").ok());

/// The four arithmetic operations the game can drill
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    strum_macros::Display,
)]
pub enum Operator {
    #[serde(rename = "+")]
    #[strum(to_string = "+")]
    Add,
    #[serde(rename = "-")]
    #[strum(to_string = "-")]
    Subtract,
    #[serde(rename = "*")]
    #[strum(to_string = "*")]
    Multiply,
    #[serde(rename = "/")]
    #[strum(to_string = "/")]
    Divide,
}

impl Operator {
    /// Fixed display and iteration order
    pub const ALL: [Operator; 4] = [
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
    ];

    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '*',
            Operator::Divide => '/',
        }
    }

    /// Only the canonical symbols; use [`normalize_operator`] first for raw glyphs
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Subtract),
            '*' => Some(Operator::Multiply),
            '/' => Some(Operator::Divide),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Operator::Add => "Addition",
            Operator::Subtract => "Subtraction",
            Operator::Multiply => "Multiplication",
            Operator::Divide => "Division",
        }
    }
}

/// Map an operator glyph from the game page to its canonical symbol.
///
/// Unrecognized glyphs come back unchanged.
pub fn normalize_operator(glyph: char) -> char {
    match glyph {
        '×' | 'x' | 'X' | '*' => '*',
        '÷' | '/' => '/',
        '–' | '-' | '−' => '-',
        '+' => '+',
        other => other,
    }
}

/// Raw pieces of a problem string before the operator is normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProblemTokens {
    pub operand1: u32,
    pub glyph: char,
    pub operand2: u32,
}

impl ProblemTokens {
    pub fn normalized_glyph(&self) -> char {
        normalize_operator(self.glyph)
    }

    pub fn operands(&self) -> [u32; 2] {
        [self.operand1, self.operand2]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedProblem {
    pub operand1: u32,
    pub operator: Operator,
    pub operand2: u32,
}

impl ParsedProblem {
    /// Ones digit of the minuend smaller than the ones digit of the subtrahend.
    ///
    /// Only looks at the ones column, so a borrow needed further left such as
    /// `312 - 41` is not recognized.
    pub fn needs_borrow(&self) -> bool {
        self.operator == Operator::Subtract && self.operand1 % 10 < self.operand2 % 10
    }
}

/// Split problem text into its two operands and the glyph between them.
///
/// Any single non-space, non-digit character is accepted as the glyph. The
/// leftmost match wins; text without one yields `None`.
pub fn tokenize(text: &str) -> Option<ProblemTokens> {
    let pattern = PROBLEM_PATTERN.as_ref()?;
    let caps = pattern.captures(text)?;

    let operand1 = caps.get(1)?.as_str().parse().ok()?;
    let glyph = caps.get(2)?.as_str().chars().next()?;
    let operand2 = caps.get(3)?.as_str().parse().ok()?;

    Some(ProblemTokens {
        operand1,
        glyph,
        operand2,
    })
}

/// Parse problem text into operands and a canonical operator.
///
/// Returns `None` when the text has no `<int> <glyph> <int>` shape or when the
/// glyph is not one of the known operator spellings. Callers skip such items.
pub fn parse(text: &str) -> Option<ParsedProblem> {
    let tokens = tokenize(text)?;
    let operator = Operator::from_symbol(tokens.normalized_glyph())?;

    Some(ParsedProblem {
        operand1: tokens.operand1,
        operator,
        operand2: tokens.operand2,
    })
}

pub const PARSER_SAMPLES: [&str; 8] = [
    "5 × 7", "12 ÷ 3", "45 - 28", "67 + 19", "8 x 9", "56 / 8", "23 – 17", "4 * 6",
];

/// One line per problem describing how the parser sees it
pub fn describe_parse(problem: &str) -> String {
    match tokenize(problem) {
        Some(tokens) => format!(
            "OK: \"{}\" --> op:\"{}\" --> normalized:\"{}\"",
            problem,
            tokens.glyph,
            tokens.normalized_glyph()
        ),
        None => format!("FAIL: \"{problem}\" --> NO MATCH"),
    }
}
