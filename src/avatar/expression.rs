//! Facial expressions
//!
//! Names arrive as free text from the link. Each expression answers to an
//! English name and a Japanese one.

use std::fmt;
use std::str::FromStr;

use crate::avatar::UnknownGesture;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expression {
    Neutral,
    Happy,
    Angry,
    Sad,
    Doubt,
    Sleepy,
    /// Neutral face with the eyes shut and blinking off
    Poet,
}

const ALIASES: &[(&str, Expression)] = &[
    ("Neutral", Expression::Neutral),
    ("中立", Expression::Neutral),
    ("Happy", Expression::Happy),
    ("嬉しい", Expression::Happy),
    ("Angry", Expression::Angry),
    ("怒り", Expression::Angry),
    ("Sad", Expression::Sad),
    ("悲しい", Expression::Sad),
    ("Doubt", Expression::Doubt),
    ("疑問", Expression::Doubt),
    ("Sleepy", Expression::Sleepy),
    ("眠い", Expression::Sleepy),
    ("Poet", Expression::Poet),
    ("俳人", Expression::Poet),
];

impl Expression {
    pub const ALL: [Expression; 7] = [
        Expression::Neutral,
        Expression::Happy,
        Expression::Angry,
        Expression::Sad,
        Expression::Doubt,
        Expression::Sleepy,
        Expression::Poet,
    ];

    /// Resolve a name, English or Japanese
    pub fn from_name(name: &str) -> Option<Self> {
        ALIASES
            .iter()
            .find(|(alias, _)| *alias == name)
            .map(|(_, expression)| *expression)
    }

    /// Tone the voice uses while this expression is shown
    pub fn beep_frequency(self) -> u32 {
        match self {
            Expression::Neutral => 1000,
            Expression::Happy => 1400,
            Expression::Angry => 600,
            Expression::Sad => 500,
            Expression::Doubt => 1100,
            Expression::Sleepy => 800,
            Expression::Poet => 700,
        }
    }

    /// Eyes closed and auto-blink disabled
    pub fn closes_eyes(self) -> bool {
        self == Expression::Poet
    }

    pub fn name(self) -> &'static str {
        match self {
            Expression::Neutral => "Neutral",
            Expression::Happy => "Happy",
            Expression::Angry => "Angry",
            Expression::Sad => "Sad",
            Expression::Doubt => "Doubt",
            Expression::Sleepy => "Sleepy",
            Expression::Poet => "Poet",
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Expression {
    type Err = UnknownGesture;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownGesture::Expression(s.to_string()))
    }
}
