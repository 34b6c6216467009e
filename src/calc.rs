use serde::{Deserialize, Serialize};
use std::fmt;

/// One-decimal rounding used for every stored score: `Int(10*x + 0.5) / 10`.
pub fn round_off_1_decimal(x: f64) -> f64 {
    ((10.0 * x) + 0.5).floor() / 10.0
}

/// The four weighted inputs of a grade summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Attendance,
    Assignment,
    Test,
    Exam,
}

impl Component {
    pub const ALL: [Component; 4] = [
        Component::Attendance,
        Component::Assignment,
        Component::Test,
        Component::Exam,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "attendance" => Some(Self::Attendance),
            "assignment" => Some(Self::Assignment),
            "test" => Some(Self::Test),
            "exam" => Some(Self::Exam),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Attendance => "attendance",
            Self::Assignment => "assignment",
            Self::Test => "test",
            Self::Exam => "exam",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Attendance => "Attendance",
            Self::Assignment => "Assignment",
            Self::Test => "Test",
            Self::Exam => "Exam",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LetterGrade {
    A,
    B,
    C,
    D,
    F,
}

impl LetterGrade {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "C" => Some(Self::C),
            "D" => Some(Self::D),
            "F" => Some(Self::F),
            _ => None,
        }
    }
}

/// Attendance component earned for `present_days` out of `total_days`,
/// scaled to the configured attendance weight.
pub fn attendance_score(present_days: u32, total_days: u32, attendance_pct: u32) -> f64 {
    if total_days == 0 {
        return 0.0;
    }
    let ratio = (present_days.min(total_days) as f64) / (total_days as f64);
    round_off_1_decimal(ratio * attendance_pct as f64)
}

/// Sum of the four component scores at stored precision.
pub fn total_of(attendance: f64, assignment: f64, test: f64, exam: f64) -> f64 {
    round_off_1_decimal(attendance + assignment + test + exam)
}
