//! Outcome classification for tool results
//!
//! `ip` and `ping` only report through an exit code and free-form text. The
//! phrases below are the ones iproute2/iputils print in the C locale; they are
//! kept in one table per operation and evaluated top to bottom after the
//! success check. Changing a phrase is a behavior change and needs a test.

use crate::executor::CommandResult;
use std::fmt;

/// Revision of the phrase tables below
pub const PHRASEBOOK_VERSION: u32 = 2;

/// `ping` exit code when the probe went out but no reply came back
pub const PING_NO_REPLY: i32 = 1;

/// Statistics line `ping` prints once probes were sent. The elevation helper
/// also exits 1 when it refuses, so the code alone does not mean "down".
pub const PING_STATISTICS: &str = "packets transmitted";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Remove,
    Test,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Add of an address that is already there
    AlreadyInDesiredState,
    /// Remove of an address that is not there
    NotFound,
    /// Probe answered
    Up,
    /// Probe sent, nothing came back
    Down,
    /// Remove of the loopback address, nothing was run
    Refused,
    GenericFailure,
}

impl Outcome {
    /// Only generic failures count as errors; the rest are convergence
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::GenericFailure)
    }
}

/// What a rule looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    OutputContains(&'static str),
    /// Exit code and phrase together
    ExitCodeWith(i32, &'static str),
}

impl Signal {
    pub fn matches(&self, result: &CommandResult) -> bool {
        match self {
            Signal::OutputContains(phrase) => result.contains(phrase),
            Signal::ExitCodeWith(code, phrase) => {
                result.status.code() == Some(*code) && result.contains(phrase)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub signal: Signal,
    pub outcome: Outcome,
    pub label: &'static str,
}

pub const ADD_RULES: &[Rule] = &[Rule {
    signal: Signal::OutputContains("File exists"),
    outcome: Outcome::AlreadyInDesiredState,
    label: "already exists, skipping!",
}];

pub const REMOVE_RULES: &[Rule] = &[Rule {
    signal: Signal::OutputContains("Cannot assign requested address"),
    outcome: Outcome::NotFound,
    label: "not found, skipping!",
}];

pub const TEST_RULES: &[Rule] = &[Rule {
    signal: Signal::ExitCodeWith(PING_NO_REPLY, PING_STATISTICS),
    outcome: Outcome::Down,
    label: "down",
}];

impl Operation {
    pub fn rules(&self) -> &'static [Rule] {
        match self {
            Operation::Add => ADD_RULES,
            Operation::Remove => REMOVE_RULES,
            Operation::Test => TEST_RULES,
        }
    }

    fn success(&self) -> (Outcome, &'static str) {
        match self {
            Operation::Add | Operation::Remove => (Outcome::Success, "done!"),
            Operation::Test => (Outcome::Up, "up"),
        }
    }

    /// Lead-in for a generic failure
    pub fn failure_label(&self) -> &'static str {
        match self {
            Operation::Add | Operation::Remove => "failed with error:",
            Operation::Test => "Ping error:",
        }
    }

    /// Verb used in the status line
    pub fn verb(&self) -> &'static str {
        match self {
            Operation::Add => "Adding",
            Operation::Remove => "Removing",
            Operation::Test => "Testing",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Add => write!(f, "add"),
            Operation::Remove => write!(f, "remove"),
            Operation::Test => write!(f, "test"),
        }
    }
}

/// Outcome plus the words shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub outcome: Outcome,
    pub label: &'static str,
    /// Raw tool text, only for generic failures
    pub detail: Option<String>,
}

impl Classification {
    pub fn new(outcome: Outcome, label: &'static str) -> Self {
        Self {
            outcome,
            label,
            detail: None,
        }
    }

    pub fn failure(label: &'static str, detail: String) -> Self {
        Self {
            outcome: Outcome::GenericFailure,
            label,
            detail: Some(detail),
        }
    }

    /// Unstyled status text
    pub fn text(&self) -> String {
        match &self.detail {
            Some(detail) => format!("{} {}", self.label, detail),
            None => self.label.to_string(),
        }
    }
}

/// Map a finished invocation of `op` to its outcome
pub fn classify(op: Operation, result: &CommandResult) -> Classification {
    if result.success() {
        let (outcome, label) = op.success();
        return Classification::new(outcome, label);
    }

    op.rules()
        .iter()
        .find(|rule| rule.signal.matches(result))
        .map(|rule| Classification::new(rule.outcome, rule.label))
        .unwrap_or_else(|| Classification::failure(op.failure_label(), result.detail()))
}
