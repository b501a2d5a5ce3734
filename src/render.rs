//! Status line rendering

use crate::alias::{Action, AliasReport};
use crate::classify::{Classification, Operation, Outcome};
use crate::style::{as_emphasis, as_error, as_ip, as_ok, as_underline, as_warning};
use colored::Colorize;

/// One line per report, without the trailing newline
pub fn render(report: &AliasReport) -> String {
    let status = render_status(&report.status);
    let target = as_ip(&report.target);

    match report.action {
        Action::Add => format!("{} {} ... {}", Operation::Add.verb(), target, status),
        Action::Remove => format!("{} {} ... {}", Operation::Remove.verb(), target, status),
        Action::Test => format!("{} {} ... {}", Operation::Test.verb(), target, status),
        Action::ListEntry => format!("{}: {}", target, status),
        // The query line stands alone; the reason goes to the log
        Action::Query => as_underline(report.status.label).red().bold().to_string(),
    }
}

fn render_status(status: &Classification) -> String {
    match status.outcome {
        Outcome::Success | Outcome::Up => as_ok(status.label).to_string(),
        Outcome::Down => as_error(status.label).to_string(),
        Outcome::AlreadyInDesiredState | Outcome::NotFound => as_warning(status.label).to_string(),
        Outcome::Refused => match status.label.split_once(' ') {
            Some((lead, rest)) => format!("{} {}", as_emphasis(lead), as_error(rest)),
            None => as_error(status.label).to_string(),
        },
        Outcome::GenericFailure => match &status.detail {
            Some(detail) => format!("{} {}", status.label, as_error(detail)),
            None => as_error(status.label).to_string(),
        },
    }
}
