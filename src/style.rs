//! Terminal styling for status lines

use colored::{ColoredString, Colorize};

/// When to emit ANSI styling on stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

/// Apply the color choice process-wide
pub fn apply(choice: ColorChoice) {
    match choice {
        ColorChoice::Always => colored::control::set_override(true),
        ColorChoice::Never => colored::control::set_override(false),
        ColorChoice::Auto => colored::control::set_override(atty::is(atty::Stream::Stdout)),
    }
}

/// Red and bold
pub fn as_error(text: &str) -> ColoredString {
    text.red().bold()
}

/// Green and bold
pub fn as_ok(text: &str) -> ColoredString {
    text.green().bold()
}

/// Yellow and italic
pub fn as_warning(text: &str) -> ColoredString {
    text.yellow().italic()
}

/// Blue
pub fn as_neutral(text: &str) -> ColoredString {
    text.blue()
}

/// Addresses: blue, bold
pub fn as_ip(text: &str) -> ColoredString {
    as_neutral(text).bold()
}

pub fn as_emphasis(text: &str) -> ColoredString {
    text.bold().italic()
}

pub fn as_underline(text: &str) -> ColoredString {
    text.underline()
}
