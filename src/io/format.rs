//! Banners and value formatting for the `qredux-output` log target.
//!
//! The binary routes this target to the main output stream, so everything written through
//! [`qredux_output`] forms the human-readable report of a run.

use std::fmt;

use itertools::Itertools;
use log;

#[cfg(test)]
#[path = "format_tests.rs"]
mod format_tests;

/// Minimum outer width of a title banner, in characters.
const BANNER_WIDTH: usize = 103;

/// Emits a warning both on the default target and in the report.
macro_rules! qredux_warn {
    ($fmt:expr $(, $($arg:tt)*)?) => {
        log::warn!($fmt, $($($arg)*)?);
        log::warn!(target: "qredux-output", $fmt, $($($arg)*)?);
    }
}

/// Emits one line of the report.
macro_rules! qredux_output {
    ($fmt:expr $(, $($arg:tt)*)?) => { log::info!(target: "qredux-output", $fmt, $($($arg)*)?); }
}

pub(crate) use {qredux_output, qredux_warn};

/// A boxed, centred title. Long titles widen the box.
fn title_lines(title: &str) -> [String; 3] {
    let inner = title.chars().count().max(BANNER_WIDTH - 6);
    let rule = "─".repeat(inner + 4);
    [
        format!("┌{rule}┐"),
        format!("│§ {title:^inner$} §│"),
        format!("└{rule}┘"),
    ]
}

/// A subtitle underlined to its own length.
fn subtitle_lines(subtitle: &str) -> [String; 2] {
    [subtitle.to_string(), "═".repeat(subtitle.chars().count())]
}

pub(crate) fn write_title(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    title_lines(title).iter().try_for_each(|line| writeln!(f, "{line}"))
}

pub(crate) fn log_title(title: &str) {
    for line in title_lines(title) {
        qredux_output!("{line}");
    }
}

pub(crate) fn write_subtitle(f: &mut fmt::Formatter<'_>, subtitle: &str) -> fmt::Result {
    subtitle_lines(subtitle).iter().try_for_each(|line| writeln!(f, "{line}"))
}

pub(crate) fn log_subtitle(subtitle: &str) {
    for line in subtitle_lines(subtitle) {
        qredux_output!("{line}");
    }
}

pub(crate) fn nice_bool(b: bool) -> &'static str {
    if b {
        "yes"
    } else {
        "no"
    }
}

/// `[0, 2, 5]` for a list, `[]` for an empty one and `--` when absent.
pub(crate) fn nice_indices(indices: Option<&Vec<usize>>) -> String {
    indices.map_or_else(
        || "--".to_string(),
        |indices| format!("[{}]", indices.iter().join(", ")),
    )
}

/// Sends the [`fmt::Display`] rendering of a value to the report, one log record per line.
pub(crate) trait QReduxOutput: fmt::Display {
    fn log_output_display(&self) {
        for line in self.to_string().lines() {
            qredux_output!("{line}");
        }
    }
}

impl<T> QReduxOutput for T where T: fmt::Display {}
