//! Terminal output for command results
//!
//! Every message the CLI shows the user goes through [`TerminalProgressReporter`] so that
//! prefixes and colors stay consistent. Errors and warnings go to stderr; everything else goes
//! to stdout. Emoji prefixes fall back to plain text on terminals without Unicode support.

use std::fmt::Display;

use console::{Emoji, style};

static ERROR_EMOJI: Emoji<'_, '_> = Emoji("❌ ", "[E] ");
static INFO_EMOJI: Emoji<'_, '_> = Emoji("ℹ️ ", "[I] ");
static PROGRESS_EMOJI: Emoji<'_, '_> = Emoji("• ", " • ");
static SUGGESTION_EMOJI: Emoji<'_, '_> = Emoji("✨", "-> ");
static SUCCESS_EMOJI: Emoji<'_, '_> = Emoji("✅ ", "OK ");
static WARN_EMOJI: Emoji<'_, '_> = Emoji("⚠️ ", "[W] ");

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum MessageType {
    Error,
    Info,
    Progress,
    Success,
    Suggestion,
    Warning,
}

/// Prints styled status lines
#[derive(Debug, Clone, Copy)]
pub struct TerminalProgressReporter {
    /// `false` under `--no-color`
    use_colors: bool,
}

impl TerminalProgressReporter {
    #[must_use]
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Prefix `message` and color it for `message_type`
    pub(crate) fn status_line(self, message_type: MessageType, message: impl Display) -> String {
        let prefix = match message_type {
            MessageType::Error => ERROR_EMOJI,
            MessageType::Info => INFO_EMOJI,
            MessageType::Progress => PROGRESS_EMOJI,
            MessageType::Success => SUCCESS_EMOJI,
            MessageType::Suggestion => SUGGESTION_EMOJI,
            MessageType::Warning => WARN_EMOJI,
        };

        if !self.use_colors {
            return format!("{prefix}{message}");
        }

        let formatted_message = match message_type {
            MessageType::Error => style(message).for_stderr().red().bold().to_string(),
            MessageType::Info => style(message).blue().to_string(),
            MessageType::Progress => style(message).dim().to_string(),
            MessageType::Success => style(message).green().to_string(),
            MessageType::Suggestion => {
                return format!("{prefix} {}: {message}", style("Hint").yellow().bold());
            }
            MessageType::Warning => style(message).for_stderr().yellow().bold().to_string(),
        };

        format!("{prefix}{formatted_message}")
    }

    pub(crate) fn format(indent: usize, message: impl Display) -> String {
        format!("{:indent$}{}", "", message, indent = indent)
    }

    pub(crate) fn format_error(self, message: impl Display) -> String {
        self.status_line(MessageType::Error, message)
    }

    pub(crate) fn format_warning(self, message: impl Display) -> String {
        self.status_line(MessageType::Warning, message)
    }

    /// Print `message` to stdout, indented by `indent` spaces
    pub(crate) fn report(indent: usize, message: impl Display) {
        println!("{}", Self::format(indent, message));
    }

    pub(crate) fn report_progress(self, message: impl Display) {
        println!("{}", self.status_line(MessageType::Progress, message));
    }

    pub(crate) fn report_success(self, message: impl Display) {
        println!("{}", self.status_line(MessageType::Success, message));
    }

    pub(crate) fn report_suggestion(self, message: impl Display) {
        println!("{}", self.status_line(MessageType::Suggestion, message));
    }

    pub(crate) fn report_info(self, message: impl Display) {
        println!("{}", self.status_line(MessageType::Info, message));
    }

    pub(crate) fn report_error(self, message: impl Display) {
        eprintln!("{}", self.format_error(message));
    }
}
