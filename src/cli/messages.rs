//! General message formatting functions for prettifying the CLI.
//!
//! - Highlight Text (make the text ferrum red but not bold)
//! - Dim Text (secondary output in grey)
//! - System message formatting functions that produce the same
//! format messages.

use colored::Colorize;

use crate::cli::colors::{FERRUM_GREY, FERRUM_RED};

pub fn highlight_argument(argument: &str) -> String {
    //! Highlight a piece of text in the ferrum red
    //! color to make it obvious.

    format!("{}", argument.color(FERRUM_RED))
}

pub fn dim_argument(argument: &str) -> String {
    format!("{}", argument.color(FERRUM_GREY))
}

pub fn system_message(source_name: &str, message: String) -> String {
    //! Format a system message for the command line according to the
    //! command line theme.
    //!
    //! Takes in a source name (like 'system') and the message as a
    //! formatted text; output of [`format!`].

    let source_formatted = format!("{:6}", source_name.color(FERRUM_RED).bold());

    format!("[{}] {}", source_formatted, message)
}
