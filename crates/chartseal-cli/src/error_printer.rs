//! Error and confirmation output on stderr.
//!
//! Colors are disabled when `NO_COLOR` is set.

use colored::*;
use std::env;

/// Configuration for diagnostic printing.
#[derive(Debug, Clone)]
pub struct ErrorPrinterConfig {
    /// Enable colored output (respects NO_COLOR environment variable).
    pub use_colors: bool,
}

impl Default for ErrorPrinterConfig {
    fn default() -> Self {
        Self {
            use_colors: env::var("NO_COLOR").is_err(),
        }
    }
}

/// Render an error and its chain of causes.
pub fn format_error(error: &anyhow::Error, config: &ErrorPrinterConfig) -> String {
    let header = format!("Error: {error}");
    let mut out = if config.use_colors {
        header.red().bold().to_string()
    } else {
        header
    };

    for cause in error.chain().skip(1) {
        let line = format!("  caused by: {cause}");
        out.push('\n');
        if config.use_colors {
            out.push_str(&line.dimmed().to_string());
        } else {
            out.push_str(&line);
        }
    }
    out
}

pub fn print_error(error: &anyhow::Error, config: &ErrorPrinterConfig) {
    eprintln!("{}", format_error(error, config));
}

/// Print a one-line success message.
pub fn print_success(message: &str, config: &ErrorPrinterConfig) {
    if config.use_colors {
        eprintln!("{} {}", "✓".green().bold(), message);
    } else {
        eprintln!("✓ {message}");
    }
}
