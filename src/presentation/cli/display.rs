use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Display utilities for the CLI interface
#[derive(Debug, Clone, Copy)]
pub struct DisplayHelper {
    pub use_color: bool,
}

impl DisplayHelper {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    pub fn success(&self, message: &str) {
        if self.use_color {
            println!("{} {}", "✓".green().bold(), message);
        } else {
            println!("[SUCCESS] {}", message);
        }
    }

    pub fn error(&self, message: &str) {
        if self.use_color {
            eprintln!("{} {}", "✗".red().bold(), message);
        } else {
            eprintln!("[ERROR] {}", message);
        }
    }

    pub fn warning(&self, message: &str) {
        if self.use_color {
            println!("{} {}", "⚠".yellow().bold(), message);
        } else {
            println!("[WARNING] {}", message);
        }
    }

    pub fn info(&self, message: &str) {
        if self.use_color {
            println!("{} {}", "::".blue().bold(), message);
        } else {
            println!("[INFO] {}", message);
        }
    }

    /// Spinner for operations of unknown length; hidden without color
    pub fn create_spinner(&self, message: &str) -> ProgressBar {
        if !self.use_color {
            return ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden());
        }

        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .tick_strings(&["⠁", "⠂", "⠄", "⡀", "⢀", "⠠", "⠐", "⠈", ""])
            .template("{spinner:.green} {msg}");
        if let Ok(style) = style {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner
    }

    pub fn print_indented(&self, message: &str, level: usize) {
        println!("{}{}", "  ".repeat(level), message);
    }
}
