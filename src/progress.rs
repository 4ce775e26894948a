//! Terminal progress and confirmation for apply.

use colored::Colorize;
use declarative::{Action, Address, ApplyResult, ConfirmCallback, Phase, ProgressCallback};
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;

/// One progress bar per dependency tier; failures are printed above it.
pub struct BarProgress {
    bar: Option<ProgressBar>,
    quiet: bool,
}

impl BarProgress {
    pub fn new(quiet: bool) -> Self {
        Self { bar: None, quiet }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }
}

/// Marker for one finished change
pub fn result_symbol(result: &ApplyResult) -> &'static str {
    match result {
        ApplyResult::NoChange => "○",
        ApplyResult::Created
        | ApplyResult::Updated
        | ApplyResult::Replaced
        | ApplyResult::Removed => "✓",
        ApplyResult::Failed { .. } => "✗",
        ApplyResult::Skipped { .. } => "⊘",
    }
}

impl ProgressCallback for BarProgress {
    fn on_batch_start(&mut self, count: usize, phase: Phase) {
        if self.quiet {
            return;
        }
        let bar = ProgressBar::new(count as u64);
        bar.set_style(Self::style());
        bar.set_message(match phase {
            Phase::Destroy => "Destroying",
            Phase::Write => "Applying",
        });
        self.bar = Some(bar);
    }

    fn on_resource_complete(&mut self, address: &Address, action: Action, result: &ApplyResult) {
        let line = match result {
            ApplyResult::Failed { error } => Some(format!(
                "  {} {address}: {action} failed: {}",
                "✗".red(),
                error.dimmed()
            )),
            ApplyResult::Skipped { reason } if !self.quiet => Some(format!(
                "  {} {address}: {action} skipped ({reason})",
                result_symbol(result)
            )),
            _ => None,
        };
        match &self.bar {
            Some(bar) => {
                if let Some(line) = line {
                    bar.suspend(|| println!("{line}"));
                }
                bar.set_message(format!("{} {address}", result_symbol(result)));
                bar.inc(1);
            }
            None => {
                if let Some(line) = line {
                    println!("{line}");
                }
            }
        }
    }

    fn on_batch_complete(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

/// Asks on the terminal before applying.
pub struct PromptConfirm;

impl ConfirmCallback for PromptConfirm {
    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        Confirm::new()
            .with_prompt(prompt)
            .default(true)
            .interact()
            .map_err(io::Error::other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_symbols() {
        assert_eq!(result_symbol(&ApplyResult::Created), "✓");
        assert_eq!(result_symbol(&ApplyResult::Removed), "✓");
        assert_eq!(result_symbol(&ApplyResult::NoChange), "○");
        assert_eq!(
            result_symbol(&ApplyResult::Failed {
                error: "boom".into()
            }),
            "✗"
        );
    }

    #[test]
    fn test_quiet_progress_has_no_bar() {
        let mut progress = BarProgress::new(true);
        progress.on_batch_start(3, Phase::Write);
        assert!(progress.bar.is_none());
        progress.on_resource_complete(
            &Address::new("sftpgo_role", "ops"),
            Action::Create,
            &ApplyResult::Created,
        );
        progress.on_batch_complete();
    }

    #[test]
    fn test_bar_lifecycle() {
        let mut progress = BarProgress::new(false);
        progress.on_batch_start(1, Phase::Destroy);
        assert_eq!(progress.bar.as_ref().map(ProgressBar::length), Some(Some(1)));
        progress.on_resource_complete(
            &Address::new("sftpgo_role", "ops"),
            Action::Delete,
            &ApplyResult::Removed,
        );
        assert_eq!(progress.bar.as_ref().map(ProgressBar::position), Some(1));
        progress.on_batch_complete();
        assert!(progress.bar.is_none());
    }
}
