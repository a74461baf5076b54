use std::fmt::Display;

use colored::Colorize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

/// Pass/fail ledger for one run, printed as it fills
#[derive(Debug, Default)]
pub struct Report {
    steps: Vec<StepResult>,
}

impl Report {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records and prints one step. Returns the success value, if any.
    pub fn record<T, E: Display>(
        &mut self,
        name: &str,
        outcome: Result<T, E>,
        describe: impl FnOnce(&T) -> String,
    ) -> Option<T> {
        match outcome {
            Ok(value) => {
                let detail = describe(&value);
                println!("{} {name} {}", "✅".green(), detail.dimmed());
                self.push(name, true, detail);
                Some(value)
            }
            Err(error) => {
                let detail = format!("{error:#}");
                println!("{} {name}: {}", "❌".red(), detail.red());
                self.push(name, false, detail);
                None
            }
        }
    }

    /// Records a step that could not run because an earlier one failed.
    pub fn skip(&mut self, name: &str, reason: &str) {
        println!("{} {name}: {}", "⏭".yellow(), reason.yellow());
        self.push(name, false, format!("skipped: {reason}"));
    }

    fn push(&mut self, name: &str, passed: bool, detail: String) {
        self.steps.push(StepResult {
            name: name.to_string(),
            passed,
            detail,
        });
    }

    #[must_use]
    pub fn steps(&self) -> &[StepResult] {
        &self.steps
    }

    #[must_use]
    pub fn passed(&self) -> usize {
        self.steps.iter().filter(|step| step.passed).count()
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.steps.iter().all(|step| step.passed)
    }

    pub fn print_summary(&self) {
        let total = self.steps.len();
        let passed = self.passed();
        println!();
        println!("{}", "=".repeat(60));
        let line = format!("{passed}/{total} steps passed");
        if self.all_passed() {
            println!("{} {}", "🎉".green(), line.bright_green().bold());
        } else {
            println!("{} {}", "⚠".red(), line.bright_red().bold());
            for step in self.steps.iter().filter(|step| !step.passed) {
                println!("   {} {}: {}", "-".red(), step.name, step.detail);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_and_skips_fail_the_run() {
        let mut report = Report::new();
        assert_eq!(report.record("health", Ok::<_, String>(1), |_| String::new()), Some(1));
        assert!(report.all_passed());

        assert_eq!(report.record("login", Err::<i32, _>("401"), |_| String::new()), None);
        report.skip("profile", "no token");

        assert_eq!(report.passed(), 1);
        assert!(!report.all_passed());
        assert_eq!(report.steps().len(), 3);
    }
}
