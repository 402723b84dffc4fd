use crate::registry::Registry;
use crate::reporter::Reporter;
use crate::rules::{Finding, Severity, Summary};
use crate::safety::SafetyLevel;
use crate::sandbox::SandboxOutcome;
use colored::Colorize;

pub struct TerminalReporter {
    /// Show medium findings, advisory warnings and per-command lines.
    verbose: bool,
}

impl TerminalReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    fn severity_color(&self, severity: &Severity) -> colored::ColoredString {
        let label = format!("[{}]", severity);
        match severity {
            Severity::Critical => label.red().bold(),
            Severity::High => label.yellow().bold(),
            Severity::Medium => label.cyan(),
        }
    }

    fn safety_color(&self, level: &SafetyLevel) -> colored::ColoredString {
        let label = level.as_str();
        match level {
            SafetyLevel::Safe => label.green(),
            SafetyLevel::Caution => label.yellow().bold(),
            SafetyLevel::Dangerous => label.red().bold(),
        }
    }

    fn format_finding(&self, finding: &Finding) -> String {
        format!(
            "{} {} {}: {}\n  {} segment {}: {}\n",
            self.severity_color(&finding.severity),
            finding.rule_id,
            finding.source_file,
            finding.message,
            "|".dimmed(),
            finding.segment + 1,
            finding.matched.dimmed()
        )
    }

    fn format_commands(&self, registry: &Registry) -> String {
        let mut output = String::new();
        for phase in &registry.phases {
            output.push_str(&format!("{}\n", format!("Phase {}", phase.id).bold()));
            for id in &phase.commands {
                if let Some(command) = registry.commands.get(id) {
                    output.push_str(&format!(
                        "  {:40} {:14} {:>3}  {}\n",
                        id,
                        command.category,
                        command.quality_score,
                        self.safety_color(&command.safety_level)
                    ));
                }
            }
        }
        output.push('\n');
        output
    }

    fn format_sandbox(&self, registry: &Registry) -> String {
        let mut output = String::new();
        for run in &registry.validation_results.sandbox_runs {
            let status = match &run.outcome {
                SandboxOutcome::Completed { exit_status, .. } => match exit_status {
                    Some(code) => format!("exit {code}").normal(),
                    None => "killed by signal".yellow(),
                },
                SandboxOutcome::TimedOut { timeout_secs } => {
                    format!("timed out after {timeout_secs}s").yellow()
                }
                SandboxOutcome::Failed { message } => message.red(),
            };
            output.push_str(&format!("  sandbox {}: {}\n", run.command, status));
        }
        output
    }
}

impl Reporter for TerminalReporter {
    fn report(&self, registry: &Registry) -> String {
        let mut output = String::new();
        let results = &registry.validation_results;

        output.push_str(&format!(
            "{}\n\n",
            format!("cmd-audit v{} - command registry validator", registry.version).bold()
        ));

        if self.verbose {
            output.push_str(&self.format_commands(registry));
        }

        let findings_to_show: Vec<_> = results
            .security_issues
            .iter()
            .filter(|f| self.verbose || f.severity >= Severity::High)
            .collect();

        if findings_to_show.is_empty() {
            output.push_str(&"No security issues found.\n".green().to_string());
        } else {
            for finding in &findings_to_show {
                output.push_str(&self.format_finding(finding));
            }
        }
        output.push('\n');

        for error in &results.errors {
            output.push_str(&format!("{} {}: {}\n", "[ERROR]".red().bold(), error.file, error.message));
        }
        if self.verbose {
            for warning in &results.warnings {
                match &warning.file {
                    Some(file) => output.push_str(&format!("{} {}: {}\n", "[WARN]".yellow(), file, warning.message)),
                    None => output.push_str(&format!("{} {}\n", "[WARN]".yellow(), warning.message)),
                }
            }
        } else {
            // Run-level warnings (sandbox degradation) are always shown
            for warning in results.warnings.iter().filter(|w| w.file.is_none()) {
                output.push_str(&format!("{} {}\n", "[WARN]".yellow(), warning.message));
            }
        }
        output.push_str(&self.format_sandbox(registry));

        output.push_str(&format!("{}\n", "━".repeat(50)));

        let summary = Summary::from_findings(&results.security_issues);
        output.push_str(&format!(
            "Files: {} scanned, {} valid, {} error(s), {} warning(s)\n",
            results.total_files,
            results.valid_files.to_string().green(),
            results.errors.len().to_string().red().bold(),
            results.warnings.len().to_string().yellow()
        ));
        output.push_str(&format!(
            "Commands: {} safe, {} caution, {} dangerous\n",
            registry.count_by_safety(SafetyLevel::Safe).to_string().green(),
            registry.count_by_safety(SafetyLevel::Caution).to_string().yellow(),
            registry.count_by_safety(SafetyLevel::Dangerous).to_string().red().bold()
        ));
        output.push_str(&format!(
            "Findings: {} critical, {} high, {} medium\n",
            summary.critical.to_string().red().bold(),
            summary.high.to_string().yellow().bold(),
            summary.medium.to_string().cyan()
        ));

        let passed = !registry.has_dangerous() && results.errors.is_empty();
        output.push_str(&format!(
            "\nResult: {}\n",
            if passed { "PASS".green().bold() } else { "FAIL".red().bold() }
        ));

        output
    }
}
