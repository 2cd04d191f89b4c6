//! Plain-text progressive reporter.

use std::io::{self, Write};
use std::sync::Mutex;

use super::{Reporter, RunSummary, ScenarioResult, StepStatus};

/// Writes one line per scenario as it finishes, plus a closing summary.
///
/// Failed and undefined steps are listed under their scenario. Write errors
/// are logged and otherwise ignored; a broken pipe should not fail a run.
pub struct ConsoleReporter<W: Write + Send> {
    out: Mutex<W>,
}

impl ConsoleReporter<io::Stdout> {
    /// Reporter writing to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleReporter<W> {
    /// Reporter writing to the given sink.
    #[must_use]
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    fn write_result(&self, result: &ScenarioResult) -> io::Result<()> {
        let mut out = match self.out.lock() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        };
        let marker = if result.passed() { "ok" } else { "FAILED" };
        writeln!(
            out,
            "{marker} {} :: {} ({}ms)",
            result.feature,
            result.scenario,
            result.duration.as_millis()
        )?;
        for step in &result.steps {
            if matches!(step.status, StepStatus::Failed | StepStatus::Undefined) {
                let detail = step.message.as_deref().unwrap_or(step.status.label());
                writeln!(out, "    {} {} <- {detail}", step.keyword, step.text)?;
            }
        }
        if let Some(failure) = &result.failure {
            if result.steps.iter().all(|s| s.status != StepStatus::Failed
                && s.status != StepStatus::Undefined)
            {
                writeln!(out, "    {failure}")?;
            }
        }
        for error in &result.hook_errors {
            writeln!(out, "    {error}")?;
        }
        Ok(())
    }

    fn write_summary(&self, summary: &RunSummary) -> io::Result<()> {
        let mut out = match self.out.lock() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        };
        let stopped = if summary.stopped { " (stopped early)" } else { "" };
        writeln!(
            out,
            "{} scenario(s): {} passed, {} failed, {} undefined{stopped}",
            summary.results.len(),
            summary.passed(),
            summary.failed(),
            summary.undefined(),
        )?;
        out.flush()
    }
}

impl<W: Write + Send> Reporter for ConsoleReporter<W> {
    fn scenario_finished(&self, result: &ScenarioResult) {
        if let Err(err) = self.write_result(result) {
            log::warn!("console reporter write failed: {err}");
        }
    }

    fn run_finished(&self, summary: &RunSummary) {
        if let Err(err) = self.write_summary(summary) {
            log::warn!("console reporter write failed: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::*;
    use crate::feature::ScenarioId;
    use crate::reporting::{FailureCause, ScenarioStatus, StepReport};
    use scenarist_patterns::StepKeyword;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            match self.0.lock() {
                Ok(mut inner) => inner.write(buf),
                Err(_) => Err(io::Error::other("poisoned")),
            }
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn contents(&self) -> String {
            self.0
                .lock()
                .map(|inner| String::from_utf8_lossy(&inner).into_owned())
                .unwrap_or_default()
        }
    }

    fn failed_result() -> ScenarioResult {
        ScenarioResult {
            id: ScenarioId {
                feature_path: "login.feature".into(),
                line: 8,
                example_row: None,
            },
            feature: "Login".into(),
            scenario: "Rejected password".into(),
            tags: Vec::new(),
            steps: vec![
                StepReport {
                    keyword: StepKeyword::Given,
                    text: "a registered user".into(),
                    status: StepStatus::Passed,
                    duration: Duration::from_millis(1),
                    message: None,
                },
                StepReport {
                    keyword: StepKeyword::When,
                    text: "the user signs in".into(),
                    status: StepStatus::Failed,
                    duration: Duration::from_millis(2),
                    message: Some("password rejected".into()),
                },
                StepReport {
                    keyword: StepKeyword::Then,
                    text: "the dashboard is shown".into(),
                    status: StepStatus::Skipped,
                    duration: Duration::ZERO,
                    message: None,
                },
            ],
            status: ScenarioStatus::Failed,
            failure: Some(FailureCause::Step {
                index: 1,
                message: "password rejected".into(),
            }),
            hook_errors: Vec::new(),
            duration: Duration::from_millis(3),
        }
    }

    #[test]
    fn prints_failed_steps_with_their_message() {
        let buf = SharedBuf::default();
        let reporter = ConsoleReporter::new(buf.clone());
        reporter.scenario_finished(&failed_result());
        let output = buf.contents();
        assert!(output.contains("FAILED Login :: Rejected password"));
        assert!(output.contains("When the user signs in <- password rejected"));
        assert!(!output.contains("the dashboard is shown"));
    }

    #[test]
    fn summary_line_reports_counts() {
        let buf = SharedBuf::default();
        let reporter = ConsoleReporter::new(buf.clone());
        let summary = RunSummary {
            results: vec![failed_result()],
            stopped: false,
        };
        reporter.run_finished(&summary);
        assert!(
            buf.contents()
                .contains("1 scenario(s): 0 passed, 1 failed, 0 undefined")
        );
    }
}
