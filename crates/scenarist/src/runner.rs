//! Run coordination: discovery, scheduling, timeouts, and cancellation.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config;
use crate::executor::execute_scenario;
use crate::feature::{FeatureDocument, ParseError, Scenario, parse_feature_file};
use crate::hooks::Hooks;
use crate::registry::StepRegistry;
use crate::reporting::{FailureCause, Reporter, RunSummary, ScenarioResult, ScenarioStatus};
use crate::tags::TagExpr;

/// How scenarios are scheduled within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// One scenario after another, in discovery order.
    #[default]
    Sequential,
    /// Scenarios distributed over a bounded pool of worker threads.
    ///
    /// Completion order may differ from discovery order; consumers needing
    /// document order sort results by [`ScenarioId`](crate::ScenarioId).
    Concurrent {
        /// Number of worker threads; clamped to at least one.
        workers: usize,
    },
}

/// Per-run execution settings.
#[derive(Debug, Default)]
pub struct RunConfig {
    mode: ExecutionMode,
    timeout: Option<Duration>,
    tag_filter: Option<TagExpr>,
    fail_fast: Option<bool>,
}

impl RunConfig {
    /// Set the scheduling mode.
    #[must_use]
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set a per-scenario time budget.
    ///
    /// A scenario exceeding the budget is reported as failed with a
    /// timed-out cause; its thread is abandoned and its late result, if any,
    /// is discarded.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Only run scenarios whose tags satisfy the expression.
    #[must_use]
    pub fn with_tag_filter(mut self, filter: TagExpr) -> Self {
        self.tag_filter = Some(filter);
        self
    }

    /// Stop scheduling new scenarios after the first failure.
    ///
    /// When unset, the `SCENARIST_FAIL_FAST` environment variable decides
    /// (see [`config`]).
    #[must_use]
    pub fn with_fail_fast(mut self, enabled: bool) -> Self {
        self.fail_fast = Some(enabled);
        self
    }

    fn effective_fail_fast(&self) -> bool {
        self.fail_fast.unwrap_or_else(config::fail_fast)
    }
}

/// Cooperative cancellation handle for a run.
///
/// Cloneable and cheap to share; once [`stop`](Self::stop) is called,
/// scenarios not yet started are no longer scheduled. Running scenarios
/// finish (or time out) normally.
#[derive(Debug, Clone, Default)]
pub struct StopToken {
    stopped: Arc<AtomicBool>,
}

impl StopToken {
    /// Request that the run stop scheduling new scenarios.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Relaxed);
    }

    /// True once [`stop`](Self::stop) has been called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }
}

/// Features and parse failures found under a set of paths.
#[derive(Debug, Default)]
pub struct DiscoveredFeatures {
    /// Successfully parsed documents, in discovery order.
    pub features: Vec<FeatureDocument>,
    /// Per-document parse failures; other documents still run.
    pub errors: Vec<ParseError>,
}

/// Collect and parse `.feature` files from files and directories.
///
/// Directories are scanned recursively in sorted order and only files with a
/// `.feature` extension are considered; explicitly listed files are parsed
/// regardless of extension. A parse failure is recorded per document and
/// does not stop discovery.
#[must_use]
pub fn discover(paths: &[PathBuf]) -> DiscoveredFeatures {
    let mut found = DiscoveredFeatures::default();
    for path in paths {
        visit(path, &mut found);
    }
    found
}

fn visit(path: &Path, found: &mut DiscoveredFeatures) {
    if path.is_dir() {
        let entries = match std::fs::read_dir(path) {
            Ok(entries) => entries,
            Err(source) => {
                found.errors.push(ParseError::Io {
                    path: path.display().to_string(),
                    source,
                });
                return;
            }
        };
        let mut children: Vec<PathBuf> =
            entries.filter_map(Result::ok).map(|e| e.path()).collect();
        children.sort();
        for child in children {
            if child.is_dir() || child.extension().is_some_and(|ext| ext == "feature") {
                visit(&child, found);
            }
        }
    } else {
        match parse_feature_file(path) {
            Ok(document) => found.features.push(document),
            Err(err) => {
                log::warn!("{err}");
                found.errors.push(err);
            }
        }
    }
}

#[derive(Clone)]
struct Job {
    feature: Arc<FeatureDocument>,
    index: usize,
}

impl Job {
    fn scenario(&self) -> Option<&Scenario> {
        self.feature.scenarios.get(self.index)
    }
}

/// Coordinates the execution of scenarios for a single run.
///
/// Each `Runner` is an independent value: it owns its registry, hooks,
/// configuration, and reporters, so multiple runs can coexist in one
/// process.
pub struct Runner {
    registry: Arc<StepRegistry>,
    hooks: Arc<Hooks>,
    config: RunConfig,
    reporters: Vec<Box<dyn Reporter>>,
    stop: StopToken,
}

impl Runner {
    /// Build a runner over the given registry with default settings.
    #[must_use]
    pub fn new(registry: StepRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            hooks: Arc::new(Hooks::new()),
            config: RunConfig::default(),
            reporters: Vec::new(),
            stop: StopToken::default(),
        }
    }

    /// Attach scenario hooks.
    #[must_use]
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    /// Replace the run configuration.
    #[must_use]
    pub fn with_config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    /// Subscribe a reporter to the result stream.
    #[must_use]
    pub fn add_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporters.push(Box::new(reporter));
        self
    }

    /// A cancellation handle for this run.
    #[must_use]
    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    /// Execute every selected scenario and aggregate the results.
    ///
    /// Scenarios excluded by the tag filter are not run and produce no
    /// result. Scenarios not yet started when the stop token fires are
    /// omitted; the summary's `stopped` flag records the interruption.
    pub fn run(&self, features: Vec<FeatureDocument>) -> RunSummary {
        let jobs = self.collect_jobs(features);
        log::debug!("running {} scenario(s)", jobs.len());
        let results = match self.config.mode {
            ExecutionMode::Sequential => self.run_sequential(jobs),
            ExecutionMode::Concurrent { workers } => self.run_concurrent(jobs, workers),
        };
        let summary = RunSummary {
            results,
            stopped: self.stop.is_stopped(),
        };
        for reporter in &self.reporters {
            reporter.run_finished(&summary);
        }
        summary
    }

    fn collect_jobs(&self, features: Vec<FeatureDocument>) -> Vec<Job> {
        let mut jobs = Vec::new();
        for feature in features {
            let feature = Arc::new(feature);
            for (index, scenario) in feature.scenarios.iter().enumerate() {
                if let Some(filter) = &self.config.tag_filter {
                    if !filter.matches(&scenario.tags) {
                        continue;
                    }
                }
                jobs.push(Job {
                    feature: Arc::clone(&feature),
                    index,
                });
            }
        }
        jobs
    }

    fn publish(&self, result: &ScenarioResult) {
        for reporter in &self.reporters {
            reporter.scenario_finished(result);
        }
    }

    fn run_sequential(&self, jobs: Vec<Job>) -> Vec<ScenarioResult> {
        let fail_fast = self.config.effective_fail_fast();
        let mut results = Vec::with_capacity(jobs.len());
        for job in jobs {
            if self.stop.is_stopped() {
                break;
            }
            let Some(result) = run_one(&self.registry, &self.hooks, &job, self.config.timeout)
            else {
                continue;
            };
            self.publish(&result);
            if fail_fast && !result.passed() {
                self.stop.stop();
            }
            results.push(result);
        }
        results
    }

    fn run_concurrent(&self, jobs: Vec<Job>, workers: usize) -> Vec<ScenarioResult> {
        let fail_fast = self.config.effective_fail_fast();
        let workers = workers.clamp(1, jobs.len().max(1));
        let queue = Arc::new(Mutex::new(VecDeque::from(jobs)));
        let (tx, rx) = mpsc::channel();

        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            let queue = Arc::clone(&queue);
            let tx = tx.clone();
            let registry = Arc::clone(&self.registry);
            let hooks = Arc::clone(&self.hooks);
            let stop = self.stop.clone();
            let timeout = self.config.timeout;
            handles.push(std::thread::spawn(move || {
                loop {
                    if stop.is_stopped() {
                        break;
                    }
                    let job = queue.lock().ok().and_then(|mut queue| queue.pop_front());
                    let Some(job) = job else { break };
                    let Some(result) = run_one(&registry, &hooks, &job, timeout) else {
                        continue;
                    };
                    if tx.send(result).is_err() {
                        break;
                    }
                }
            }));
        }
        drop(tx);

        let mut results = Vec::new();
        while let Ok(result) = rx.recv() {
            self.publish(&result);
            if fail_fast && !result.passed() {
                self.stop.stop();
            }
            results.push(result);
        }
        for handle in handles {
            if handle.join().is_err() {
                log::warn!("a worker thread panicked");
            }
        }
        results
    }
}

fn run_one(
    registry: &Arc<StepRegistry>,
    hooks: &Arc<Hooks>,
    job: &Job,
    timeout: Option<Duration>,
) -> Option<ScenarioResult> {
    match timeout {
        None => {
            let scenario = job.scenario()?;
            Some(execute_scenario(registry, hooks, &job.feature, scenario))
        }
        Some(limit) => run_with_deadline(
            Arc::clone(registry),
            Arc::clone(hooks),
            job.clone(),
            limit,
        ),
    }
}

/// Run the scenario on its own thread so a deadline can be enforced.
///
/// On expiry the thread is abandoned; if it eventually finishes, its result
/// is discarded because the receiver is gone.
fn run_with_deadline(
    registry: Arc<StepRegistry>,
    hooks: Arc<Hooks>,
    job: Job,
    limit: Duration,
) -> Option<ScenarioResult> {
    let scenario = job.scenario()?;
    let id = scenario.id.clone();
    let name = scenario.name.clone();
    let tags = scenario.tags.clone();
    let feature_name = job.feature.name.clone();

    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        if let Some(scenario) = job.scenario() {
            let result = execute_scenario(&registry, &hooks, &job.feature, scenario);
            let _sent = tx.send(result);
        }
    });

    match rx.recv_timeout(limit) {
        Ok(result) => Some(result),
        Err(err) => {
            let failure = match err {
                RecvTimeoutError::Timeout => {
                    log::warn!("scenario '{name}' ({id}) exceeded its {}ms budget", limit.as_millis());
                    FailureCause::TimedOut { limit }
                }
                RecvTimeoutError::Disconnected => FailureCause::Step {
                    index: 0,
                    message: "scenario thread terminated unexpectedly".into(),
                },
            };
            Some(ScenarioResult {
                id,
                feature: feature_name,
                scenario: name,
                tags,
                steps: Vec::new(),
                status: ScenarioStatus::Failed,
                failure: Some(failure),
                hook_errors: Vec::new(),
                duration: limit,
            })
        }
    }
}
