//! Command line surface for running, checking, and listing feature documents.
//!
//! The `run` entry point is a library function rather than a subcommand of
//! the shipped binary: step definitions only exist in the embedding crate,
//! so projects call [`run_with_registry`] from their own `main` with the
//! registry and hooks they have built. The binary itself offers `check` and
//! `list`, which need no step definitions.

use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use eyre::{Result, WrapErr, bail};

use scenarist::{
    ConsoleReporter, DiscoveredFeatures, ExecutionMode, Hooks, JsonReporter, RunConfig, Runner,
    StepRegistry, TagExpr, discover,
};

/// Options accepted by an embedded `run` entry point.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct RunArgs {
    /// Feature files or directories to run.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Only run scenarios whose tags satisfy this expression.
    #[arg(long, value_name = "EXPR")]
    pub tags: Option<String>,

    /// Number of worker threads; 1 runs scenarios sequentially.
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,

    /// Per-scenario time budget in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Stop scheduling new scenarios after the first failure.
    #[arg(long)]
    pub fail_fast: bool,

    /// Suppress the per-scenario console stream.
    #[arg(long)]
    pub quiet: bool,

    /// Also write newline-delimited JSON results to this file.
    #[arg(long, value_name = "PATH")]
    pub json: Option<PathBuf>,
}

/// Discover, filter, and run feature documents against the given registry.
///
/// Exit status: `0` when every scenario passed and every document parsed,
/// `1` when any scenario failed or was undefined, and `2` for discovery or
/// parse errors and unusable input such as a malformed tag expression.
#[must_use]
pub fn run_with_registry(args: &RunArgs, registry: StepRegistry, hooks: Hooks) -> ExitCode {
    match try_run(args, registry, hooks) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn try_run(args: &RunArgs, registry: StepRegistry, hooks: Hooks) -> Result<u8> {
    let config = build_config(args)?;
    let found = discover(&args.paths);
    for err in &found.errors {
        eprintln!("error: {err}");
    }
    if found.features.is_empty() && found.errors.is_empty() {
        bail!("no feature documents found under the given paths");
    }

    let mut runner = Runner::new(registry)
        .with_hooks(hooks)
        .with_config(config);
    if !args.quiet {
        runner = runner.add_reporter(ConsoleReporter::stdout());
    }
    if let Some(path) = &args.json {
        let file = File::create(path)
            .wrap_err_with(|| format!("cannot create {}", path.display()))?;
        runner = runner.add_reporter(JsonReporter::new(file));
    }

    let summary = runner.run(found.features);
    if !found.errors.is_empty() {
        return Ok(2);
    }
    Ok(if summary.all_passed() { 0 } else { 1 })
}

fn build_config(args: &RunArgs) -> Result<RunConfig> {
    let mut config = RunConfig::default();
    if args.concurrency > 1 {
        config = config.with_mode(ExecutionMode::Concurrent {
            workers: args.concurrency,
        });
    }
    if let Some(secs) = args.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    if let Some(expr) = &args.tags {
        let filter = TagExpr::parse(expr)
            .wrap_err_with(|| format!("invalid tag expression {expr:?}"))?;
        config = config.with_tag_filter(filter);
    }
    if args.fail_fast {
        config = config.with_fail_fast(true);
    }
    Ok(config)
}

/// Parse every document under `paths` and report diagnostics without
/// running anything.
#[must_use]
pub fn check_paths(paths: &[PathBuf]) -> ExitCode {
    let found = discover(paths);
    for err in &found.errors {
        eprintln!("error: {err}");
    }
    let scenarios: usize = found.features.iter().map(|f| f.scenarios.len()).sum();
    println!(
        "{} document(s) parsed, {} scenario(s)",
        found.features.len(),
        scenarios
    );
    if found.errors.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}

/// Print one line per scenario found under `paths`.
#[must_use]
pub fn list_paths(paths: &[PathBuf]) -> ExitCode {
    let found = discover(paths);
    for err in &found.errors {
        eprintln!("error: {err}");
    }
    for line in listing(&found) {
        println!("{line}");
    }
    if found.errors.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}

fn listing(found: &DiscoveredFeatures) -> Vec<String> {
    found
        .features
        .iter()
        .flat_map(|feature| {
            feature
                .scenarios
                .iter()
                .map(|scenario| format!("{}  {} :: {}", scenario.id, feature.name, scenario.name))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> RunArgs {
        RunArgs::try_parse_from(argv)
            .unwrap_or_else(|err| panic!("arguments should parse: {err}"))
    }

    #[test]
    fn paths_are_required() {
        assert!(RunArgs::try_parse_from(["scenarist"]).is_err());
    }

    #[test]
    fn defaults_are_sequential_and_verbose() {
        let args = args(&["scenarist", "features/"]);
        assert_eq!(args.concurrency, 1);
        assert!(!args.quiet);
        assert!(!args.fail_fast);
        assert!(args.tags.is_none());
        assert!(args.json.is_none());
    }

    #[test]
    fn flags_round_trip() {
        let args = args(&[
            "scenarist",
            "features/",
            "--tags",
            "@smoke and not @slow",
            "--concurrency",
            "4",
            "--timeout-secs",
            "30",
            "--fail-fast",
            "--quiet",
            "--json",
            "out.ndjson",
        ]);
        assert_eq!(args.concurrency, 4);
        assert_eq!(args.timeout_secs, Some(30));
        assert!(args.fail_fast);
        assert!(args.quiet);
        assert_eq!(args.tags.as_deref(), Some("@smoke and not @slow"));
        assert_eq!(args.json, Some(PathBuf::from("out.ndjson")));
    }

    #[test]
    fn malformed_tag_expressions_are_rejected_up_front() {
        let args = args(&["scenarist", "features/", "--tags", "@a &&"]);
        assert!(build_config(&args).is_err());
    }

    #[test]
    fn listing_names_each_scenario_with_its_identity() {
        let dir =
            tempfile::tempdir().unwrap_or_else(|err| panic!("tempdir should exist: {err}"));
        let path = dir.path().join("cart.feature");
        std::fs::write(
            &path,
            "Feature: Cart\n\
             \n\
             Scenario: Empty cart\n\
               Given an empty cart\n\
             \n\
             Scenario: One item\n\
               Given a cart with one item\n",
        )
        .unwrap_or_else(|err| panic!("writing the fixture should succeed: {err}"));

        let lines = listing(&discover(&[dir.path().to_path_buf()]));
        assert_eq!(lines.len(), 2);
        assert!(
            lines
                .first()
                .is_some_and(|l| l.contains("Cart :: Empty cart") && l.contains(":3"))
        );
    }
}
