//! A behaviour-driven scenario execution engine.
//!
//! `scenarist` parses plain-text Gherkin features, binds their steps to
//! explicitly registered step definitions, and runs scenarios in isolation,
//! streaming results to pluggable reporters. There is no global state: step
//! definitions live in a [`StepRegistry`] value, and each [`Runner`] owns the
//! registry, hooks, and configuration for one run.
//!
//! ```
//! use scenarist::{Runner, StepRegistry, parse_feature_str};
//!
//! let feature = parse_feature_str(
//!     "Feature: Arithmetic\n\
//!      \n\
//!      Scenario: Adding\n\
//!        Given a calculator\n\
//!        When I add 2 and 3\n\
//!        Then the total is 5\n",
//!     "arithmetic.feature",
//! )?;
//!
//! let mut registry = StepRegistry::new();
//! registry.given("a calculator", |ctx, _| {
//!     ctx.insert("total", 0_i64);
//!     Ok(())
//! })?;
//! registry.when("I add {a:i64} and {b:i64}", |ctx, args| {
//!     let sum = args.parse::<i64>(0)? + args.parse::<i64>(1)?;
//!     ctx.insert("total", sum);
//!     Ok(())
//! })?;
//! registry.then("the total is {expected:i64}", |ctx, args| {
//!     let total = ctx.get::<i64>("total").copied().unwrap_or_default();
//!     scenarist::ensure_step!(total == args.parse::<i64>(0)?, "total was {total}");
//!     Ok(())
//! })?;
//!
//! let summary = Runner::new(registry).run(vec![feature]);
//! assert!(summary.all_passed());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
mod context;
mod executor;
mod feature;
mod hooks;
mod macros;
mod matcher;
mod panic;
mod pattern;
mod registry;
pub mod reporting;
mod runner;
mod tags;

pub use context::Context;
pub use executor::execute_scenario;
pub use feature::{
    FeatureDocument, ParseError, Scenario, ScenarioId, Step, parse_feature_file, parse_feature_str,
};
pub use hooks::Hooks;
pub use matcher::{MatchOutcome, match_step};
pub use panic::panic_message;
pub use pattern::StepPattern;
pub use registry::{RegistrationError, StepArgs, StepDefinition, StepError, StepRegistry};
#[cfg(feature = "json-report")]
pub use reporting::JsonReporter;
pub use reporting::{
    ConsoleReporter, FailureCause, Reporter, RunSummary, ScenarioResult, ScenarioStatus,
    StepReport, StepStatus,
};
pub use runner::{
    DiscoveredFeatures, ExecutionMode, RunConfig, Runner, StopToken, discover,
};
pub use scenarist_patterns::{PatternError, StepKeyword, StepKeywordParseError};
pub use tags::{TagExpr, TagExprError};
