//! Before/after hooks run around every scenario.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::context::Context;
use crate::panic::panic_message;
use crate::registry::StepError;

type HookFn = Box<dyn Fn(&mut Context) -> Result<(), StepError> + Send + Sync>;

/// Hooks executed before and after each scenario.
///
/// Before-hooks run in registration order against the scenario's fresh
/// context; a failing before-hook fails the scenario and its steps are
/// skipped. After-hooks run unconditionally, even when a hook or step has
/// already failed, and their errors are recorded on the result without
/// masking an earlier failure.
#[derive(Default)]
pub struct Hooks {
    before: Vec<HookFn>,
    after: Vec<HookFn>,
}

impl Hooks {
    /// Create an empty hook set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a before-scenario hook.
    #[must_use]
    pub fn before(
        mut self,
        hook: impl Fn(&mut Context) -> Result<(), StepError> + Send + Sync + 'static,
    ) -> Self {
        self.before.push(Box::new(hook));
        self
    }

    /// Append an after-scenario hook.
    #[must_use]
    pub fn after(
        mut self,
        hook: impl Fn(&mut Context) -> Result<(), StepError> + Send + Sync + 'static,
    ) -> Self {
        self.after.push(Box::new(hook));
        self
    }

    pub(crate) fn run_before(&self, ctx: &mut Context) -> Vec<String> {
        run_hooks(&self.before, "before", ctx)
    }

    pub(crate) fn run_after(&self, ctx: &mut Context) -> Vec<String> {
        run_hooks(&self.after, "after", ctx)
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("before", &self.before.len())
            .field("after", &self.after.len())
            .finish()
    }
}

fn run_hooks(hooks: &[HookFn], phase: &str, ctx: &mut Context) -> Vec<String> {
    let mut errors = Vec::new();
    for hook in hooks {
        let outcome = catch_unwind(AssertUnwindSafe(|| hook(ctx)));
        let result = match outcome {
            Ok(result) => result,
            Err(payload) => Err(StepError::new(panic_message(payload.as_ref()))),
        };
        if let Err(err) = result {
            log::warn!("{phase}-scenario hook failed: {err}");
            errors.push(format!("{phase} hook: {err}"));
        }
    }
    errors
}
