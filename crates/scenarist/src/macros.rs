//! Assertion helpers for use inside step actions.
//!
//! The macros live in a dedicated module to keep `lib.rs` focused on type
//! exports; `#[macro_export]` makes them available at the crate root.

/// Return early from a step action with a [`StepError`](crate::StepError).
///
/// The error records the calling file and line so failure messages point at
/// the step definition, not the engine.
///
/// # Examples
/// ```
/// use scenarist::{Context, StepArgs, StepError};
///
/// fn check(_ctx: &mut Context, _args: &StepArgs<'_>) -> Result<(), StepError> {
///     scenarist::bail_step!("login was rejected for {}", "alice");
/// }
/// ```
#[macro_export]
macro_rules! bail_step {
    ($($arg:tt)*) => {
        return Err($crate::StepError::with_location(
            format!($($arg)*),
            file!(),
            line!(),
        ))
    };
}

/// Fail the step with a formatted message when the condition is false.
///
/// # Examples
/// ```
/// use scenarist::{Context, StepArgs, StepError};
///
/// fn check(_ctx: &mut Context, _args: &StepArgs<'_>) -> Result<(), StepError> {
///     let total = 5;
///     scenarist::ensure_step!(total == 5, "total was {total}");
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! ensure_step {
    ($cond:expr, $($arg:tt)*) => {
        if !$cond {
            $crate::bail_step!($($arg)*);
        }
    };
}
