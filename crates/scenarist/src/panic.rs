//! Panic payload formatting.

use std::any::Any;

/// Format a caught panic payload into a readable message.
///
/// String payloads are extracted directly; anything else falls back to its
/// [`Debug`](core::fmt::Debug) rendering.
///
/// # Examples
///
/// ```
/// use scenarist::panic_message;
/// use std::any::Any;
///
/// let payload: Box<dyn Any + Send> = Box::new(String::from("boom"));
/// assert_eq!(panic_message(payload.as_ref()), "boom");
/// ```
#[must_use]
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| format!("{payload:?}"))
}
