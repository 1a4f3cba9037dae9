//! The checker protocol.
//!
//! A [`Checker`] is a named comparison between a got value and a fixed number
//! of extra arguments. It never panics on a failed comparison; it returns a
//! [`CheckError`] and leaves the decision to stop the test to the caller.
//!
//! ## Checkers Provided
//!
//! - **Equality**: [`EQUALS`], [`DEEP_EQUALS`], [`cmp_equals`]
//! - **Patterns**: [`MATCHES`], [`ERROR_MATCHES`], [`PANIC_MATCHES`]
//! - **Nilness**: [`IS_NIL`]
//! - **Combinators**: [`not`]

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use log::{debug, trace};

use crate::{bad_check, failure};
use crate::errors::{CheckError, CheckResult};
use crate::value::Value;

mod equality;
mod negate;
mod nil;
mod pattern;

pub use equality::{cmp_equals, CmpEquals, CmpOption, Equals, DEEP_EQUALS, EQUALS};
pub use negate::{not, Not};
pub use nil::{IsNil, IS_NIL};
pub use pattern::{ErrorMatches, Matches, PanicMatches, ERROR_MATCHES, MATCHES, PANIC_MATCHES};

/// A comparison between a got value and its extra arguments.
pub trait Checker {
    /// Returns the display name and the argument names. The first argument
    /// name always describes the got value.
    fn info(&self) -> (String, Vec<String>);

    /// Runs the comparison. Diagnostics that are not part of the error
    /// message go to `notes`.
    fn check(&self, got: &Value, args: &[Value], notes: &mut Notes) -> CheckResult;

    /// Describes why a successful check is a failure under negation.
    fn negated_failure(&self, got: &Value, _args: &[Value]) -> CheckError {
        let (name, _) = self.info();
        CheckError::failure(format!("{} succeeded on {:?}, but should not", name, got))
    }

    /// Runs the comparison with its outcome inverted. Bad checks are
    /// returned unchanged. The comparison runs exactly once.
    fn check_negated(&self, got: &Value, args: &[Value], notes: &mut Notes) -> CheckResult {
        match self.check(got, args, notes) {
            Ok(()) => Err(self.negated_failure(got, args)),
            Err(err) if err.is_bad_check() => Err(err),
            Err(_) => Ok(()),
        }
    }

    /// Number of extra arguments, not counting the got value.
    fn arity(&self) -> usize {
        self.info().1.len().saturating_sub(1)
    }
}

impl<C: Checker + ?Sized> Checker for &C {
    fn info(&self) -> (String, Vec<String>) {
        (**self).info()
    }

    fn check(&self, got: &Value, args: &[Value], notes: &mut Notes) -> CheckResult {
        (**self).check(got, args, notes)
    }

    fn negated_failure(&self, got: &Value, args: &[Value]) -> CheckError {
        (**self).negated_failure(got, args)
    }

    fn check_negated(&self, got: &Value, args: &[Value], notes: &mut Notes) -> CheckResult {
        (**self).check_negated(got, args, notes)
    }
}

impl<C: Checker + ?Sized> Checker for Box<C> {
    fn info(&self) -> (String, Vec<String>) {
        (**self).info()
    }

    fn check(&self, got: &Value, args: &[Value], notes: &mut Notes) -> CheckResult {
        (**self).check(got, args, notes)
    }

    fn negated_failure(&self, got: &Value, args: &[Value]) -> CheckError {
        (**self).negated_failure(got, args)
    }

    fn check_negated(&self, got: &Value, args: &[Value], notes: &mut Notes) -> CheckResult {
        (**self).check_negated(got, args, notes)
    }
}

/// Ordered key/value annotations attached to a failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notes(Vec<(String, String)>);

impl Notes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Fails with a bad check unless `args` holds exactly the checker's arity.
pub fn check_arity<C: Checker + ?Sized>(checker: &C, args: &[Value]) -> CheckResult {
    let want = checker.arity();
    if args.len() != want {
        return Err(bad_check!(
            "invalid number of arguments provided to checker: got {}, want {}\n",
            args.len(),
            want
        ));
    }
    Ok(())
}

/// Runs `checker` once, collecting its notes alongside the outcome.
pub fn evaluate(checker: &dyn Checker, got: &Value, args: &[Value]) -> (CheckResult, Notes) {
    let mut notes = Notes::new();
    let result = checker.check(got, args, &mut notes);
    let (name, _) = checker.info();
    match &result {
        Ok(()) => trace!("check {} passed", name),
        Err(err) if err.is_bad_check() => trace!("check {} is malformed", name),
        Err(_) => trace!("check {} failed", name),
    }
    (result, notes)
}

/// Runs `f`, turning a panic into a `runtime error:` failure.
///
/// Comparing and formatting values runs foreign `Display` code, which may
/// panic.
pub(crate) fn guarded<T>(f: impl FnOnce() -> Result<T, CheckError>) -> Result<T, CheckError> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(&*payload);
            debug!("recovered panic while inspecting values: {}", message);
            Err(failure!("runtime error: {}", message))
        }
    }
}

/// Extracts the message from a recovered panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}
