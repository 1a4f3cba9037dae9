use super::{Checker, Notes};
use crate::errors::CheckResult;
use crate::value::Value;

/// Inverts a checker. Bad checks pass through unchanged.
#[derive(Debug, Clone, Copy)]
pub struct Not<C> {
    inner: C,
}

/// Wraps `inner` so that the check passes exactly when `inner` fails.
///
/// # Examples
///
/// ```rust
/// use verdict::checkers::{not, Checker, Notes, IS_NIL};
/// use verdict::value::Value;
/// let not_nil = not(&IS_NIL);
/// assert_eq!(not_nil.info().0, "not(is nil)");
/// assert!(not_nil.check(&Value::from(42), &[], &mut Notes::new()).is_ok());
/// ```
pub fn not<C: Checker>(inner: C) -> Not<C> {
    Not { inner }
}

impl<C: Checker> Checker for Not<C> {
    fn info(&self) -> (String, Vec<String>) {
        let (name, args) = self.inner.info();
        (format!("not({})", name), args)
    }

    fn check(&self, got: &Value, args: &[Value], notes: &mut Notes) -> CheckResult {
        self.inner.check_negated(got, args, notes)
    }

    /// Negating a negation is the wrapped check itself, so its failure is
    /// reported as is.
    fn check_negated(&self, got: &Value, args: &[Value], notes: &mut Notes) -> CheckResult {
        self.inner.check(got, args, notes)
    }
}
