use super::{check_arity, Checker, Notes};
use crate::errors::{CheckError, CheckResult};
use crate::failure;
use crate::value::Value;

/// Checks that got is nil. See [`Value::is_nil`].
pub static IS_NIL: IsNil = IsNil;

#[derive(Debug, Clone, Copy, Default)]
pub struct IsNil;

impl Checker for IsNil {
    fn info(&self) -> (String, Vec<String>) {
        ("is nil".to_string(), vec!["got".to_string()])
    }

    fn check(&self, got: &Value, args: &[Value], _notes: &mut Notes) -> CheckResult {
        check_arity(self, args)?;
        if got.is_nil() {
            return Ok(());
        }
        Err(failure!("{:?} is not nil", got))
    }

    fn negated_failure(&self, _got: &Value, _args: &[Value]) -> CheckError {
        CheckError::failure("the value is nil, but should not")
    }
}
