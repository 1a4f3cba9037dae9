use std::rc::Rc;

use super::{check_arity, guarded, Checker, Notes};
use crate::diff;
use crate::errors::{CheckError, CheckResult};
use crate::failure;
use crate::value::{Struct, Value};

/// Checks that got equals want.
///
/// Equality is shallow: lists, maps and functions cannot be compared and
/// make the check fail with a runtime error, and pointers are equal only
/// when they share a target. Use [`DEEP_EQUALS`] for structural equality.
pub static EQUALS: Equals = Equals;

/// Checks that got and want are structurally equal, reporting a line diff of
/// their indented forms on failure.
pub static DEEP_EQUALS: CmpEquals = CmpEquals {
    options: Vec::new(),
};

#[derive(Debug, Clone, Copy, Default)]
pub struct Equals;

impl Checker for Equals {
    fn info(&self) -> (String, Vec<String>) {
        ("equals".to_string(), vec!["got".to_string(), "want".to_string()])
    }

    fn check(&self, got: &Value, args: &[Value], _notes: &mut Notes) -> CheckResult {
        check_arity(self, args)?;
        let want = &args[0];
        guarded(|| match got.shallow_eq(want) {
            Ok(true) => Ok(()),
            Ok(false) => Err(failure!(
                "not equal:\n(-got +want)\n{}",
                diff::compact(got, want)
            )),
            Err(fault) => Err(CheckError::failure(fault.to_string())),
        })
    }

    fn negated_failure(&self, got: &Value, _args: &[Value]) -> CheckError {
        failure!("both values equal {:?}, but should not", got)
    }
}

/// Adjusts how [`CmpEquals`] compares values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmpOption {
    /// Compare lists regardless of element order.
    SortLists,
    /// Drop struct fields with this name before comparing.
    IgnoreField(String),
}

/// Structural equality with options. See [`cmp_equals`].
#[derive(Debug, Clone, Default)]
pub struct CmpEquals {
    options: Vec<CmpOption>,
}

/// Builds a structural equality checker that applies `options` to both sides
/// before comparing.
///
/// # Examples
///
/// ```rust
/// use verdict::checkers::{cmp_equals, Checker, CmpOption, Notes};
/// use verdict::value::Value;
/// let checker = cmp_equals([CmpOption::SortLists]);
/// let result = checker.check(&Value::list([1, 2, 3]), &[Value::list([3, 2, 1])], &mut Notes::new());
/// assert!(result.is_ok());
/// ```
pub fn cmp_equals(options: impl IntoIterator<Item = CmpOption>) -> CmpEquals {
    CmpEquals {
        options: options.into_iter().collect(),
    }
}

impl CmpEquals {
    fn compare(&self, got: &Value, want: &Value) -> Result<Option<String>, CheckError> {
        let got = self.normalize(got);
        let want = self.normalize(want);
        match got.try_eq(&want) {
            Ok(true) => Ok(None),
            Ok(false) => Ok(Some(diff::pretty(&got, &want))),
            Err(fault) => Err(CheckError::failure(fault.to_string())),
        }
    }

    fn normalize(&self, value: &Value) -> Value {
        match value {
            Value::List(Some(items)) => {
                let mut items: Vec<Value> = items.iter().map(|v| self.normalize(v)).collect();
                if self.options.contains(&CmpOption::SortLists) {
                    items.sort_by_cached_key(|v| format!("{:?}", v));
                }
                Value::List(Some(items))
            }
            Value::Map(Some(entries)) => Value::Map(Some(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), self.normalize(v)))
                    .collect(),
            )),
            Value::Struct(s) => Value::Struct(Struct {
                name: s.name.clone(),
                fields: s
                    .fields
                    .iter()
                    .filter(|(name, _)| !self.ignores(name))
                    .map(|(name, v)| (name.clone(), self.normalize(v)))
                    .collect(),
            }),
            Value::Pointer(Some(target)) => Value::Pointer(Some(Rc::new(self.normalize(target)))),
            other => other.clone(),
        }
    }

    fn ignores(&self, field: &str) -> bool {
        self.options
            .iter()
            .any(|option| matches!(option, CmpOption::IgnoreField(name) if name == field))
    }
}

impl Checker for CmpEquals {
    fn info(&self) -> (String, Vec<String>) {
        let name = if self.options.is_empty() {
            "deep equals"
        } else {
            "cmp equals"
        };
        (name.to_string(), vec!["got".to_string(), "want".to_string()])
    }

    fn check(&self, got: &Value, args: &[Value], _notes: &mut Notes) -> CheckResult {
        check_arity(self, args)?;
        let want = &args[0];
        match guarded(|| self.compare(got, want))? {
            None => Ok(()),
            Some(diff) => Err(failure!("values are not equal:\n(-got +want)\n{}", diff)),
        }
    }

    fn negated_failure(&self, got: &Value, _args: &[Value]) -> CheckError {
        failure!("both values deeply equal {:?}, but should not", got)
    }
}
