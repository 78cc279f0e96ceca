//! Interpreter intrinsics
//!
//! Only two builtins are executed natively: `drift(ms)` blocks the thread and
//! `Observe(value)` is the call form of `observe`. Both return null.

use super::constants::{DRIFT_INTRINSIC, OBSERVE_INTRINSIC};
use super::engine::Interpreter;
use super::errors::RuntimeError;
use crate::memory::value::Value;
use crate::parser::ast::SourceLocation;
use std::thread;
use std::time::Duration;

impl Interpreter {
    pub(crate) fn call_intrinsic(
        &mut self,
        name: &str,
        args: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let intrinsic = if name == DRIFT_INTRINSIC || name == "Drift" {
            DRIFT_INTRINSIC
        } else if name == OBSERVE_INTRINSIC {
            OBSERVE_INTRINSIC
        } else {
            return Err(RuntimeError::UndefinedFunction {
                name: name.to_string(),
                location,
            });
        };

        let [arg] = <[Value; 1]>::try_from(args).map_err(|args| {
            RuntimeError::ArgumentCountMismatch {
                function: name.to_string(),
                expected: 1,
                got: args.len(),
                location,
            }
        })?;

        if intrinsic == DRIFT_INTRINSIC {
            let millis = arg
                .as_number()
                .ok_or_else(|| RuntimeError::type_error("number", arg.type_name(), location))?;
            // Negative and NaN durations sleep for zero
            thread::sleep(Duration::from_millis(millis.max(0.0) as u64));
        } else {
            self.write_line(&arg.to_string())?;
        }
        Ok(Value::Null)
    }
}
