//! The built-in function library.
//!
//! Only the functions the evaluator and its callers need; everything
//! dispatches through [`call_function`] on the (prefix, local) pair,
//! with `fn:` and no prefix treated alike.

mod boolean;
mod core;
mod sequence;

use crate::ast::QName;
use crate::datasource::DataSourceNode;
use crate::engine::EvaluationContext;
use crate::error::XdmError;
use crate::types::XdmValue;

pub fn call_function<N: DataSourceNode>(
    name: &QName,
    args: Vec<XdmValue<N>>,
    ctx: &EvaluationContext<'_, N>,
) -> Result<XdmValue<N>, XdmError> {
    let prefix = name.prefix.as_deref();
    let local = name.local_part.as_str();

    match (prefix, local) {
        (Some("fn") | None, "true") => boolean::fn_true(args),
        (Some("fn") | None, "false") => boolean::fn_false(args),
        (Some("fn") | None, "not") => boolean::fn_not(args),
        (Some("fn") | None, "boolean") => boolean::fn_boolean(args),

        (Some("fn") | None, "string") => core::fn_string(args, ctx),
        (Some("fn") | None, "number") => core::fn_number(args, ctx),
        (Some("fn") | None, "concat") => core::fn_concat(args),
        (Some("fn") | None, "error") => core::fn_error(args),

        (Some("fn") | None, "count") => sequence::fn_count(args),
        (Some("fn") | None, "empty") => sequence::fn_empty(args),
        (Some("fn") | None, "exists") => sequence::fn_exists(args),

        _ => Err(XdmError::function(
            name.to_string(),
            "unknown function".to_string(),
        )),
    }
}
