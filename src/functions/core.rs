use crate::datasource::DataSourceNode;
use crate::engine::EvaluationContext;
use crate::error::XdmError;
use crate::types::XdmValue;

pub fn fn_string<N: DataSourceNode>(
    mut args: Vec<XdmValue<N>>,
    ctx: &EvaluationContext<'_, N>,
) -> Result<XdmValue<N>, XdmError> {
    if args.len() > 1 {
        return Err(XdmError::function("string", "Expected 0 or 1 arguments"));
    }
    let value = if args.is_empty() {
        match &ctx.context_item {
            Some(item) => XdmValue::from_item(item.clone()),
            None => return Err(XdmError::NoContextItem),
        }
    } else {
        args.remove(0)
    };
    Ok(XdmValue::from_string(value.to_string_value()))
}

pub fn fn_number<N: DataSourceNode>(
    mut args: Vec<XdmValue<N>>,
    ctx: &EvaluationContext<'_, N>,
) -> Result<XdmValue<N>, XdmError> {
    if args.len() > 1 {
        return Err(XdmError::function("number", "Expected 0 or 1 arguments"));
    }
    let value = if args.is_empty() {
        match &ctx.context_item {
            Some(item) => XdmValue::from_item(item.clone()),
            None => return Err(XdmError::NoContextItem),
        }
    } else {
        args.remove(0)
    };
    Ok(XdmValue::from_double(value.atomize().to_double()))
}

pub fn fn_concat<N: DataSourceNode>(args: Vec<XdmValue<N>>) -> Result<XdmValue<N>, XdmError> {
    if args.len() < 2 {
        return Err(XdmError::function("concat", "Expected at least 2 arguments"));
    }
    let mut out = String::new();
    for arg in &args {
        out.push_str(&arg.to_string_value());
    }
    Ok(XdmValue::from_string(out))
}

/// Unconditionally raises a dynamic error, with the optional second
/// argument as its description.
pub fn fn_error<N: DataSourceNode>(args: Vec<XdmValue<N>>) -> Result<XdmValue<N>, XdmError> {
    if args.len() > 2 {
        return Err(XdmError::function("error", "Expected 0 to 2 arguments"));
    }
    let description = args
        .get(1)
        .map(|v| v.to_string_value())
        .filter(|s| !s.is_empty())
        .or_else(|| args.first().map(|v| v.to_string_value()))
        .unwrap_or_else(|| "error signalled by fn:error".to_string());
    Err(XdmError::dynamic_error(description))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn ctx<'d>(
        vars: &'d HashMap<String, XdmValue<()>>,
        ns: &'d HashMap<String, String>,
    ) -> EvaluationContext<'d, ()> {
        EvaluationContext::new(None, vars, ns)
    }

    #[test]
    fn test_string_and_number() {
        let vars = HashMap::new();
        let ns = HashMap::new();
        let c = ctx(&vars, &ns);

        let s = fn_string(vec![XdmValue::from_integer(42)], &c).unwrap();
        assert_eq!(s.to_string_value(), "42");

        let n = fn_number(vec![XdmValue::from_string("7.5")], &c).unwrap();
        assert_eq!(n.to_double(), 7.5);

        let nan = fn_number(vec![XdmValue::from_string("x")], &c).unwrap();
        assert!(nan.to_double().is_nan());

        // No argument and no context item.
        assert!(matches!(fn_string(vec![], &c), Err(XdmError::NoContextItem)));
    }

    #[test]
    fn test_concat() {
        let joined = fn_concat::<()>(vec![
            XdmValue::from_string("a"),
            XdmValue::from_integer(1),
            XdmValue::empty(),
        ])
        .unwrap();
        assert_eq!(joined.to_string_value(), "a1");
    }

    #[test]
    fn test_error() {
        let err = fn_error::<()>(vec![]).unwrap_err();
        assert!(matches!(err, XdmError::Dynamic(_)));

        let err = fn_error::<()>(vec![
            XdmValue::from_string("err:code"),
            XdmValue::from_string("boom"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("boom"));
    }
}
