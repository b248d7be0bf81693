use crate::error::XdmError;
use crate::types::XdmValue;

pub fn fn_true<N: Clone>(args: Vec<XdmValue<N>>) -> Result<XdmValue<N>, XdmError> {
    if !args.is_empty() {
        return Err(XdmError::function("true", "Expected 0 arguments"));
    }
    Ok(XdmValue::from_bool(true))
}

pub fn fn_false<N: Clone>(args: Vec<XdmValue<N>>) -> Result<XdmValue<N>, XdmError> {
    if !args.is_empty() {
        return Err(XdmError::function("false", "Expected 0 arguments"));
    }
    Ok(XdmValue::from_bool(false))
}

pub fn fn_not<N: Clone>(mut args: Vec<XdmValue<N>>) -> Result<XdmValue<N>, XdmError> {
    if args.len() != 1 {
        return Err(XdmError::function("not", "Expected 1 argument"));
    }
    let val = args.remove(0);
    Ok(XdmValue::from_bool(!val.effective_boolean_value()))
}

pub fn fn_boolean<N: Clone>(mut args: Vec<XdmValue<N>>) -> Result<XdmValue<N>, XdmError> {
    if args.len() != 1 {
        return Err(XdmError::function("boolean", "Expected 1 argument"));
    }
    let val = args.remove(0);
    Ok(XdmValue::from_bool(val.effective_boolean_value()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_true_false() {
        let t: XdmValue<()> = fn_true(vec![]).unwrap();
        assert!(t.effective_boolean_value());

        let f: XdmValue<()> = fn_false(vec![]).unwrap();
        assert!(!f.effective_boolean_value());

        assert!(fn_true::<()>(vec![XdmValue::empty()]).is_err());
    }

    #[test]
    fn test_not() {
        let result: XdmValue<()> = fn_not(vec![XdmValue::from_bool(true)]).unwrap();
        assert!(!result.effective_boolean_value());

        let result: XdmValue<()> = fn_not(vec![XdmValue::empty()]).unwrap();
        assert!(result.effective_boolean_value());
    }

    #[test]
    fn test_boolean() {
        let result: XdmValue<()> = fn_boolean(vec![XdmValue::from_string("hello")]).unwrap();
        assert!(result.effective_boolean_value());

        let result: XdmValue<()> = fn_boolean(vec![XdmValue::from_integer(0)]).unwrap();
        assert!(!result.effective_boolean_value());
    }
}
