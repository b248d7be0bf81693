use crate::error::XdmError;
use crate::types::XdmValue;

pub fn fn_count<N: Clone>(args: Vec<XdmValue<N>>) -> Result<XdmValue<N>, XdmError> {
    if args.len() != 1 {
        return Err(XdmError::function("count", "Expected 1 argument"));
    }
    Ok(XdmValue::from_integer(args[0].len() as i64))
}

pub fn fn_empty<N: Clone>(args: Vec<XdmValue<N>>) -> Result<XdmValue<N>, XdmError> {
    if args.len() != 1 {
        return Err(XdmError::function("empty", "Expected 1 argument"));
    }
    Ok(XdmValue::from_bool(args[0].is_empty()))
}

pub fn fn_exists<N: Clone>(args: Vec<XdmValue<N>>) -> Result<XdmValue<N>, XdmError> {
    if args.len() != 1 {
        return Err(XdmError::function("exists", "Expected 1 argument"));
    }
    Ok(XdmValue::from_bool(!args[0].is_empty()))
}
