//! Value checks applied to bound parameters before a request is built.

use crate::model::{ParamType, Parameter};

/// Whether `value` is acceptable for `param`.
///
/// Only integers are checked. Every other declared type, and parameters with
/// no declared type, accept any value.
pub fn check_param(param: &Parameter, value: &str) -> bool {
    check_type(param.param_type, value)
}

pub fn check_type(param_type: ParamType, value: &str) -> bool {
    match param_type {
        ParamType::Integer => is_integer(value),
        ParamType::Number
        | ParamType::String
        | ParamType::Boolean
        | ParamType::Array
        | ParamType::File
        | ParamType::Invalid => true,
    }
}

/// One or more ASCII digits. No sign, no whitespace.
pub fn is_integer(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// Whether `value` is one of the enumerated options, or no options are declared.
pub fn in_options(param: &Parameter, value: &str) -> bool {
    param.options.is_empty() || param.options.iter().any(|o| o == value)
}
