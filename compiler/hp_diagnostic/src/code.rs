use std::fmt;

/// Error codes for all compiler diagnostics.
///
/// Format: E#### where the first digit indicates the phase:
/// - E2xxx: Semantic (validation) errors
/// - E9xxx: Internal compiler errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Semantic Errors (E2xxx)
    /// Unknown symbol
    E2001,
    /// Redefinition of a declaration in one scope
    E2002,
    /// Expression not evaluable in a boolean context
    E2003,
    /// Invalid implicit cast
    E2004,
    /// Incompatible assignment
    E2005,
    /// Call of a non-function value
    E2006,
    /// Wrong number of call arguments
    E2007,
    /// Unknown field
    E2008,
    /// Member access on a non-class value
    E2009,
    /// Assignment target is not a storage location
    E2010,
    /// Redefinition of a variable
    E2011,
    /// Missing return in a value-returning function
    E2012,
    /// Return value in a void function
    E2013,
    /// Break or continue outside a loop
    E2014,
    /// Invalid operand type for an operator
    E2015,
    /// Expression does not name a value
    E2016,
    /// Expression is not a compile-time constant
    E2017,
    /// Field reference without an object value
    E2018,
    /// Unreachable statement after a return (warning)
    E2901,

    // Internal Errors (E9xxx)
    /// Internal consistency failure
    E9001,
}

impl ErrorCode {
    /// Short description for documentation and tooling.
    pub fn description(self) -> &'static str {
        match self {
            ErrorCode::E2001 => "unknown symbol",
            ErrorCode::E2002 => "redefinition of a declaration in one scope",
            ErrorCode::E2003 => "expression not evaluable in a boolean context",
            ErrorCode::E2004 => "invalid implicit cast",
            ErrorCode::E2005 => "incompatible assignment",
            ErrorCode::E2006 => "call of a non-function value",
            ErrorCode::E2007 => "wrong number of call arguments",
            ErrorCode::E2008 => "unknown field",
            ErrorCode::E2009 => "member access on a non-class value",
            ErrorCode::E2010 => "assignment target is not a storage location",
            ErrorCode::E2011 => "redefinition of a variable",
            ErrorCode::E2012 => "missing return in a value-returning function",
            ErrorCode::E2013 => "return value in a void function",
            ErrorCode::E2014 => "break or continue outside a loop",
            ErrorCode::E2015 => "invalid operand type for an operator",
            ErrorCode::E2016 => "expression does not name a value",
            ErrorCode::E2017 => "expression is not a compile-time constant",
            ErrorCode::E2018 => "field reference without an object value",
            ErrorCode::E2901 => "unreachable statement after a return",
            ErrorCode::E9001 => "internal consistency failure",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_displays_as_identifier() {
        assert_eq!(format!("{}", ErrorCode::E2003), "E2003");
    }
}
