use std::fmt;

/// Errors that can occur while building or running a continuous query
#[derive(Debug, Clone, PartialEq)]
pub enum BqlError {
    /// Tuple routing errors: the input name matches no declared relation
    UnknownInput {
        input_name: String,
        known: Vec<String>,
    },

    /// Window state invariant violations
    WindowError { message: String },

    /// Features refused at plan construction time
    Unsupported { feature: String },

    /// Plan descriptor validation errors
    PlanError { message: String },

    /// Expression evaluation errors surfaced by an evaluator
    EvalError { message: String },

    /// The WHERE clause failed to evaluate on a joined row
    FilterError { message: String },

    /// A projection failed to evaluate or to assign its output value
    ProjectionError { target: String, message: String },

    /// A GROUP BY expression failed to evaluate
    GroupKeyError { message: String },

    /// Aggregate resolution or computation errors
    AggregateError { function: String, message: String },

    /// Type conversion errors
    TypeError {
        expected: String,
        actual: String,
        value: Option<String>,
    },
}

impl fmt::Display for BqlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BqlError::UnknownInput { input_name, known } => {
                write!(
                    f,
                    "no declared relation matches input '{}' (known inputs: {})",
                    input_name,
                    known.join(", ")
                )
            }
            BqlError::WindowError { message } => {
                write!(f, "window invariant error: {}", message)
            }
            BqlError::Unsupported { feature } => {
                write!(f, "unsupported feature: {}", feature)
            }
            BqlError::PlanError { message } => {
                write!(f, "invalid plan: {}", message)
            }
            BqlError::EvalError { message } => {
                write!(f, "expression evaluation error: {}", message)
            }
            BqlError::FilterError { message } => {
                write!(f, "filter evaluation error: {}", message)
            }
            BqlError::ProjectionError { target, message } => {
                write!(f, "projection '{}' failed: {}", target, message)
            }
            BqlError::GroupKeyError { message } => {
                write!(f, "GROUP BY evaluation error: {}", message)
            }
            BqlError::AggregateError { function, message } => {
                write!(f, "aggregate function '{}': {}", function, message)
            }
            BqlError::TypeError {
                expected,
                actual,
                value,
            } => {
                if let Some(val) = value {
                    write!(
                        f,
                        "type error: expected {}, got {} for value '{}'",
                        expected, actual, val
                    )
                } else {
                    write!(f, "type error: expected {}, got {}", expected, actual)
                }
            }
        }
    }
}

impl std::error::Error for BqlError {}

impl BqlError {
    /// Create an unknown-input error listing the inputs the plan can accept
    pub fn unknown_input(input_name: impl Into<String>, known: Vec<String>) -> Self {
        BqlError::UnknownInput {
            input_name: input_name.into(),
            known,
        }
    }

    /// Create a window invariant error
    pub fn window_error(message: impl Into<String>) -> Self {
        BqlError::WindowError {
            message: message.into(),
        }
    }

    /// Create an unsupported-feature error
    pub fn unsupported(feature: impl Into<String>) -> Self {
        BqlError::Unsupported {
            feature: feature.into(),
        }
    }

    /// Create a plan validation error
    pub fn plan_error(message: impl Into<String>) -> Self {
        BqlError::PlanError {
            message: message.into(),
        }
    }

    /// Create a generic expression evaluation error
    pub fn eval_error(message: impl Into<String>) -> Self {
        BqlError::EvalError {
            message: message.into(),
        }
    }

    /// Create a filter evaluation error
    pub fn filter_error(message: impl Into<String>) -> Self {
        BqlError::FilterError {
            message: message.into(),
        }
    }

    /// Create a projection error for the given output target
    pub fn projection_error(target: impl Into<String>, message: impl Into<String>) -> Self {
        BqlError::ProjectionError {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Create a GROUP BY evaluation error
    pub fn group_key_error(message: impl Into<String>) -> Self {
        BqlError::GroupKeyError {
            message: message.into(),
        }
    }

    /// Create an aggregate error for the given function name
    pub fn aggregate_error(function: impl Into<String>, message: impl Into<String>) -> Self {
        BqlError::AggregateError {
            function: function.into(),
            message: message.into(),
        }
    }

    /// Create a type conversion error
    pub fn type_error(
        expected: impl Into<String>,
        actual: impl Into<String>,
        value: Option<String>,
    ) -> Self {
        BqlError::TypeError {
            expected: expected.into(),
            actual: actual.into(),
            value,
        }
    }
}

/// Result type for continuous-query operations
pub type BqlResult<T> = Result<T, BqlError>;
