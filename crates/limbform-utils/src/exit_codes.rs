//! Exit code constants and error mapping for limbform.
//!
//! # Exit Code Table
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Operation completed successfully |
//! | 1 | `INTERNAL` | General/internal failure |
//! | 2 | `CLI_ARGS` | Invalid CLI arguments or configuration |
//! | 3 | `USER_INPUT` | No preference selected, or a step run out of order |
//! | 4 | `REMOTE_FAILURE` | A remote service call failed |
//! | 5 | `AUTH_REQUIRED` | Email delivery needs an authorization step that was not completed |

use crate::error::{ClientError, FlowError, LimbformError};

/// Exit codes matching the documented exit code table.
///
/// The numeric values are part of the CLI contract.
///
/// ```rust
/// use limbform_utils::exit_codes::ExitCode;
///
/// assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
/// assert_eq!(ExitCode::from_i32(4), ExitCode::REMOTE_FAILURE);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - operation completed successfully
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// CLI arguments or configuration error
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    /// User input error - empty selection or step run out of order
    pub const USER_INPUT: ExitCode = ExitCode(3);

    /// A remote service call failed
    pub const REMOTE_FAILURE: ExitCode = ExitCode(4);

    /// Email delivery is waiting on an authorization step
    pub const AUTH_REQUIRED: ExitCode = ExitCode(5);

    /// Get the numeric exit code value.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Create an ExitCode from a raw i32 value.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}

impl LimbformError {
    /// Map this error to the CLI exit code
    #[must_use]
    pub fn to_exit_code(&self) -> ExitCode {
        match self {
            Self::Config(_) => ExitCode::CLI_ARGS,
            Self::Client(ClientError::Misconfiguration(_)) => ExitCode::CLI_ARGS,
            Self::Client(_) => ExitCode::REMOTE_FAILURE,
            Self::Flow(flow) => match flow {
                FlowError::EmptySelection | FlowError::NotReady { .. } => ExitCode::USER_INPUT,
                FlowError::Busy(_) | FlowError::State(_) => ExitCode::INTERNAL,
                FlowError::Description(_)
                | FlowError::Model(_)
                | FlowError::Notification(_)
                | FlowError::Viewer(_) => ExitCode::REMOTE_FAILURE,
            },
            Self::State(_) | Self::Io(_) => ExitCode::INTERNAL,
        }
    }
}
