//! Process exit codes.

pub const SUCCESS: u8 = 0;
pub const GENERAL_ERROR: u8 = 1;
/// Invalid invocation: bad flags or missing required settings.
pub const USAGE: u8 = 2;
/// The repository session could not be established.
pub const CONNECTION_FAILED: u8 = 3;
/// A driver callback returned a non-success status.
pub const OPERATION_FAILED: u8 = 4;
