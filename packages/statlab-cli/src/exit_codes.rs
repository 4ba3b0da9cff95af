pub const SUCCESS: i32 = 0;
/// Local failure after input was accepted (writing output, serialization)
pub const EXECUTION_ERROR: i32 = 1;
/// Rejected file, invalid parameter or missing dataset
pub const INPUT_ERROR: i32 = 2;
/// The service failed, was unreachable, or sent a malformed response
pub const SERVICE_ERROR: i32 = 3;
