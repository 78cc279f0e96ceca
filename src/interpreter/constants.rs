// Constants for the HypnoScript interpreter

/// Default limit on nested suggestion/method calls.
/// Deeper recursion fails with `CallDepthExceeded` instead of overflowing the native stack.
pub const MAX_CALL_DEPTH: usize = 256;

/// Remaining native stack below which a call body runs on a fresh segment
pub const STACK_RED_ZONE: usize = 256 * 1024;

/// Size of each native stack segment allocated for deep recursion
pub const STACK_SEGMENT_SIZE: usize = 4 * 1024 * 1024;

/// Name of the blocking sleep intrinsic (milliseconds); `Drift` is accepted too
pub const DRIFT_INTRINSIC: &str = "drift";

/// Name of the output intrinsic, the call form of `observe`
pub const OBSERVE_INTRINSIC: &str = "Observe";
