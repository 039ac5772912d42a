//! Exit codes for kalori
//!
//! Values follow sysexits(3) where one fits.

/// Exit code for success
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for general errors
pub const EXIT_GENERAL_ERROR: i32 = 1;

/// Exit code when the photo given to `analyze` does not exist
pub const EXIT_NO_INPUT: i32 = 66;

/// Exit code when the configured camera cannot be set up
pub const EXIT_CAMERA_UNAVAILABLE: i32 = 69;

/// Exit code when a one-shot analysis ends in a failure outcome
pub const EXIT_ANALYSIS_FAILED: i32 = 75;

/// Exit code when camera access is denied
pub const EXIT_PERMISSION_DENIED: i32 = 77;
