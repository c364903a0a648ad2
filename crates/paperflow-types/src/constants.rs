//! System-wide constants for commercial paper issuance.

/// SHA-256 of the prospectus every commercial paper issuance must attach.
pub const PROSPECTUS_HASH_HEX: &str =
    "decd098666b9657314870e192ced0c3519c2c9d395507a238338f8d003929de9";

/// Default time between issuance and maturity, in days.
pub const DEFAULT_VALIDITY_DAYS: u64 = 10;

/// Default width of the notarisation time-window, in seconds.
pub const DEFAULT_TIME_WINDOW_SECS: u64 = 30;

/// Default upper bound on one finality exchange, in milliseconds.
pub const DEFAULT_FINALITY_TIMEOUT_MS: u64 = 60_000;

/// Domain separator for the canonical proposal encoding.
pub const PROPOSAL_DOMAIN: &[u8] = b"paperflow:tx:v1:";

/// Domain separator for the canonical state encoding.
pub const STATE_DOMAIN: &[u8] = b"paperflow:state:v1:";

/// Progress label reported while the issuance runs.
pub const ISSUING_STEP_LABEL: &str = "Issuing and timestamping some commercial paper";

/// Progress label reported while the move runs.
pub const MOVING_STEP_LABEL: &str = "Moving commercial paper to the recipient";
