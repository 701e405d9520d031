//! Exit code constants for the clink CLI.
//!
//! - 0: Success
//! - 1: User error (bad args)
//! - 2: Agent error (the external tool exited non-zero)
//! - 3: Timeout
//! - 4: Launch failure (missing executable, missing file reference)
//! - 5: Parse failure (structured output could not be decoded)
//! - 6: Configuration error (unknown agent/role, invalid config, missing prompt)

use crate::result::Status;

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments.
pub const USER_ERROR: i32 = 1;

/// The agent ran and exited with a non-zero status.
pub const AGENT_ERROR: i32 = 2;

/// The agent was killed after exceeding its timeout.
pub const TIMEOUT: i32 = 3;

/// The agent could not be started.
pub const LAUNCH_FAILURE: i32 = 4;

/// The agent succeeded but its structured output could not be parsed.
pub const PARSE_FAILURE: i32 = 5;

/// Configuration could not be loaded or an invocation could not be resolved.
pub const CONFIG_ERROR: i32 = 6;

/// Map an invocation status to the process exit code.
pub fn for_status(status: Status) -> i32 {
    match status {
        Status::Success => SUCCESS,
        Status::AgentError => AGENT_ERROR,
        Status::Timeout => TIMEOUT,
        Status::LaunchFailure => LAUNCH_FAILURE,
        Status::ParseFailure => PARSE_FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [
            SUCCESS,
            USER_ERROR,
            AGENT_ERROR,
            TIMEOUT,
            LAUNCH_FAILURE,
            PARSE_FAILURE,
            CONFIG_ERROR,
        ];
        for (i, &a) in codes.iter().enumerate() {
            for (j, &b) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "Exit codes must be distinct");
                }
            }
        }
    }

    #[test]
    fn every_status_maps_to_its_code() {
        assert_eq!(for_status(Status::Success), SUCCESS);
        assert_eq!(for_status(Status::AgentError), AGENT_ERROR);
        assert_eq!(for_status(Status::Timeout), TIMEOUT);
        assert_eq!(for_status(Status::LaunchFailure), LAUNCH_FAILURE);
        assert_eq!(for_status(Status::ParseFailure), PARSE_FAILURE);
    }
}
