//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Tag shape constants
pub mod tags {
    /// Minimum words per tag
    pub const MIN_TAG_WORDS: usize = 3;

    /// Maximum words per tag
    pub const MAX_TAG_WORDS: usize = 4;

    /// Target tag count for the initial generation stage
    pub const STAGE1_TARGET: usize = 3;

    /// Target tag count for the follow-up generation stage
    pub const STAGE2_TARGET: usize = 5;

    /// Minimum topic length accepted for generation
    pub const MIN_TOPIC_CHARS: usize = 4;
}

/// Response cache constants
pub mod cache {
    /// Entry time-to-live (seconds)
    pub const TTL_SECS: u64 = 600;
}

/// Client session constants
pub mod session {
    /// Debounce window after a topic keystroke (milliseconds)
    pub const DEBOUNCE_MS: u64 = 500;

    /// Tags revealed before the first selection
    pub const INITIAL_REVEAL: usize = 3;

    /// Default selection cap
    pub const DEFAULT_SELECTION_CAP: usize = 5;

    /// Largest selection cap any deployment may configure
    pub const MAX_SELECTION_CAP: usize = 8;
}

/// Network constants
pub mod network {
    /// Default provider request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
}
