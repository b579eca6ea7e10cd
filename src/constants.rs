//! Constants used throughout userio

/// Configuration file names in order of preference
pub const CONFIG_FILENAMES: &[&str] = &["userio.json", "userio.yaml", "userio.yml"];

/// Environment variable that disables colored output when set
pub const NO_COLOR_ENV: &str = "NO_COLOR";

/// Render loop defaults
pub mod defaults {
    /// Spinner frame interval in milliseconds
    pub const SPINNER_INTERVAL_MS: u64 = 100;

    /// Upper bound for flushing already queued updates once `done` arrives
    pub const DRAIN_GRACE_MS: u64 = 200;

    /// Capacity of the handler to render loop update channel
    pub const UPDATE_QUEUE_CAPACITY: usize = 16;

    /// Number of list rows shown at once by the select widgets
    pub const LIST_PAGE_SIZE: usize = 10;

    /// Terminal size assumed when it cannot be queried
    pub const TERMINAL_WIDTH: u16 = 80;
    pub const TERMINAL_HEIGHT: u16 = 24;

    /// How often the terminal reader thread checks whether it should stop
    pub const EVENT_POLL_MS: u64 = 50;
}

/// Glyphs drawn in the session frame
pub mod glyphs {
    pub const SPINNER_FRAMES: &[&str] = &["⣾ ", "⣽ ", "⣻ ", "⢿ ", "⡿ ", "⣟ ", "⣯ ", "⣷ "];
    pub const EDITING: &str = "📝 ";
    pub const SUCCESS: &str = "✓";
    pub const ERROR: &str = "✗";
    pub const SKIPPED: &str = "⚠";
    pub const POINTER: &str = "> ";
    pub const CHECKED: &str = "[X] ";
    pub const UNCHECKED: &str = "[ ] ";
}

/// Validation messages
pub mod validation {
    pub const EMPTY_INPUT: &str = "empty input";
    pub const NOTHING_SELECTED: &str = "no items selected";
    pub const DIRECTORY_NOT_EXPECTED: &str = "directory is not expected";
    pub const DIRECTORY_EXPECTED: &str = "directory only is expected";
    pub const DIRECTORY_NOT_EMPTY: &str = "directory is not empty";
}

/// Exit codes
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
    pub const NOT_SET: i32 = 2;
    pub const INTERRUPTED: i32 = 130;
}

/// Verbosity levels
pub mod verbosity {
    pub const OFF: u8 = 0;
    pub const INFO: u8 = 1;
    pub const DEBUG: u8 = 2;
    pub const TRACE: u8 = 3;
}

/// Values used by the `init` demonstration command
pub mod demo {
    pub const NAME_PATTERN: &str = "^[a-z][a-z0-9-]*$";
    pub const ENVIRONMENTS: &[&str] = &["dev", "predev", "staging", "prod"];
    pub const TIERS: &[(&str, &str)] = &[
        ("bronze", "Bronze - best effort"),
        ("silver", "Silver - business hours support"),
        ("gold", "Gold - 24/7 support"),
    ];
    pub const MANIFEST_FILENAME: &str = "userio-app.json";

    /// Pause between simulated steps so the spinner is visible
    pub const STEP_DELAY_MS: u64 = 300;
}
