//! Application constants
//!
//! Centralized location for magic strings and configuration defaults.

/// Environment variable holding the API base URL
pub const API_BASE_ENV: &str = "PROJDECK_API_BASE";

/// Environment variable overriding the HTTP timeout (seconds)
pub const TIMEOUT_ENV: &str = "PROJDECK_TIMEOUT_SECS";

/// Base URL used when the environment does not provide one
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Default HTTP timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Extensions handed to the OS viewer instead of being fetched inline
pub const BROWSER_VIEWABLE: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp", "pdf", "txt"];

/// How many notifications are kept for the status bar
pub const MAX_NOTIFICATIONS: usize = 5;

/// Log file name
pub const LOG_FILE: &str = "projdeck.log";

/// Application name
pub const APP_NAME: &str = "projdeck";
