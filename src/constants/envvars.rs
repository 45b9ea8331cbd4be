pub const LOGGING_LEVEL: &str = "LOGGING_LEVEL";
pub const TIMEZONE: &str = "PPMP_TIMEZONE";
pub const ENV_FILE: &str = "PPMP_ENV_FILE";
