pub const LOGGING_LEVEL: &str = "INFO";
pub const SAMPLE_SEPARATOR: char = '=';
