use memchr::memmem;

/// Substring that marks a line as an error.
pub const ERROR_MARKER: &str = "ERROR";

/// Substrings that cancel an otherwise matching error line.
///
/// Each one covers a known-benign line that happens to contain the marker.
pub const SUPPRESSION_MARKERS: [&str; 3] = [
    // Job summary footer
    "Final Counters for",
    // Startup noise
    "No log4j2 configuration file found",
    // Task completion event
    "TASK_FINISHED",
];

/// Returns `true` if `line` is an error line.
///
/// Matching is case-sensitive and works on raw bytes, so lines that aren't
/// valid UTF-8 are classified like any other.
///
/// ```
/// use logscan_scan::is_error;
///
/// assert!(is_error(b"2024-03-01 ERROR Connection refused"));
/// assert!(!is_error(b"ERROR Final Counters for job_1"));
/// assert!(!is_error(b"error: lowercase does not count"));
/// ```
pub fn is_error(line: &[u8]) -> bool {
    contains(line, ERROR_MARKER) && !SUPPRESSION_MARKERS.iter().any(|marker| contains(line, marker))
}

fn contains(haystack: &[u8], needle: &str) -> bool {
    memmem::find(haystack, needle.as_bytes()).is_some()
}
