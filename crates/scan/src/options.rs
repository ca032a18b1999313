use logscan_compress::Selector;

/// Lines printed after each error line unless configured otherwise.
pub const DEFAULT_CONTEXT_LINES: usize = 10;

/// What to scan and how.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanOptions {
    pub bucket: String,
    /// Plain string prefix; empty scans the whole bucket.
    pub prefix: String,
    /// Context window size, see [`ContextWindow`](crate::ContextWindow).
    pub context: usize,
    pub selector: Selector,
}

impl ScanOptions {
    pub fn new(bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: prefix.into(),
            context: DEFAULT_CONTEXT_LINES,
            selector: Selector::default(),
        }
    }

    pub fn with_context(mut self, context: usize) -> Self {
        self.context = context;
        self
    }

    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = selector;
        self
    }
}
