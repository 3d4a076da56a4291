//! Parser configuration.

use chrono::Datelike;

/// Configuration shared by the recognizer, chain builder and aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Upper bound on fragments collected into one chain.
    pub max_chain_fragments: usize,
    /// Upper bound on recognizer re-entrancy within one session.
    pub max_recursion_depth: usize,
    /// Run the memoizing pre-pass before parsing a line.
    pub speed_regime: bool,
    /// Anchor year of the two-digit year window.
    pub reference_year: i32,
    /// How many years past `reference_year` a two-digit year may point.
    pub year_window: i32,
}

impl ParserConfig {
    /// Standard configuration anchored to the current local year.
    pub fn standard() -> Self {
        Self {
            max_chain_fragments: 20,
            max_recursion_depth: 10,
            speed_regime: false,
            reference_year: chrono::Local::now().year(),
            year_window: 5,
        }
    }

    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = year;
        self
    }

    pub fn with_speed_regime(mut self, enabled: bool) -> Self {
        self.speed_regime = enabled;
        self
    }

    pub fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = depth;
        self
    }

    /// Largest two-digit value that still maps into the 2000s.
    pub(crate) fn two_digit_threshold(&self) -> i32 {
        self.reference_year - 2000 + self.year_window
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::standard()
    }
}
