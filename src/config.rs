use crate::classify::{Category, CategoryRules, Direction, DirectionRules};

/// Lines shorter than this are never considered by the line-by-line fallback.
pub const DEFAULT_MIN_FALLBACK_LINE_LEN: usize = 10;

/// Extraction settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// Ordered category table, first match wins
    pub category_rules: CategoryRules,
    /// Keywords marking a description as a credit
    pub direction_rules: DirectionRules,
    /// Category given to descriptions no rule matches
    pub default_category: Category,
    /// Minimum trimmed length of a line for the fallback extractor to look at it
    pub min_fallback_line_len: usize,
    /// Extract each page on its own thread
    pub parallel_pages: bool,
}

impl ExtractorConfig {
    pub fn categorize(&self, description: &str) -> Category {
        self.category_rules
            .classify(description)
            .unwrap_or(self.default_category)
    }

    pub fn direction(&self, description: &str) -> Direction {
        self.direction_rules.classify(description)
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            category_rules: CategoryRules::default(),
            direction_rules: DirectionRules::default(),
            default_category: Category::Miscellaneous,
            min_fallback_line_len: DEFAULT_MIN_FALLBACK_LINE_LEN,
            parallel_pages: false,
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn should_fall_back_to_the_default_category() {
        let config = ExtractorConfig::default();
        assert_eq!(Category::Miscellaneous, config.categorize("TRF TO J DOE"));

        let config = ExtractorConfig {
            default_category: Category::Personal,
            ..ExtractorConfig::default()
        };
        assert_eq!(Category::Personal, config.categorize("TRF TO J DOE"));
        assert_eq!(Category::FoodAndDining, config.categorize("GROCERY MART"));
    }
}
