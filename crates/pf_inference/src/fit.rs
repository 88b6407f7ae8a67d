//! Reduces a classifier's free-text verdict to a fit / no-fit decision.

/// Words that count as a positive verdict.
pub const AFFIRMATIVE: &[&str] = &["yes", "true", "relevant", "matches", "fits"];

/// Words that cancel an affirmative word appearing shortly after them.
pub const NEGATORS: &[&str] = &["no", "not", "never", "isn't", "doesn't", "don't", "hardly"];

/// How many words before an affirmative word a negator still applies to.
const NEGATION_WINDOW: usize = 2;

/// Lenient word-level match: any affirmative word that is not negated within
/// the preceding two words makes the article fit.
#[derive(Debug, Clone)]
pub struct FitDecisionRule {
    affirmative: Vec<String>,
    negators: Vec<String>,
}

impl Default for FitDecisionRule {
    fn default() -> Self {
        Self {
            affirmative: AFFIRMATIVE.iter().map(|w| w.to_string()).collect(),
            negators: NEGATORS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl FitDecisionRule {
    pub fn decide(&self, response: &str) -> bool {
        let lowered = response.to_lowercase().replace('\u{2019}', "'");
        let words: Vec<&str> = lowered
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .map(|w| w.trim_matches('\''))
            .filter(|w| !w.is_empty())
            .collect();

        words.iter().enumerate().any(|(i, word)| {
            self.affirmative.iter().any(|a| a == word)
                && !words[i.saturating_sub(NEGATION_WINDOW)..i]
                    .iter()
                    .any(|prev| self.negators.iter().any(|n| n == prev))
        })
    }
}

/// [`FitDecisionRule::decide`] with the default vocabulary.
pub fn fits_profile(response: &str) -> bool {
    FitDecisionRule::default().decide(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affirmative_verdicts_fit() {
        for response in ["Yes", "yes, it fits", "This seems relevant", "TRUE", "It matches."] {
            assert!(fits_profile(response), "{response:?} should fit");
        }
    }

    #[test]
    fn negative_verdicts_do_not_fit() {
        for response in ["No", "not relevant", "", "It doesn't fit at all", "Isn’t relevant"] {
            assert!(!fits_profile(response), "{response:?} should not fit");
        }
    }

    #[test]
    fn matches_whole_words_only() {
        assert!(!fits_profile("My eyes hurt"));
        assert!(!fits_profile("irrelevant"));
    }

    #[test]
    fn negation_only_reaches_two_words_back() {
        assert!(!fits_profile("not very relevant"));
        assert!(fits_profile("No doubt about it, yes"));
    }
}
