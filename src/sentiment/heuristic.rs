use std::cell::RefCell;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{ClassifyError, Label, Sentiment, SentimentClassifier};

pub const DECISIVE_CONFIDENCE: f64 = 0.95;
pub const TIE_CONFIDENCE: f64 = 0.60;

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "excellent", "amazing", "awesome", "best", "love", "perfect",
    "recommend", "fantastic", "wonderful", "happy", "fast", "nice", "quality product",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "poor", "terrible", "worst", "broken", "disappoint", "waste", "awful",
    "hate", "slow", "sad", "unclear", "refund", "useless", "does not work",
];

/// Keyword-count classifier. Matching is plain substring containment on the
/// lower-cased text; each listed word counts once.
///
/// Equal counts, including no matches at all, get a random label from the
/// injected generator with the lower confidence tier.
pub struct HeuristicClassifier {
    rng: RefCell<StdRng>,
}

impl HeuristicClassifier {
    pub fn new(rng: StdRng) -> Self {
        Self {
            rng: RefCell::new(rng),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_os_rng())
    }

    /// `(positive, negative)` keyword counts.
    pub fn score(text: &str) -> (usize, usize) {
        let lower = text.to_lowercase();
        let count = |words: &[&str]| words.iter().filter(|w| lower.contains(*w)).count();
        (count(POSITIVE_WORDS), count(NEGATIVE_WORDS))
    }

    pub fn judge(&self, text: &str) -> Sentiment {
        let (pos, neg) = Self::score(text);
        if pos > neg {
            Sentiment {
                label: Label::Positive,
                confidence: DECISIVE_CONFIDENCE,
            }
        } else if neg > pos {
            Sentiment {
                label: Label::Negative,
                confidence: DECISIVE_CONFIDENCE,
            }
        } else {
            let label = if self.rng.borrow_mut().random_bool(0.5) {
                Label::Positive
            } else {
                Label::Negative
            };
            Sentiment {
                label,
                confidence: TIE_CONFIDENCE,
            }
        }
    }
}

impl SentimentClassifier for HeuristicClassifier {
    fn classify(&self, text: &str) -> Result<Sentiment, ClassifyError> {
        Ok(self.judge(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clearly_positive() {
        let h = HeuristicClassifier::seeded(0);
        let s = h.judge("This is the best, excellent product");
        assert_eq!(s.label, Label::Positive);
        assert_eq!(s.confidence, 0.95);
    }

    #[test]
    fn clearly_negative() {
        let h = HeuristicClassifier::seeded(0);
        let s = h.judge("Worst, terrible, broken item");
        assert_eq!(s.label, Label::Negative);
        assert_eq!(s.confidence, 0.95);
    }

    #[test]
    fn case_insensitive_substring_match() {
        assert_eq!(HeuristicClassifier::score("GREATEST of all"), (1, 0));
        assert_eq!(HeuristicClassifier::score("I was disappointed"), (0, 1));
    }

    #[test]
    fn each_word_counts_once() {
        assert_eq!(HeuristicClassifier::score("good good good bad"), (1, 1));
    }

    #[test]
    fn no_matches_is_a_tie() {
        let h = HeuristicClassifier::seeded(9);
        for _ in 0..50 {
            let s = h.judge("It is a chair.");
            assert_eq!(s.confidence, 0.60);
            assert!(matches!(s.label, Label::Positive | Label::Negative));
        }
    }

    #[test]
    fn tie_breaks_use_both_labels() {
        let h = HeuristicClassifier::seeded(1234);
        let labels: Vec<Label> = (0..64).map(|_| h.judge("").label).collect();
        assert!(labels.contains(&Label::Positive));
        assert!(labels.contains(&Label::Negative));
    }

    #[test]
    fn same_seed_same_tie_breaks() {
        let a = HeuristicClassifier::seeded(77);
        let b = HeuristicClassifier::seeded(77);
        for _ in 0..20 {
            assert_eq!(a.judge("good and bad").label, b.judge("good and bad").label);
        }
    }

    #[test]
    fn equal_nonzero_counts_tie() {
        let h = HeuristicClassifier::seeded(3);
        assert_eq!(h.judge("great but slow").confidence, 0.60);
    }
}
