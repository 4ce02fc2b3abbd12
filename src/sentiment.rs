//! Sentiment readings and fusion
//!
//! A reading is either a bounded score in [-1, 1] or explicitly unavailable.
//! Zero is a valid score (a token nobody is talking about averages to 0.0),
//! so absence of data is carried as its own variant and never folded into
//! the numeric range.

use crate::constants::SENTIMENT_SAMPLE_LIMIT;
use serde::{Serialize, Serializer};

/// One sentiment reading from a single source
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SentimentReading {
    /// Average compound score over the sampled posts, in [-1, 1]
    Score(f64),
    /// No reading obtained (source failed, throttled or disabled)
    Unavailable,
}

impl SentimentReading {
    /// Returns the numeric score, if one was obtained
    pub fn score(&self) -> Option<f64> {
        match self {
            SentimentReading::Score(v) => Some(*v),
            SentimentReading::Unavailable => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, SentimentReading::Unavailable)
    }
}

impl Serialize for SentimentReading {
    /// Unavailable readings serialize as the string "unknown"; the frontend
    /// branches on that value to grey out the hype meter.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SentimentReading::Score(v) => serializer.serialize_f64(*v),
            SentimentReading::Unavailable => serializer.serialize_str("unknown"),
        }
    }
}

/// Fuses two independently-sourced readings into one.
///
/// If both are unavailable the fusion is unavailable. If exactly one is
/// unavailable the fusion equals the other reading unchanged. If both are
/// present the fusion is their arithmetic mean. A merely unreachable source
/// must not drag the fused score toward neutral, which is why the one-sided
/// cases never re-average against zero.
pub fn fuse(a: SentimentReading, b: SentimentReading) -> SentimentReading {
    use SentimentReading::*;
    match (a, b) {
        (Unavailable, Unavailable) => Unavailable,
        (Score(x), Unavailable) => Score(x),
        (Unavailable, Score(y)) => Score(y),
        (Score(x), Score(y)) => Score((x + y) / 2.0),
    }
}

/// Average VADER compound score over a batch of texts.
///
/// An empty batch scores 0.0: posts were searched and none were found, which
/// is a real (neutral) observation, distinct from a failed search.
pub(crate) fn mean_compound(texts: &[String]) -> f64 {
    if texts.is_empty() {
        return 0.0;
    }

    let analyzer = vader_sentiment::SentimentIntensityAnalyzer::new();
    let sum: f64 = texts
        .iter()
        .take(SENTIMENT_SAMPLE_LIMIT)
        .map(|text| {
            analyzer
                .polarity_scores(text)
                .get("compound")
                .copied()
                .unwrap_or(0.0)
        })
        .sum();

    sum / texts.len().min(SENTIMENT_SAMPLE_LIMIT) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use SentimentReading::*;

    #[test]
    fn fuse_both_unavailable() {
        assert_eq!(fuse(Unavailable, Unavailable), Unavailable);
    }

    #[test]
    fn fuse_one_sided_keeps_the_present_reading() {
        assert_eq!(fuse(Score(0.4), Unavailable), Score(0.4));
        assert_eq!(fuse(Unavailable, Score(-0.9)), Score(-0.9));
        // A zero reading survives one-sided fusion as a zero, not as absence
        assert_eq!(fuse(Score(0.0), Unavailable), Score(0.0));
    }

    #[test]
    fn fuse_both_present_is_the_mean() {
        assert_eq!(fuse(Score(0.4), Score(0.8)), Score(0.6));
        assert_eq!(fuse(Score(-1.0), Score(1.0)), Score(0.0));
    }

    #[test]
    fn fuse_is_commutative() {
        let readings = [Score(-1.0), Score(-0.3), Score(0.0), Score(0.7), Unavailable];
        for a in readings {
            for b in readings {
                assert_eq!(fuse(a, b), fuse(b, a));
            }
        }
    }

    #[test]
    fn mean_compound_empty_is_neutral() {
        assert_eq!(mean_compound(&[]), 0.0);
    }

    #[test]
    fn mean_compound_scores_obvious_polarity() {
        let positive = mean_compound(&["This project is great, amazing work".to_string()]);
        let negative = mean_compound(&["This is a terrible scam, awful".to_string()]);
        assert!(positive > 0.0);
        assert!(negative < 0.0);
    }

    #[test]
    fn reading_serializes_score_or_unknown() {
        assert_eq!(serde_json::to_value(Score(0.25)).unwrap(), 0.25);
        assert_eq!(serde_json::to_value(Unavailable).unwrap(), "unknown");
    }
}
