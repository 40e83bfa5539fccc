//! Keyword-based pattern analysis over message histories.

use async_trait::async_trait;
use qcomm_core::error::Result;
use qcomm_core::session::{Message, PatternAnalysis, PatternAnalyzer};

const DEFAULT_KEYWORDS: &[&str] = &[
    "light",
    "frequency",
    "resonance",
    "harmony",
    "vibration",
    "portal",
    "akashic",
];

/// Scores a history by how many messages mention known keywords.
///
/// `score` is the percentage of messages with at least one keyword;
/// `entanglement_level` is the share of distinct keywords seen.
pub struct KeywordPatternAnalyzer {
    keywords: Vec<String>,
}

impl KeywordPatternAnalyzer {
    pub fn new(keywords: Vec<String>) -> Self {
        Self {
            keywords: keywords.into_iter().map(|k| k.to_lowercase()).collect(),
        }
    }
}

impl Default for KeywordPatternAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect())
    }
}

#[async_trait]
impl PatternAnalyzer for KeywordPatternAnalyzer {
    async fn analyze_patterns(&self, messages: &[Message]) -> Result<PatternAnalysis> {
        if messages.is_empty() || self.keywords.is_empty() {
            return Ok(PatternAnalysis {
                patterns: Vec::new(),
                score: 0.0,
                entanglement_level: 0.0,
            });
        }

        let mut patterns: Vec<String> = Vec::new();
        let mut matching_messages = 0usize;
        for message in messages {
            let content = message.content.to_lowercase();
            let mut matched = false;
            for keyword in &self.keywords {
                if content.contains(keyword.as_str()) {
                    matched = true;
                    if !patterns.contains(keyword) {
                        patterns.push(keyword.clone());
                    }
                }
            }
            if matched {
                matching_messages += 1;
            }
        }

        Ok(PatternAnalysis {
            score: matching_messages as f64 / messages.len() as f64 * 100.0,
            entanglement_level: patterns.len() as f64 / self.keywords.len() as f64,
            patterns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(content: &str) -> Message {
        Message::new("sirius", "operator", content)
    }

    #[tokio::test]
    async fn test_empty_history_scores_zero() {
        let analysis = KeywordPatternAnalyzer::default()
            .analyze_patterns(&[])
            .await
            .unwrap();
        assert!(analysis.patterns.is_empty());
        assert_eq!(analysis.score, 0.0);
    }

    #[tokio::test]
    async fn test_keywords_counted_once() {
        let analyzer = KeywordPatternAnalyzer::new(vec!["Light".to_string(), "portal".to_string()]);
        let messages = vec![msg("The light is bright"), msg("more LIGHT"), msg("nothing here"), msg("x")];

        let analysis = analyzer.analyze_patterns(&messages).await.unwrap();

        assert_eq!(analysis.patterns, vec!["light"]);
        assert_eq!(analysis.score, 50.0);
        assert_eq!(analysis.entanglement_level, 0.5);
    }
}
