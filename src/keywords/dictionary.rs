//! Immutable synonym/abbreviation tables for the Keyword Expander,
//! constructed once and threaded as a dependency rather than kept as
//! module-level statics.

use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct KeywordDictionary {
    synonyms: HashMap<String, Vec<String>>,
    abbreviations: HashMap<String, String>,
    expansions: HashMap<String, String>,
}

impl Default for KeywordDictionary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl KeywordDictionary {
    pub fn builtin() -> Self {
        let mut synonyms: HashMap<String, Vec<String>> = HashMap::new();
        let groups: &[&[&str]] = &[
            &["robot", "robotics", "robotic", "robots", "humanoid"],
            &["neural network", "neural net", "nn", "deep learning"],
            &["reinforcement learning", "rl"],
            &["computer vision", "cv"],
            &["natural language processing", "nlp"],
            &["large language model", "llm", "llms"],
            &["machine learning", "ml"],
            &["artificial intelligence", "ai"],
            &["manipulation", "grasping", "grasp"],
            &["navigation", "path planning", "motion planning"],
            &["transformer", "attention mechanism"],
            &["generative adversarial network", "gan"],
        ];
        for group in groups {
            for word in *group {
                let mut others: Vec<String> = group
                    .iter()
                    .filter(|w| *w != word)
                    .map(|w| w.to_string())
                    .collect();
                synonyms
                    .entry(word.to_string())
                    .or_insert_with(Vec::new)
                    .append(&mut others);
            }
        }

        let mut abbreviations = HashMap::new();
        let mut expansions = HashMap::new();
        let pairs: &[(&str, &str)] = &[
            ("reinforcement learning", "rl"),
            ("computer vision", "cv"),
            ("natural language processing", "nlp"),
            ("large language model", "llm"),
            ("machine learning", "ml"),
            ("artificial intelligence", "ai"),
            ("generative adversarial network", "gan"),
            ("convolutional neural network", "cnn"),
            ("recurrent neural network", "rnn"),
        ];
        for (long, short) in pairs {
            abbreviations.insert(long.to_string(), short.to_string());
            expansions.insert(short.to_string(), long.to_string());
        }

        Self { synonyms, abbreviations, expansions }
    }

    /// All synonyms for `keyword`, case-insensitive lookup.
    pub fn synonyms_of(&self, keyword: &str) -> Vec<String> {
        self.synonyms.get(&keyword.to_lowercase()).cloned().unwrap_or_default()
    }

    /// Bidirectional abbreviation lookup: long form -> short, short -> long.
    pub fn abbreviation_of(&self, keyword: &str) -> Option<String> {
        let lower = keyword.to_lowercase();
        self.abbreviations
            .get(&lower)
            .or_else(|| self.expansions.get(&lower))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn robot_has_synonyms() {
        let dict = KeywordDictionary::builtin();
        let syns = dict.synonyms_of("robot");
        assert!(syns.contains(&"robotics".to_string()));
        assert!(syns.contains(&"humanoid".to_string()));
    }

    #[test]
    fn abbreviation_lookup_is_bidirectional() {
        let dict = KeywordDictionary::builtin();
        assert_eq!(dict.abbreviation_of("reinforcement learning"), Some("rl".to_string()));
        assert_eq!(dict.abbreviation_of("rl"), Some("reinforcement learning".to_string()));
    }
}
