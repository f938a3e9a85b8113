//! Comment and whitespace normalization for source-code samples.

use regex::Regex;

use crate::data_handling::Sample;
use crate::preprocessing::pipeline::Transformer;

/// `//` line comments and non-greedy `/* ... */` blocks.
const COMMENT_PATTERN: &str = r"//.*|/\*[\s\S]*?\*/";
const WHITESPACE_PATTERN: &str = r"[[:space:]]+";
/// Everything outside word characters, whitespace and the punctuation the
/// feature patterns rely on.
const DISALLOWED_PATTERN: &str =
    r"[^A-Za-z0-9_[:space:]\$\{\}\(\)\[\]\-><:;\.,=\+\*/!\?\|\&%\^]";

/// Pure text transform that strips comments and noise from code.
///
/// The output is ASCII-only, lowercase, single-spaced and trimmed, which
/// makes it the canonical input for [`FeatureExtractor`](crate::preprocessing::FeatureExtractor).
#[derive(Debug, Clone)]
pub struct CodeNormalizer {
    comments: Regex,
    whitespace: Regex,
    disallowed: Regex,
}

impl CodeNormalizer {
    pub fn new() -> Self {
        CodeNormalizer {
            comments: Regex::new(COMMENT_PATTERN).expect("comment pattern compiles"),
            whitespace: Regex::new(WHITESPACE_PATTERN).expect("whitespace pattern compiles"),
            disallowed: Regex::new(DISALLOWED_PATTERN).expect("allow-list pattern compiles"),
        }
    }

    /// Normalize one snippet.
    pub fn normalize(&self, code: &str) -> String {
        let without_comments = self.comments.replace_all(code, "");
        let single_spaced = self.whitespace.replace_all(&without_comments, " ");
        let lowered = single_spaced.to_ascii_lowercase();
        let cleaned = self.disallowed.replace_all(&lowered, "");
        cleaned.trim().to_string()
    }
}

impl Default for CodeNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Transformer for CodeNormalizer {
    fn transform(&self, samples: Vec<Sample>) -> Vec<Sample> {
        samples
            .into_iter()
            .map(|sample| match sample {
                Sample::Raw(code) => Sample::Raw(self.normalize(&code)),
                features => features,
            })
            .collect()
    }

    fn name(&self) -> &str {
        "Code Normalizer"
    }
}
