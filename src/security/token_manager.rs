//! Secret masking for diagnostics
//!
//! Automation scripts and API error bodies sometimes echo the credentials
//! they were given. Everything that ends up in an error message goes through
//! a [`SecretMasker`] first.

use aho_corasick::AhoCorasick;

/// Secrets shorter than this are masked entirely
const MIN_PARTIAL_MASK_LEN: usize = 10;

/// Replaces known secret values in free-form text
///
/// # Examples
///
/// ```
/// use video_publisher::SecretMasker;
///
/// let masker = SecretMasker::new(["super-secret-password"]);
/// assert_eq!(masker.mask("login failed for super-secret-password"), "login failed for sup...ord");
/// ```
#[derive(Debug, Clone)]
pub struct SecretMasker {
    matcher: Option<AhoCorasick>,
    replacements: Vec<String>,
}

impl SecretMasker {
    /// Build a masker for the given secrets; empty strings are ignored
    pub fn new<I, S>(secrets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut patterns: Vec<String> = secrets
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // Longest first so a secret containing another is masked whole
        patterns.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        patterns.dedup();

        let replacements = patterns.iter().map(|s| Self::mask_token(s)).collect();
        let matcher = if patterns.is_empty() {
            None
        } else {
            AhoCorasick::builder()
                .match_kind(aho_corasick::MatchKind::LeftmostLongest)
                .build(&patterns)
                .ok()
        };

        Self { matcher, replacements }
    }

    /// Masks a single token for safe logging
    ///
    /// Shows only the first 3 and last 3 characters. Tokens shorter than 10
    /// characters are fully masked as "****".
    pub fn mask_token(token: &str) -> String {
        let chars: Vec<char> = token.chars().collect();
        if chars.len() < MIN_PARTIAL_MASK_LEN {
            return "****".to_string();
        }

        let prefix: String = chars[..3].iter().collect();
        let suffix: String = chars[chars.len() - 3..].iter().collect();
        format!("{}...{}", prefix, suffix)
    }

    /// Replace every known secret in `text`
    pub fn mask(&self, text: &str) -> String {
        match &self.matcher {
            Some(matcher) => matcher.replace_all(text, &self.replacements),
            None => text.to_string(),
        }
    }
}
