use regex::Regex;

/// A text normalizer.
///
/// Lowercases the text and replaces every character other than `a-z`, `0-9` and ` ` by a space.
#[derive(Clone, Debug)]
pub struct Normalizer {
    disallowed: Regex,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            // the pattern is a valid regex
            disallowed: Regex::new("[^a-z0-9 ]").unwrap(),
        }
    }
}

impl Normalizer {
    /// Normalizes the text.
    pub fn normalize(&self, text: &str) -> String {
        self.disallowed
            .replace_all(&text.to_lowercase(), " ")
            .into_owned()
    }
}
