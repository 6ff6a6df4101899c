//! Filler acknowledgments spoken when active listening captured nothing.

use rand::Rng;

/// The canned acknowledgments used when none are configured.
const DEFAULT_PHRASES: [&str; 5] = [
    "What?",
    "I didn't hear anything.",
    "I didn't catch that, please say it again.",
    "Huh? Was I daydreaming?",
    "What did you say?",
];

/// Default filler set as owned strings (for config defaults).
pub fn default_phrases() -> Vec<String> {
    DEFAULT_PHRASES.iter().map(|p| (*p).to_owned()).collect()
}

/// Picks an index into a phrase set of `len` entries.
pub trait PhraseSelector: Send + Sync {
    /// Returns an index; values `>= len` are wrapped by the caller.
    fn select(&self, len: usize) -> usize;
}

/// Uniform random choice.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSelector;

impl PhraseSelector for RandomSelector {
    fn select(&self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        rand::thread_rng().gen_range(0..len)
    }
}

/// Always picks the same index.
#[derive(Debug, Clone, Copy)]
pub struct FixedSelector(pub usize);

impl PhraseSelector for FixedSelector {
    fn select(&self, _len: usize) -> usize {
        self.0
    }
}

/// A finite, enumerable set of filler phrases plus the selector used to pick one.
pub struct FillerPhrases {
    phrases: Vec<String>,
    selector: Box<dyn PhraseSelector>,
}

impl FillerPhrases {
    /// Build a set from `phrases`. An empty list falls back to the defaults.
    pub fn new(phrases: Vec<String>, selector: Box<dyn PhraseSelector>) -> Self {
        let phrases = if phrases.is_empty() {
            default_phrases()
        } else {
            phrases
        };
        Self { phrases, selector }
    }

    /// All phrases, in configured order.
    pub fn all(&self) -> &[String] {
        &self.phrases
    }

    /// Pick one phrase.
    pub fn pick(&self) -> &str {
        let idx = self.selector.select(self.phrases.len()) % self.phrases.len();
        &self.phrases[idx]
    }
}

impl Default for FillerPhrases {
    fn default() -> Self {
        Self::new(default_phrases(), Box::new(RandomSelector))
    }
}

impl std::fmt::Debug for FillerPhrases {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FillerPhrases")
            .field("phrases", &self.phrases)
            .finish_non_exhaustive()
    }
}
