use smallvec::SmallVec;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fmt::Debug;
use std::{fmt, fs};
use unicode_normalization::UnicodeNormalization;

use crate::types::WordId;
use crate::MAX_SLOT_LENGTH;

/// A struct representing a word in the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    /// The word as it would appear in a grid: only uppercase letters.
    pub string: String,

    /// The letters making up `string`, stored inline so that crossing checks can index them
    /// directly.
    pub letters: SmallVec<[char; MAX_SLOT_LENGTH]>,
}

impl Word {
    /// The number of letters (not bytes) in the word.
    #[must_use]
    pub fn len(&self) -> usize {
        self.letters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }
}

/// Given a raw entry from a word list, turn it into the normalized form we'll use in the solver.
#[must_use]
pub fn normalize_word(raw: &str) -> String {
    raw.nfc() // Normalize Unicode combining forms
        .flat_map(char::to_uppercase)
        .filter(|c| !c.is_whitespace())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordListError {
    InvalidPath(String),
    InvalidWord(String),
}

impl fmt::Display for WordListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let string = match self {
            WordListError::InvalidPath(path) => format!("Can’t read file: “{path}”"),
            WordListError::InvalidWord(word) => {
                format!("Word list contains invalid word: “{word}”")
            }
        };
        write!(f, "{string}")
    }
}

impl std::error::Error for WordListError {}

/// The fixed vocabulary a puzzle is filled from. Words are interned once and afterwards
/// referred to by `WordId` everywhere else in the crate.
#[derive(Clone, Default)]
pub struct WordList {
    /// Every distinct word, in the order it was first seen.
    pub words: Vec<Word>,

    /// Lookup from normalized string to the word's id.
    pub word_id_by_string: HashMap<String, WordId>,
}

impl WordList {
    /// Build a word list from in-memory entries. Blank entries are skipped and duplicates (after
    /// normalization) are collapsed; anything containing a non-letter is rejected.
    pub fn from_words<I, S>(entries: I) -> Result<WordList, WordListError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut word_list = WordList::default();

        for entry in entries {
            let normalized = normalize_word(entry.as_ref());
            if normalized.is_empty() {
                continue;
            }
            if !normalized.chars().all(char::is_alphabetic) {
                return Err(WordListError::InvalidWord(entry.as_ref().trim().into()));
            }
            word_list.add_word(&normalized);
        }

        log::debug!("Loaded word list with {} words", word_list.len());

        Ok(word_list)
    }

    /// Parse the contents of a word list file, one word per line.
    pub fn from_file_contents(contents: &str) -> Result<WordList, WordListError> {
        WordList::from_words(contents.lines())
    }

    /// Load a word list file, one word per line.
    pub fn from_file<P: AsRef<OsStr> + ?Sized>(path: &P) -> Result<WordList, WordListError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|_| WordListError::InvalidPath(path.to_string_lossy().into()))?;
        WordList::from_file_contents(&contents)
    }

    /// Intern a normalized word, returning its id (existing or new).
    fn add_word(&mut self, normalized_word: &str) -> WordId {
        if let Some(&word_id) = self.word_id_by_string.get(normalized_word) {
            return word_id;
        }

        let word_id = self.words.len();
        self.words.push(Word {
            string: normalized_word.to_string(),
            letters: normalized_word.chars().collect(),
        });
        self.word_id_by_string
            .insert(normalized_word.to_string(), word_id);
        word_id
    }

    /// Look up a word by id. Ids handed out by this list are always valid.
    #[must_use]
    pub fn get_word(&self, word_id: WordId) -> &Word {
        &self.words[word_id]
    }

    /// Look up the id of a word, normalizing the query first.
    #[must_use]
    pub fn word_id(&self, word: &str) -> Option<WordId> {
        self.word_id_by_string.get(&normalize_word(word)).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Iterate over every word id in the list.
    pub fn ids(&self) -> impl Iterator<Item = WordId> {
        0..self.words.len()
    }
}

impl Debug for WordList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WordList")
            .field("len", &self.words.len())
            .field(
                "max_length",
                &self.words.iter().map(Word::len).max().unwrap_or(0),
            )
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub mod tests {
    use crate::word_list::{normalize_word, WordList, WordListError};

    #[must_use]
    pub fn word_list(words: &[&str]) -> WordList {
        WordList::from_words(words).expect("fixture words should be valid")
    }

    #[test]
    fn test_normalizes_and_dedupes_words() {
        let word_list = word_list(&["cat", " CAT ", "Dog", "", "   ", "ate"]);

        assert_eq!(word_list.len(), 3);
        assert_eq!(word_list.get_word(0).string, "CAT");
        assert_eq!(word_list.get_word(1).string, "DOG");
        assert_eq!(word_list.word_id("ate"), Some(2));
        assert_eq!(word_list.word_id("cow"), None);
    }

    #[test]
    #[allow(clippy::unicode_not_nfc)]
    fn test_unusual_characters() {
        assert_eq!(normalize_word("e\u{301}te\u{301}"), "ÉTÉ");

        let word_list = word_list(&["Straße", "résumé"]);
        let word = word_list.get_word(word_list.word_id("résumé").unwrap());
        assert_eq!(word.len(), 6);
        assert_eq!(word.letters[1], 'É');
    }

    #[test]
    fn test_rejects_non_letters() {
        let result = WordList::from_words(["fine", "no-go"]);
        assert_eq!(result.unwrap_err(), WordListError::InvalidWord("no-go".into()));
    }

    #[test]
    fn test_missing_file() {
        let result = WordList::from_file("/definitely/not/a/real/words.txt");
        assert!(matches!(result, Err(WordListError::InvalidPath(_))));
    }

    #[test]
    fn test_from_file_contents() {
        let word_list = WordList::from_file_contents("one\ntwo\r\nthree\n\n").unwrap();
        assert_eq!(word_list.len(), 3);
        assert_eq!(word_list.get_word(2).letters.len(), 5);
    }
}
