//! Error types shared across the crate. Note that an unsatisfiable puzzle is *not* an error:
//! the search reports it as a normal outcome (`FillFailure::HardFailure`, or `None` from
//! `solve`).

use std::error::Error;
use std::fmt;

use crate::grid_config::GridError;
use crate::word_list::WordListError;

/// Malformed input detected before solving begins. Always fatal.
#[derive(Debug, Clone)]
pub enum InputError {
    WordList(WordListError),
    Grid(GridError),
    EmptyVocabulary,
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::WordList(error) => write!(f, "{error}"),
            InputError::Grid(error) => write!(f, "{error}"),
            InputError::EmptyVocabulary => write!(f, "Word list is empty"),
        }
    }
}

impl Error for InputError {}

impl From<WordListError> for InputError {
    fn from(error: WordListError) -> Self {
        InputError::WordList(error)
    }
}

impl From<GridError> for InputError {
    fn from(error: GridError) -> Self {
        InputError::Grid(error)
    }
}

/// Errors that can only be produced by a bug in grid construction or search bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveError {
    InvariantViolation(String),
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveError::InvariantViolation(message) => {
                write!(f, "Invariant violation: {message}")
            }
        }
    }
}

impl Error for SolveError {}
