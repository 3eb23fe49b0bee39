//! The domain store: for each variable, the set of words still considered possible. This is a
//! plain container; all pruning logic lives in `arc_consistency.rs`. Search never mutates
//! domains, so there is nothing to roll back when it backtracks.

use smallvec::SmallVec;
use std::collections::HashSet;
use std::fmt;

use crate::grid_config::CrosswordConfig;
use crate::types::{VariableId, WordId};
use crate::MAX_SLOT_COUNT;

/// Candidate words for every variable, indexed by `VariableId`.
#[derive(Clone, PartialEq, Eq)]
pub struct Domains {
    options: SmallVec<[HashSet<WordId>; MAX_SLOT_COUNT]>,
}

impl Domains {
    /// Give every variable the entire vocabulary as its candidate set. No length filtering
    /// happens here; see `enforce_node_consistency`.
    #[must_use]
    pub fn initial(config: &CrosswordConfig) -> Domains {
        let all_words: HashSet<WordId> = config.word_list.ids().collect();

        Domains {
            options: (0..config.grid.variable_count())
                .map(|_| all_words.clone())
                .collect(),
        }
    }

    /// Build domains directly from per-variable candidate sets.
    #[cfg(test)]
    #[must_use]
    pub(crate) fn from_options(options: Vec<HashSet<WordId>>) -> Domains {
        Domains {
            options: options.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn get(&self, variable_id: VariableId) -> &HashSet<WordId> {
        &self.options[variable_id]
    }

    /// The number of candidates remaining for a variable.
    #[must_use]
    pub fn len(&self, variable_id: VariableId) -> usize {
        self.options[variable_id].len()
    }

    /// The number of variables tracked.
    #[must_use]
    pub fn variable_count(&self) -> usize {
        self.options.len()
    }

    #[must_use]
    pub fn contains(&self, variable_id: VariableId, word_id: WordId) -> bool {
        self.options[variable_id].contains(&word_id)
    }

    /// Keep only the candidates matching `predicate`, returning how many were removed.
    pub fn retain<F>(&mut self, variable_id: VariableId, predicate: F) -> usize
    where
        F: FnMut(&WordId) -> bool,
    {
        let before = self.options[variable_id].len();
        self.options[variable_id].retain(predicate);
        before - self.options[variable_id].len()
    }

    /// Has this variable run out of candidates?
    #[must_use]
    pub fn is_wiped_out(&self, variable_id: VariableId) -> bool {
        self.options[variable_id].is_empty()
    }

    /// The total number of candidates across all variables.
    #[must_use]
    pub fn total_options(&self) -> usize {
        self.options.iter().map(HashSet::len).sum()
    }
}

impl fmt::Debug for Domains {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Domains")
            .field(
                "sizes",
                &self.options.iter().map(HashSet::len).collect::<Vec<_>>(),
            )
            .finish()
    }
}
