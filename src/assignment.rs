//! Partial and complete assignments of words to slots, and the predicate that checks them
//! against the puzzle's constraints.

use smallvec::SmallVec;

use crate::error::SolveError;
use crate::grid_config::CrosswordConfig;
use crate::types::{VariableId, WordId};
use crate::MAX_SLOT_COUNT;

/// A struct recording a slot assignment, as yielded by `Assignment::choices`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub variable_id: VariableId,
    pub word_id: WordId,
}

/// A mapping from variable to word, built incrementally during search. Mutated only through
/// `assign` and `unassign`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    word_ids: SmallVec<[Option<WordId>; MAX_SLOT_COUNT]>,
    assigned_count: usize,
}

impl Assignment {
    /// An empty assignment for a grid with `variable_count` slots.
    #[must_use]
    pub fn new(variable_count: usize) -> Assignment {
        Assignment {
            word_ids: (0..variable_count).map(|_| None).collect(),
            assigned_count: 0,
        }
    }

    /// Place a word in a slot, returning the word it replaced (if any). An id outside the grid
    /// means the caller's bookkeeping is broken.
    pub fn assign(
        &mut self,
        variable_id: VariableId,
        word_id: WordId,
    ) -> Result<Option<WordId>, SolveError> {
        let variable_count = self.word_ids.len();
        let slot = self.word_ids.get_mut(variable_id).ok_or_else(|| {
            SolveError::InvariantViolation(format!(
                "can't assign variable {variable_id} in a grid with {variable_count} variables"
            ))
        })?;

        let previous = slot.replace(word_id);
        if previous.is_none() {
            self.assigned_count += 1;
        }
        Ok(previous)
    }

    /// Clear a slot, returning the word it held (if any).
    pub fn unassign(&mut self, variable_id: VariableId) -> Option<WordId> {
        let previous = self.word_ids.get_mut(variable_id).and_then(Option::take);
        if previous.is_some() {
            self.assigned_count -= 1;
        }
        previous
    }

    #[must_use]
    pub fn get(&self, variable_id: VariableId) -> Option<WordId> {
        self.word_ids.get(variable_id).copied().flatten()
    }

    #[must_use]
    pub fn is_assigned(&self, variable_id: VariableId) -> bool {
        self.get(variable_id).is_some()
    }

    /// Does every slot have a word?
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.assigned_count == self.word_ids.len()
    }

    /// The number of slots with a word.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assigned_count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assigned_count == 0
    }

    /// Is this word already placed in some slot?
    #[must_use]
    pub fn contains_word(&self, word_id: WordId) -> bool {
        self.word_ids.contains(&Some(word_id))
    }

    /// Iterate over the assigned slots in id order.
    pub fn choices(&self) -> impl Iterator<Item = Choice> + '_ {
        self.word_ids
            .iter()
            .enumerate()
            .filter_map(|(variable_id, word_id)| {
                word_id.map(|word_id| Choice {
                    variable_id,
                    word_id,
                })
            })
    }
}

/// Check every constraint involving `variable_id` against the rest of the assignment: its word has
/// the right length, no other slot holds the same word, and it agrees with every assigned
/// crossing slot. An unassigned slot is trivially consistent.
#[must_use]
pub fn is_consistent_extension(
    config: &CrosswordConfig,
    assignment: &Assignment,
    variable_id: VariableId,
) -> bool {
    let Some(word_id) = assignment.get(variable_id) else {
        return true;
    };
    let word = config.word_list.get_word(word_id);

    if word.len() != config.grid.variable(variable_id).length {
        return false;
    }

    if assignment
        .choices()
        .any(|choice| choice.variable_id != variable_id && choice.word_id == word_id)
    {
        return false;
    }

    config.grid.neighbors(variable_id).iter().all(|&neighbor_id| {
        let Some(neighbor_word_id) = assignment.get(neighbor_id) else {
            return true;
        };
        let Some((cell, neighbor_cell)) = config.grid.overlap(variable_id, neighbor_id) else {
            return true;
        };
        let neighbor_word = config.word_list.get_word(neighbor_word_id);

        match (word.letters.get(cell), neighbor_word.letters.get(neighbor_cell)) {
            (Some(letter), Some(neighbor_letter)) => letter == neighbor_letter,
            _ => false,
        }
    })
}

/// Check a full or partial assignment against all constraints: (a) every word has its slot's
/// length, (b) no word is used twice, and (c) crossing slots agree in their shared cell.
#[must_use]
pub fn is_consistent(config: &CrosswordConfig, assignment: &Assignment) -> bool {
    (0..config.grid.variable_count())
        .all(|variable_id| is_consistent_extension(config, assignment, variable_id))
}
