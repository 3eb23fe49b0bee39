//! This module implements grid-filling using a plain backtracking search. Domains are pruned once
//! up front (node consistency plus AC-3) and are read-only afterwards: the search itself only
//! assigns and unassigns words, checking each tentative placement against the slots already
//! filled. Variables are ordered by minimum remaining values with ties going to the slot with the
//! most crossings; values are ordered by the least-constraining-value heuristic.

use std::cmp::Reverse;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::arc_consistency::{establish_arc_consistency, ArcConsistencyFailure};
use crate::assignment::{is_consistent, is_consistent_extension, Assignment};
use crate::domains::Domains;
use crate::error::SolveError;
use crate::grid_config::CrosswordConfig;
use crate::types::{VariableId, WordId};
use crate::{CHECK_INVARIANTS, LOG_FILL_PROCESS};

/// How many states should we visit between checks of the deadline and abort flag?
pub const INTERRUPT_FREQUENCY: usize = 10;

/// A struct tracking stats about the filling process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    /// Number of calls to `backtrack`.
    pub states: usize,

    /// Number of tentative assignments that were undone.
    pub backtracks: usize,

    /// Number of tentative assignments checked for consistency.
    pub consistency_checks: usize,

    /// Number of options removed by the initial consistency pass.
    pub initial_eliminations: usize,

    pub initial_arc_consistency_time: Duration,
    pub total_time: Duration,
}

/// Optional limits a caller can put on a fill. None of them are set by default, in which case the
/// search runs until it finds a fill or exhausts every possibility.
#[derive(Debug, Clone, Copy, Default)]
pub struct FillOptions<'a> {
    /// Give up with `FillFailure::Timeout` after this instant.
    pub deadline: Option<Instant>,

    /// Give up with `FillFailure::ExceededStateLimit` after visiting this many states.
    pub max_states: Option<usize>,

    /// A flag that can be set (from any thread) to cancel the fill.
    pub abort: Option<&'a AtomicBool>,
}

/// A struct representing the results of a successful fill.
#[derive(Debug)]
pub struct FillSuccess {
    pub statistics: Statistics,
    pub assignment: Assignment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillFailure {
    /// The search was exhausted: no fill exists.
    HardFailure,
    Timeout,
    Abort,
    ExceededStateLimit(usize),
    InvariantViolation(SolveError),
}

impl fmt::Display for FillFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillFailure::HardFailure => write!(f, "No solution."),
            FillFailure::Timeout => write!(f, "Timed out before finding a solution"),
            FillFailure::Abort => write!(f, "Fill was aborted"),
            FillFailure::ExceededStateLimit(states) => {
                write!(f, "Gave up after visiting {states} states")
            }
            FillFailure::InvariantViolation(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for FillFailure {}

impl From<SolveError> for FillFailure {
    fn from(error: SolveError) -> Self {
        FillFailure::InvariantViolation(error)
    }
}

/// Pick the unassigned slot with the fewest remaining options, breaking ties in favor of the slot
/// with the most crossings and then the lowest id. Returns `None` once every slot is assigned.
#[must_use]
pub fn select_unassigned_variable(
    config: &CrosswordConfig,
    assignment: &Assignment,
    domains: &Domains,
) -> Option<VariableId> {
    (0..config.grid.variable_count())
        .filter(|&variable_id| !assignment.is_assigned(variable_id))
        .min_by_key(|&variable_id| {
            (
                domains.len(variable_id),
                Reverse(config.grid.degree(variable_id)),
                variable_id,
            )
        })
}

/// Order a slot's options by how many crossing slots also have the same word as an option, fewest
/// first, since choosing a word rules it out everywhere else. Words already placed elsewhere in
/// the assignment are skipped, as they can never be consistent. Ties keep word list order.
#[must_use]
pub fn order_domain_values(
    config: &CrosswordConfig,
    variable_id: VariableId,
    domains: &Domains,
    assignment: &Assignment,
) -> Vec<WordId> {
    let neighbors = config.grid.neighbors(variable_id);

    let mut values: Vec<WordId> = domains
        .get(variable_id)
        .iter()
        .copied()
        .filter(|&word_id| !assignment.contains_word(word_id))
        .collect();

    values.sort_by_cached_key(|&word_id| {
        let ruled_out = neighbors
            .iter()
            .filter(|&&neighbor_id| domains.contains(neighbor_id, word_id))
            .count();
        (ruled_out, word_id)
    });

    values
}

/// The state of a single fill attempt: the pruned domains plus bookkeeping. The assignment is
/// passed separately so that each level of recursion owns its own tentative change to it.
pub struct Search<'a> {
    config: &'a CrosswordConfig,
    domains: &'a Domains,
    options: FillOptions<'a>,
    pub statistics: Statistics,
}

impl<'a> Search<'a> {
    #[must_use]
    pub fn new(
        config: &'a CrosswordConfig,
        domains: &'a Domains,
        options: FillOptions<'a>,
    ) -> Search<'a> {
        Search {
            config,
            domains,
            options,
            statistics: Statistics::default(),
        }
    }

    /// Bail out if the caller's deadline, state limit or abort flag says so.
    fn check_interrupts(&self) -> Result<(), FillFailure> {
        let states = self.statistics.states;

        if let Some(max_states) = self.options.max_states {
            if states > max_states {
                return Err(FillFailure::ExceededStateLimit(states));
            }
        }

        if (states - 1) % INTERRUPT_FREQUENCY == 0 {
            if let Some(deadline) = self.options.deadline {
                if Instant::now() > deadline {
                    return Err(FillFailure::Timeout);
                }
            }
            if let Some(abort) = self.options.abort {
                if abort.load(Ordering::Relaxed) {
                    return Err(FillFailure::Abort);
                }
            }
        }

        Ok(())
    }

    /// Extend `assignment` to a complete, consistent one. Returns `Ok(true)` with the assignment
    /// completed, or `Ok(false)` with the assignment exactly as it was passed in if no completion
    /// exists. The first completion found wins.
    pub fn backtrack(&mut self, assignment: &mut Assignment) -> Result<bool, FillFailure> {
        self.statistics.states += 1;
        self.check_interrupts()?;

        let Some(variable_id) = select_unassigned_variable(self.config, assignment, self.domains)
        else {
            // Nothing left to assign, so we're done.
            return Ok(true);
        };

        for word_id in order_domain_values(self.config, variable_id, self.domains, assignment) {
            if LOG_FILL_PROCESS {
                log::trace!(
                    "Trying “{}” in slot {} ({} of {} slots assigned)",
                    self.config.word_list.get_word(word_id).string,
                    self.config.grid.variable(variable_id),
                    assignment.len(),
                    self.config.grid.variable_count(),
                );
            }

            assignment.assign(variable_id, word_id)?;
            self.statistics.consistency_checks += 1;

            if is_consistent_extension(self.config, assignment, variable_id)
                && self.backtrack(assignment)?
            {
                return Ok(true);
            }

            assignment.unassign(variable_id);
            self.statistics.backtracks += 1;
        }

        if CHECK_INVARIANTS && assignment.is_assigned(variable_id) {
            return Err(SolveError::InvariantViolation(format!(
                "slot {variable_id} still assigned after exhausting its options"
            ))
            .into());
        }

        Ok(false)
    }
}

/// Search for a valid fill for the given puzzle: prune the domains once with node consistency and
/// AC-3, then backtrack. `FillFailure::HardFailure` means the puzzle has no solution.
pub fn find_fill(
    config: &CrosswordConfig,
    options: FillOptions,
) -> Result<FillSuccess, FillFailure> {
    let start = Instant::now();
    let mut statistics = Statistics::default();

    let mut domains = Domains::initial(config);
    let initial_result = establish_arc_consistency(config, &mut domains);
    statistics.initial_arc_consistency_time = start.elapsed();

    match initial_result {
        Ok(success) => {
            statistics.initial_eliminations = success.eliminations;
        }
        Err(ArcConsistencyFailure { wiped_out }) => {
            // If we can't even establish consistency, we're obviously not going to find a fill.
            log::info!(
                "No fill possible: no options remain for slot {}",
                config.grid.variable(wiped_out)
            );
            return Err(FillFailure::HardFailure);
        }
    }

    let mut search = Search::new(config, &domains, options);
    search.statistics = statistics;

    let mut assignment = Assignment::new(config.grid.variable_count());
    let found = search.backtrack(&mut assignment);

    let mut statistics = search.statistics;
    statistics.total_time = start.elapsed();
    log::debug!("Fill finished: {statistics:?}");

    match found {
        Ok(true) => {
            if CHECK_INVARIANTS && !(assignment.is_complete() && is_consistent(config, &assignment))
            {
                return Err(SolveError::InvariantViolation(
                    "search returned an invalid assignment".into(),
                )
                .into());
            }
            log::info!("Found fill after {} states", statistics.states);
            Ok(FillSuccess {
                statistics,
                assignment,
            })
        }
        Ok(false) => {
            log::info!("No fill possible after {} states", statistics.states);
            Err(FillFailure::HardFailure)
        }
        Err(failure) => {
            log::info!("Fill interrupted after {} states: {failure}", statistics.states);
            Err(failure)
        }
    }
}

/// Solve a puzzle with no limits, returning `None` if it has no solution.
#[must_use]
pub fn solve(config: &CrosswordConfig) -> Option<Assignment> {
    match find_fill(config, FillOptions::default()) {
        Ok(FillSuccess { assignment, .. }) => Some(assignment),
        Err(FillFailure::HardFailure) => None,
        Err(failure) => {
            log::error!("Fill failed unexpectedly: {failure}");
            None
        }
    }
}
