//! This module contains the consistency engine that prunes domains before search. For our
//! purposes, a set of domains is consistent when:
//!
//! - Every candidate word for a slot has the slot's length (node consistency).
//!
//! - For every pair of crossing slots X and Y, every candidate for X has at least one candidate
//!   for Y with the same letter in the shared cell (arc consistency, established with AC-3).
//!
//! Running out of candidates for some slot isn't an error; it's reported as an
//! `ArcConsistencyFailure` and means the puzzle can't be filled from these domains.

use std::collections::HashSet;

use crate::domains::Domains;
use crate::grid_config::CrosswordConfig;
use crate::types::VariableId;

/// A directed constraint `(x, y)`: "every candidate of x needs support in y".
pub type ConstraintArc = (VariableId, VariableId);

/// Result from a successful call to `ac3`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArcConsistencySuccess {
    /// How many arcs were popped off the worklist.
    pub arcs_processed: usize,

    /// How many of those revisions actually removed something.
    pub revisions: usize,

    /// How many candidates were removed in total.
    pub eliminations: usize,
}

/// Result from a failed call to `ac3`, naming the slot whose domain was wiped out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcConsistencyFailure {
    pub wiped_out: VariableId,
}

/// Result from a call to `ac3`.
pub type ArcConsistencyResult = Result<ArcConsistencySuccess, ArcConsistencyFailure>;

/// Remove every candidate whose length doesn't match its slot. Returns the number of candidates
/// removed; running this again on its own output removes nothing.
pub fn enforce_node_consistency(config: &CrosswordConfig, domains: &mut Domains) -> usize {
    let removed: usize = config
        .grid
        .variables()
        .iter()
        .enumerate()
        .map(|(variable_id, variable)| {
            domains.retain(variable_id, |&word_id| {
                config.word_list.get_word(word_id).len() == variable.length
            })
        })
        .sum();

    log::debug!(
        "Node consistency removed {removed} options, {} remain",
        domains.total_options()
    );

    removed
}

/// Make `x` arc consistent with `y`: remove every candidate of `x` that has no candidate of `y`
/// agreeing with it in the shared cell. Returns true iff `x`'s domain changed. Slots that don't
/// cross are left alone.
pub fn revise(
    config: &CrosswordConfig,
    domains: &mut Domains,
    x: VariableId,
    y: VariableId,
) -> bool {
    let Some((x_cell, y_cell)) = config.grid.overlap(x, y) else {
        return false;
    };

    // Every letter some candidate of `y` can put in the shared cell. Building this once makes the
    // revision linear in the two domain sizes instead of quadratic.
    let supported_letters: HashSet<char> = domains
        .get(y)
        .iter()
        .filter_map(|&word_id| config.word_list.get_word(word_id).letters.get(y_cell))
        .copied()
        .collect();

    let removed = domains.retain(x, |&word_id| {
        config
            .word_list
            .get_word(word_id)
            .letters
            .get(x_cell)
            .is_some_and(|letter| supported_letters.contains(letter))
    });

    removed > 0
}

/// Every ordered pair of crossing slots in the grid.
#[must_use]
pub fn all_arcs(config: &CrosswordConfig) -> Vec<ConstraintArc> {
    (0..config.grid.variable_count())
        .flat_map(|x| config.grid.neighbors(x).iter().map(move |&y| (x, y)))
        .collect()
}

/// Propagate arc consistency with AC-3. If `arcs` is `None` the worklist starts with every arc
/// in the grid; otherwise only the given arcs are checked initially (so `Some(vec![])` is a
/// no-op). Fails as soon as any domain becomes empty.
pub fn ac3(
    config: &CrosswordConfig,
    domains: &mut Domains,
    arcs: Option<Vec<ConstraintArc>>,
) -> ArcConsistencyResult {
    let mut queue: Vec<ConstraintArc> = arcs.unwrap_or_else(|| all_arcs(config));
    let mut stats = ArcConsistencySuccess::default();

    while let Some((x, y)) = queue.pop() {
        stats.arcs_processed += 1;

        let before = domains.len(x);
        if !revise(config, domains, x, y) {
            continue;
        }
        stats.revisions += 1;
        stats.eliminations += before - domains.len(x);

        if domains.is_wiped_out(x) {
            log::debug!(
                "AC-3 wiped out slot {} after {} arcs",
                config.grid.variable(x),
                stats.arcs_processed
            );
            return Err(ArcConsistencyFailure { wiped_out: x });
        }

        // Shrinking `x` may have removed the only support some other neighbor had.
        queue.extend(
            config
                .grid
                .neighbors(x)
                .iter()
                .filter(|&&z| z != y)
                .map(|&z| (z, x)),
        );
    }

    log::debug!(
        "AC-3 processed {} arcs and removed {} options",
        stats.arcs_processed,
        stats.eliminations
    );

    Ok(stats)
}

/// The full pre-search pruning pass: node consistency followed by AC-3 over every arc.
pub fn establish_arc_consistency(
    config: &CrosswordConfig,
    domains: &mut Domains,
) -> ArcConsistencyResult {
    let removed = enforce_node_consistency(config, domains);

    if let Some(wiped_out) =
        (0..config.grid.variable_count()).find(|&variable_id| domains.is_wiped_out(variable_id))
    {
        return Err(ArcConsistencyFailure { wiped_out });
    }

    ac3(config, domains, None).map(|mut stats| {
        stats.eliminations += removed;
        stats
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::arc_consistency::{
        ac3, all_arcs, enforce_node_consistency, establish_arc_consistency, revise,
        ArcConsistencyFailure,
    };
    use crate::domains::Domains;
    use crate::grid_config::tests::generate_config;
    use crate::grid_config::{CrosswordConfig, Grid};
    use crate::word_list::WordList;

    /// An across slot and a down slot crossing at the across slot's second cell and the down
    /// slot's first cell.
    const CROSSING_TEMPLATE: &str = "
        ___
        #_#
        #_#
    ";

    fn words_of(config: &CrosswordConfig, domains: &Domains, variable_id: usize) -> Vec<String> {
        let mut words: Vec<String> = domains
            .get(variable_id)
            .iter()
            .map(|&word_id| config.word_list.get_word(word_id).string.clone())
            .collect();
        words.sort();
        words
    }

    fn assert_arc_consistent(config: &CrosswordConfig, domains: &Domains) {
        for (x, y) in all_arcs(config) {
            let (i, j) = config.grid.overlap(x, y).unwrap();
            for &word_x in domains.get(x) {
                let letter = config.word_list.get_word(word_x).letters[i];
                assert!(
                    domains
                        .get(y)
                        .iter()
                        .any(|&word_y| config.word_list.get_word(word_y).letters[j] == letter),
                    "candidate {} of slot {x} has no support in slot {y}",
                    config.word_list.get_word(word_x).string
                );
            }
        }
    }

    #[test]
    fn test_node_consistency_filters_by_length() {
        let config = generate_config(
            "
            ____
            _###
            _###
            ",
            &["cat", "dogs", "ate", "emus", "hi"],
        );
        let mut domains = Domains::initial(&config);

        let removed = enforce_node_consistency(&config, &mut domains);

        assert_eq!(removed, 6);
        assert_eq!(words_of(&config, &domains, 0), vec!["DOGS", "EMUS"]);
        assert_eq!(words_of(&config, &domains, 1), vec!["ATE", "CAT"]);

        let snapshot = domains.clone();
        assert_eq!(enforce_node_consistency(&config, &mut domains), 0);
        assert_eq!(domains, snapshot, "node consistency should be idempotent");
    }

    #[test]
    fn test_revise() {
        let config = generate_config(CROSSING_TEMPLATE, &["cat", "dog", "ate", "ore"]);
        let mut domains = Domains::initial(&config);
        enforce_node_consistency(&config, &mut domains);

        // Across letter 1 must match down letter 0: only CAT (A -> ATE) and DOG (O -> ORE).
        assert!(revise(&config, &mut domains, 0, 1));
        assert_eq!(words_of(&config, &domains, 0), vec!["CAT", "DOG"]);
        assert!(!revise(&config, &mut domains, 0, 1));

        assert!(revise(&config, &mut domains, 1, 0));
        assert_eq!(words_of(&config, &domains, 1), vec!["ATE", "ORE"]);
    }

    #[test]
    fn test_revise_ignores_slots_that_dont_cross() {
        let config = generate_config(
            "
            ___
            ###
            ___
            ",
            &["cat", "dog"],
        );
        let mut domains = Domains::initial(&config);
        enforce_node_consistency(&config, &mut domains);

        assert!(!revise(&config, &mut domains, 0, 1));
        assert_eq!(domains.len(0), 2);
    }

    #[test]
    fn test_ac3_establishes_consistency() {
        let config = generate_config(CROSSING_TEMPLATE, &["cat", "dog", "ate", "ore", "emu"]);
        let mut domains = Domains::initial(&config);

        let stats = establish_arc_consistency(&config, &mut domains).unwrap();

        assert!(stats.eliminations > 0);
        assert_eq!(words_of(&config, &domains, 0), vec!["CAT", "DOG"]);
        assert_eq!(words_of(&config, &domains, 1), vec!["ATE", "ORE"]);
        assert_arc_consistent(&config, &domains);
    }

    #[test]
    fn test_ac3_reports_unsatisfiable_crossing() {
        let config = generate_config(CROSSING_TEMPLATE, &["cat", "dog"]);
        let mut domains = Domains::initial(&config);
        enforce_node_consistency(&config, &mut domains);

        let result = ac3(&config, &mut domains, None);

        assert!(matches!(result, Err(ArcConsistencyFailure { .. })));
    }

    #[test]
    fn test_ac3_with_explicit_arcs() {
        let config = generate_config(CROSSING_TEMPLATE, &["cat", "dog", "ate", "ore", "emu"]);
        let mut domains = Domains::initial(&config);
        enforce_node_consistency(&config, &mut domains);

        let stats = ac3(&config, &mut domains, Some(vec![])).unwrap();
        assert_eq!(stats.arcs_processed, 0);
        assert_eq!(domains.len(0), 5);

        // Revising (0, 1) shrinks slot 0, which would re-enqueue arcs into slot 0 from its other
        // neighbors; it has none, so slot 1 keeps its options.
        ac3(&config, &mut domains, Some(vec![(0, 1)])).unwrap();
        assert_eq!(words_of(&config, &domains, 0), vec!["CAT", "DOG"]);
        assert_eq!(domains.len(1), 5);
    }

    #[test]
    fn test_establish_arc_consistency_with_no_matching_lengths() {
        let config = generate_config(CROSSING_TEMPLATE, &["antelope", "go"]);
        let mut domains = Domains::initial(&config);

        let result = establish_arc_consistency(&config, &mut domains);

        assert_eq!(result, Err(ArcConsistencyFailure { wiped_out: 0 }));
        assert_eq!(domains.total_options(), 0);
    }

    prop_compose! {
        fn arb_config()(
            fillable in prop::collection::vec(prop::collection::vec(any::<bool>(), 4), 2..5),
            words in prop::collection::vec("[ABC]{2,4}", 1..40),
        ) -> CrosswordConfig {
            let grid = Grid::new(fillable).unwrap();
            let word_list = WordList::from_words(&words).unwrap();
            CrosswordConfig::new(grid, word_list).unwrap()
        }
    }

    proptest! {
        #[test]
        fn prop_node_consistency_matches_lengths(config in arb_config()) {
            let mut domains = Domains::initial(&config);
            enforce_node_consistency(&config, &mut domains);

            for (variable_id, variable) in config.grid.variables().iter().enumerate() {
                for &word_id in domains.get(variable_id) {
                    prop_assert_eq!(config.word_list.get_word(word_id).len(), variable.length);
                }
            }

            let snapshot = domains.clone();
            prop_assert_eq!(enforce_node_consistency(&config, &mut domains), 0);
            prop_assert!(domains == snapshot);
        }

        #[test]
        fn prop_ac3_success_means_arc_consistent(config in arb_config()) {
            let mut domains = Domains::initial(&config);

            match establish_arc_consistency(&config, &mut domains) {
                Ok(_) => {
                    for variable_id in 0..config.grid.variable_count() {
                        prop_assert!(!domains.is_wiped_out(variable_id));
                    }
                    assert_arc_consistent(&config, &domains);
                }
                Err(ArcConsistencyFailure { wiped_out }) => {
                    prop_assert!(domains.is_wiped_out(wiped_out));
                }
            }
        }
    }
}
