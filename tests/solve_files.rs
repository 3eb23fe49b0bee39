use std::path::PathBuf;

use crossword_csp::assignment::is_consistent;
use crossword_csp::backtracking_search::solve;
use crossword_csp::error::InputError;
use crossword_csp::grid_config::{render_grid, CrosswordConfig, GridError};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn load(structure: &str, words: &str) -> Result<CrosswordConfig, InputError> {
    CrosswordConfig::from_files(&fixture_path(structure), &fixture_path(words))
}

#[test]
fn test_solves_structure_from_files() {
    let config = load("structure0.txt", "words0.txt").unwrap();

    let assignment = solve(&config).expect("Failed to find a fill");

    assert!(assignment.is_complete());
    assert!(is_consistent(&config, &assignment));
    assert_eq!(
        render_grid(&config, &assignment).unwrap(),
        "█SIX█\n█E██F\n█V██I\n█E██V\n█NINE"
    );
}

#[test]
fn test_unsolvable_structure_is_not_an_error() {
    let config = load("crossing.txt", "words1.txt").unwrap();

    assert!(solve(&config).is_none());
}

#[test]
fn test_malformed_input_is_reported() {
    assert!(matches!(
        load("malformed.txt", "words0.txt"),
        Err(InputError::Grid(GridError::NonRectangular { row: 2, .. }))
    ));
    assert!(matches!(
        load("structure0.txt", "empty_words.txt"),
        Err(InputError::EmptyVocabulary)
    ));
    assert!(matches!(
        load("missing.txt", "words0.txt"),
        Err(InputError::Grid(GridError::InvalidPath(_)))
    ));

    let message = load("structure0.txt", "missing.txt").unwrap_err().to_string();
    assert!(message.contains("missing.txt"), "{message}");
}
