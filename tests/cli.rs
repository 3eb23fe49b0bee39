use std::path::PathBuf;
use std::process::{Command, Output};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("crossword_cli_{}_{name}", std::process::id()))
}

fn run(structure: &str, words: &str, extra_args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_crossword-solve"))
        .arg(fixture_path(structure))
        .arg(fixture_path(words))
        .args(extra_args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run crossword-solve")
}

#[test]
fn test_prints_fill_and_exits_zero() {
    let output = run("structure0.txt", "words0.txt", &[]);

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "█SIX█\n█E██F\n█V██I\n█E██V\n█NINE\n"
    );
}

#[test]
fn test_unsolvable_puzzle_exits_zero() {
    let output = run("crossing.txt", "words1.txt", &[]);

    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "No solution.\n");
}

#[test]
fn test_exhausted_state_limit_reports_no_solution() {
    let output = run("structure0.txt", "words0.txt", &["--max-states", "1"]);

    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "No solution.\n");
}

#[test]
fn test_malformed_input_exits_nonzero_with_message() {
    let output = run("malformed.txt", "words0.txt", &[]);

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(
        stderr.contains("Rows in grid must all be the same length"),
        "{stderr}"
    );

    let output = run("structure0.txt", "empty_words.txt", &[]);
    assert!(!output.status.success());
    assert!(String::from_utf8(output.stderr)
        .unwrap()
        .contains("Word list is empty"));
}

#[test]
fn test_writes_text_output() {
    let path = temp_path("fill.txt");
    let output = run(
        "structure0.txt",
        "words0.txt",
        &[path.to_str().unwrap()],
    );

    assert!(output.status.success());
    let written = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(written, "█SIX█\n█E██F\n█V██I\n█E██V\n█NINE\n");
}

#[cfg(feature = "image")]
#[test]
fn test_writes_image_output() {
    let path = temp_path("fill.png");
    let output = run(
        "structure0.txt",
        "words0.txt",
        &[path.to_str().unwrap()],
    );

    assert!(output.status.success());
    let image = image::open(&path).unwrap().to_rgba8();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(image.dimensions(), (500, 500));
    // Cell (0, 0) is blocked.
    assert_eq!(image.get_pixel(50, 50).0, [0, 0, 0, 255]);
    // Cell (1, 1) is fillable; its corner sits clear of the letter.
    assert_eq!(image.get_pixel(105, 105).0, [255, 255, 255, 255]);
}
