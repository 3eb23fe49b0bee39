use clap::Parser;
use crossword_csp::assignment::Assignment;
use crossword_csp::backtracking_search::{find_fill, FillFailure, FillOptions};
use crossword_csp::grid_config::{render_grid, CrosswordConfig};
use std::ffi::OsStr;
use std::fmt::{Debug, Formatter};
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

/// crossword-solve: fill a crossword structure from a word list
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the structure file, with _ representing fillable cells and # representing blocks
    structure_path: String,

    /// Path to the word list file, one word per line
    words_path: String,

    /// Optional path to save the filled grid to: a .txt path gets the text rendering, anything
    /// else is drawn as an image in the format its extension names (e.g. .png)
    output_path: Option<String>,

    /// Give up (reporting no solution) after visiting this many search states [default: none]
    #[arg(long)]
    max_states: Option<usize>,

    /// Give up (reporting no solution) after this many seconds [default: none]
    #[arg(long)]
    timeout_secs: Option<u64>,
}

struct Error(String);

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0) // Print error unquoted
    }
}

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    let config = CrosswordConfig::from_files(&args.structure_path, &args.words_path)
        .map_err(|error| Error(error.to_string()))?;

    let options = FillOptions {
        deadline: args
            .timeout_secs
            .map(|secs| Instant::now() + Duration::from_secs(secs)),
        max_states: args.max_states,
        abort: None,
    };

    match find_fill(&config, options) {
        Ok(result) => {
            log::info!("{:?}", result.statistics);

            let rendered = render_grid(&config, &result.assignment)
                .map_err(|error| Error(error.to_string()))?;
            println!("{rendered}");

            if let Some(output_path) = &args.output_path {
                write_output(&config, &result.assignment, &rendered, Path::new(output_path))?;
            }
        }
        Err(FillFailure::InvariantViolation(error)) => {
            return Err(Error(error.to_string()));
        }
        Err(failure) => {
            // Running out of budget is reported the same way as a proven failure.
            if failure != FillFailure::HardFailure {
                log::warn!("{failure}");
            }
            println!("No solution.");
        }
    }

    Ok(())
}

fn write_output(
    config: &CrosswordConfig,
    assignment: &Assignment,
    rendered: &str,
    path: &Path,
) -> Result<(), Error> {
    let is_text = path
        .extension()
        .and_then(OsStr::to_str)
        .is_some_and(|extension| extension.eq_ignore_ascii_case("txt"));

    if is_text {
        fs::write(path, format!("{rendered}\n"))
            .map_err(|_| Error(format!("Couldn't write file '{}'", path.display())))
    } else {
        save_image(config, assignment, path)
    }
}

#[cfg(feature = "image")]
fn save_image(
    config: &CrosswordConfig,
    assignment: &Assignment,
    path: &Path,
) -> Result<(), Error> {
    crossword_csp::image_render::save_image(config, assignment, path)
        .map_err(|error| Error(format!("Couldn't write image '{}': {error}", path.display())))
}

#[cfg(not(feature = "image"))]
fn save_image(
    _config: &CrosswordConfig,
    _assignment: &Assignment,
    path: &Path,
) -> Result<(), Error> {
    Err(Error(format!(
        "Couldn't write '{}': image output needs the `image` feature (use a .txt path for text)",
        path.display()
    )))
}
