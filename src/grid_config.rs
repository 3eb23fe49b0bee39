//! This module implements the static model of a puzzle: which cells are fillable, which slots
//! (variables) those cells form, and how the slots cross each other. It also owns the solve input
//! (`CrosswordConfig`) and the text rendering of a finished fill.

use smallvec::SmallVec;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fmt::{self, Debug};
use std::fs;

use crate::assignment::Assignment;
use crate::error::{InputError, SolveError};
use crate::types::{GridCoord, VariableId};
use crate::word_list::WordList;

/// Glyph used for blocked cells in rendered output.
pub const BLOCK_GLYPH: char = '█';

/// The direction that a slot is facing.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Across,
    Down,
}

/// A slot in the grid, identified by its start cell, direction and length. Two variables are
/// equal iff all four fields match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable {
    pub row: usize,
    pub col: usize,
    pub direction: Direction,
    pub length: usize,
}

impl Variable {
    /// The coords of the `offset`-th cell of this slot. The offset isn't bounds-checked against
    /// `length`, so callers placing over-long words can detect the overflow themselves.
    #[must_use]
    pub fn cell_at(&self, offset: usize) -> GridCoord {
        match self.direction {
            Direction::Across => (self.row, self.col + offset),
            Direction::Down => (self.row + offset, self.col),
        }
    }

    /// Generate the coords for each cell of this slot.
    #[must_use]
    pub fn cell_coords(&self) -> Vec<GridCoord> {
        (0..self.length).map(|offset| self.cell_at(offset)).collect()
    }
}

/// Renders as the slot key "row,col,direction,length", e.g. "1,2,down,5".
impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.direction {
            Direction::Across => "across",
            Direction::Down => "down",
        };
        write!(f, "{},{},{},{}", self.row, self.col, direction, self.length)
    }
}

/// A crossing between one slot and another, referencing the other slot's id and the location of
/// the intersection within the other slot.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Crossing {
    other_variable_id: VariableId,
    other_cell: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    InvalidPath(String),
    Empty,
    NonRectangular { row: usize, expected: usize, found: usize },
    InvalidCell { row: usize, col: usize, found: char },
    InvariantViolation(String),
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::InvalidPath(path) => write!(f, "Can’t read file: “{path}”"),
            GridError::Empty => write!(f, "Grid must have at least one row and one column"),
            GridError::NonRectangular {
                row,
                expected,
                found,
            } => write!(
                f,
                "Rows in grid must all be the same length (row {row} has {found} cells, expected {expected})"
            ),
            GridError::InvalidCell { row, col, found } => {
                write!(f, "Invalid cell “{found}” at row {row}, column {col}")
            }
            GridError::InvariantViolation(message) => {
                write!(f, "Invariant violation: {message}")
            }
        }
    }
}

impl std::error::Error for GridError {}

/// The puzzle structure plus everything derived from it: variables, overlaps and neighbors.
/// Immutable once built.
#[derive(Clone)]
pub struct Grid {
    pub width: usize,
    pub height: usize,

    /// A flat array of fillable flags, in order of row and then column.
    fillable: Vec<bool>,

    /// Every slot in the grid: across slots in row-major order of their start cell, then down
    /// slots in column-major order.
    variables: Vec<Variable>,

    /// For each ordered pair of crossing variables, the in-word indices of the shared cell.
    overlaps: HashMap<(VariableId, VariableId), (usize, usize)>,

    /// For each variable, its crossing variables in ascending id order.
    neighbors: Vec<Vec<VariableId>>,
}

impl Grid {
    /// Build a grid from a rectangular array of fillable flags.
    pub fn new(fillable: Vec<Vec<bool>>) -> Result<Grid, GridError> {
        let height = fillable.len();
        let width = fillable.first().map_or(0, Vec::len);
        if height == 0 || width == 0 {
            return Err(GridError::Empty);
        }

        if let Some((row, cells)) = fillable
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() != width)
        {
            return Err(GridError::NonRectangular {
                row,
                expected: width,
                found: cells.len(),
            });
        }

        let fillable: Vec<bool> = fillable.into_iter().flatten().collect();
        let variables = generate_variables(&fillable, width, height);
        let crossings = generate_crossings(&variables)?;

        let mut overlaps = HashMap::new();
        let neighbors: Vec<Vec<VariableId>> = crossings
            .iter()
            .enumerate()
            .map(|(variable_id, cells)| {
                let mut neighbors: Vec<VariableId> = cells
                    .iter()
                    .enumerate()
                    .filter_map(|(cell_idx, crossing)| {
                        crossing.as_ref().map(|crossing| {
                            overlaps.insert(
                                (variable_id, crossing.other_variable_id),
                                (cell_idx, crossing.other_cell),
                            );
                            crossing.other_variable_id
                        })
                    })
                    .collect();
                neighbors.sort_unstable();
                neighbors
            })
            .collect();

        log::debug!(
            "Built {width}x{height} grid with {} variables and {} crossings",
            variables.len(),
            overlaps.len() / 2
        );

        Ok(Grid {
            width,
            height,
            fillable,
            variables,
            overlaps,
            neighbors,
        })
    }

    /// Build a grid from a template string with `_` (or `.`) representing fillable cells and `#`
    /// (or `█`) representing blocks. Lines are trimmed and blank lines before the first row or
    /// after the last are ignored; a blank line between rows is an empty row, which makes the grid
    /// non-rectangular.
    pub fn from_template_string(template: &str) -> Result<Grid, GridError> {
        let lines: Vec<&str> = template.lines().map(str::trim).collect();
        let first = lines.iter().position(|line| !line.is_empty());
        let last = lines.iter().rposition(|line| !line.is_empty());
        let lines = match (first, last) {
            (Some(first), Some(last)) => &lines[first..=last],
            _ => return Err(GridError::Empty),
        };

        let rows = lines
            .iter()
            .enumerate()
            .map(|(row, line)| {
                line.chars()
                    .enumerate()
                    .map(|(col, cell)| match cell {
                        '_' | '.' => Ok(true),
                        '#' | BLOCK_GLYPH => Ok(false),
                        found => Err(GridError::InvalidCell { row, col, found }),
                    })
                    .collect::<Result<Vec<bool>, GridError>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Grid::new(rows)
    }

    /// Load a structure file in the template format.
    pub fn from_file<P: AsRef<OsStr> + ?Sized>(path: &P) -> Result<Grid, GridError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|_| GridError::InvalidPath(path.to_string_lossy().into()))?;
        Grid::from_template_string(&contents)
    }

    /// Is the given cell part of the puzzle? Out-of-range cells are not.
    #[must_use]
    pub fn is_fillable(&self, row: usize, col: usize) -> bool {
        row < self.height && col < self.width && self.fillable[row * self.width + col]
    }

    #[must_use]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    #[must_use]
    pub fn variable(&self, variable_id: VariableId) -> &Variable {
        &self.variables[variable_id]
    }

    #[must_use]
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Every variable crossing the given one, in ascending id order.
    #[must_use]
    pub fn neighbors(&self, variable_id: VariableId) -> &[VariableId] {
        &self.neighbors[variable_id]
    }

    /// The number of crossing variables, used by the degree heuristic.
    #[must_use]
    pub fn degree(&self, variable_id: VariableId) -> usize {
        self.neighbors[variable_id].len()
    }

    /// If `x` and `y` cross, the index of the shared cell within `x` and within `y`.
    #[must_use]
    pub fn overlap(&self, x: VariableId, y: VariableId) -> Option<(usize, usize)> {
        self.overlaps.get(&(x, y)).copied()
    }
}

impl Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("variables", &self.variables.len())
            .finish_non_exhaustive()
    }
}

/// Scan rows for across runs and then columns for down runs. Runs shorter than two cells aren't
/// slots.
fn generate_variables(fillable: &[bool], width: usize, height: usize) -> Vec<Variable> {
    fn build_runs(
        line_count: usize,
        line_length: usize,
        is_fillable: impl Fn(usize, usize) -> bool,
    ) -> Vec<(usize, usize, usize)> {
        let mut result = vec![];

        for line in 0..line_count {
            let mut run_start: Option<usize> = None;

            for pos in 0..=line_length {
                let open = pos < line_length && is_fillable(line, pos);
                match (open, run_start) {
                    (true, None) => run_start = Some(pos),
                    (false, Some(start)) => {
                        if pos - start > 1 {
                            result.push((line, start, pos - start));
                        }
                        run_start = None;
                    }
                    _ => {}
                }
            }
        }

        result
    }

    let across = build_runs(height, width, |row, col| fillable[row * width + col])
        .into_iter()
        .map(|(row, col, length)| Variable {
            row,
            col,
            direction: Direction::Across,
            length,
        });

    let down = build_runs(width, height, |col, row| fillable[row * width + col])
        .into_iter()
        .map(|(col, row, length)| Variable {
            row,
            col,
            direction: Direction::Down,
            length,
        });

    across.chain(down).collect()
}

/// Derive the crossings of each variable by mapping every cell to the slots covering it.
fn generate_crossings(variables: &[Variable]) -> Result<Vec<Vec<Option<Crossing>>>, GridError> {
    // (variable id, cell index within variable)
    let mut entries_by_loc: HashMap<GridCoord, SmallVec<[(VariableId, usize); 2]>> =
        HashMap::new();

    for (variable_id, variable) in variables.iter().enumerate() {
        for (cell_idx, loc) in variable.cell_coords().into_iter().enumerate() {
            entries_by_loc
                .entry(loc)
                .or_default()
                .push((variable_id, cell_idx));
        }
    }

    variables
        .iter()
        .enumerate()
        .map(|(variable_id, variable)| {
            variable
                .cell_coords()
                .iter()
                .map(|loc| {
                    let others: SmallVec<[(VariableId, usize); 2]> = entries_by_loc[loc]
                        .iter()
                        .filter(|&&(other_id, _)| other_id != variable_id)
                        .copied()
                        .collect();

                    match others.as_slice() {
                        [] => Ok(None),
                        [(other_variable_id, other_cell)] => Ok(Some(Crossing {
                            other_variable_id: *other_variable_id,
                            other_cell: *other_cell,
                        })),
                        _ => Err(GridError::InvariantViolation(format!(
                            "more than two slots cross at {loc:?}"
                        ))),
                    }
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .collect()
}

/// A struct that owns all of the information needed as input to a solve.
#[derive(Debug, Clone)]
pub struct CrosswordConfig {
    pub grid: Grid,
    pub word_list: WordList,
}

impl CrosswordConfig {
    /// Pair a grid with its vocabulary. An empty vocabulary is rejected up front.
    pub fn new(grid: Grid, word_list: WordList) -> Result<CrosswordConfig, InputError> {
        if word_list.is_empty() {
            return Err(InputError::EmptyVocabulary);
        }
        Ok(CrosswordConfig { grid, word_list })
    }

    /// Load a structure file and a word list file.
    pub fn from_files<P, Q>(structure_path: &P, words_path: &Q) -> Result<Self, InputError>
    where
        P: AsRef<OsStr> + ?Sized,
        Q: AsRef<OsStr> + ?Sized,
    {
        let grid = Grid::from_file(structure_path)?;
        let word_list = WordList::from_file(words_path)?;
        CrosswordConfig::new(grid, word_list)
    }
}

/// Map an assignment onto a 2D array of letters, `letters[row][col]`.
pub fn letter_grid(
    config: &CrosswordConfig,
    assignment: &Assignment,
) -> Result<Vec<Vec<Option<char>>>, SolveError> {
    let grid = &config.grid;
    let mut letters = vec![vec![None; grid.width]; grid.height];

    for choice in assignment.choices() {
        let variable = grid.variables.get(choice.variable_id).ok_or_else(|| {
            SolveError::InvariantViolation(format!(
                "assignment refers to unknown variable {}",
                choice.variable_id
            ))
        })?;
        let word = config.word_list.get_word(choice.word_id);

        for (offset, &letter) in word.letters.iter().enumerate() {
            let (row, col) = variable.cell_at(offset);
            if !grid.is_fillable(row, col) {
                return Err(SolveError::InvariantViolation(format!(
                    "“{}” doesn't fit in slot {variable}",
                    word.string
                )));
            }
            letters[row][col] = Some(letter);
        }
    }

    Ok(letters)
}

/// Turn the given config and assignment into a rendered string, with blocks drawn as
/// `BLOCK_GLYPH` and unfilled cells as spaces.
pub fn render_grid(config: &CrosswordConfig, assignment: &Assignment) -> Result<String, SolveError> {
    let letters = letter_grid(config, assignment)?;

    Ok(letters
        .iter()
        .enumerate()
        .map(|(row, line)| {
            line.iter()
                .enumerate()
                .map(|(col, cell)| {
                    if config.grid.is_fillable(row, col) {
                        cell.unwrap_or(' ')
                    } else {
                        BLOCK_GLYPH
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n"))
}
