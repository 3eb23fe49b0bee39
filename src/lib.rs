pub mod arc_consistency;
pub mod assignment;
pub mod backtracking_search;
pub mod domains;
pub mod error;
pub mod grid_config;
#[cfg(feature = "image")]
pub mod image_render;
pub mod types;
pub mod word_list;

pub use assignment::{Assignment, Choice};
pub use backtracking_search::{find_fill, solve, FillFailure, FillOptions, FillSuccess};
pub use error::{InputError, SolveError};
pub use grid_config::{render_grid, CrosswordConfig, Direction, Grid, Variable};
pub use word_list::WordList;

pub const LOG_FILL_PROCESS: bool = cfg!(feature = "log_fill_process");
pub const CHECK_INVARIANTS: bool = cfg!(feature = "check_invariants");

/// The expected maximum number of slots appearing in a grid.
pub const MAX_SLOT_COUNT: usize = 256;

/// The expected maximum length for a single slot.
pub const MAX_SLOT_LENGTH: usize = 21;
