//! Image rendering of a fill: a black canvas with a white square for every fillable cell and each
//! placed letter centered in its square. Blocked cells stay black.

use std::fmt;
use std::path::Path;

use ab_glyph::{FontRef, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

use crate::assignment::Assignment;
use crate::error::SolveError;
use crate::grid_config::{letter_grid, CrosswordConfig};

/// Side of one cell in pixels, border included.
pub const CELL_SIZE: u32 = 100;

/// Black margin kept on every side of a fillable cell's white square.
pub const CELL_BORDER: u32 = 2;

pub const FONT_SIZE: f32 = 80.0;

const FONT_DATA: &[u8] = include_bytes!("../assets/fonts/DejaVuSans-Bold.ttf");

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

#[derive(Debug)]
pub enum ImageRenderError {
    Solve(SolveError),
    TooLarge { width: usize, height: usize },
    InvalidFont(String),
    Image(image::ImageError),
}

impl fmt::Display for ImageRenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageRenderError::Solve(error) => write!(f, "{error}"),
            ImageRenderError::TooLarge { width, height } => {
                write!(f, "A {width}x{height} grid is too large to draw")
            }
            ImageRenderError::InvalidFont(message) => write!(f, "Can’t load font: {message}"),
            ImageRenderError::Image(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for ImageRenderError {}

impl From<SolveError> for ImageRenderError {
    fn from(error: SolveError) -> Self {
        ImageRenderError::Solve(error)
    }
}

impl From<image::ImageError> for ImageRenderError {
    fn from(error: image::ImageError) -> Self {
        ImageRenderError::Image(error)
    }
}

/// Pixel length of `cells` cells, if it fits the drawing coordinate space.
fn pixels(cells: usize) -> Option<u32> {
    let px = u32::try_from(cells).ok()?.checked_mul(CELL_SIZE)?;
    i32::try_from(px).ok().map(|_| px)
}

/// Draw the given assignment as an image of `width * CELL_SIZE` by `height * CELL_SIZE` pixels.
/// Unassigned fillable cells are drawn as empty white squares.
pub fn render_image(
    config: &CrosswordConfig,
    assignment: &Assignment,
) -> Result<RgbaImage, ImageRenderError> {
    let grid = &config.grid;
    let (Some(width_px), Some(height_px)) = (pixels(grid.width), pixels(grid.height)) else {
        return Err(ImageRenderError::TooLarge {
            width: grid.width,
            height: grid.height,
        });
    };

    let letters = letter_grid(config, assignment)?;
    let font = FontRef::try_from_slice(FONT_DATA)
        .map_err(|error| ImageRenderError::InvalidFont(error.to_string()))?;
    let scale = PxScale::from(FONT_SIZE);
    let interior = CELL_SIZE - 2 * CELL_BORDER;

    let mut image = RgbaImage::from_pixel(width_px, height_px, BLACK);

    for (row, line) in letters.iter().enumerate() {
        for (col, cell) in line.iter().enumerate() {
            if !grid.is_fillable(row, col) {
                continue;
            }

            // Both fit in i32: `pixels` checked the whole canvas.
            let left = col as i32 * CELL_SIZE as i32 + CELL_BORDER as i32;
            let top = row as i32 * CELL_SIZE as i32 + CELL_BORDER as i32;
            draw_filled_rect_mut(
                &mut image,
                Rect::at(left, top).of_size(interior, interior),
                WHITE,
            );

            if let Some(letter) = cell {
                let text = letter.to_string();
                let (text_width, text_height) = text_size(scale, &font, &text);
                let x = left + (interior.saturating_sub(text_width) / 2) as i32;
                let y = top + (interior.saturating_sub(text_height) / 2) as i32;
                draw_text_mut(&mut image, BLACK, x, y, scale, &font, &text);
            }
        }
    }

    Ok(image)
}

/// Render the assignment and save it to `path`; the image format follows the file extension.
pub fn save_image(
    config: &CrosswordConfig,
    assignment: &Assignment,
    path: &Path,
) -> Result<(), ImageRenderError> {
    let image = render_image(config, assignment)?;
    image.save(path)?;

    log::debug!(
        "Saved {}x{} image to {}",
        image.width(),
        image.height(),
        path.display()
    );

    Ok(())
}
