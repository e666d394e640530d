//! Screen parsing: pixel probes over an RGB frame of the Qbert cabinet

use serde::{Deserialize, Serialize};

use crate::{
    board::{BlockGrid, Cell, EdgeDiscs, NUM_ROWS, Side},
    error::{Error, Result},
};

/// Native Atari screen size.
pub const SCREEN_WIDTH: usize = 160;
pub const SCREEN_HEIGHT: usize = 210;

/// Probe pixel `(y, x)` on the top face of each block, row by row.
const BLOCK_PIXELS: [&[(usize, usize)]; NUM_ROWS] = [
    &[(38, 77)],
    &[(66, 65), (66, 93)],
    &[(95, 53), (95, 77), (95, 105)],
    &[(124, 42), (124, 65), (124, 93), (124, 118)],
    &[(153, 30), (153, 53), (153, 77), (153, 105), (153, 130)],
    &[(182, 18), (182, 42), (182, 65), (182, 93), (182, 118), (182, 142)],
];

/// Pixel of the score area that shows the color blocks must be turned to.
pub const SCORE_PIXEL: (usize, usize) = (10, 70);

/// Sprites standing on a block are probed this many rows above its pixel.
pub const AGENT_OFFSET: usize = 10;

/// Horizontal distance from an edge block to the disc hovering beside it.
pub const DISC_OFFSET: usize = 14;

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    /// First level's target color.
    pub const YELLOW: Rgb = Rgb(210, 210, 64);
    pub const QBERT: Rgb = Rgb(181, 83, 40);
    /// Green ball and Sam.
    pub const GREEN: Rgb = Rgb(50, 132, 50);
    /// Coily and the purple ball.
    pub const PURPLE: Rgb = Rgb(146, 70, 192);

    pub fn is_black(self) -> bool {
        self == Rgb::BLACK
    }
}

/// Probe pixel of a block's top face.
pub fn block_pixel(cell: Cell) -> (usize, usize) {
    BLOCK_PIXELS[cell.row()][cell.col()]
}

/// Pixel where a sprite standing on `cell` shows up.
pub fn sprite_pixel(cell: Cell) -> (usize, usize) {
    let (y, x) = block_pixel(cell);
    (y - AGENT_OFFSET, x)
}

/// Pixel where a disc beside `row` would hover.
pub fn disc_pixel(row: usize, side: Side) -> Option<(usize, usize)> {
    let pixels = BLOCK_PIXELS.get(row)?;
    let (y, x) = match side {
        Side::Left => pixels.first()?,
        Side::Right => pixels.last()?,
    };
    let x = match side {
        Side::Left => x.checked_sub(DISC_OFFSET)?,
        Side::Right => x + DISC_OFFSET,
    };
    Some((y - AGENT_OFFSET, x))
}

/// Packed RGB screen buffer, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Frame {
    /// Black frame of the given size.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height * 3],
        }
    }

    pub fn from_rgb(width: usize, height: usize, pixels: Vec<u8>) -> Result<Self> {
        let expected = width * height * 3;
        if pixels.len() != expected {
            return Err(Error::FrameSize {
                expected,
                got: pixels.len(),
                width,
                height,
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw bytes, for emulators that render straight into the frame.
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Color at `(y, x)`; off-screen reads are black.
    pub fn pixel(&self, y: usize, x: usize) -> Rgb {
        if y >= self.height || x >= self.width {
            return Rgb::BLACK;
        }
        let at = (y * self.width + x) * 3;
        Rgb(self.pixels[at], self.pixels[at + 1], self.pixels[at + 2])
    }

    pub fn set_pixel(&mut self, y: usize, x: usize, color: Rgb) {
        if y >= self.height || x >= self.width {
            return;
        }
        let at = (y * self.width + x) * 3;
        self.pixels[at..at + 3].copy_from_slice(&[color.0, color.1, color.2]);
    }

    pub fn copy_from(&mut self, other: &Frame) {
        self.width = other.width;
        self.height = other.height;
        self.pixels.clone_from(&other.pixels);
    }
}

/// What one frame says about the pyramid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFrame {
    pub colored: BlockGrid<bool>,
    pub enemies: BlockGrid<bool>,
    pub friendlies: BlockGrid<bool>,
    pub discs: EdgeDiscs,
}

impl ParsedFrame {
    pub fn level_won(&self) -> bool {
        self.colored.all()
    }
}

/// Reads block colors and sprites from frames.
///
/// The target color is taken from the score area, which flashes black while
/// points are being counted; black readings keep the previous target.
#[derive(Debug, Clone)]
pub struct FrameParser {
    target: Rgb,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    pub fn new() -> Self {
        Self {
            target: Rgb::YELLOW,
        }
    }

    pub fn target_color(&self) -> Rgb {
        self.target
    }

    pub fn update_target(&mut self, frame: &Frame) {
        let (y, x) = SCORE_PIXEL;
        let color = frame.pixel(y, x);
        if !color.is_black() {
            self.target = color;
        }
    }

    /// Whether Qbert's sprite is visible above `cell`.
    pub fn qbert_at(&self, frame: &Frame, cell: Cell) -> bool {
        let (y, x) = sprite_pixel(cell);
        frame.pixel(y, x) == Rgb::QBERT
    }

    pub fn parse(&mut self, frame: &Frame) -> ParsedFrame {
        self.update_target(frame);
        let mut parsed = ParsedFrame::default();
        for cell in Cell::all() {
            let (y, x) = block_pixel(cell);
            parsed.colored.set(cell, frame.pixel(y, x) == self.target);

            let (y, x) = sprite_pixel(cell);
            match frame.pixel(y, x) {
                Rgb::PURPLE => parsed.enemies.set(cell, true),
                Rgb::GREEN => parsed.friendlies.set(cell, true),
                _ => {}
            }
        }
        for row in 0..NUM_ROWS {
            for side in [Side::Left, Side::Right] {
                let present = disc_pixel(row, side)
                    .is_some_and(|(y, x)| !frame.pixel(y, x).is_black());
                parsed.discs.set(row, side, present);
            }
        }
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(row: i32, col: i32) -> Cell {
        Cell::new(row, col).unwrap()
    }

    fn paint_block(frame: &mut Frame, cell: Cell, color: Rgb) {
        let (y, x) = block_pixel(cell);
        frame.set_pixel(y, x, color);
    }

    #[test]
    fn test_start_pixel_sits_above_top_block() {
        assert_eq!(sprite_pixel(Cell::TOP), (28, 77));
        assert_eq!(block_pixel(cell(5, 5)), (182, 142));
    }

    #[test]
    fn test_black_score_keeps_target() {
        let mut parser = FrameParser::new();
        let mut frame = Frame::new(SCREEN_WIDTH, SCREEN_HEIGHT);
        parser.update_target(&frame);
        assert_eq!(parser.target_color(), Rgb::YELLOW);

        let blue = Rgb(45, 50, 184);
        frame.set_pixel(SCORE_PIXEL.0, SCORE_PIXEL.1, blue);
        parser.update_target(&frame);
        assert_eq!(parser.target_color(), blue);
    }

    #[test]
    fn test_parse_reads_blocks_and_sprites() {
        let mut parser = FrameParser::new();
        let mut frame = Frame::new(SCREEN_WIDTH, SCREEN_HEIGHT);
        frame.set_pixel(SCORE_PIXEL.0, SCORE_PIXEL.1, Rgb::YELLOW);
        paint_block(&mut frame, cell(2, 1), Rgb::YELLOW);
        let (y, x) = sprite_pixel(cell(3, 0));
        frame.set_pixel(y, x, Rgb::PURPLE);
        let (y, x) = sprite_pixel(cell(4, 4));
        frame.set_pixel(y, x, Rgb::GREEN);
        let (y, x) = disc_pixel(4, Side::Right).unwrap();
        frame.set_pixel(y, x, Rgb(200, 72, 72));

        let parsed = parser.parse(&frame);
        assert_eq!(parsed.colored.count(), 1);
        assert!(parsed.colored.get(cell(2, 1)));
        assert!(parsed.enemies.get(cell(3, 0)));
        assert!(parsed.friendlies.get(cell(4, 4)));
        assert!(parsed.discs.get(4, Side::Right));
        assert_eq!(parsed.discs.count(), 1);
        assert!(!parsed.level_won());
    }

    #[test]
    fn test_all_blocks_in_target_color_wins_level() {
        let mut parser = FrameParser::new();
        let mut frame = Frame::new(SCREEN_WIDTH, SCREEN_HEIGHT);
        for cell in Cell::all() {
            paint_block(&mut frame, cell, Rgb::YELLOW);
        }
        assert!(parser.parse(&frame).level_won());
    }

    #[test]
    fn test_wrong_buffer_size_is_rejected() {
        let result = Frame::from_rgb(2, 2, vec![0; 5]);
        assert!(matches!(result, Err(Error::FrameSize { expected: 12, .. })));
    }
}
