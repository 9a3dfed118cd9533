use crate::emulator::{Framebuffer, LCD_HEIGHT, LCD_WIDTH};
use crate::host::{LCD_ROWS, LCD_ROWSIZE, Lcd};

/// Width of the game area on the display.
pub const GAME_WIDTH: usize = LCD_WIDTH * 2;
/// Bytes covered by one game-area row.
pub const GAME_ROWSIZE: usize = GAME_WIDTH / 8;
/// Destination rows produced by the line cadence.
pub const GAME_ROWS: usize = LCD_ROWS;

/// Source pixels packed into one destination byte.
const PIXELS_PER_BYTE: usize = 4;

/// `[shade][y][x]`, 1 = white.
const PATTERNS: [[[u8; 4]; 4]; 4] = [
    [[1, 1, 1, 1], [1, 1, 1, 1], [1, 1, 1, 1], [1, 1, 1, 1]],
    [[0, 1, 0, 1], [1, 1, 1, 1], [0, 1, 0, 1], [1, 1, 1, 1]],
    [[1, 0, 1, 0], [0, 1, 0, 1], [1, 0, 1, 0], [0, 1, 0, 1]],
    [[0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
];

/// `[shade][sub_pixel][row_phase]` -> bits for source pixel `sub_pixel` of a
/// destination byte, on a destination row with `row_phase = row & 3`.
pub type MaskTable = [[[u8; 4]; PIXELS_PER_BYTE]; 4];

pub const MASKS: MaskTable = build_mask_table();

const fn build_mask_table() -> MaskTable {
    let mut table = [[[0u8; 4]; PIXELS_PER_BYTE]; 4];
    let mut shade = 0;
    while shade < 4 {
        let mut row = 0;
        while row < 4 {
            let mut sub = 0;
            while sub < PIXELS_PER_BYTE {
                // two destination columns per source pixel, wrapping every
                // other pixel within the 4-wide pattern
                let x_offset = (sub * 2) % 4;
                let mut mask = 0u8;
                let mut x = 0;
                while x < 2 {
                    if PATTERNS[shade][row][x_offset + x] == 1 {
                        mask |= 1 << (7 - (sub * 2 + x));
                    }
                    x += 1;
                }
                table[shade][sub][row] = mask;
                sub += 1;
            }
            row += 1;
        }
        shade += 1;
    }
    table
}

/// One source row and the destination rows it covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowSpan {
    pub source: usize,
    /// First destination row, relative to the game area.
    pub dest: usize,
    /// 1 or 2.
    pub lines: usize,
}

/// Vertical cadence: five doubled rows, then two single rows, repeating.
///
/// The counter that triggers the single rows restarts on the first single
/// row and counts the second one, so after the opening run of five the
/// period is `1, 1, 2, 2, 2, 2` (six source rows, ten destination rows).
/// The last source row falls outside the 240 destination rows.
pub fn line_cadence() -> Vec<RowSpan> {
    let mut spans = Vec::with_capacity(LCD_HEIGHT);
    let mut dest = 0;
    let mut doublings = 0;
    let mut next_lines = 2;
    let mut single_line = false;

    for source in 0..LCD_HEIGHT {
        if dest >= GAME_ROWS {
            break;
        }

        let mut lines = next_lines;
        if doublings == 5 {
            lines = 1;
            next_lines = 1;
            doublings = 0;
            single_line = true;
        } else if single_line {
            next_lines = 2;
            single_line = false;
        }

        let lines = lines.min(GAME_ROWS - dest);
        spans.push(RowSpan {
            source,
            dest,
            lines,
        });
        dest += lines;

        if !single_line {
            doublings += 1;
        }
    }

    spans
}

/// Converts emulator frames into the host frame buffer. Only source rows that
/// differ from the last converted frame are written, and only their
/// destination rows are marked for flushing.
pub struct DisplayConverter {
    x_byte: usize,
    y: usize,
    cadence: Vec<RowSpan>,
    previous: Box<Framebuffer>,
    has_baseline: bool,
}

impl DisplayConverter {
    /// `lcd_x` must be a multiple of 8 (see [`crate::config::LcdConfig`]).
    pub fn new(lcd_x: usize, lcd_y: usize) -> Self {
        let rows_available = LCD_ROWS.saturating_sub(lcd_y);
        let cadence = line_cadence()
            .into_iter()
            .filter(|span| span.dest < rows_available)
            .map(|span| RowSpan {
                lines: span.lines.min(rows_available - span.dest),
                ..span
            })
            .collect();

        Self {
            x_byte: lcd_x / 8,
            y: lcd_y,
            cadence,
            previous: Box::new([[0; LCD_WIDTH]; LCD_HEIGHT]),
            has_baseline: false,
        }
    }

    /// Forgets the previous frame so the next conversion redraws everything.
    pub fn invalidate(&mut self) {
        self.has_baseline = false;
    }

    /// Writes every changed source row into `lcd` and marks the destination
    /// rows it touched. `force` (or a missing baseline) redraws all rows.
    /// Returns the number of destination rows marked.
    pub fn convert<L: Lcd + ?Sized>(
        &mut self,
        source: &Framebuffer,
        lcd: &mut L,
        force: bool,
    ) -> usize {
        let full = force || !self.has_baseline;
        let mut marked = 0;

        for span in &self.cadence {
            let pixels = &source[span.source];
            if !full && *pixels == self.previous[span.source] {
                continue;
            }

            let frame = lcd.frame_mut();
            for line in 0..span.lines {
                let dest_row = span.dest + line;
                let start = (self.y + dest_row) * LCD_ROWSIZE + self.x_byte;
                let Some(row) = frame.get_mut(start..start + GAME_ROWSIZE) else {
                    continue;
                };
                write_row(row, pixels, dest_row & 3);
            }

            let first = self.y + span.dest;
            lcd.mark_updated_rows(first, first + span.lines - 1);
            marked += span.lines;

            self.previous[span.source] = *pixels;
        }

        self.has_baseline = true;
        marked
    }
}

fn write_row(row: &mut [u8], pixels: &[u8; LCD_WIDTH], phase: usize) {
    row.fill(0);
    for (byte, chunk) in row.iter_mut().zip(pixels.chunks_exact(PIXELS_PER_BYTE)) {
        for (sub, &pixel) in chunk.iter().enumerate() {
            *byte |= MASKS[usize::from(pixel & 3)][sub][phase];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestLcd {
        frame: Vec<u8>,
        marked: Vec<(usize, usize)>,
    }

    impl TestLcd {
        fn new() -> Self {
            Self {
                frame: vec![0xAA; LCD_ROWS * LCD_ROWSIZE],
                marked: Vec::new(),
            }
        }

        fn row(&self, y: usize) -> &[u8] {
            &self.frame[y * LCD_ROWSIZE..(y + 1) * LCD_ROWSIZE]
        }
    }

    impl Lcd for TestLcd {
        fn frame_mut(&mut self) -> &mut [u8] {
            &mut self.frame
        }

        fn mark_updated_rows(&mut self, start: usize, end: usize) {
            self.marked.push((start, end));
        }
    }

    fn blank() -> Box<Framebuffer> {
        Box::new([[0; LCD_WIDTH]; LCD_HEIGHT])
    }

    #[test]
    fn cadence_fills_exactly_the_game_area() {
        let spans = line_cadence();
        assert_eq!(spans.len(), LCD_HEIGHT - 1);

        let mut next = 0;
        for span in &spans {
            assert_eq!(span.dest, next);
            assert!(span.lines == 1 || span.lines == 2);
            next += span.lines;
        }
        assert_eq!(next, GAME_ROWS);

        let singles = spans.iter().filter(|s| s.lines == 1).count();
        assert_eq!(singles, 46);

        let lines: Vec<usize> = spans.iter().take(13).map(|s| s.lines).collect();
        assert_eq!(lines, [2, 2, 2, 2, 2, 1, 1, 2, 2, 2, 2, 1, 1]);
    }

    #[test]
    fn mask_table_matches_patterns() {
        // white and black are solid on every row
        for sub in 0..4 {
            for phase in 0..4 {
                assert_eq!(MASKS[3][sub][phase], 0);
            }
        }
        let white_byte: u8 = (0..4).fold(0, |acc, sub| acc | MASKS[0][sub][0]);
        assert_eq!(white_byte, 0xFF);

        // checkerboard for the dark grey
        let row0: u8 = (0..4).fold(0, |acc, sub| acc | MASKS[2][sub][0]);
        let row1: u8 = (0..4).fold(0, |acc, sub| acc | MASKS[2][sub][1]);
        assert_eq!(row0, 0b1010_1010);
        assert_eq!(row1, 0b0101_0101);

        // light grey leaves every other pixel dark on even rows only
        let row0: u8 = (0..4).fold(0, |acc, sub| acc | MASKS[1][sub][0]);
        let row1: u8 = (0..4).fold(0, |acc, sub| acc | MASKS[1][sub][1]);
        assert_eq!(row0, 0b0101_0101);
        assert_eq!(row1, 0xFF);
    }

    #[test]
    fn unchanged_frame_marks_nothing() {
        let mut converter = DisplayConverter::new(32, 0);
        let mut lcd = TestLcd::new();
        let mut src = blank();
        src[10][3] = 2;

        assert_eq!(converter.convert(&src, &mut lcd, false), GAME_ROWS);
        lcd.marked.clear();

        assert_eq!(converter.convert(&src, &mut lcd, false), 0);
        assert!(lcd.marked.is_empty());
    }

    #[test]
    fn only_changed_rows_are_redrawn() {
        let mut converter = DisplayConverter::new(32, 0);
        let mut lcd = TestLcd::new();
        let mut src = blank();
        converter.convert(&src, &mut lcd, false);
        lcd.marked.clear();

        // source row 5 is the first single row
        src[5][0] = 3;
        assert_eq!(converter.convert(&src, &mut lcd, false), 1);
        assert_eq!(lcd.marked, vec![(10, 10)]);

        lcd.marked.clear();
        src[0][0] = 3;
        assert_eq!(converter.convert(&src, &mut lcd, false), 2);
        assert_eq!(lcd.marked, vec![(0, 1)]);
    }

    #[test]
    fn force_redraws_everything() {
        let mut converter = DisplayConverter::new(32, 0);
        let mut lcd = TestLcd::new();
        let src = blank();
        converter.convert(&src, &mut lcd, false);
        assert_eq!(converter.convert(&src, &mut lcd, true), GAME_ROWS);

        converter.invalidate();
        assert_eq!(converter.convert(&src, &mut lcd, false), GAME_ROWS);
    }

    #[test]
    fn writes_stay_inside_game_area() {
        let mut converter = DisplayConverter::new(32, 0);
        let mut lcd = TestLcd::new();
        let mut src = blank();
        for row in src.iter_mut() {
            row.fill(3);
        }
        converter.convert(&src, &mut lcd, false);

        for y in 0..LCD_ROWS {
            let row = lcd.row(y);
            assert!(row[..4].iter().all(|&b| b == 0xAA), "left margin row {y}");
            assert!(row[4..44].iter().all(|&b| b == 0x00), "game row {y}");
            assert!(row[44..].iter().all(|&b| b == 0xAA), "right margin row {y}");
        }
    }

    #[test]
    fn pixels_expand_to_two_bits() {
        let mut converter = DisplayConverter::new(0, 0);
        let mut lcd = TestLcd::new();
        let mut src = blank();
        // first four pixels: white, black, white, black
        src[0][1] = 3;
        src[0][3] = 3;
        converter.convert(&src, &mut lcd, false);
        assert_eq!(lcd.row(0)[0], 0b1100_1100);
        assert_eq!(lcd.row(1)[0], 0b1100_1100);
        assert_eq!(lcd.row(0)[1], 0xFF);
    }

    #[test]
    fn shade_ignores_upper_bits() {
        let mut converter = DisplayConverter::new(0, 0);
        let mut lcd = TestLcd::new();
        let mut src = blank();
        src[0][0] = 0x13;
        converter.convert(&src, &mut lcd, false);
        assert_eq!(lcd.row(0)[0], 0b0011_1111);
    }
}
