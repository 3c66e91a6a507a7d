// Terminal buffer rows and the mapping from wrapped-line text offsets to
// buffer cell coordinates.

use unicode_width::UnicodeWidthChar;

/// One cell of a buffer row.
///
/// A wide character occupies a cell of width 2 followed by a spacer cell of
/// width 0 with no characters. A blank cell has width 1 and no characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferCell {
    pub chars: String,
    pub width: usize,
}

impl BufferCell {
    pub fn new(chars: impl Into<String>, width: usize) -> Self {
        Self {
            chars: chars.into(),
            width,
        }
    }

    pub fn blank() -> Self {
        Self::new("", 1)
    }

    fn spacer() -> Self {
        Self::new("", 0)
    }
}

/// One physical row of the terminal buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferLine {
    cells: Vec<BufferCell>,
}

impl BufferLine {
    pub fn new(cells: Vec<BufferCell>) -> Self {
        Self { cells }
    }

    #[cfg(test)]
    fn from_text(text: &str) -> Self {
        let mut line = Self::default();
        for c in text.chars() {
            line.push_char(c);
        }
        line
    }

    pub fn cell(&self, x: usize) -> Option<&BufferCell> {
        self.cells.get(x)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Render columns `[start, end)` as a string.
    ///
    /// Spacer cells after wide characters are skipped and blank cells render
    /// as a space. With `trim_right`, trailing blank cells are dropped.
    pub fn translate_to_string(&self, trim_right: bool, start: usize, end: usize) -> String {
        let end = if trim_right {
            end.min(self.trimmed_len())
        } else {
            end.min(self.cells.len())
        };
        let mut out = String::new();
        let mut x = start;
        while x < end {
            let cell = &self.cells[x];
            if cell.chars.is_empty() {
                if cell.width > 0 {
                    out.push(' ');
                }
            } else {
                out.push_str(&cell.chars);
            }
            x += cell.width.max(1);
        }
        out
    }

    fn trimmed_len(&self) -> usize {
        self.cells
            .iter()
            .rposition(|cell| !cell.chars.is_empty())
            .map_or(0, |i| i + self.cells[i].width.max(1))
    }

    fn push_char(&mut self, c: char) {
        match c.width().unwrap_or(0) {
            0 => match self.cells.iter_mut().rev().find(|cell| cell.width > 0) {
                // Combining marks join the preceding visible cell.
                Some(cell) => cell.chars.push(c),
                None => self.cells.push(BufferCell::new(c.to_string(), 1)),
            },
            2 => {
                self.cells.push(BufferCell::new(c.to_string(), 2));
                self.cells.push(BufferCell::spacer());
            }
            _ => self.cells.push(BufferCell::new(c.to_string(), 1)),
        }
    }
}

/// Split a logical line into physical rows of `columns` cells.
///
/// A wide character that would straddle the last column is moved to the next
/// row, leaving a blank cell behind. Always returns at least one row.
pub fn wrap_text(text: &str, columns: usize) -> Vec<BufferLine> {
    let columns = columns.max(2);
    let mut rows = vec![BufferLine::default()];
    for c in text.chars() {
        let width = c.width().unwrap_or(0);
        let used = rows.last().map_or(0, BufferLine::len);
        if width > 0 && used + width > columns {
            if let Some(row) = rows.last_mut() {
                while row.len() < columns {
                    row.cells.push(BufferCell::blank());
                }
            }
            rows.push(BufferLine::default());
        }
        if let Some(row) = rows.last_mut() {
            row.push_char(c);
        }
    }
    rows
}

/// Reconstruct the text of a wrapped line from its physical rows.
pub fn line_content(lines: &[BufferLine], columns: usize) -> String {
    lines
        .iter()
        .map(|line| line.translate_to_string(true, 0, columns))
        .collect()
}

/// A 1-based column range within a reconstructed single-line string.
/// `end_column` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkRange {
    pub start_column: usize,
    pub end_column: usize,
}

/// A 1-based cell position in the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferPoint {
    pub x: usize,
    pub y: usize,
}

/// An inclusive range of buffer cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferRange {
    pub start: BufferPoint,
    pub end: BufferPoint,
}

/// Convert a column range in the reconstructed text of `lines` into buffer
/// coordinates, where `start_line` is the 0-based buffer index of `lines[0]`.
///
/// Wide characters before and inside the link shift the cells to the right,
/// as do rows that wrapped early because a wide character did not fit.
pub fn convert_link_range_to_buffer(
    lines: &[BufferLine],
    buffer_width: usize,
    range: LinkRange,
    start_line: usize,
) -> BufferRange {
    let width = buffer_width.max(1) as isize;
    let start_column = range.start_column as isize;
    let end_column = range.end_column as isize;

    let mut start_x = start_column;
    let mut end_x = end_column - 1;
    let mut start_y = start_line + 1;
    let mut end_y = start_line + 1;

    // Wide characters and multi-char cells before the link.
    let mut start_offset: isize = 0;
    let start_wrapped_rows = (start_column + width - 1) / width;
    for y in 0..start_wrapped_rows {
        let Some(line) = lines.get(y as usize) else {
            break;
        };
        let row_length = width.min(start_column - y * width);
        let mut row_offset: isize = 0;
        let mut x: isize = 0;
        while x < width.min(row_length + row_offset) {
            let Some(cell) = line.cell(x as usize) else {
                break;
            };
            if cell.width == 2 {
                row_offset += 1;
            }
            // Blank last cell: the row wrapped early.
            if x == width - 1 && cell.chars.is_empty() {
                row_offset += 1;
            }
            let char_count = cell.chars.chars().count() as isize;
            if char_count > 1 {
                row_offset -= char_count - 1;
            }
            x += 1;
        }
        start_offset += row_offset;
    }

    // Wide characters inside the link.
    let mut end_offset: isize = 0;
    let end_wrapped_rows = (end_column + width - 1) / width;
    for y in (start_wrapped_rows - 1).max(0)..end_wrapped_rows {
        let Some(line) = lines.get(y as usize) else {
            break;
        };
        let first_row = y == start_wrapped_rows - 1;
        let start = if first_row {
            (start_column + start_offset) % width
        } else {
            0
        };
        let row_length = width.min(end_column + start_offset - y * width);
        let row_start_offset = if first_row { start_offset } else { 0 };
        let mut row_offset: isize = 0;
        let mut x = start;
        while x < width.min(row_length + row_offset + row_start_offset) {
            let Some(cell) = line.cell(x as usize) else {
                break;
            };
            if cell.width == 2 {
                row_offset += 1;
            }
            if x == width - 1 && cell.chars.is_empty() {
                row_offset += 1;
            }
            x += 1;
        }
        end_offset += row_offset;
    }

    start_x += start_offset;
    end_x += start_offset + end_offset;

    while start_x > width {
        start_x -= width;
        start_y += 1;
    }
    while end_x > width {
        end_x -= width;
        end_y += 1;
    }

    BufferRange {
        start: BufferPoint {
            x: start_x.max(1) as usize,
            y: start_y,
        },
        end: BufferPoint {
            x: end_x.max(0) as usize,
            y: end_y,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start_column: usize, end_column: usize) -> LinkRange {
        LinkRange {
            start_column,
            end_column,
        }
    }

    #[test]
    fn from_text_lays_out_wide_characters() {
        let line = BufferLine::from_text("a中b");
        assert_eq!(line.len(), 4);
        assert_eq!(line.cell(1).unwrap().width, 2);
        assert_eq!(line.cell(2).unwrap().width, 0);
        assert_eq!(line.translate_to_string(false, 0, 4), "a中b");
    }

    #[test]
    fn combining_mark_joins_previous_cell() {
        let line = BufferLine::from_text("e\u{0301}x");
        assert_eq!(line.len(), 2);
        assert_eq!(line.cell(0).unwrap().chars, "e\u{0301}");
    }

    #[test]
    fn translate_trims_trailing_blank_cells() {
        let line = BufferLine::new(vec![
            BufferCell::new("a", 1),
            BufferCell::blank(),
            BufferCell::new("b", 1),
            BufferCell::blank(),
            BufferCell::blank(),
        ]);
        assert_eq!(line.translate_to_string(true, 0, 5), "a b");
        assert_eq!(line.translate_to_string(false, 0, 5), "a b  ");
    }

    #[test]
    fn translate_respects_column_limit() {
        let line = BufferLine::from_text("abcdef");
        assert_eq!(line.translate_to_string(true, 0, 4), "abcd");
    }

    #[test]
    fn wrap_text_splits_rows_at_width() {
        let rows = wrap_text("abcdefghij", 4);
        assert_eq!(rows.len(), 3);
        assert_eq!(line_content(&rows, 4), "abcdefghij");
    }

    #[test]
    fn wrap_text_of_empty_line_is_one_row() {
        let rows = wrap_text("", 80);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_empty());
    }

    #[test]
    fn wrap_text_moves_straddling_wide_char() {
        let rows = wrap_text("abc中", 4);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 4);
        assert_eq!(rows[0].cell(3).unwrap(), &BufferCell::blank());
        assert_eq!(line_content(&rows, 4), "abc中");
    }

    #[test]
    fn single_row_ascii_range() {
        let lines = wrap_text("abc /foo/bar end", 80);
        // "/foo/bar" spans columns 5..=12.
        let result = convert_link_range_to_buffer(&lines, 80, range(5, 13), 0);
        assert_eq!(
            result,
            BufferRange {
                start: BufferPoint { x: 5, y: 1 },
                end: BufferPoint { x: 12, y: 1 },
            }
        );
    }

    #[test]
    fn start_line_offsets_rows() {
        let lines = wrap_text("/a/b", 80);
        let result = convert_link_range_to_buffer(&lines, 80, range(1, 5), 9);
        assert_eq!(result.start, BufferPoint { x: 1, y: 10 });
        assert_eq!(result.end, BufferPoint { x: 4, y: 10 });
    }

    #[test]
    fn range_wrapping_onto_next_row() {
        let lines = wrap_text("0123456/abc/def", 10);
        // "/abc/def" is columns 8..=15 of the logical line.
        let result = convert_link_range_to_buffer(&lines, 10, range(8, 16), 0);
        assert_eq!(result.start, BufferPoint { x: 8, y: 1 });
        assert_eq!(result.end, BufferPoint { x: 5, y: 2 });
    }

    #[test]
    fn wide_character_before_link_shifts_start() {
        let lines = wrap_text("中 /a/b", 80);
        // Text columns: 中=1, ' '=2, "/a/b"=3..=6; cells shift right by one.
        let result = convert_link_range_to_buffer(&lines, 80, range(3, 7), 0);
        assert_eq!(result.start, BufferPoint { x: 4, y: 1 });
        assert_eq!(result.end, BufferPoint { x: 7, y: 1 });
    }

    #[test]
    fn wide_character_inside_link_extends_end() {
        let lines = wrap_text("/a/中.txt", 80);
        // Eight characters, nine cells.
        let result = convert_link_range_to_buffer(&lines, 80, range(1, 9), 0);
        assert_eq!(result.start, BufferPoint { x: 1, y: 1 });
        assert_eq!(result.end, BufferPoint { x: 9, y: 1 });
    }

    #[test]
    fn link_after_early_wrapped_row() {
        // Row 0 is "abc" plus a blank cell, row 1 starts with the wide char.
        let lines = wrap_text("abc中/x/y", 4);
        // "/x/y" is columns 5..=8 of the logical line.
        let result = convert_link_range_to_buffer(&lines, 4, range(5, 9), 0);
        assert_eq!(result.start, BufferPoint { x: 3, y: 2 });
        assert_eq!(result.end, BufferPoint { x: 2, y: 3 });
    }
}
