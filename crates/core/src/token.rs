//! Text format for cells and grids.
//!
//! A cell is `.` when empty, otherwise one or two sub-cells joined by `+`.
//! A sub-cell is an optional kind prefix (`!` obstacle, `*` asteroid,
//! `?` placeholder), a shape (`#` full, numpad corners `1` `3` `7` `9`)
//! and a color letter. Rows are written top row first.

use crate::{BlockGrid, BlockKind, Cell, Color, Fill, GridError, SubCell, TokenError};

fn parse_sub(part: &str, token: &str) -> Result<SubCell, TokenError> {
    let mut chars = part.chars().peekable();
    let mut kind = BlockKind::Piece;
    if let Some(k) = chars.peek().copied().and_then(BlockKind::from_prefix) {
        kind = k;
        chars.next();
    }
    let shape = chars.next().ok_or(TokenError::Empty)?;
    let fill = match Fill::from_char(shape) {
        Some(Fill::Empty) | None => {
            return Err(TokenError::UnknownShape {
                shape,
                token: token.to_string(),
            })
        }
        Some(fill) => fill,
    };
    let color_char = chars
        .next()
        .ok_or_else(|| TokenError::MissingColor(token.to_string()))?;
    let color = Color::from_char(color_char).ok_or_else(|| TokenError::UnknownColor {
        color: color_char,
        token: token.to_string(),
    })?;
    if chars.next().is_some() {
        return Err(TokenError::Trailing(token.to_string()));
    }
    Ok(SubCell::new(fill, color).with_kind(kind))
}

/// Parse one cell token.
pub fn parse_cell(token: &str) -> Result<Cell, TokenError> {
    if token.is_empty() {
        return Err(TokenError::Empty);
    }
    if token == "." {
        return Ok(Cell::EMPTY);
    }
    let parts: Vec<&str> = token.split('+').collect();
    if parts.len() > 2 {
        return Err(TokenError::TooManyParts(token.to_string()));
    }
    let mut cell = Cell::EMPTY;
    for part in parts {
        let sub = parse_sub(part, token)?;
        if !cell.accepts(sub.fill) {
            return Err(TokenError::Overlap(token.to_string()));
        }
        cell.insert(sub);
    }
    Ok(cell)
}

fn format_sub(sub: &SubCell, out: &mut String) {
    if let Some(prefix) = sub.kind.prefix() {
        out.push(prefix);
    }
    out.push(sub.fill.as_char());
    out.push(sub.color.map_or('?', Color::as_char));
}

/// Render a cell as its token.
pub fn format_cell(cell: &Cell) -> String {
    if cell.is_empty() {
        return ".".to_string();
    }
    let mut out = String::with_capacity(4);
    for (i, (_, sub)) in cell.occupied().enumerate() {
        if i > 0 {
            out.push('+');
        }
        format_sub(sub, &mut out);
    }
    out
}

/// Parse whitespace-separated rows, top row first. Blank lines are skipped.
pub fn parse_rows<S: AsRef<str>>(rows: &[S]) -> Result<BlockGrid, GridError> {
    let rows: Vec<&str> = rows
        .iter()
        .map(AsRef::as_ref)
        .filter(|r| !r.trim().is_empty())
        .collect();
    let height = rows.len();
    if height == 0 {
        return Err(GridError::NoRows);
    }
    let width = rows[0].split_whitespace().count();
    let mut grid = BlockGrid::empty(width, height);
    for (row, line) in rows.iter().enumerate() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != width {
            return Err(GridError::Ragged {
                row,
                expected: width,
                found: tokens.len(),
            });
        }
        let y = height - 1 - row;
        for (column, token) in tokens.into_iter().enumerate() {
            let cell =
                parse_cell(token).map_err(|source| GridError::Token { row, column, source })?;
            grid.set(column, y, cell);
        }
    }
    Ok(grid)
}

/// Parse a multi-line block of rows, top row first.
pub fn parse_grid(text: &str) -> Result<BlockGrid, GridError> {
    let lines: Vec<&str> = text.lines().collect();
    parse_rows(&lines)
}

/// Render rows top first, one token per cell.
pub fn format_rows(grid: &BlockGrid) -> Vec<String> {
    (0..grid.height())
        .rev()
        .map(|y| {
            grid.row(y)
                .iter()
                .map(format_cell)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}
