//! Indentation tracking for significant whitespace.

use crate::LexErrorKind;

/// Width of a tab stop when measuring indentation.
const TAB_WIDTH: u32 = 8;

/// Change in block depth at the start of a logical line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum IndentChange {
    Same,
    Indent,
    Dedent(usize),
}

/// Stack of open indentation columns plus bracket depth.
///
/// Indentation is only meaningful outside brackets; newlines inside `()`,
/// `[]` and `{}` are joined into the enclosing logical line.
#[derive(Debug)]
pub(crate) struct IndentStack {
    levels: Vec<u32>,
    bracket_depth: usize,
}

impl IndentStack {
    pub(crate) fn new() -> Self {
        IndentStack {
            levels: vec![0],
            bracket_depth: 0,
        }
    }

    pub(crate) fn in_brackets(&self) -> bool {
        self.bracket_depth > 0
    }

    pub(crate) fn open_bracket(&mut self) {
        self.bracket_depth += 1;
    }

    pub(crate) fn close_bracket(&mut self) {
        self.bracket_depth = self.bracket_depth.saturating_sub(1);
    }

    /// Blocks still open at end of input.
    pub(crate) fn open_blocks(&self) -> usize {
        self.levels.len() - 1
    }

    /// Compare a new line's column against the stack.
    pub(crate) fn process(&mut self, column: u32) -> Result<IndentChange, LexErrorKind> {
        let current = self.levels.last().copied().unwrap_or(0);
        if column > current {
            self.levels.push(column);
            return Ok(IndentChange::Indent);
        }
        if column == current {
            return Ok(IndentChange::Same);
        }
        let mut popped = 0;
        while self.levels.last().is_some_and(|&level| level > column) {
            self.levels.pop();
            popped += 1;
        }
        if self.levels.last() != Some(&column) {
            return Err(LexErrorKind::InconsistentDedent);
        }
        Ok(IndentChange::Dedent(popped))
    }
}

/// Column of the first non-blank character of the line that ends at `offset`.
pub(crate) fn column_at(source: &str, offset: usize) -> u32 {
    let line_start = source[..offset].rfind('\n').map_or(0, |nl| nl + 1);
    let mut column = 0;
    for c in source[line_start..offset].chars() {
        match c {
            '\t' => column = (column / TAB_WIDTH + 1) * TAB_WIDTH,
            '\x0C' => column = 0,
            _ => column += 1,
        }
    }
    column
}

#[cfg(test)]
mod tests;
