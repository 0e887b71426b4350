//! An in-place, keyboard-driven reorderable table.
//!
//! The user moves a cursor with Up/Down, presses Space to grab the row under the cursor, carries
//! it with Up/Down, and presses Space again to drop it. Each redraw first erases the lines drawn
//! by the previous render so the table stays put instead of scrolling.

use std::io::{self, Write};
use std::ops::ControlFlow;

use crossterm::cursor::MoveUp;
use crossterm::queue;
use crossterm::style::{Print, PrintStyledContent, Stylize};
use crossterm::terminal::{Clear, ClearType};
use tracing::debug;

use crate::Result;
use crate::term::keys::{KeySource, ListKey};

/// Lines a render draws besides the data rows: title, three rules, and the header.
const CHROME_LINES: usize = 5;

const RULE: char = '─';

/// Anything that can be shown as one table row.
pub trait TableRow {
    fn cells(&self) -> Vec<String>;
}

impl TableRow for Vec<String> {
    fn cells(&self) -> Vec<String> {
        self.clone()
    }
}

/// How a row is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    None,
    /// The row is under the cursor.
    Cursor,
    /// The row is under the cursor and is being carried.
    Grabbed,
}

#[derive(Debug, Clone)]
pub struct ReorderableList<R> {
    title: String,
    columns: Vec<String>,
    rows: Vec<R>,
    cursor: usize,
    grabbed: bool,
    drawn_lines: usize,
}

impl<R: TableRow> ReorderableList<R> {
    pub fn new(title: impl Into<String>, columns: Vec<String>, rows: Vec<R>) -> Self {
        Self {
            title: title.into(),
            columns,
            rows,
            cursor: 0,
            grabbed: false,
            drawn_lines: 0,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<R> {
        self.rows
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_grabbed(&self) -> bool {
        self.grabbed
    }

    pub fn highlight(&self, idx: usize) -> Highlight {
        if idx != self.cursor || idx >= self.rows.len() {
            Highlight::None
        } else if self.grabbed {
            Highlight::Grabbed
        } else {
            Highlight::Cursor
        }
    }

    /// Apply one key. Breaks when the user is done.
    pub fn handle_key(&mut self, key: ListKey) -> ControlFlow<()> {
        match key {
            ListKey::Up => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    if self.grabbed {
                        self.rows.swap(self.cursor, self.cursor + 1);
                    }
                }
            }
            ListKey::Down => {
                if self.cursor + 1 < self.rows.len() {
                    self.cursor += 1;
                    if self.grabbed {
                        self.rows.swap(self.cursor - 1, self.cursor);
                    }
                }
            }
            ListKey::Select => self.grabbed = !self.grabbed,
            ListKey::Interrupt => return ControlFlow::Break(()),
        }

        debug!(?key, cursor = self.cursor, grabbed = self.grabbed, "list key handled");
        ControlFlow::Continue(())
    }

    /// Draw the table and return the number of lines written.
    pub fn render<W: Write>(&self, w: &mut W) -> io::Result<usize> {
        let rows: Vec<Vec<String>> = self.rows.iter().map(TableRow::cells).collect();
        let widths = column_widths(&self.columns, &rows);

        let header = format_line(&self.columns, &widths);
        let width = header.chars().count().max(self.title.chars().count());
        let rule: String = std::iter::repeat_n(RULE, width).collect();

        queue!(w, Print(format!("{:^width$}\n", self.title)))?;
        queue!(w, Print(format!("{rule}\n")))?;
        queue!(w, PrintStyledContent(header.bold()), Print("\n"))?;
        queue!(w, Print(format!("{rule}\n")))?;

        for (idx, cells) in rows.iter().enumerate() {
            let line = format!("{:<width$}", format_line(cells, &widths));
            match self.highlight(idx) {
                Highlight::None => queue!(w, Print(line))?,
                Highlight::Cursor => queue!(w, PrintStyledContent(line.on_green()))?,
                Highlight::Grabbed => queue!(w, PrintStyledContent(line.black().on_yellow()))?,
            }
            queue!(w, Print("\n"))?;
        }

        queue!(w, Print(format!("{rule}\n")))?;
        Ok(rows.len() + CHROME_LINES)
    }

    /// Run the interaction loop until the user interrupts it.
    ///
    /// Rows keep whatever order they reached; there is no rollback.
    pub fn interact<K, W>(&mut self, keys: &mut K, out: &mut W) -> Result<()>
    where
        K: KeySource,
        W: Write,
    {
        let mut dirty = true;
        loop {
            if dirty {
                self.redraw(out)?;
                dirty = false;
            }

            // Timeouts and unmapped keys change nothing, so there is nothing to redraw.
            let Some(key) = keys.read_key()? else {
                continue;
            };

            if self.handle_key(key).is_break() {
                break;
            }
            dirty = true;
        }
        Ok(())
    }

    fn redraw<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        for _ in 0..self.drawn_lines {
            queue!(out, MoveUp(1), Clear(ClearType::CurrentLine))?;
        }
        self.drawn_lines = self.render(out)?;
        out.flush()
    }
}

fn column_widths(columns: &[String], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for cells in rows {
        for (idx, cell) in cells.iter().enumerate().take(widths.len()) {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }
    widths
}

/// Lay cells out under the column widths. The first column is right-aligned, the rest left.
fn format_line(cells: &[String], widths: &[usize]) -> String {
    let parts: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(idx, &width)| {
            let cell = cells.get(idx).map(String::as_str).unwrap_or("");
            if idx == 0 {
                format!("{cell:>width$}")
            } else {
                format!("{cell:<width$}")
            }
        })
        .collect();
    format!(" {} ", parts.join("  "))
}
