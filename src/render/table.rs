//! Box-drawn text tables.

use std::fmt::Write as _;
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

#[derive(Debug, Clone)]
pub struct Table {
    head: Vec<String>,
    align: Vec<Align>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(head: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let head: Vec<String> = head.into_iter().map(Into::into).collect();
        let align = vec![Align::Left; head.len()];
        Self {
            head,
            align,
            rows: Vec::new(),
        }
    }

    pub fn align(mut self, column: usize, align: Align) -> Self {
        if let Some(slot) = self.align.get_mut(column) {
            *slot = align;
        }
        self
    }

    /// Short rows are padded with empty cells; extra cells are dropped.
    pub fn push<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = row.into_iter().map(Into::into).collect();
        row.resize(self.head.len(), String::new());
        self.rows.push(row);
    }

    pub fn render(&self) -> String {
        let widths: Vec<usize> = (0..self.head.len())
            .map(|col| {
                std::iter::once(&self.head[col])
                    .chain(self.rows.iter().map(|r| &r[col]))
                    .map(|cell| cell.width())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        out.push_str(&rule(&widths, '┌', '┬', '┐'));
        out.push_str(&line(&self.head, &widths, &vec![Align::Left; widths.len()]));
        out.push_str(&rule(&widths, '├', '┼', '┤'));
        for row in &self.rows {
            out.push_str(&line(row, &widths, &self.align));
        }
        out.push_str(&rule(&widths, '└', '┴', '┘'));
        out
    }
}

fn rule(widths: &[usize], left: char, mid: char, right: char) -> String {
    let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
    format!("{}{}{}\n", left, segments.join(&mid.to_string()), right)
}

fn line(cells: &[String], widths: &[usize], align: &[Align]) -> String {
    let mut out = String::from("│");
    for ((cell, width), align) in cells.iter().zip(widths).zip(align) {
        let pad = " ".repeat(width.saturating_sub(cell.width()));
        match align {
            Align::Left => write!(out, " {}{} │", cell, pad),
            Align::Right => write!(out, " {}{} │", pad, cell),
        }
        .unwrap();
    }
    out.push('\n');
    out
}
