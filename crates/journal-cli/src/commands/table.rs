//! Plain text tables

use std::io::{self, Write};

use super::sgr::visible_width;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Column-aligned table with an optional footer row
pub struct Table {
    headers: Vec<String>,
    aligns: Vec<Align>,
    rows: Vec<Vec<String>>,
    footer: Option<Vec<String>>,
}

impl Table {
    pub fn new(columns: &[(&str, Align)]) -> Self {
        Self {
            headers: columns.iter().map(|(name, _)| name.to_uppercase()).collect(),
            aligns: columns.iter().map(|(_, align)| *align).collect(),
            rows: Vec::new(),
            footer: None,
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn set_footer(&mut self, row: Vec<String>) {
        self.footer = Some(row);
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| visible_width(h)).collect();
        for row in self.rows.iter().chain(self.footer.iter()) {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(visible_width(cell));
            }
        }
        widths
    }

    fn write_row<W: Write>(&self, out: &mut W, row: &[String], widths: &[usize]) -> io::Result<()> {
        let cells: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, width)| {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                let pad = " ".repeat(width.saturating_sub(visible_width(cell)));
                match self.aligns[i] {
                    Align::Left => format!("{}{}", cell, pad),
                    Align::Right => format!("{}{}", pad, cell),
                }
            })
            .collect();
        writeln!(out, " {} ", cells.join(" │ "))
    }

    fn write_rule<W: Write>(&self, out: &mut W, widths: &[usize]) -> io::Result<()> {
        let parts: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        writeln!(out, "{}", parts.join("┼"))
    }

    pub fn render<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let widths = self.widths();
        self.write_row(out, &self.headers, &widths)?;
        self.write_rule(out, &widths)?;
        for row in &self.rows {
            self.write_row(out, row, &widths)?;
        }
        if let Some(footer) = &self.footer {
            self.write_rule(out, &widths)?;
            self.write_row(out, footer, &widths)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        let mut table = Table::new(&[("Group", Align::Left), ("Sum", Align::Right)]);
        table.push(vec!["Groceries".into(), "-370,50".into()]);
        table.push(vec!["Salary".into(), "25000,00".into()]);
        table.set_footer(vec!["Total".into(), "24629,50".into()]);

        let mut out = Vec::new();
        table.render(&mut out).unwrap();
        let want = " GROUP     │      SUM \n\
                    ───────────┼──────────\n \
                    Groceries │  -370,50 \n \
                    Salary    │ 25000,00 \n\
                    ───────────┼──────────\n \
                    Total     │ 24629,50 \n";
        assert_eq!(String::from_utf8(out).unwrap(), want);
    }

    #[test]
    fn test_colored_cells_align() {
        let mut table = Table::new(&[("A", Align::Right)]);
        table.push(vec!["\x1b[1;31m12\x1b[0m".into()]);
        table.push(vec!["123".into()]);

        let mut out = Vec::new();
        table.render(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[2], "  \x1b[1;31m12\x1b[0m ");
        assert_eq!(lines[3], " 123 ");
    }
}
