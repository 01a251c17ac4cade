//! GFM table parsing, pretty-printing, and HTML rendering.
//!
//! [`TableModel`] supplies the shape of a table (alignments, column count,
//! ragged rows) to the renderer and the formatter. Cell content is supplied by
//! the caller, so the table plugin can render cells as inline markdown.

use std::fmt::Write;

use crate::util::escape_html;

/// Column alignment from the delimiter row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Alignment {
    /// `---` or `:---`.
    #[default]
    Left,
    /// `:---:`.
    Center,
    /// `---:`.
    Right,
}

impl Alignment {
    /// Parse one trimmed delimiter cell. `None` if it is not `:?-+:?`.
    fn parse(cell: &str) -> Option<Self> {
        let leading = cell.starts_with(':');
        let trailing = cell.len() > 1 && cell.ends_with(':');
        let dashes = &cell[usize::from(leading)..cell.len() - usize::from(trailing)];
        if dashes.is_empty() || !dashes.bytes().all(|b| b == b'-') {
            return None;
        }
        Some(match (leading, trailing) {
            (true, true) => Self::Center,
            (false, true) => Self::Right,
            _ => Self::Left,
        })
    }

    fn delimiter(self, width: usize) -> String {
        match self {
            Self::Left => "-".repeat(width),
            Self::Center => format!(":{}:", "-".repeat(width - 2)),
            Self::Right => format!("{}:", "-".repeat(width - 1)),
        }
    }

    fn pad(self, cell: &str, width: usize) -> String {
        let space = width.saturating_sub(cell.chars().count());
        match self {
            Self::Left => format!("{cell}{}", " ".repeat(space)),
            Self::Right => format!("{}{cell}", " ".repeat(space)),
            Self::Center => {
                let left = space / 2;
                format!("{}{cell}{}", " ".repeat(left), " ".repeat(space - left))
            }
        }
    }

    fn style(self) -> &'static str {
        match self {
            Self::Left => r#" style="text-align:left""#,
            Self::Center => r#" style="text-align:center""#,
            Self::Right => r#" style="text-align:right""#,
        }
    }
}

/// Parsed table: header cells, column alignments, data rows.
///
/// Rows may be ragged; missing cells read as empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableModel {
    /// Header cells.
    pub headers: Vec<String>,
    /// One alignment per header column.
    pub alignments: Vec<Alignment>,
    /// Data rows.
    pub rows: Vec<Vec<String>>,
}

impl TableModel {
    /// Parse table source. Returns `None` if the text is not a table.
    ///
    /// # Example
    ///
    /// ```
    /// use inkset_engine::table::{Alignment, TableModel};
    ///
    /// let table = TableModel::parse("| a | b |\n|:-:|--:|\n| 1 |").unwrap();
    /// assert_eq!(table.alignments, vec![Alignment::Center, Alignment::Right]);
    /// assert_eq!(table.cell(0, 1), "");
    ///
    /// assert!(TableModel::parse("| a | b |\n| -- | x |").is_none());
    /// ```
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let mut lines = text.lines().filter(|line| !line.trim().is_empty());
        let headers = split_cells(lines.next()?);
        let delimiter = split_cells(lines.next()?);

        let mut alignments = delimiter
            .iter()
            .map(|cell| Alignment::parse(cell))
            .collect::<Option<Vec<_>>>()?;
        alignments.resize(headers.len(), Alignment::Left);

        let rows = lines.map(split_cells).collect();
        Some(Self {
            headers,
            alignments,
            rows,
        })
    }

    /// Number of columns (the header width).
    #[must_use]
    pub fn columns(&self) -> usize {
        self.headers.len()
    }

    /// Cell text, empty for cells a ragged row lacks.
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map_or("", String::as_str)
    }

    /// Width of each column: at least 3, else the longest cell.
    #[must_use]
    pub fn widths(&self) -> Vec<usize> {
        (0..self.columns())
            .map(|column| {
                let header = self.headers[column].chars().count();
                (0..self.rows.len())
                    .map(|row| self.cell(row, column).chars().count())
                    .fold(header.max(3), usize::max)
            })
            .collect()
    }

    /// Pretty-print as aligned markdown.
    ///
    /// Formatting is idempotent: parsing and formatting the output again
    /// yields the same text.
    #[must_use]
    pub fn format(&self) -> String {
        let widths = self.widths();
        let columns = 0..self.columns();

        let header = columns
            .clone()
            .map(|c| self.alignments[c].pad(&self.headers[c], widths[c]));
        let delimiter = columns
            .clone()
            .map(|c| self.alignments[c].delimiter(widths[c]));

        let mut lines = vec![row_line(header), row_line(delimiter)];
        lines.extend((0..self.rows.len()).map(|row| {
            row_line(
                columns
                    .clone()
                    .map(|c| self.alignments[c].pad(self.cell(row, c), widths[c])),
            )
        }));
        lines.join("\n")
    }

    /// Cell text as escaped HTML; `row` is `None` for the header.
    #[must_use]
    pub fn plain_html(&self, row: Option<usize>, column: usize) -> String {
        let text = match row {
            None => self.headers.get(column).map_or("", String::as_str),
            Some(row) => self.cell(row, column),
        };
        escape_html(&text.replace("\\|", "|"))
    }

    /// Render as an HTML table with escaped plain-text cells.
    #[must_use]
    pub fn to_html(&self) -> String {
        self.to_html_with(|row, column| self.plain_html(row, column))
    }

    /// Render as an HTML table, taking each cell's content from `content`.
    ///
    /// `content` receives `None` as the row of header cells. It is called for
    /// every column of every row, including cells a ragged row lacks.
    pub fn to_html_with(&self, mut content: impl FnMut(Option<usize>, usize) -> String) -> String {
        let mut out = String::from("<table><thead><tr>");
        for column in 0..self.columns() {
            let style = self.alignments[column].style();
            let _ = write!(out, "<th{style}>{}</th>", content(None, column));
        }
        out.push_str("</tr></thead>");

        if !self.rows.is_empty() {
            out.push_str("<tbody>");
            for row in 0..self.rows.len() {
                out.push_str("<tr>");
                for column in 0..self.columns() {
                    let style = self.alignments[column].style();
                    let _ = write!(out, "<td{style}>{}</td>", content(Some(row), column));
                }
                out.push_str("</tr>");
            }
            out.push_str("</tbody>");
        }

        out.push_str("</table>");
        out
    }
}

/// Parse and pretty-print table source. `None` if it is not a table.
#[must_use]
pub fn format_table(text: &str) -> Option<String> {
    TableModel::parse(text).map(|table| table.format())
}

/// Split a row on unescaped pipes; one leading and one trailing pipe are optional.
fn split_cells(line: &str) -> Vec<String> {
    let mut line = line.trim();
    line = line.strip_prefix('|').unwrap_or(line);
    if line.ends_with('|') && !line.ends_with("\\|") {
        line = &line[..line.len() - 1];
    }

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                current.push(c);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            '|' => cells.push(std::mem::take(&mut current).trim().to_owned()),
            _ => current.push(c),
        }
    }
    cells.push(current.trim().to_owned());
    cells
}

fn row_line(cells: impl Iterator<Item = String>) -> String {
    format!("| {} |", cells.collect::<Vec<_>>().join(" | "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_alignments() {
        let table = TableModel::parse("a | b | c | d\n--- | :-- | :-: | --:").unwrap();
        assert_eq!(table.headers, vec!["a", "b", "c", "d"]);
        assert_eq!(
            table.alignments,
            vec![
                Alignment::Left,
                Alignment::Left,
                Alignment::Center,
                Alignment::Right
            ]
        );
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_reject_bad_delimiter() {
        assert_eq!(TableModel::parse("| a | b |\n| -- | x |"), None);
        assert_eq!(TableModel::parse("| a |\n| : |"), None);
        assert_eq!(TableModel::parse("| a |\n| :: |"), None);
        assert_eq!(TableModel::parse("| a |"), None);
        assert_eq!(format_table("| a | b |\n| -- | x |"), None);
    }

    #[test]
    fn test_escaped_pipe_stays_in_cell() {
        let table = TableModel::parse("| a \\| b | c |\n|---|---|").unwrap();
        assert_eq!(table.headers, vec!["a \\| b", "c"]);
        assert!(table.to_html().contains("<th style=\"text-align:left\">a | b</th>"));
    }

    #[test]
    fn test_format() {
        let formatted = format_table("|a|Right|c|\n|-|--:|:-:|\n|long cell|1|\n|x|22|yy|").unwrap();
        assert_eq!(
            formatted,
            "| a         | Right |  c  |\n\
             | --------- | ----: | :-: |\n\
             | long cell |     1 |     |\n\
             | x         |    22 | yy  |"
        );
    }

    #[test]
    fn test_format_is_idempotent() {
        let inputs = [
            "|a|b|\n|-|-|\n|1|2|",
            "| x | y |\n|:-:|--:|\n| centered text | r |\n| odd |",
            "h\n---\nvalue",
            "| é | ü |\n|---|---|\n| ça | über |",
            "| a \\| b |\n|:--|\n| c |",
        ];
        for input in inputs {
            let once = format_table(input).unwrap();
            let twice = format_table(&once).unwrap();
            assert_eq!(once, twice, "input: {input}");
        }
    }

    #[test]
    fn test_center_extra_space_right() {
        assert_eq!(Alignment::Center.pad("ab", 5), " ab  ");
        assert_eq!(Alignment::Right.pad("ab", 5), "   ab");
        assert_eq!(Alignment::Left.pad("ab", 5), "ab   ");
    }

    #[test]
    fn test_to_html_with_asks_for_every_cell() {
        let table = TableModel::parse("| a | b |\n|---|---|\n| 1 |").unwrap();
        let mut asked = Vec::new();
        let html = table.to_html_with(|row, column| {
            asked.push((row, column));
            format!("{row:?}:{column}")
        });
        assert_eq!(
            asked,
            vec![(None, 0), (None, 1), (Some(0), 0), (Some(0), 1)]
        );
        assert!(html.contains("<td style=\"text-align:left\">Some(0):1</td>"));
    }

    #[test]
    fn test_to_html_pads_ragged_rows() {
        let table = TableModel::parse("| a | b |\n|---|--:|\n| <1> |").unwrap();
        assert_eq!(
            table.to_html(),
            "<table><thead><tr><th style=\"text-align:left\">a</th>\
             <th style=\"text-align:right\">b</th></tr></thead>\
             <tbody><tr><td style=\"text-align:left\">&lt;1&gt;</td>\
             <td style=\"text-align:right\"></td></tr></tbody></table>"
        );
    }
}
