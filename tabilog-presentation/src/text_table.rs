use std::borrow::Cow;

const COLUMN_GAP: &str = "  ";
const RULE: char = '-';

#[derive(Default)]
pub struct TextTableBuilder<'a, Seq> {
    headers: &'a [Cow<'a, str>],
    rows: Vec<Seq>,
    alignments: Cow<'a, [Alignment]>,
}

#[derive(Clone, Copy, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl<'a, Seq> TextTableBuilder<'a, Seq>
where
    Seq: AsRef<[Cow<'a, str>]> + Default,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alignments(mut self, alignments: &'a [Alignment]) -> Self {
        self.alignments = Cow::Borrowed(alignments);
        self
    }

    pub fn headers(mut self, headers: &'a [Cow<'a, str>]) -> Self {
        self.headers = headers;
        if self.alignments.is_empty() {
            self.alignments = Cow::Owned(vec![Alignment::default(); self.headers.len()]);
        }
        self
    }

    pub fn row(mut self, row: Seq) -> Self {
        self.rows.push(row);
        self
    }

    pub fn rows(mut self, rows: impl IntoIterator<Item = Seq>) -> Self {
        self.rows.extend(rows);
        self
    }

    /// Renders a header line, a rule and one line per row. Every line ends
    /// with `\n` and carries no trailing spaces.
    pub fn build(self) -> String {
        let col_count = self.headers.len();
        if col_count == 0 {
            return String::new();
        }

        let mut col_widths: Vec<usize> = self.headers.iter().map(|h| display_width(h)).collect();
        for row in &self.rows {
            for (i, cell) in row.as_ref().iter().take(col_count).enumerate() {
                col_widths[i] = col_widths[i].max(display_width(cell));
            }
        }

        let line_width = col_widths.iter().sum::<usize>() + COLUMN_GAP.len() * col_count;
        let mut table = String::with_capacity(line_width * (self.rows.len() + 2));

        self.push_line(&mut table, self.headers, &col_widths);
        let rule = col_widths
            .iter()
            .map(|width| RULE.to_string().repeat(*width))
            .collect::<Vec<_>>()
            .join(COLUMN_GAP);
        table.push_str(&rule);
        table.push('\n');

        for row in &self.rows {
            self.push_line(&mut table, row.as_ref(), &col_widths);
        }

        table
    }

    fn push_line(&self, table: &mut String, cells: &[Cow<'_, str>], col_widths: &[usize]) {
        let mut line = String::new();
        for (i, width) in col_widths.iter().enumerate() {
            if i > 0 {
                line.push_str(COLUMN_GAP);
            }
            let cell = cells.get(i).map(|cell| &**cell).unwrap_or_default();
            let alignment = self.alignments.get(i).copied().unwrap_or_default();
            pad_cell(&mut line, cell, *width, alignment);
        }
        table.push_str(line.trim_end());
        table.push('\n');
    }
}

/// Terminal columns taken by `text`; non-ASCII counts as double width so CJK
/// names line up.
fn display_width(text: &str) -> usize {
    text.chars().map(|c| if c.is_ascii() { 1 } else { 2 }).sum()
}

fn pad_cell(line: &mut String, cell: &str, width: usize, alignment: Alignment) {
    let fill = width.saturating_sub(display_width(cell));
    let (before, after) = match alignment {
        Alignment::Left => (0, fill),
        Alignment::Center => (fill / 2, fill - fill / 2),
        Alignment::Right => (fill, 0),
    };
    line.extend(std::iter::repeat_n(' ', before));
    line.push_str(cell);
    line.extend(std::iter::repeat_n(' ', after));
}
