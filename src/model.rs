/// Marker carried by a `w:fldChar` run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldChar {
    Begin,
    Separate,
    End,
}

#[derive(Clone, Debug, Default)]
pub struct Run {
    /// Displayed text of the run (`w:t`, tabs and breaks).
    pub text: String,
    pub field_char: Option<FieldChar>,
    /// Field instruction carried by `w:instrText`, e.g. ` MERGEFIELD CAL_DATE \* MERGEFORMAT `.
    pub instr_text: Option<String>,
}

/// A self-contained `w:fldSimple` node: instruction plus its own displayed text.
#[derive(Clone, Debug)]
pub struct SimpleField {
    pub instr: String,
    pub text: String,
}

#[derive(Clone, Debug, Default)]
pub struct Paragraph {
    pub runs: Vec<Run>,
    pub simple_fields: Vec<SimpleField>,
}

impl Paragraph {
    /// Raw paragraph text, every run's displayed text in order.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Paragraph text with whitespace runs collapsed to one space.
    pub fn normalized_text(&self) -> String {
        collapse_whitespace(&self.text())
    }
}

#[derive(Clone, Debug, Default)]
pub struct TableCell {
    /// Paragraphs and nested tables in document order.
    pub blocks: Vec<Block>,
}

impl TableCell {
    /// Cell text: its own paragraphs joined, whitespace-collapsed. Nested
    /// tables are not part of the cell text.
    pub fn text(&self) -> String {
        let joined: Vec<String> = self
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::Paragraph(p) => Some(p.text()),
                Block::Table(_) => None,
            })
            .collect();
        collapse_whitespace(&joined.join("\n"))
    }

    pub fn nested_tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            Block::Paragraph(_) => None,
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

impl TableRow {
    pub fn cell_texts(&self) -> Vec<String> {
        self.cells.iter().map(TableCell::text).collect()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Table {
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Rows in document order, with the rows of any nested table visited
    /// directly after the row that contains it.
    pub fn flattened_rows(&self) -> Vec<&TableRow> {
        let mut out = Vec::new();
        flatten_rows(self, &mut out);
        out
    }
}

fn flatten_rows<'a>(table: &'a Table, out: &mut Vec<&'a TableRow>) {
    for row in &table.rows {
        out.push(row);
        for cell in &row.cells {
            for nested in cell.nested_tables() {
                flatten_rows(nested, out);
            }
        }
    }
}

#[derive(Clone, Debug)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

/// A `w:sdt` content control.
#[derive(Clone, Debug, Default)]
pub struct ContentControl {
    pub tag: Option<String>,
    pub alias: Option<String>,
    pub text: String,
}

#[derive(Clone, Debug, Default)]
pub struct Document {
    pub body: Vec<Block>,
    /// Header and footer parts, each part's blocks in order, parts in first
    /// reference order.
    pub headers_footers: Vec<Block>,
    pub content_controls: Vec<ContentControl>,
}

impl Document {
    /// Every paragraph surface: body, table cells (recursively), then
    /// headers and footers.
    pub fn paragraphs(&self) -> Vec<&Paragraph> {
        let mut out = Vec::new();
        collect_paragraphs(&self.body, &mut out);
        collect_paragraphs(&self.headers_footers, &mut out);
        out
    }
}

fn collect_paragraphs<'a>(blocks: &'a [Block], out: &mut Vec<&'a Paragraph>) {
    for block in blocks {
        match block {
            Block::Paragraph(p) => out.push(p),
            Block::Table(t) => {
                for row in &t.rows {
                    for cell in &row.cells {
                        collect_paragraphs(&cell.blocks, out);
                    }
                }
            }
        }
    }
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
