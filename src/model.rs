//! Data structures describing the logical content of the report document.
//!
//! The types in this module mirror the building blocks the PDF builder knows how to lay out
//! without referencing `genpdf` directly, so a report can be assembled and inspected (for
//! example in tests) before anything is rendered.

use std::path::PathBuf;

use crate::richtext::Span;

/// Left-aligned paragraph made of styled spans.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RichParagraph {
    spans: Vec<Span>,
}

impl RichParagraph {
    /// Creates a paragraph from the provided spans.
    pub fn new(spans: impl Into<Vec<Span>>) -> Self {
        Self {
            spans: spans.into(),
        }
    }

    /// Returns the spans that make up the paragraph.
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }
}

/// A centered chart image loaded from disk when the document is rendered.
///
/// The width is stored in millimetres; the image is scaled to it while keeping the aspect ratio.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageBlock {
    path: PathBuf,
    width_mm: Option<f64>,
}

impl ImageBlock {
    /// Creates a new image block for the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            width_mm: None,
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn width_mm(&self) -> Option<f64> {
        self.width_mm
    }

    /// Constrains the rendered width (in millimetres) and returns the updated block.
    pub fn with_width_mm(mut self, width_mm: impl Into<Option<f64>>) -> Self {
        self.width_mm = width_mm.into();
        self
    }
}

/// Column definition of a [`TableBlock`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableColumn {
    header: String,
    weight: usize,
}

impl TableColumn {
    /// Creates a column; `weight` is its share of the table width relative to the other columns.
    pub fn new(header: impl Into<String>, weight: usize) -> Self {
        Self {
            header: header.into(),
            weight: weight.max(1),
        }
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn weight(&self) -> usize {
        self.weight
    }
}

/// A framed table with a bold header row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableBlock {
    columns: Vec<TableColumn>,
    rows: Vec<Vec<String>>,
}

impl TableBlock {
    pub fn new(columns: impl Into<Vec<TableColumn>>) -> Self {
        Self {
            columns: columns.into(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[TableColumn] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Appends a row. Missing trailing cells are left blank and surplus cells are dropped.
    pub fn with_row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = cells
            .into_iter()
            .take(self.columns.len())
            .map(Into::into)
            .collect();
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
        self
    }
}

/// Individual content blocks that make up sections.
#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    /// Styled paragraph content.
    Paragraph(RichParagraph),
    /// Image content.
    Image(ImageBlock),
    /// Tabular content.
    Table(TableBlock),
    /// Vertical gap measured in lines.
    Spacer(f64),
    /// Explicit page break request.
    PageBreak,
}

impl Block {
    /// Convenience helper for building a paragraph block.
    pub fn paragraph(spans: impl Into<Vec<Span>>) -> Self {
        Self::Paragraph(RichParagraph::new(spans))
    }
}

/// Logical representation of a titled document section.
#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    title: String,
    blocks: Vec<Block>,
}

impl Section {
    /// Creates a new section with the provided title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            blocks: Vec::new(),
        }
    }

    /// Returns the title of the section.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the blocks contained in the section.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Appends a block and returns the updated section.
    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    /// Extends the section with additional blocks and returns the updated instance.
    pub fn with_blocks<I>(mut self, blocks: I) -> Self
    where
        I: IntoIterator<Item = Block>,
    {
        self.blocks.extend(blocks);
        self
    }

    /// Creates a builder that can inject an initial page break.
    pub fn builder(title: impl Into<String>) -> SectionBuilder {
        SectionBuilder::new(title)
    }

    /// Returns `true` when the section begins with a page break.
    pub fn starts_on_new_page(&self) -> bool {
        matches!(self.blocks.first(), Some(Block::PageBreak))
    }
}

/// Builder for [`Section`] values.
///
/// Callers can opt in to inserting a page break at the beginning of the section via
/// [`SectionBuilder::start_on_new_page`].
#[derive(Clone, Debug, Default)]
pub struct SectionBuilder {
    title: String,
    blocks: Vec<Block>,
    start_on_new_page: bool,
}

impl SectionBuilder {
    /// Creates a builder for a section with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Marks the section to start on a new page.
    pub fn start_on_new_page(mut self, start_on_new_page: bool) -> Self {
        self.start_on_new_page = start_on_new_page;
        self
    }

    /// Pushes an additional block into the section.
    pub fn push_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    /// Builds the final section, injecting a leading page break when requested.
    pub fn build(mut self) -> Section {
        if self.start_on_new_page {
            match self.blocks.first() {
                Some(Block::PageBreak) => {}
                _ => self.blocks.insert(0, Block::PageBreak),
            }
        }

        let mut section = Section::new(self.title);
        section.blocks = self.blocks;
        section
    }
}

/// A whole document: a centered title followed by sections.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReportDocument {
    title: String,
    sections: Vec<Section>,
}

impl ReportDocument {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sections: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Appends a section and returns the updated document.
    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// Looks up a section by title.
    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.title() == title)
    }
}
