//! Document construction: turns a [`ReportDocument`] into PDF bytes with `genpdf`.

use std::fs;
use std::path::{Path, PathBuf};

use genpdf::elements::{Break, PageBreak, Paragraph};
use genpdf::error::{Error, ErrorKind};
use genpdf::style::{self, Style};
use genpdf::{self, Alignment, Element, Margins, Mm, PageDecorator, PaperSize, Position, Size};
use log::debug;
use thiserror::Error as ThisError;

use crate::elements::{framed_table, FittedImage};
use crate::fonts;
use crate::model::{Block, ImageBlock, ReportDocument, RichParagraph, Section};

const DEFAULT_MARGIN_MM: f64 = 10.0;
const DEFAULT_FONT_SIZE: u8 = 10;
const TITLE_FONT_SIZE: u8 = 16;
const HEADING_FONT_SIZE: u8 = 12;
const FOOTER_HEIGHT_MM: f64 = 8.0;
const FOOTER_FONT_SIZE: u8 = 8;

/// Errors produced while turning a [`ReportDocument`] into PDF bytes.
#[derive(Debug, ThisError)]
pub enum PdfBuildError {
    #[error("failed to load fonts")]
    FontLoad(#[source] Error),

    #[error("failed to embed image {}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: Error,
    },

    #[error("failed to lay out table in section '{section}'")]
    Table {
        section: String,
        #[source]
        source: Error,
    },

    #[error("failed to render document")]
    Render(#[source] Error),
}

/// Builder for `genpdf::Document` instances pre-configured with the crate defaults.
#[derive(Default)]
pub struct DocumentBuilder {
    paper_size: Option<Size>,
    margins: Option<Margins>,
    footer: Option<FooterSpec>,
}

type ElementFactory = dyn Fn(usize) -> Box<dyn Element>;

impl DocumentBuilder {
    /// Creates a new builder instance with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the paper size used for newly created documents.
    pub fn with_paper_size(mut self, paper_size: impl Into<Size>) -> Self {
        self.paper_size = Some(paper_size.into());
        self
    }

    /// Sets the margins applied through the page decorator.
    pub fn with_margins(mut self, margins: impl Into<Margins>) -> Self {
        self.margins = Some(margins.into());
        self
    }

    /// Configures a footer callback with a fixed height that is invoked for every page.
    pub fn with_footer<F, E>(mut self, height: impl Into<Mm>, footer: F) -> Self
    where
        F: Fn(usize) -> E + 'static,
        E: Element + 'static,
    {
        self.footer = Some(FooterSpec::new(height, footer));
        self
    }

    /// Builds a fully configured `genpdf::Document` instance.
    pub fn build(self) -> Result<genpdf::Document, Error> {
        let font_family = fonts::default_font_family()?;
        let mut document = genpdf::Document::new(font_family);

        if let Some(paper_size) = self.paper_size {
            document.set_paper_size(paper_size);
        }

        let decorator = ConfiguredPageDecorator::new(self.margins, self.footer);
        document.set_page_decorator(decorator);

        Ok(document)
    }
}

/// Definition of a footer rendered through the page decorator.
pub struct FooterSpec {
    height: Mm,
    factory: Box<ElementFactory>,
}

impl FooterSpec {
    /// Creates a new footer specification.
    pub fn new<F, E>(height: impl Into<Mm>, factory: F) -> Self
    where
        F: Fn(usize) -> E + 'static,
        E: Element + 'static,
    {
        Self {
            height: height.into(),
            factory: Box::new(move |page| Box::new(factory(page)) as Box<dyn Element>),
        }
    }
}

struct ConfiguredPageDecorator {
    page: usize,
    margins: Option<Margins>,
    footer: Option<FooterSpec>,
}

impl ConfiguredPageDecorator {
    fn new(margins: Option<Margins>, footer: Option<FooterSpec>) -> Self {
        Self {
            page: 0,
            margins,
            footer,
        }
    }
}

impl PageDecorator for ConfiguredPageDecorator {
    fn decorate_page<'a>(
        &mut self,
        context: &genpdf::Context,
        mut area: genpdf::render::Area<'a>,
        style: style::Style,
    ) -> Result<genpdf::render::Area<'a>, Error> {
        self.page += 1;

        if let Some(margins) = self.margins {
            area.add_margins(margins);
        }

        if let Some(footer) = &self.footer {
            let available = area.size().height;
            if footer.height > available {
                return Err(Error::new(
                    "Footer height exceeds available space",
                    ErrorKind::InvalidData,
                ));
            }

            let mut footer_area = area.clone();
            footer_area.add_offset(Position::new(0, available - footer.height));
            let mut element = (footer.factory)(self.page);
            let result = element.render(context, footer_area, style)?;
            if result.has_more {
                return Err(Error::new(
                    "Footer element does not fit into the reserved space",
                    ErrorKind::PageSizeExceeded,
                ));
            }

            area.set_height(available - footer.height);
        }

        Ok(area)
    }
}

/// PDF bytes produced by [`PdfBuilder::render`].
#[derive(Clone, Debug)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
}

impl RenderedPdf {
    /// Writes the document to `path`, replacing any existing file.
    pub fn write_to(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        fs::write(path, &self.bytes)
    }
}

fn paragraph(rich: &RichParagraph) -> Paragraph {
    let mut paragraph = Paragraph::default();
    for span in rich.spans() {
        paragraph.push(span.to_styled_string());
    }
    paragraph
}

fn image(block: &ImageBlock) -> Result<FittedImage, PdfBuildError> {
    let image = FittedImage::from_path(block.path()).map_err(|source| PdfBuildError::Image {
        path: block.path().clone(),
        source,
    })?;
    let image = image
        .with_alignment(Alignment::Center)
        .with_width(block.width_mm().map(|width| Mm::from(printpdf::Mm(width))));
    let size = image.rendered_size();
    debug!(
        "Placing {} at {:?} x {:?}",
        block.path().display(),
        size.width,
        size.height
    );
    Ok(image)
}

/// Renders a [`ReportDocument`] on A4 pages with 10 mm margins and a `Page N` footer.
pub struct PdfBuilder {
    document: ReportDocument,
}

impl PdfBuilder {
    pub fn new(document: ReportDocument) -> Self {
        Self { document }
    }

    /// Lays out the document and returns the PDF bytes.
    pub fn render(self) -> Result<RenderedPdf, PdfBuildError> {
        let mut document = DocumentBuilder::new()
            .with_paper_size(PaperSize::A4)
            .with_margins(Mm::from(printpdf::Mm(DEFAULT_MARGIN_MM)))
            .with_footer(Mm::from(printpdf::Mm(FOOTER_HEIGHT_MM)), |page| {
                Paragraph::new(format!("Page {}", page))
                    .aligned(Alignment::Right)
                    .styled(Style::new().with_font_size(FOOTER_FONT_SIZE))
            })
            .build()
            .map_err(PdfBuildError::FontLoad)?;
        document.set_title(self.document.title());
        document.set_font_size(DEFAULT_FONT_SIZE);

        document.push(
            Paragraph::new(self.document.title())
                .aligned(Alignment::Center)
                .styled(Style::new().bold().with_font_size(TITLE_FONT_SIZE)),
        );
        document.push(Break::new(1.5));

        for section in self.document.sections() {
            push_section(&mut document, section)?;
        }

        let mut bytes = Vec::new();
        document.render(&mut bytes).map_err(PdfBuildError::Render)?;
        debug!("Rendered PDF '{}' ({} bytes)", self.document.title(), bytes.len());
        Ok(RenderedPdf { bytes })
    }
}

fn push_section(document: &mut genpdf::Document, section: &Section) -> Result<(), PdfBuildError> {
    let mut blocks = section.blocks();
    if section.starts_on_new_page() {
        document.push(PageBreak::new());
        blocks = &blocks[1..];
    }

    document.push(
        Paragraph::new(section.title())
            .styled(Style::new().bold().with_font_size(HEADING_FONT_SIZE)),
    );
    document.push(Break::new(0.5));

    for block in blocks {
        match block {
            Block::Paragraph(rich) => document.push(paragraph(rich)),
            Block::Image(image_block) => document.push(image(image_block)?),
            Block::Table(table) => {
                let layout = framed_table(table).map_err(|source| PdfBuildError::Table {
                    section: section.title().to_owned(),
                    source,
                })?;
                document.push(layout);
            }
            Block::Spacer(lines) => document.push(Break::new(*lines)),
            Block::PageBreak => document.push(PageBreak::new()),
        }
    }

    Ok(())
}
