//! Element implementations built on top of `genpdf` primitives.
//!
//! This module adds a width-constrained image element for the chart images, helpers for decoding
//! image files with descriptive errors, and the conversion of [`TableBlock`]s into framed tables.

use std::path::Path;

use image::GenericImageView;

use genpdf::elements::{FrameCellDecorator, Image, Paragraph, TableLayout};
use genpdf::error::{Context as _, Error};
use genpdf::style::Style;
use genpdf::{render, Alignment, Element, Mm, RenderResult, Scale, Size};

use crate::model::TableBlock;

const DEFAULT_IMAGE_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;
const TABLE_CELL_PADDING_MM: f64 = 1.5;

fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

fn estimated_image_size(image: &image::DynamicImage, dpi: f64) -> Size {
    let (px_width, px_height) = image.dimensions();
    let width_mm = MM_PER_INCH * (px_width as f64) / dpi;
    let height_mm = MM_PER_INCH * (px_height as f64) / dpi;
    Size::new(mm_from_f64(width_mm), mm_from_f64(height_mm))
}

/// Loads an image from the given path using the [`image`] crate with descriptive errors.
pub fn decode_image_from_path(path: impl AsRef<Path>) -> Result<image::DynamicImage, Error> {
    let path = path.as_ref();
    let reader = image::io::Reader::open(path)
        .with_context(|| format!("Failed to open image file {}", path.display()))?;
    reader
        .with_guessed_format()
        .context("Unable to determine image format")?
        .decode()
        .with_context(|| format!("Failed to decode image file {}", path.display()))
}

/// Converts the image at `path` into a `genpdf` image together with its natural size.
pub fn image_from_path(path: impl AsRef<Path>) -> Result<(Image, Size), Error> {
    let dynamic = decode_image_from_path(path)?;
    let size = estimated_image_size(&dynamic, DEFAULT_IMAGE_DPI);
    let image = Image::from_dynamic_image(dynamic)?;
    Ok((image, size))
}

/// Scale factor that brings `natural` to `desired` millimetres, if the image has a width at all.
fn width_scale(natural: Mm, desired: Mm) -> Option<f64> {
    let natural = mm_to_f64(natural);
    (natural > f64::EPSILON).then(|| mm_to_f64(desired) / natural)
}

/// An image that can be rescaled to a fixed width while keeping its aspect ratio.
pub struct FittedImage {
    image: Image,
    alignment: Alignment,
    natural_size: Size,
    requested_width: Option<Mm>,
}

impl FittedImage {
    /// Creates the element from the image file at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let (image, natural_size) = image_from_path(path)?;
        Ok(Self {
            image,
            alignment: Alignment::Left,
            natural_size,
            requested_width: None,
        })
    }

    /// Sets the horizontal alignment and returns the updated element.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Constrains the rendered width and returns the updated element.
    pub fn with_width(mut self, width: impl Into<Option<Mm>>) -> Self {
        self.requested_width = width.into();
        self
    }

    /// Size the image occupies once the requested width is applied.
    pub fn rendered_size(&self) -> Size {
        match self
            .requested_width
            .and_then(|width| width_scale(self.natural_size.width, width))
        {
            Some(scale) => Size::new(
                mm_from_f64(mm_to_f64(self.natural_size.width) * scale),
                mm_from_f64(mm_to_f64(self.natural_size.height) * scale),
            ),
            None => self.natural_size,
        }
    }

    fn apply_layout(&mut self) {
        self.image.set_alignment(self.alignment);
        let scale = self
            .requested_width
            .and_then(|width| width_scale(self.natural_size.width, width))
            .unwrap_or(1.0);
        self.image.set_scale(Scale::new(scale, scale));
    }
}

impl Element for FittedImage {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        self.apply_layout();
        self.image.render(context, area, style)
    }
}

/// Converts a [`TableBlock`] into a framed `genpdf` table with a bold header row.
pub fn framed_table(table: &TableBlock) -> Result<TableLayout, Error> {
    let weights = table.columns().iter().map(|column| column.weight()).collect();
    let mut layout = TableLayout::new(weights);
    layout.set_cell_decorator(FrameCellDecorator::new(true, true, false));

    let padding = mm_from_f64(TABLE_CELL_PADDING_MM);
    let mut header = layout.row();
    for column in table.columns() {
        header.push_element(
            Paragraph::new(column.header())
                .styled(Style::new().bold())
                .padded(padding),
        );
    }
    header.push()?;

    for cells in table.rows() {
        let mut row = layout.row();
        for cell in cells {
            row.push_element(Paragraph::new(cell.as_str()).padded(padding));
        }
        row.push()?;
    }

    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_scale_preserves_aspect_ratio_inputs() {
        let scale = width_scale(mm_from_f64(100.0), mm_from_f64(190.0)).unwrap();
        assert!((scale - 1.9).abs() < 1e-9);
        assert_eq!(width_scale(mm_from_f64(0.0), mm_from_f64(190.0)), None);
    }

    #[test]
    fn natural_size_uses_300_dpi() {
        let image = image::DynamicImage::new_rgb8(300, 150);
        let size = estimated_image_size(&image, DEFAULT_IMAGE_DPI);
        assert!((mm_to_f64(size.width) - 25.4).abs() < 1e-9);
        assert!((mm_to_f64(size.height) - 12.7).abs() < 1e-9);
    }

    #[test]
    fn fitted_image_reports_scaled_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.png");
        image::DynamicImage::new_rgb8(1200, 600).save(&path).unwrap();

        let element = FittedImage::from_path(&path)
            .unwrap()
            .with_width(mm_from_f64(190.0));
        let size = element.rendered_size();
        assert!((mm_to_f64(size.width) - 190.0).abs() < 1e-6);
        assert!((mm_to_f64(size.height) - 95.0).abs() < 1e-6);
    }

    #[test]
    fn missing_image_reports_path() {
        let err = match decode_image_from_path("does/not/exist.png") {
            Err(err) => err,
            Ok(_) => panic!("decoding a missing file should fail"),
        };
        assert!(err.to_string().contains("does/not/exist.png"));
    }
}
