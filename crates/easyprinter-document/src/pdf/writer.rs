// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer: wrap a scanned raster in a single-page PDF using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use easyprinter_core::settings::PaperSize;
use image::RgbImage;
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use tracing::{debug, info, instrument};

/// Builds single-page image PDFs sized for printing.
pub struct PdfWriter {
    paper_size: PaperSize,
    title: String,
    /// Resolution the raster was captured at; sets its physical size.
    dpi: f32,
    margin_mm: f32,
}

impl PdfWriter {
    pub fn new(paper_size: PaperSize) -> Self {
        Self {
            paper_size,
            title: "EasyPrinter Scan".into(),
            dpi: 300.0,
            margin_mm: 0.0,
        }
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi.max(1) as f32;
        self
    }

    pub fn with_margin_mm(mut self, margin_mm: f32) -> Self {
        self.margin_mm = margin_mm.max(0.0);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Create a single-page PDF containing `rgb`.
    ///
    /// The image keeps its physical size at the configured DPI, is shrunk
    /// (never enlarged) to fit inside the margins, and is centred.
    #[instrument(skip_all, fields(width = rgb.width(), height = rgb.height()))]
    pub fn create_from_image(&self, rgb: &RgbImage) -> Vec<u8> {
        let (w_mm, h_mm) = self.paper_size.dimensions_mm();
        let (page_w, page_h) = (Mm(w_mm), Mm(h_mm));

        info!(paper = ?self.paper_size, dpi = self.dpi, "Creating image PDF");

        let img_width = rgb.width() as usize;
        let img_height = rgb.height() as usize;
        let raw = RawImage {
            pixels: RawImageData::U8(rgb.clone().into_raw()),
            width: img_width,
            height: img_height,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };

        let mut doc = PdfDocument::new(&self.title);
        let xobject_id = doc.add_image(&raw);

        let usable_w_pt = Mm(page_w.0 - 2.0 * self.margin_mm).into_pt().0;
        let usable_h_pt = Mm(page_h.0 - 2.0 * self.margin_mm).into_pt().0;

        let img_w_pt = (img_width.max(1) as f32 / self.dpi * 72.0).max(f32::EPSILON);
        let img_h_pt = (img_height.max(1) as f32 / self.dpi * 72.0).max(f32::EPSILON);

        let scale = (usable_w_pt / img_w_pt).min(usable_h_pt / img_h_pt).min(1.0);

        let rendered_w_pt = img_w_pt * scale;
        let rendered_h_pt = img_h_pt * scale;

        let margin_pt = Mm(self.margin_mm).into_pt().0;
        let x_offset = margin_pt + (usable_w_pt - rendered_w_pt) / 2.0;
        let y_offset = margin_pt + (usable_h_pt - rendered_h_pt) / 2.0;

        let ops = vec![Op::UseXobject {
            id: xobject_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(x_offset)),
                translate_y: Some(Pt(y_offset)),
                scale_x: Some(scale),
                scale_y: Some(scale),
                dpi: Some(self.dpi),
                rotate: None,
            },
        }];

        doc.with_pages(vec![PdfPage::new(page_w, page_h, ops)]);

        debug!(rendered_w_pt, rendered_h_pt, scale, "Image placed on page");

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        doc.save(&PdfSaveOptions::default(), &mut warnings)
    }
}
