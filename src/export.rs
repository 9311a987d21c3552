//! Document exports of a priced project.

use std::io::Write;

use chrono::{DateTime, Utc};
use itertools::Itertools;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rgb,
};
use thiserror::Error;

use crate::pricing::PricingState;

const UNNAMED: &str = "Unnamed Item";
const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const LEFT: f32 = 14.0;
const RIGHT: f32 = 196.0;
const VALUE_X: f32 = 150.0;
const ROW_H: f32 = 8.0;
const ROWS_PER_PAGE: usize = 25;
const BREAKDOWN_HEIGHT: f32 = 90.0;
const TABLE_COLUMNS: [(&str, f32); 4] = [
    ("Material", LEFT),
    ("Qty", 110.0),
    ("Unit Price", 135.0),
    ("Total", 170.0),
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("spreadsheet export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("pdf export failed: {0}")]
    Pdf(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportLine {
    pub name: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub line_total: f64,
}

/// Exactly what the export sinks receive.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub lines: Vec<ExportLine>,
    pub materials_total: f64,
    pub labor_total: f64,
    pub subtotal: f64,
    pub profit_margin: f64,
    pub profit_amount: f64,
    pub tax_rate: f64,
    pub tax_amount: f64,
    pub final_price: f64,
}

impl ExportSummary {
    pub fn new(state: &PricingState) -> Self {
        let totals = state.totals();
        let lines = state
            .materials()
            .iter()
            .map(|m| ExportLine {
                name: if m.name.trim().is_empty() {
                    UNNAMED.to_string()
                } else {
                    m.name.clone()
                },
                quantity: m.quantity,
                unit_price: m.unit_price,
                line_total: m.line_total(),
            })
            .collect();

        Self {
            lines,
            materials_total: totals.materials_total,
            labor_total: totals.labor_total,
            subtotal: totals.subtotal,
            profit_margin: state.profit_margin(),
            profit_amount: totals.profit_amount,
            tax_rate: state.tax_rate(),
            tax_amount: totals.tax_amount,
            final_price: totals.final_price,
        }
    }

    fn breakdown(&self) -> Vec<(String, f64)> {
        vec![
            ("Labor Cost".to_string(), self.labor_total),
            ("Materials Subtotal".to_string(), self.materials_total),
            ("Total Cost (Base)".to_string(), self.subtotal),
            (
                format!("Profit Margin ({}%)", self.profit_margin),
                self.profit_amount,
            ),
            (format!("Tax Provision ({}%)", self.tax_rate), self.tax_amount),
        ]
    }
}

pub fn money(value: f64) -> String {
    format!("${value:.2}")
}

pub fn file_name(extension: &str, now: DateTime<Utc>) -> String {
    format!("ValoraPricing_Project_{}.{extension}", now.timestamp_millis())
}

/// A "Materials" section followed by a "Summary" section.
pub fn write_csv<W: Write>(summary: &ExportSummary, out: W) -> Result<(), ExportError> {
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(out);

    wtr.write_record(["Materials"])?;
    wtr.write_record(["Material Name", "Quantity", "Unit Price", "Total Price"])?;
    for line in &summary.lines {
        wtr.write_record([
            line.name.clone(),
            line.quantity.to_string(),
            format!("{:.2}", line.unit_price),
            format!("{:.2}", line.line_total),
        ])?;
    }

    wtr.write_record(["Summary"])?;
    wtr.write_record(["Label", "Value"])?;
    for (label, value) in summary.breakdown() {
        wtr.write_record([label, format!("{value:.2}")])?;
    }
    wtr.write_record([
        "FINAL SELLING PRICE".to_string(),
        format!("{:.2}", summary.final_price),
    ])?;
    wtr.flush()?;
    Ok(())
}

struct PdfPen {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl PdfPen {
    fn new(title: &str) -> Result<Self, ExportError> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ExportError::Pdf(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ExportError::Pdf(e.to_string()))?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            regular,
            bold,
        })
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
    }

    fn text(&self, text: &str, size: f32, x: f32, y: f32) {
        self.layer.use_text(text, size, Mm(x), Mm(y), &self.regular);
    }

    fn strong(&self, text: &str, size: f32, x: f32, y: f32) {
        self.layer.use_text(text, size, Mm(x), Mm(y), &self.bold);
    }

    fn color(&self, rgb: (f32, f32, f32)) {
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(rgb.0, rgb.1, rgb.2, None)));
    }

    fn rule(&self, y: f32) {
        self.layer.set_outline_thickness(0.5);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(LEFT), Mm(y)), false),
                (Point::new(Mm(RIGHT), Mm(y)), false),
            ],
            is_closed: false,
        });
    }

    fn table_header(&self, y: f32) {
        self.color(ACCENT);
        for (label, x) in TABLE_COLUMNS {
            self.strong(label, 11.0, x, y);
        }
        self.color(INK);
        self.rule(y - 2.5);
    }

    fn finish(self) -> Result<Vec<u8>, ExportError> {
        self.doc
            .save_to_bytes()
            .map_err(|e| ExportError::Pdf(e.to_string()))
    }
}

const ACCENT: (f32, f32, f32) = (79.0 / 255.0, 70.0 / 255.0, 229.0 / 255.0);
const INK: (f32, f32, f32) = (0.1, 0.1, 0.12);

/// Renders an A4 summary and returns the PDF bytes.
pub fn render_pdf(summary: &ExportSummary, generated_on: DateTime<Utc>) -> Result<Vec<u8>, ExportError> {
    let mut pen = PdfPen::new("ValoraPricing Summary")?;

    pen.strong("ValoraPricing Summary", 22.0, 62.0, 277.0);
    pen.text(
        &format!("Generated on: {}", generated_on.format("%Y-%m-%d")),
        12.0,
        78.0,
        267.0,
    );

    let mut y = 255.0;
    let pages = summary.lines.iter().chunks(ROWS_PER_PAGE);
    for (page, chunk) in pages.into_iter().enumerate() {
        if page > 0 {
            pen.new_page();
            y = 277.0;
        }
        pen.table_header(y);
        y -= ROW_H;
        for line in chunk {
            pen.text(&line.name, 10.0, TABLE_COLUMNS[0].1, y);
            pen.text(&line.quantity.to_string(), 10.0, TABLE_COLUMNS[1].1, y);
            pen.text(&money(line.unit_price), 10.0, TABLE_COLUMNS[2].1, y);
            pen.text(&money(line.line_total), 10.0, TABLE_COLUMNS[3].1, y);
            y -= ROW_H;
        }
    }
    if summary.lines.is_empty() {
        pen.table_header(y);
        y -= ROW_H;
    }

    y -= 7.0;
    if y < BREAKDOWN_HEIGHT {
        pen.new_page();
        y = 277.0;
    }
    pen.strong("Cost Breakdown", 14.0, LEFT, y);
    y -= 10.0;
    for (label, value) in summary.breakdown() {
        pen.text(&format!("{label}:"), 11.0, LEFT, y);
        pen.text(&money(value), 11.0, VALUE_X, y);
        y -= ROW_H;
    }
    pen.rule(y);

    y -= 12.0;
    pen.color(ACCENT);
    pen.strong("Final Selling Price:", 18.0, LEFT, y);
    pen.strong(&money(summary.final_price), 18.0, VALUE_X, y);

    pen.finish()
}
