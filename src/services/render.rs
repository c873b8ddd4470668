// src/services/render.rs

//! Rendering backends for captured content.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument};
use scraper::Html;

use crate::error::{AppError, Result};
use crate::models::RenderFormat;
use crate::navigation::inspect;

use super::resolver::MarkupDocument;

/// Converts a composed document into artifact bytes.
pub trait DocumentRenderer: Send + Sync {
    /// File extension of produced artifacts.
    fn extension(&self) -> &str;

    fn render(&self, document: &MarkupDocument) -> Result<Vec<u8>>;
}

/// Backend for the configured output format.
pub fn renderer_for(format: RenderFormat) -> Box<dyn DocumentRenderer> {
    match format {
        RenderFormat::Pdf => Box::new(PdfRenderer),
        RenderFormat::Html => Box::new(HtmlRenderer),
    }
}

/// Writes the composed document as a standalone UTF-8 HTML file.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl DocumentRenderer for HtmlRenderer {
    fn extension(&self) -> &str {
        "html"
    }

    fn render(&self, document: &MarkupDocument) -> Result<Vec<u8>> {
        if !document.html.contains("<body") {
            return Err(AppError::render(&document.title, "document has no body"));
        }
        Ok(document.html.clone().into_bytes())
    }
}

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const TITLE_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 11.0;
const TITLE_WRAP: usize = 55;
const BODY_WRAP: usize = 88;

/// Block elements laid out as separate paragraphs.
const PARAGRAPHS: &str = "p, li, h2, h3, h4, h5, h6, pre, blockquote";

/// Lays the document text out on A4 pages with the built-in Helvetica.
///
/// Markup is reduced to a bold title and plain paragraphs. Characters
/// outside Windows-1252 are dropped by the built-in fonts.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfRenderer;

impl DocumentRenderer for PdfRenderer {
    fn extension(&self) -> &str {
        "pdf"
    }

    fn render(&self, document: &MarkupDocument) -> Result<Vec<u8>> {
        if !document.html.contains("<body") {
            return Err(AppError::render(&document.title, "document has no body"));
        }
        let paragraphs = body_paragraphs(&document.html)?;
        let fail = |e: printpdf::Error| AppError::render(&document.title, e);

        let (pdf, page, layer) = PdfDocument::new(
            document.title.as_str(),
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            "content",
        );
        let regular = pdf.add_builtin_font(BuiltinFont::Helvetica).map_err(fail)?;
        let bold = pdf.add_builtin_font(BuiltinFont::HelveticaBold).map_err(fail)?;

        let mut lines: Vec<(String, f32, &IndirectFontRef)> = wrap(&document.title, TITLE_WRAP)
            .into_iter()
            .map(|l| (l, TITLE_SIZE, &bold))
            .collect();
        for paragraph in &paragraphs {
            lines.push((String::new(), BODY_SIZE, &regular));
            lines.extend(
                wrap(paragraph, BODY_WRAP)
                    .into_iter()
                    .map(|l| (l, BODY_SIZE, &regular)),
            );
        }

        let mut current = pdf.get_page(page).get_layer(layer);
        let mut y = PAGE_HEIGHT - MARGIN;
        for (text, size, font) in lines {
            let step = line_height(size);
            if y - step < MARGIN {
                let (page, layer) = pdf.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "content");
                current = pdf.get_page(page).get_layer(layer);
                y = PAGE_HEIGHT - MARGIN;
            }
            y -= step;
            if !text.is_empty() {
                current.use_text(text, size, Mm(MARGIN), Mm(y), font);
            }
        }
        pdf.save_to_bytes().map_err(fail)
    }
}

/// Line advance in mm for a font size in points.
fn line_height(size: f32) -> f32 {
    size * 0.3528 * 1.4
}

/// Paragraph texts of the body, title heading excluded.
///
/// Falls back to the whole body text when no block element carries text.
fn body_paragraphs(html: &str) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let body = inspect::parse_selector("body")?;
    let Some(body) = document.select(&body).next() else {
        return Ok(Vec::new());
    };
    let blocks: Vec<String> = inspect::locate_all_in(body, PARAGRAPHS)?
        .into_iter()
        .map(inspect::text)
        .filter(|t| !t.is_empty())
        .collect();
    if !blocks.is_empty() {
        return Ok(blocks);
    }
    let heading: String = inspect::locate_in(body, "h1")?
        .map(inspect::text)
        .unwrap_or_default();
    let rest = inspect::text(body);
    let rest = rest.strip_prefix(heading.as_str()).unwrap_or(&rest).trim();
    Ok(if rest.is_empty() {
        Vec::new()
    } else {
        vec![rest.to_string()]
    })
}

/// Greedy word wrap at `width` characters; longer words are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            lines.push(word.drain(..width).collect());
        }
        let word: String = word.into_iter().collect();
        if word.is_empty() {
            continue;
        }
        if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(&word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}
