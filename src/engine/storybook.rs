use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::engine::error::ExportError;

pub const TITLE: &str = "StoryWorlds Adventure";

// US letter, in points.
pub const PAGE_WIDTH: i32 = 612;
pub const PAGE_HEIGHT: i32 = 792;

const TITLE_X: i32 = 100;
const TITLE_Y: i32 = PAGE_HEIGHT - 50;
const TITLE_SIZE: i32 = 18;
const BODY_SIZE: i32 = 12;
const MARGIN_X: i32 = 50;
const FIRST_LINE_Y: i32 = PAGE_HEIGHT - 100;
const PAGE_TOP_Y: i32 = PAGE_HEIGHT - 80;
const BOTTOM_MARGIN: i32 = 80;
const LINE_STEP: i32 = 18;
const SEGMENT_GAP: i32 = 10;

pub trait DocumentExporter: Send {
    fn export(&self, history: &[String]) -> Result<Vec<u8>, ExportError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedLine {
    pub x: i32,
    pub y: i32,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLayout {
    pub lines: Vec<PlacedLine>,
}

/// Places every history line in reading order, starting a new page once
/// the pen drops below the bottom margin.
pub fn layout_pages(history: &[String]) -> Vec<PageLayout> {
    let mut pages = vec![PageLayout::default()];
    let mut y = FIRST_LINE_Y;

    for segment in history {
        for line in segment.split('\n') {
            if y < BOTTOM_MARGIN {
                pages.push(PageLayout::default());
                y = PAGE_TOP_Y;
            }

            if let Some(page) = pages.last_mut() {
                page.lines.push(PlacedLine {
                    x: MARGIN_X,
                    y,
                    text: line.trim().to_string(),
                });
            }
            y -= LINE_STEP;
        }
        y -= SEGMENT_GAP;
    }

    pages
}

/// Minimal PDF writer using the built-in Helvetica faces.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfStorybook;

impl DocumentExporter for PdfStorybook {
    fn export(&self, history: &[String]) -> Result<Vec<u8>, ExportError> {
        if history.is_empty() {
            return Err(ExportError::EmptyHistory);
        }

        let pages = layout_pages(history);
        Ok(write_pdf(&pages)?)
    }
}

pub fn save_storybook(
    exporter: &dyn DocumentExporter,
    history: &[String],
    path: &Path,
) -> Result<PathBuf, ExportError> {
    let bytes = exporter.export(history)?;
    fs::write(path, bytes)?;

    info!(path = %path.display(), segments = history.len(), "storybook saved");
    Ok(path.to_path_buf())
}

fn write_pdf(pages: &[PageLayout]) -> std::io::Result<Vec<u8>> {
    // 1 catalog, 2 page tree, 3-4 fonts, then a page + content pair per page.
    let page_id = |i: usize| 5 + 2 * i;
    let object_count = 4 + 2 * pages.len();

    let mut out = Vec::new();
    let mut offsets = Vec::with_capacity(object_count);

    out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

    offsets.push(out.len());
    write!(out, "1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n")?;

    let kids: Vec<String> = (0..pages.len()).map(|i| format!("{} 0 R", page_id(i))).collect();
    offsets.push(out.len());
    write!(
        out,
        "2 0 obj\n<< /Type /Pages /Kids [{}] /Count {} >>\nendobj\n",
        kids.join(" "),
        pages.len()
    )?;

    for (id, face) in [(3, "Helvetica"), (4, "Helvetica-Bold")] {
        offsets.push(out.len());
        write!(
            out,
            "{} 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /{} \
             /Encoding /WinAnsiEncoding >>\nendobj\n",
            id, face
        )?;
    }

    for (i, page) in pages.iter().enumerate() {
        let id = page_id(i);
        let content = page_content(page, i == 0)?;

        offsets.push(out.len());
        write!(
            out,
            "{} 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
             /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>\nendobj\n",
            id,
            PAGE_WIDTH,
            PAGE_HEIGHT,
            id + 1
        )?;

        offsets.push(out.len());
        write!(out, "{} 0 obj\n<< /Length {} >>\nstream\n", id + 1, content.len())?;
        out.extend_from_slice(&content);
        write!(out, "\nendstream\nendobj\n")?;
    }

    let xref = out.len();
    write!(out, "xref\n0 {}\n0000000000 65535 f \n", object_count + 1)?;
    for offset in &offsets {
        write!(out, "{:010} 00000 n \n", offset)?;
    }
    write!(
        out,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        object_count + 1,
        xref
    )?;

    Ok(out)
}

fn page_content(page: &PageLayout, with_title: bool) -> std::io::Result<Vec<u8>> {
    let mut content = Vec::new();

    if with_title {
        write!(content, "BT /F2 {} Tf {} {} Td (", TITLE_SIZE, TITLE_X, TITLE_Y)?;
        content.extend_from_slice(&pdf_text(TITLE));
        content.extend_from_slice(b") Tj ET\n");
    }

    for line in &page.lines {
        write!(content, "BT /F1 {} Tf {} {} Td (", BODY_SIZE, line.x, line.y)?;
        content.extend_from_slice(&pdf_text(&line.text));
        content.extend_from_slice(b") Tj ET\n");
    }

    Ok(content)
}

/// Escapes text for a PDF string literal in WinAnsi encoding. Characters
/// the base fonts cannot show become '?'.
fn pdf_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push(b'\\');
                out.push(c as u8);
            }
            '\t' => out.push(b' '),
            ' '..='~' => out.push(c as u8),
            '\u{2018}' | '\u{2019}' => out.push(b'\''),
            '\u{201C}' | '\u{201D}' => out.push(b'"'),
            '\u{2013}' | '\u{2014}' => out.push(b'-'),
            '\u{2026}' => out.extend_from_slice(b"..."),
            '\u{A0}'..='\u{FF}' => out.extend_from_slice(format!("\\{:03o}", c as u32).as_bytes()),
            _ => out.push(b'?'),
        }
    }

    out
}
