use docx_rs::{
    read_docx, DocumentChild, Paragraph, ParagraphChild, RunChild, Table, TableCellContent,
    TableChild, TableRowChild,
};

use crate::errors::ResumeError;

/// Anything shorter than this after trimming is not plausibly a resume.
pub const MIN_RESUME_CHARS: usize = 50;

/// Best-effort document-to-text conversion.
///
/// Implementations may return empty text for content they cannot make sense of;
/// [`extract_text`] turns that into an explicit failure.
pub trait TextSource: Send + Sync {
    fn raw_text(&self, bytes: &[u8]) -> Result<String, ResumeError>;
}

/// Extracts text from a document and enforces the minimum-content rules.
/// Returns the trimmed text.
pub fn extract_text(source: &dyn TextSource, bytes: &[u8]) -> Result<String, ResumeError> {
    if bytes.is_empty() {
        return Err(ResumeError::EmptyFile);
    }

    let raw = source.raw_text(bytes)?;
    let text = raw.trim();
    if text.is_empty() {
        return Err(ResumeError::EmptyFile);
    }

    let chars = text.chars().count();
    if chars < MIN_RESUME_CHARS {
        return Err(ResumeError::TooShort { chars });
    }

    Ok(text.to_string())
}

/// Reads `.docx` files with `docx-rs`: body paragraphs and table cells in document order,
/// one line per paragraph.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocxTextSource;

impl TextSource for DocxTextSource {
    fn raw_text(&self, bytes: &[u8]) -> Result<String, ResumeError> {
        let docx = read_docx(bytes).map_err(|e| ResumeError::FileError(e.to_string()))?;

        let mut lines: Vec<String> = Vec::new();
        for child in &docx.document.children {
            match child {
                DocumentChild::Paragraph(para) => push_paragraph(&mut lines, para),
                DocumentChild::Table(table) => push_table(&mut lines, table),
                _ => {}
            }
        }

        Ok(lines.join("\n"))
    }
}

fn push_paragraph(lines: &mut Vec<String>, para: &Paragraph) {
    let mut text = String::new();
    collect_text(&para.children, &mut text);

    if !text.trim().is_empty() {
        lines.push(text);
    }
}

/// Appends run text in order, descending into hyperlinks. Tabs and breaks become whitespace.
fn collect_text(children: &[ParagraphChild], out: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for rc in &run.children {
                    match rc {
                        RunChild::Text(t) => out.push_str(&t.text),
                        RunChild::Tab(_) | RunChild::PTab(_) => out.push('\t'),
                        RunChild::Break(_) | RunChild::CarriageReturn(_) => out.push('\n'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => collect_text(&link.children, out),
            _ => {}
        }
    }
}

#[allow(irrefutable_let_patterns)]
fn push_table(lines: &mut Vec<String>, table: &Table) {
    for row in &table.rows {
        let TableChild::TableRow(row) = row else {
            continue;
        };
        for cell in &row.cells {
            let TableRowChild::TableCell(cell) = cell else {
                continue;
            };
            for content in &cell.children {
                match content {
                    TableCellContent::Paragraph(para) => push_paragraph(lines, para),
                    TableCellContent::Table(inner) => push_table(lines, inner),
                    _ => {}
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Treats the upload bytes as UTF-8 text.
    pub struct PlainTextSource;

    impl TextSource for PlainTextSource {
        fn raw_text(&self, bytes: &[u8]) -> Result<String, ResumeError> {
            Ok(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}
