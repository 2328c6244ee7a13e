use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;

use lopdf::Document;
use pdf_extract::{MediaBox, OutputDev, OutputError, Transform};
use tracing::debug;

use crate::error::ExtractError;
use crate::model::Token;
use crate::options::TokenOptions;

/// A page that can hand out its positioned text tokens.
pub trait TokenPage {
    fn tokens(&self, options: &TokenOptions) -> Vec<Token>;
}

/// Pre-tokenized pages ignore the grouping options.
impl TokenPage for Vec<Token> {
    fn tokens(&self, _options: &TokenOptions) -> Vec<Token> {
        self.clone()
    }
}

/// One rendered character in top-left page coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub text: String,
    pub x0: f64,
    pub x1: f64,
    pub top: f64,
}

impl Glyph {
    fn is_blank(&self) -> bool {
        self.text.chars().all(char::is_whitespace)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PdfPage {
    pub number: u32,
    pub glyphs: Vec<Glyph>,
}

impl TokenPage for PdfPage {
    fn tokens(&self, options: &TokenOptions) -> Vec<Token> {
        glyphs_to_tokens(&self.glyphs, options)
    }
}

struct WordBuilder {
    text: String,
    x0: f64,
    x1: f64,
    top: f64,
}

impl WordBuilder {
    fn start(glyph: &Glyph) -> Self {
        Self {
            text: glyph.text.clone(),
            x0: glyph.x0,
            x1: glyph.x1,
            top: glyph.top,
        }
    }

    fn push(&mut self, glyph: &Glyph) {
        self.text.push_str(&glyph.text);
        self.x1 = self.x1.max(glyph.x1);
        self.top = self.top.min(glyph.top);
    }

    fn finish(self, out: &mut Vec<Token>) {
        let text = self.text.trim_end();
        if !text.is_empty() {
            out.push(Token::new(text, self.x0, self.top));
        }
    }
}

/// Merges glyphs into tokens, line by line, left to right.
///
/// Glyphs whose tops chain within `y_tolerance` share a line. Inside a line a
/// token ends at a horizontal gap wider than `x_tolerance`, or at a blank
/// glyph unless `keep_blank_chars` is set.
#[must_use]
pub fn glyphs_to_tokens(glyphs: &[Glyph], options: &TokenOptions) -> Vec<Token> {
    let mut sorted = glyphs.iter().collect::<Vec<_>>();
    sorted.sort_by(|left, right| left.top.total_cmp(&right.top));

    let mut lines: Vec<Vec<&Glyph>> = Vec::new();
    for glyph in sorted {
        let same_line = lines
            .last()
            .and_then(|line| line.last())
            .is_some_and(|last| glyph.top - last.top <= options.y_tolerance);
        if same_line {
            if let Some(line) = lines.last_mut() {
                line.push(glyph);
                continue;
            }
        }
        lines.push(vec![glyph]);
    }

    let mut tokens = Vec::new();
    for mut line in lines {
        line.sort_by(|left, right| left.x0.total_cmp(&right.x0));

        let mut current: Option<WordBuilder> = None;
        for glyph in line {
            let blank = glyph.is_blank();
            if blank && !options.keep_blank_chars {
                if let Some(word) = current.take() {
                    word.finish(&mut tokens);
                }
                continue;
            }

            let joins = current
                .as_ref()
                .is_some_and(|word| glyph.x0 <= word.x1 + options.x_tolerance);
            if joins {
                if let Some(word) = current.as_mut() {
                    word.push(glyph);
                }
                continue;
            }

            if let Some(word) = current.take() {
                word.finish(&mut tokens);
            }
            if !blank {
                current = Some(WordBuilder::start(glyph));
            }
        }
        if let Some(word) = current {
            word.finish(&mut tokens);
        }
    }
    tokens
}

/// Collects glyph positions from the pdf-extract text renderer.
#[derive(Default)]
struct GlyphCollector {
    pages: Vec<PdfPage>,
    page_height: f64,
}

impl OutputDev for GlyphCollector {
    fn begin_page(
        &mut self,
        page_num: u32,
        media_box: &MediaBox,
        _art_box: Option<(f64, f64, f64, f64)>,
    ) -> Result<(), OutputError> {
        self.page_height = media_box.ury - media_box.lly;
        self.pages.push(PdfPage {
            number: page_num,
            glyphs: Vec::new(),
        });
        Ok(())
    }

    fn end_page(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn output_character(
        &mut self,
        trm: &Transform,
        width: f64,
        _spacing: f64,
        font_size: f64,
        char: &str,
    ) -> Result<(), OutputError> {
        let Some(page) = self.pages.last_mut() else {
            return Ok(());
        };

        let scale = (trm.m11 * trm.m22 - trm.m12 * trm.m21).abs().sqrt();
        let size = font_size * scale;
        let baseline = self.page_height - trm.m32;
        page.glyphs.push(Glyph {
            text: char.to_string(),
            x0: trm.m31,
            x1: trm.m31 + width * size,
            top: baseline - size,
        });
        Ok(())
    }

    fn begin_word(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn end_word(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn end_line(&mut self) -> Result<(), OutputError> {
        Ok(())
    }
}

/// A loaded PDF with the glyphs of every page, in page order.
///
/// The underlying document is parsed once and released when loading ends.
#[derive(Debug, Clone)]
pub struct PdfDocument {
    pages: Vec<PdfPage>,
}

impl PdfDocument {
    pub fn open(path: &Path) -> Result<Self, ExtractError> {
        if !path.is_file() {
            return Err(ExtractError::MissingSource(path.to_path_buf()));
        }
        let document = Document::load(path)?;
        Self::from_document(&document)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ExtractError> {
        let document = Document::load_mem(bytes)?;
        Self::from_document(&document)
    }

    fn from_document(document: &Document) -> Result<Self, ExtractError> {
        let mut collector = GlyphCollector::default();
        for page_no in document.get_pages().into_keys() {
            let rendered = catch_unwind(AssertUnwindSafe(|| {
                pdf_extract::output_doc_page(document, &mut collector, page_no)
            }))
            .map_err(|_| {
                ExtractError::PdfExtract(format!("text renderer panicked on page {page_no}"))
            })?;
            rendered?;

            if let Some(page) = collector.pages.last() {
                debug!(page = page.number, glyphs = page.glyphs.len(), "collected glyphs");
            }
        }

        if collector.pages.is_empty() {
            return Err(ExtractError::PdfExtract("document has no pages".to_string()));
        }

        Ok(Self {
            pages: collector.pages,
        })
    }

    #[must_use]
    pub fn pages(&self) -> &[PdfPage] {
        &self.pages
    }
}
