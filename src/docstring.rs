//! Reflowed documentation strings.
//!
//! Commands take their help text from a documentation string. Paragraphs are
//! separated by blank lines; each one is rewrapped to the display width. The
//! first paragraph becomes the one-line summary shown in command listings and
//! the whole text becomes the description shown by `--help`.

use textwrap::{Options, WordSeparator, WrapAlgorithm};

/// A documentation string reflowed to a given width.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Docstring {
    summary: String,
    description: String,
}

impl Docstring {
    /// Reflows `doc` to `width` columns. `None` yields empty text.
    pub fn new(doc: Option<&str>, width: usize) -> Self {
        let paragraphs = paragraphs(doc.unwrap_or_default(), width);
        Self {
            summary: paragraphs.first().cloned().unwrap_or_default(),
            description: paragraphs.join("\n\n"),
        }
    }

    /// The first paragraph, reflowed.
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// All paragraphs, reflowed and separated by a blank line.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Splits into `(summary, description)`, mapping empty text to `None`.
    pub fn into_parts(self) -> (Option<String>, Option<String>) {
        let non_empty = |s: String| if s.is_empty() { None } else { Some(s) };
        (non_empty(self.summary), non_empty(self.description))
    }
}

/// Reflows `text` to `width` columns.
pub fn reflow(text: &str, width: usize) -> Docstring {
    Docstring::new(Some(text), width)
}

fn paragraphs(doc: &str, width: usize) -> Vec<String> {
    let mut result = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in doc.lines() {
        let stripped = line.trim();
        if stripped.is_empty() {
            if !current.is_empty() {
                result.push(fill(&current, width));
                current.clear();
            }
        } else {
            current.extend(stripped.split_whitespace());
        }
    }
    if !current.is_empty() {
        result.push(fill(&current, width));
    }

    result
}

fn fill(words: &[&str], width: usize) -> String {
    let options = Options::new(width.max(1))
        .word_separator(WordSeparator::AsciiSpace)
        .wrap_algorithm(WrapAlgorithm::FirstFit);
    textwrap::fill(&words.join(" "), options)
}
