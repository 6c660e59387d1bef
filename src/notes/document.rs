//! Section-level model of the markdown notes document.
//!
//! The document is kept as raw lines (line terminators included) so that
//! rendering an untouched document reproduces it byte for byte. Only `## `
//! headings outside fenced code blocks start a section; everything before
//! the first section heading is the preamble.
use crate::lib::errors::DocumentParseError;

/// Sections every notes document is expected to grow into.
pub const STANDARD_SECTIONS: &[&str] = &[
    "User Preferences",
    "Dependencies",
    "Development Workflow",
    "Project Structure",
    "Code Patterns",
    "Server Implementation",
    "Testing",
];

/// Section used when no classifier keyword matches.
pub const FALLBACK_SECTION: &str = "General Notes";

const SECTION_PREFIX: &str = "## ";

/// One `## ` section: its heading plus body lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    title: String,
    lines: Vec<String>,
}

/// A bullet entry inside a section body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryLine<'a> {
    pub index: usize,
    pub statement: &'a str,
}

impl Section {
    fn new(title: String) -> Self {
        Self {
            title,
            lines: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> String {
        self.lines.concat()
    }

    /// Top-level bullet entries in document order.
    pub fn entries(&self) -> impl Iterator<Item = EntryLine<'_>> {
        self.lines.iter().enumerate().filter_map(|(index, line)| {
            entry_statement(line).map(|statement| EntryLine { index, statement })
        })
    }

    /// Insert `entry` (without terminator) after the last non-blank line.
    pub fn append_entry(&mut self, entry: &str) {
        let insert_at = match self.lines.iter().rposition(|line| !line.trim().is_empty()) {
            Some(last) => {
                if !self.lines[last].ends_with('\n') {
                    self.lines[last].push('\n');
                }
                last + 1
            }
            None => self.lines.len(),
        };
        self.lines.insert(insert_at, format!("{entry}\n"));
    }

    /// Drop the lines whose index is in `indices`.
    pub fn remove_lines(&mut self, indices: &[usize]) {
        let mut index = 0;
        self.lines.retain(|_| {
            let keep = !indices.contains(&index);
            index += 1;
            keep
        });
    }
}

/// Parsed notes document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotesDocument {
    preamble: Vec<String>,
    sections: Vec<Section>,
}

impl NotesDocument {
    pub fn parse(text: &str) -> Result<Self, DocumentParseError> {
        let mut document = Self::default();
        let mut fence: Option<(char, usize, usize)> = None;

        for (offset, line) in text.split_inclusive('\n').enumerate() {
            let line_no = offset + 1;

            match fence {
                Some((marker, width, _)) => {
                    if closes_fence(line, marker, width) {
                        fence = None;
                    }
                }
                None => {
                    if let Some((marker, width)) = opens_fence(line) {
                        fence = Some((marker, width, line_no));
                    } else if let Some(title) = heading_title(line) {
                        if document.find_section(title).is_some() {
                            return Err(DocumentParseError::DuplicateSection {
                                title: title.to_string(),
                                line: line_no,
                            });
                        }
                        document.sections.push(Section::new(title.to_string()));
                    }
                }
            }

            match document.sections.last_mut() {
                Some(section) => section.lines.push(line.to_string()),
                None => document.preamble.push(line.to_string()),
            }
        }

        if let Some((_, _, line)) = fence {
            return Err(DocumentParseError::UnterminatedFence { line });
        }
        Ok(document)
    }

    pub fn render(&self) -> String {
        let mut out = self.preamble.concat();
        for section in &self.sections {
            out.push_str(&section.render());
        }
        out
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Case-insensitive section lookup.
    pub fn find_section(&self, title: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|section| section.title.eq_ignore_ascii_case(normalize_title(title)))
    }

    pub fn find_section_mut(&mut self, title: &str) -> Option<&mut Section> {
        self.sections
            .iter_mut()
            .find(|section| section.title.eq_ignore_ascii_case(normalize_title(title)))
    }

    /// Existing section matching `title`, or a new one appended at the end.
    ///
    /// `title` must be single-line; see [`validate_title`].
    pub fn ensure_section(&mut self, title: &str) -> &mut Section {
        let title = normalize_title(title);
        let existing = self
            .sections
            .iter()
            .position(|section| section.title.eq_ignore_ascii_case(title));
        let index = match existing {
            Some(index) => index,
            None => {
                let mut section = Section::new(title.to_string());
                section.lines = section_separator(self.last_line());
                section.lines.push(format!("{SECTION_PREFIX}{title}\n"));
                self.sections.push(section);
                self.sections.len() - 1
            }
        };
        &mut self.sections[index]
    }

    fn last_line(&self) -> Option<&str> {
        self.sections
            .iter()
            .rev()
            .find_map(|section| section.lines.last())
            .or_else(|| self.preamble.last())
            .map(String::as_str)
    }
}

/// Blank lines needed so a new heading starts on its own paragraph.
pub(crate) fn section_separator(last_line: Option<&str>) -> Vec<String> {
    let mut separator = Vec::new();
    if let Some(last) = last_line {
        if !last.ends_with('\n') {
            separator.push("\n".to_string());
        }
        if !last.trim().is_empty() {
            separator.push("\n".to_string());
        }
    }
    separator
}

/// Title of a `## ` heading line.
fn heading_title(line: &str) -> Option<&str> {
    let title = normalize_title(line.trim_end_matches(['\n', '\r']).strip_prefix(SECTION_PREFIX)?);
    (!title.is_empty()).then_some(title)
}

/// Heading text with surrounding whitespace and closing `#` runs removed.
///
/// A closing run only counts when whitespace separates it from the title, so
/// `C#` stays as is. Idempotent: a normalized title renders as `## {title}`
/// and parses back to itself.
pub fn normalize_title(raw: &str) -> &str {
    let mut title = raw.trim();
    loop {
        let stripped = title.trim_end_matches('#');
        if stripped.is_empty() {
            return "";
        }
        if stripped.len() == title.len() || !stripped.ends_with([' ', '\t']) {
            return title;
        }
        title = stripped.trim_end();
    }
}

/// Normalize a caller-supplied section name for use as a heading.
pub fn validate_title(raw: &str) -> Result<&str, &'static str> {
    if raw.contains(['\n', '\r']) {
        return Err("must be a single line");
    }
    let title = normalize_title(raw);
    if title.is_empty() {
        return Err("is empty once heading markers are removed");
    }
    Ok(title)
}

/// Marker and width when `line` opens a fenced code block.
fn opens_fence(line: &str) -> Option<(char, usize)> {
    let body = strip_fence_indent(line)?;
    let marker = body.chars().next().filter(|c| matches!(c, '`' | '~'))?;
    let width = fence_run(body, marker);
    if width < 3 {
        return None;
    }
    // Backtick info strings may not contain backticks.
    if marker == '`' && body[width..].contains('`') {
        return None;
    }
    Some((marker, width))
}

/// Closing fences are at least as wide as the opener and carry no info string.
fn closes_fence(line: &str, marker: char, width: usize) -> bool {
    match strip_fence_indent(line) {
        Some(body) => {
            let run = fence_run(body, marker);
            run >= width && body[run..].trim().is_empty()
        }
        None => false,
    }
}

/// Line without its indent, or `None` when indented four or more spaces.
fn strip_fence_indent(line: &str) -> Option<&str> {
    let body = line.trim_start_matches(' ');
    (line.len() - body.len() <= 3).then_some(body)
}

fn fence_run(body: &str, marker: char) -> usize {
    body.chars().take_while(|c| *c == marker).count()
}

/// Statement text of a top-level `- ` / `* ` entry, timestamp stripped.
pub fn entry_statement(line: &str) -> Option<&str> {
    let body = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))?
        .trim();
    let statement = match body.strip_prefix('[') {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => match rest.find(']') {
            Some(end) => rest[end + 1..].trim(),
            None => body,
        },
        _ => body,
    };
    (!statement.is_empty()).then_some(statement)
}
