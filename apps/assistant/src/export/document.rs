//! Markdown → structured document conversion for downloads.
//!
//! Deliberately shallow: each line is classified by its leading token only,
//! and inline spans come from one regex alternation over `**bold**`,
//! `*italic*` and `` `code` ``. Spans do not nest and markers cannot be
//! escaped. This covers what the generators emit.

use once_cell::sync::Lazy;
use regex::Regex;

static INLINE_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*.*?\*\*|\*.*?\*|`.*?`").expect("inline span regex"));

static BULLET_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-*]\s+").expect("bullet marker regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStyle {
    Plain,
    Bold,
    Italic,
    Code,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub style: RunStyle,
}

impl TextRun {
    fn new(text: &str, style: RunStyle) -> Self {
        Self {
            text: text.to_string(),
            style,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Spacer for an empty source line.
    Blank,
    Heading { level: u8, text: String },
    Bullet { text: String },
    Paragraph { runs: Vec<TextRun> },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn from_markdown(markdown: &str) -> Self {
        Self {
            blocks: markdown.lines().map(parse_line).collect(),
        }
    }

    /// Minimal HTML body, suitable for HTML-to-DOCX converters.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        let mut in_list = false;
        for block in &self.blocks {
            let is_bullet = matches!(block, Block::Bullet { .. });
            if in_list && !is_bullet {
                html.push_str("</ul>\n");
                in_list = false;
            }
            match block {
                Block::Blank => html.push_str("<p></p>\n"),
                Block::Heading { level, text } => {
                    html.push_str(&format!("<h{level}>{}</h{level}>\n", escape_html(text)));
                }
                Block::Bullet { text } => {
                    if !in_list {
                        html.push_str("<ul>\n");
                        in_list = true;
                    }
                    html.push_str(&format!("<li>{}</li>\n", escape_html(text)));
                }
                Block::Paragraph { runs } => {
                    html.push_str("<p>");
                    for run in runs {
                        let text = escape_html(&run.text);
                        match run.style {
                            RunStyle::Plain => html.push_str(&text),
                            RunStyle::Bold => html.push_str(&format!("<strong>{text}</strong>")),
                            RunStyle::Italic => html.push_str(&format!("<em>{text}</em>")),
                            RunStyle::Code => html.push_str(&format!("<code>{text}</code>")),
                        }
                    }
                    html.push_str("</p>\n");
                }
            }
        }
        if in_list {
            html.push_str("</ul>\n");
        }
        html
    }
}

fn parse_line(raw: &str) -> Block {
    let line = raw.trim();
    if line.is_empty() {
        return Block::Blank;
    }
    if let Some(text) = line.strip_prefix("# ") {
        return heading(1, text);
    }
    if let Some(text) = line.strip_prefix("## ") {
        return heading(2, text);
    }
    if let Some(text) = line.strip_prefix("### ") {
        return heading(3, text);
    }
    if line.starts_with("- ") || line.starts_with("* ") {
        return Block::Bullet {
            text: BULLET_MARKER.replace(line, "").into_owned(),
        };
    }

    let runs = inline_runs(line);
    if runs.is_empty() {
        // Only empty spans such as `**`; keep the source text.
        return Block::Paragraph {
            runs: vec![TextRun::new(line, RunStyle::Plain)],
        };
    }
    Block::Paragraph { runs }
}

fn heading(level: u8, text: &str) -> Block {
    Block::Heading {
        level,
        text: text.to_string(),
    }
}

/// Splits a line into plain text and marked spans, in source order.
/// Empty pieces are dropped.
pub fn inline_runs(line: &str) -> Vec<TextRun> {
    let mut runs = Vec::new();
    let mut last = 0;
    for span in INLINE_SPAN.find_iter(line) {
        if span.start() > last {
            runs.push(TextRun::new(&line[last..span.start()], RunStyle::Plain));
        }
        let marked = span.as_str();
        let run = if marked.len() >= 4 && marked.starts_with("**") && marked.ends_with("**") {
            TextRun::new(&marked[2..marked.len() - 2], RunStyle::Bold)
        } else if marked.starts_with('`') {
            TextRun::new(&marked[1..marked.len() - 1], RunStyle::Code)
        } else {
            TextRun::new(&marked[1..marked.len() - 1], RunStyle::Italic)
        };
        if !run.text.is_empty() {
            runs.push(run);
        }
        last = span.end();
    }
    if last < line.len() {
        runs.push(TextRun::new(&line[last..], RunStyle::Plain));
    }
    runs
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
