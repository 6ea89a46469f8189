/* ===============================
   Transcript: what a demo produced
   =============================== */

use std::fmt;

use colored::Colorize;

/// A single line of demo output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Heading(String),
    Text(String),
}

/// Ordered output of one demo run.
///
/// Demos push lines here instead of printing, so tests can assert on the
/// scenario and the binary decides how to render it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Transcript {
    lines: Vec<Line>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn heading(&mut self, text: impl Into<String>) -> &mut Self {
        self.lines.push(Line::Heading(text.into()));
        self
    }

    pub fn line(&mut self, text: impl Into<String>) -> &mut Self {
        self.lines.push(Line::Text(text.into()));
        self
    }

    pub fn extend<I, S>(&mut self, lines: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines
            .extend(lines.into_iter().map(|l| Line::Text(l.into())));
        self
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// True if any text line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| match l {
            Line::Heading(s) | Line::Text(s) => s.contains(needle),
        })
    }

    /// Colourised rendering for the terminal.
    pub fn render_colored(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            match line {
                Line::Heading(h) => {
                    out.push_str(&format!("{}\n", h.bold().cyan()));
                }
                Line::Text(t) => {
                    out.push_str(&format!("  {}\n", t));
                }
            }
        }
        out
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            match line {
                Line::Heading(h) => writeln!(f, "== {} ==", h)?,
                Line::Text(t) => writeln!(f, "{}", t)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_lines_in_order() {
        let mut t = Transcript::new();
        t.heading("Start").line("one").extend(["two", "three"]);

        assert_eq!(t.len(), 4);
        assert_eq!(t.lines()[0], Line::Heading("Start".into()));
        assert_eq!(t.lines()[3], Line::Text("three".into()));
        assert!(t.contains("two"));
        assert!(!t.contains("four"));
    }

    #[test]
    fn test_display_marks_headings() {
        let mut t = Transcript::new();
        t.heading("H").line("body");
        assert_eq!(t.to_string(), "== H ==\nbody\n");
    }
}
