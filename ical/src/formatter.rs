// SPDX-FileCopyrightText: 2026 Kalends Contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Serialization to RFC 5545 text with transparent line folding.
//!
//! [`Formatter`] wraps any [`Write`] implementer and folds content lines
//! at the configured octet limit; the emission code just writes
//! properties and line breaks and never thinks about folding.

use std::io::{self, Write};

use crate::component::Component;
use crate::keyword::{KW_BEGIN, KW_END};

/// Formatting options.
#[derive(Debug, Clone, Copy)]
pub struct FormatOptions {
    /// Maximum line length in octets before folding; `None` disables
    /// folding. Defaults to `Some(75)` per RFC 5545.
    pub folding: Option<usize>,

    /// The continuation sequence used when folding.
    pub folding_style: FoldingStyle,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            folding: Some(75),
            folding_style: FoldingStyle::default(),
        }
    }
}

impl FormatOptions {
    /// Set the folding limit.
    #[must_use]
    pub const fn folding(mut self, folding: Option<usize>) -> Self {
        self.folding = folding;
        self
    }

    /// Set the folding style.
    #[must_use]
    pub const fn folding_style(mut self, style: FoldingStyle) -> Self {
        self.folding_style = style;
        self
    }

    /// Write a component tree to `w` with these options.
    ///
    /// # Errors
    ///
    /// Returns an error when writing fails.
    pub fn write(&self, component: &Component, w: &mut impl Write) -> io::Result<()> {
        let mut formatter = Formatter::new(w, *self);
        write_component(&mut formatter, component)
    }

    /// Write a component tree to a `String` with these options.
    ///
    /// # Errors
    ///
    /// Returns an error when writing fails or the output is not UTF-8.
    pub fn write_to_string(&self, component: &Component) -> io::Result<String> {
        let mut buffer = Vec::new();
        self.write(component, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

/// Line folding style: CRLF followed by one whitespace octet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FoldingStyle {
    /// CRLF + SPACE (RFC 5545 default).
    #[default]
    Space,
    /// CRLF + TAB.
    Tab,
}

impl FoldingStyle {
    const fn as_bytes(self) -> &'static [u8] {
        match self {
            Self::Space => b"\r\n ",
            Self::Tab => b"\r\n\t",
        }
    }
}

/// Format a component tree to a `String` with default options.
///
/// # Errors
///
/// Returns an error when writing fails.
pub fn format(component: &Component) -> io::Result<String> {
    FormatOptions::default().write_to_string(component)
}

/// A folding writer.
#[derive(Debug)]
pub struct Formatter<W: Write> {
    writer: W,
    options: FormatOptions,
    /// Octets on the current line so far.
    line_length: usize,
}

impl<W: Write> Formatter<W> {
    /// Wrap a writer with the given options.
    #[must_use]
    pub fn new(writer: W, options: FormatOptions) -> Self {
        Self {
            writer,
            options,
            line_length: 0,
        }
    }

    /// Consume the formatter, returning the underlying writer.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Terminate the current content line with CRLF.
    ///
    /// # Errors
    ///
    /// Returns an error when writing fails.
    pub fn writeln(&mut self) -> io::Result<()> {
        self.writer.write_all(b"\r\n")?;
        self.line_length = 0;
        Ok(())
    }
}

impl<W: Write> Write for Formatter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let Some(max_len) = self.options.folding else {
            self.writer.write_all(buf)?;
            return Ok(buf.len());
        };

        for &byte in buf {
            // Folding is only legal between characters, so a UTF-8
            // continuation byte postpones the fold.
            if self.line_length >= max_len && byte & 0xC0 != 0x80 {
                self.writer.write_all(self.options.folding_style.as_bytes())?;
                self.line_length = 1;
            }
            self.writer.write_all(std::slice::from_ref(&byte))?;
            self.line_length += 1;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Write one component, its properties and its children as folded
/// content lines.
///
/// # Errors
///
/// Returns an error when writing fails.
pub fn write_component<W: Write>(f: &mut Formatter<W>, component: &Component) -> io::Result<()> {
    write!(f, "{KW_BEGIN}:{}", component.kind)?;
    f.writeln()?;
    for property in &component.properties {
        write!(f, "{property}")?;
        f.writeln()?;
    }
    for child in &component.components {
        write_component(f, child)?;
    }
    write!(f, "{KW_END}:{}", component.kind)?;
    f.writeln()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::unfold;

    fn event_with_summary(summary: &str) -> Component {
        let src = format!(
            "BEGIN:VEVENT\r\nUID:x@example.com\r\nDTSTAMP:20250101T000000Z\r\nSUMMARY:{summary}\r\nEND:VEVENT\r\n"
        );
        Component::parse(&src).unwrap().remove(0)
    }

    #[test]
    fn folds_long_lines_at_75_octets() {
        let summary = "a".repeat(200);
        let component = event_with_summary(&summary);
        let text = format(&component).unwrap();
        for line in text.split("\r\n") {
            assert!(line.len() <= 75, "line too long: {}", line.len());
        }
        // Folding must be reversible.
        assert!(unfold(&text).contains(&summary));
    }

    #[test]
    fn folding_respects_utf8_boundaries() {
        let summary = "ä".repeat(120);
        let component = event_with_summary(&summary);
        let text = format(&component).unwrap();
        // The output is valid UTF-8 by construction of write_to_string;
        // unfolding must restore the original text.
        assert!(unfold(&text).contains(&summary));
        for line in text.split("\r\n") {
            assert!(line.len() <= 76, "fold split a character: {}", line.len());
        }
    }

    #[test]
    fn folding_can_be_disabled() {
        let summary = "b".repeat(200);
        let component = event_with_summary(&summary);
        let text = FormatOptions::default()
            .folding(None)
            .write_to_string(&component)
            .unwrap();
        assert!(text.contains(&summary));
    }

    #[test]
    fn tab_folding_style() {
        let summary = "c".repeat(100);
        let component = event_with_summary(&summary);
        let text = FormatOptions::default()
            .folding_style(FoldingStyle::Tab)
            .write_to_string(&component)
            .unwrap();
        assert!(text.contains("\r\n\t"));
        assert!(unfold(&text).contains(&summary));
    }
}
