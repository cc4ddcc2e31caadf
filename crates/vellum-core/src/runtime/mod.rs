//! Section runtime - capture stack and section table for one render call
//!
//! A [`SectionRuntime`] lives exactly as long as one top-level render and is
//! passed by `&mut` through every nested template execution, so concurrent
//! renders never share sections.
//!
//! Templates execute leaf first, so the most-derived template is the first to
//! close a section of a given name. Its capture is kept; a later (ancestor)
//! capture of the same name is discarded, and if the ancestor ended it with
//! `show` the kept content is emitted in its place.

use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionError {
    /// `endsection` with no open section
    EndWithoutBegin,
    /// Sections still open when the render finished, innermost last
    Unclosed(Vec<String>),
}

impl fmt::Display for SectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionError::EndWithoutBegin => write!(f, "section end without a matching section"),
            SectionError::Unclosed(names) => {
                write!(f, "unclosed section(s): {}", names.join(", "))
            }
        }
    }
}

impl std::error::Error for SectionError {}

#[derive(Debug, Default)]
pub struct SectionRuntime {
    sections: HashMap<String, String>,
    /// Open section names paired with their capture buffers
    stack: Vec<(String, String)>,
    output: String,
}

impl SectionRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append text to the innermost open capture, or to the final output
    pub fn emit(&mut self, text: &str) {
        match self.stack.last_mut() {
            Some((_, buffer)) => buffer.push_str(text),
            None => self.output.push_str(text),
        }
    }

    pub fn begin_section(&mut self, name: &str) {
        self.stack.push((name.to_string(), String::new()));
    }

    /// Close the innermost section.
    ///
    /// First capture of a name is stored (and emitted when `emit_now`). For a
    /// name already stored the capture is dropped and, when `emit_now`, the
    /// stored content is emitted instead.
    pub fn end_section(&mut self, emit_now: bool) -> Result<(), SectionError> {
        let (name, captured) = self.stack.pop().ok_or(SectionError::EndWithoutBegin)?;

        let content = match self.sections.get(&name) {
            Some(existing) => {
                log::trace!("section '{}' already defined, keeping first capture", name);
                existing.clone()
            }
            None => {
                self.sections.insert(name, captured.clone());
                captured
            }
        };

        if emit_now {
            self.emit(&content);
        }
        Ok(())
    }

    /// Stored content of a section, if any template defined it
    pub fn section(&self, name: &str) -> Option<&str> {
        self.sections.get(name).map(String::as_str)
    }

    /// Consume the runtime and return the assembled output
    pub fn finish(self) -> Result<String, SectionError> {
        if self.stack.is_empty() {
            Ok(self.output)
        } else {
            Err(SectionError::Unclosed(
                self.stack.into_iter().map(|(name, _)| name).collect(),
            ))
        }
    }
}
