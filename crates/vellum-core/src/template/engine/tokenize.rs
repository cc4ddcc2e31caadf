//! Tokenization of compiled artifacts
//!
//! Finds `<% ... %>` tags in O(n) with a forward-only state machine. Text
//! between tags is not tokenized; the parser slices it out using the tag
//! positions.
//!
//! Template text that itself contains `<%` reaches the artifact as `<%%`;
//! the stream reports that as a [`TagKind::Literal`] so it is never read as
//! the start of a tag.

/// What a tag asks the interpreter to do, before block structure is known
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TagKind {
    /// `<%= expr %>` (escape) or `<%- expr %>` (raw)
    Echo { expr: String, escape: bool },

    /// `<% keyword args %>`
    Statement { keyword: String, args: String },

    /// `<%%` written back as `<%`
    Literal,
}

/// Artifact spelling of a literal `<%` from template text
pub(crate) const ESCAPED_OPEN: &str = "<%%";

/// One `<% ... %>` tag
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Tag {
    pub kind: TagKind,
    /// Byte offset of `<%`
    pub start: usize,
    /// Length including both delimiters
    pub length: usize,
    /// Line of `<%`, 1-based
    pub line: usize,
}

/// Scanner state
///
/// ```text
/// Normal ──<──> SeenLt ──%──> InTag ──%──> SeenPct ──>──> [Tag] → Normal
///   ^             │ (other)     ^            │ (other)
///   └─────────────┘             └────────────┘
/// ```
///
/// A `<%` that never closes ends the stream; the parser keeps the rest as text.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ScanState {
    Normal,
    SeenLt {
        pos: usize,
    },
    InTag {
        start: usize,
        content_start: usize,
        line: usize,
    },
    SeenPct {
        start: usize,
        content_start: usize,
        pct_pos: usize,
        line: usize,
    },
}

pub(crate) struct TagStream<'a> {
    text: &'a str,
    pos: usize,
    state: ScanState,
    line: usize,
}

impl<'a> TagStream<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            state: ScanState::Normal,
            line: 1,
        }
    }

    fn classify(content: &str) -> TagKind {
        if let Some(expr) = content.strip_prefix('=') {
            return TagKind::Echo {
                expr: expr.trim().to_string(),
                escape: true,
            };
        }
        if let Some(expr) = content.strip_prefix('-') {
            return TagKind::Echo {
                expr: expr.trim().to_string(),
                escape: false,
            };
        }

        let trimmed = content.trim();
        let (keyword, args) = match trimmed.find(char::is_whitespace) {
            Some(split) => (&trimmed[..split], trimmed[split..].trim()),
            None => (trimmed, ""),
        };
        TagKind::Statement {
            keyword: keyword.to_string(),
            args: args.to_string(),
        }
    }
}

impl Iterator for TagStream<'_> {
    type Item = Tag;

    fn next(&mut self) -> Option<Tag> {
        let bytes = self.text.as_bytes();

        while self.pos < bytes.len() {
            let byte = bytes[self.pos];

            match self.state {
                ScanState::Normal => {
                    if byte == b'<' {
                        self.state = ScanState::SeenLt { pos: self.pos };
                    } else if byte == b'\n' {
                        self.line += 1;
                    }
                    self.pos += 1;
                }
                ScanState::SeenLt { pos } => {
                    if byte == b'%' {
                        self.state = ScanState::InTag {
                            start: pos,
                            content_start: self.pos + 1,
                            line: self.line,
                        };
                        self.pos += 1;
                    } else {
                        // reprocess this byte as plain text
                        self.state = ScanState::Normal;
                    }
                }
                ScanState::InTag {
                    start,
                    content_start,
                    line,
                } => {
                    if byte == b'%' && self.pos == content_start {
                        self.pos += 1;
                        self.state = ScanState::Normal;
                        return Some(Tag {
                            kind: TagKind::Literal,
                            start,
                            length: self.pos - start,
                            line,
                        });
                    }
                    if byte == b'%' {
                        self.state = ScanState::SeenPct {
                            start,
                            content_start,
                            pct_pos: self.pos,
                            line,
                        };
                    } else if byte == b'\n' {
                        self.line += 1;
                    }
                    self.pos += 1;
                }
                ScanState::SeenPct {
                    start,
                    content_start,
                    pct_pos,
                    line,
                } => {
                    if byte == b'>' {
                        self.pos += 1;
                        self.state = ScanState::Normal;
                        return Some(Tag {
                            kind: Self::classify(&self.text[content_start..pct_pos]),
                            start,
                            length: self.pos - start,
                            line,
                        });
                    }
                    self.state = ScanState::InTag {
                        start,
                        content_start,
                        line,
                    };
                }
            }
        }

        None
    }
}
