//! Block structure of compiled artifacts
//!
//! Folds the flat tag stream into a node tree. `if`/`foreach` must nest
//! properly; section tags stay flat because the section runtime tracks
//! their pairing at execution time.

use super::tokenize::{Tag, TagKind, TagStream};
use crate::template::error::TemplateError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Text(String),
    Echo {
        expr: String,
        escape: bool,
        line: usize,
    },
    If {
        branches: Vec<Branch>,
        otherwise: Option<Vec<Node>>,
    },
    Foreach {
        head: LoopHead,
        body: Vec<Node>,
        line: usize,
    },
    SectionStart {
        name: String,
    },
    SectionEnd {
        show: bool,
        line: usize,
    },
    Yield {
        name: String,
        default: Option<String>,
    },
    Render {
        name: String,
        line: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Branch {
    pub condition: String,
    pub line: usize,
    pub body: Vec<Node>,
}

/// `items as item` or `items as key => item`
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LoopHead {
    pub source: String,
    pub key: Option<String>,
    pub value: String,
}

impl LoopHead {
    fn parse(args: &str, line: usize) -> Result<Self, TemplateError> {
        let malformed = || TemplateError::MalformedSyntax {
            message: format!("expected 'foreach <expr> as <var>', found 'foreach {}'", args),
            line,
        };

        let split = args.rfind(" as ").ok_or_else(malformed)?;
        let source = args[..split].trim();
        let binding = args[split + 4..].trim();

        let (key, value) = match binding.split_once("=>") {
            Some((key, value)) => (Some(variable_name(key, line)?), variable_name(value, line)?),
            None => (None, variable_name(binding, line)?),
        };

        if source.is_empty() {
            return Err(malformed());
        }

        Ok(Self {
            source: source.to_string(),
            key,
            value,
        })
    }
}

/// `"a" "b"` -> `["a", "b"]`; compiled names never contain `"`
fn tag_args(args: &str) -> Option<Vec<String>> {
    let mut values = Vec::new();
    let mut rest = args.trim();

    while !rest.is_empty() {
        let inner = rest.strip_prefix('"')?;
        let close = inner.find('"')?;
        values.push(inner[..close].to_string());
        rest = inner[close + 1..].trim_start();
    }

    (!values.is_empty()).then_some(values)
}

fn variable_name(raw: &str, line: usize) -> Result<String, TemplateError> {
    let name = raw.trim();
    let name = name.strip_prefix('$').unwrap_or(name);
    let valid = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(name.to_string())
    } else {
        Err(TemplateError::MalformedSyntax {
            message: format!("'{}' is not a valid loop variable", raw.trim()),
            line,
        })
    }
}

/// Open block while parsing
enum Frame {
    /// `condition` is `None` once `else` has been seen
    If {
        branches: Vec<Branch>,
        condition: Option<(String, usize)>,
        body: Vec<Node>,
        line: usize,
    },
    Foreach {
        head: LoopHead,
        body: Vec<Node>,
        line: usize,
    },
}

struct Builder {
    root: Vec<Node>,
    frames: Vec<Frame>,
}

impl Builder {
    fn current(&mut self) -> &mut Vec<Node> {
        match self.frames.last_mut() {
            None => &mut self.root,
            Some(Frame::If { body, .. }) | Some(Frame::Foreach { body, .. }) => body,
        }
    }

    fn push(&mut self, node: Node) {
        self.current().push(node);
    }

    fn statement(&mut self, keyword: &str, args: &str, line: usize) -> Result<(), TemplateError> {
        let malformed = |message: String| TemplateError::MalformedSyntax { message, line };

        match keyword {
            "if" => {
                if args.is_empty() {
                    return Err(malformed("'if' without a condition".to_string()));
                }
                self.frames.push(Frame::If {
                    branches: Vec::new(),
                    condition: Some((args.to_string(), line)),
                    body: Vec::new(),
                    line,
                });
            }
            "elseif" | "else" => {
                let Some(Frame::If {
                    branches,
                    condition,
                    body,
                    ..
                }) = self.frames.last_mut()
                else {
                    return Err(malformed(format!("'{}' without a matching 'if'", keyword)));
                };
                let Some((previous, previous_line)) = condition.take() else {
                    return Err(malformed(format!("'{}' after 'else'", keyword)));
                };
                branches.push(Branch {
                    condition: previous,
                    line: previous_line,
                    body: std::mem::take(body),
                });

                if keyword == "elseif" {
                    if args.is_empty() {
                        return Err(malformed("'elseif' without a condition".to_string()));
                    }
                    *condition = Some((args.to_string(), line));
                }
            }
            "endif" => match self.frames.pop() {
                Some(Frame::If {
                    mut branches,
                    condition,
                    body,
                    ..
                }) => {
                    let otherwise = match condition {
                        Some((condition, line)) => {
                            branches.push(Branch {
                                condition,
                                line,
                                body,
                            });
                            None
                        }
                        None => Some(body),
                    };
                    self.push(Node::If {
                        branches,
                        otherwise,
                    });
                }
                other => {
                    self.frames.extend(other);
                    return Err(malformed("'endif' without a matching 'if'".to_string()));
                }
            },
            "foreach" => {
                let head = LoopHead::parse(args, line)?;
                self.frames.push(Frame::Foreach {
                    head,
                    body: Vec::new(),
                    line,
                });
            }
            "endforeach" => match self.frames.pop() {
                Some(Frame::Foreach { head, body, line }) => {
                    self.push(Node::Foreach { head, body, line });
                }
                other => {
                    self.frames.extend(other);
                    return Err(malformed(
                        "'endforeach' without a matching 'foreach'".to_string(),
                    ));
                }
            },
            "section" => {
                let name = match tag_args(args).as_deref() {
                    Some([name]) => name.clone(),
                    _ => return Err(malformed(format!("invalid section name {}", args))),
                };
                self.push(Node::SectionStart { name });
            }
            "endsection" => {
                let show = match args {
                    "stop" => false,
                    "show" => true,
                    _ => {
                        return Err(malformed(format!(
                            "'endsection' expects 'stop' or 'show', found '{}'",
                            args
                        )))
                    }
                };
                self.push(Node::SectionEnd { show, line });
            }
            "yield" => {
                let (name, default) = match tag_args(args).as_deref() {
                    Some([name]) => (name.clone(), None),
                    Some([name, default]) => (name.clone(), Some(default.clone())),
                    _ => return Err(malformed(format!("invalid yield arguments {}", args))),
                };
                self.push(Node::Yield { name, default });
            }
            "render" => {
                let name = match tag_args(args).as_deref() {
                    Some([name]) => name.clone(),
                    _ => return Err(malformed(format!("invalid render target {}", args))),
                };
                self.push(Node::Render { name, line });
            }
            other => return Err(malformed(format!("unknown tag '{}'", other))),
        }

        Ok(())
    }

    fn finish(self) -> Result<Vec<Node>, TemplateError> {
        match self.frames.last() {
            None => Ok(self.root),
            Some(Frame::If { line, .. }) => Err(TemplateError::MalformedSyntax {
                message: "'if' is never closed with 'endif'".to_string(),
                line: *line,
            }),
            Some(Frame::Foreach { line, .. }) => Err(TemplateError::MalformedSyntax {
                message: "'foreach' is never closed with 'endforeach'".to_string(),
                line: *line,
            }),
        }
    }
}

/// Parse a compiled artifact into its node tree
pub(crate) fn parse(compiled: &str) -> Result<Vec<Node>, TemplateError> {
    let mut builder = Builder {
        root: Vec::new(),
        frames: Vec::new(),
    };
    let mut last_end = 0;

    for Tag {
        kind,
        start,
        length,
        line,
    } in TagStream::new(compiled)
    {
        if start > last_end {
            builder.push(Node::Text(compiled[last_end..start].to_string()));
        }
        last_end = start + length;

        match kind {
            TagKind::Echo { expr, escape } => {
                if expr.is_empty() {
                    return Err(TemplateError::MalformedSyntax {
                        message: "empty echo".to_string(),
                        line,
                    });
                }
                builder.push(Node::Echo { expr, escape, line });
            }
            TagKind::Statement { keyword, args } => builder.statement(&keyword, &args, line)?,
            TagKind::Literal => builder.push(Node::Text("<%".to_string())),
        }
    }

    if last_end < compiled.len() {
        builder.push(Node::Text(compiled[last_end..].to_string()));
    }

    builder.finish()
}
