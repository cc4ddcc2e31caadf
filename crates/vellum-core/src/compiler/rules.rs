//! Rule substitution - ordered (matcher, replacement) table
//!
//! Each rule rewrites the whole text once, in table order. A rule sees the
//! output of the rules before it but never its own output. Built-in rules
//! turn echo, comment, conditional and loop markers into compiled tags; user
//! rules are regexes appended after them.
//!
//! In a replacement, `${1}` stands for the captured expression. User regex
//! rules get the full `regex` replacement syntax (`$1`, `${name}`, `$$`).

use super::scan;
use crate::error::{Result, VellumError};
use regex::Regex;

#[derive(Debug, Clone)]
enum Matcher {
    /// `open ... close`, inner text trimmed
    Delimited {
        open: &'static str,
        close: &'static str,
        single_line: bool,
    },
    /// `@keyword(args)` with balanced parentheses
    Call(&'static str),
    /// bare `@keyword`
    Keyword(&'static str),
    Pattern(Regex),
}

#[derive(Debug, Clone)]
struct Rule {
    key: String,
    matcher: Matcher,
    replacement: String,
}

impl Rule {
    fn builtin(key: &str, matcher: Matcher, replacement: &str) -> Self {
        Self {
            key: key.to_string(),
            matcher,
            replacement: replacement.to_string(),
        }
    }

    fn apply(&self, text: &str) -> String {
        let fill = |captured: &str| self.replacement.replace("${1}", captured.trim());

        match &self.matcher {
            Matcher::Delimited {
                open,
                close,
                single_line,
            } => scan::replace_delimited(text, open, close, *single_line, fill),
            Matcher::Call(keyword) => scan::replace_calls(text, keyword, |args| Some(fill(args))),
            Matcher::Keyword(keyword) => scan::replace_keyword(text, keyword, &self.replacement),
            Matcher::Pattern(regex) => regex
                .replace_all(text, self.replacement.as_str())
                .into_owned(),
        }
    }
}

/// Ordered rule table, first entry applied first
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    /// Table holding only the built-in rules
    pub fn new() -> Self {
        use Matcher::*;

        // Comments go first so `{{-- x --}}` is never read as an echo
        let rules = vec![
            Rule::builtin(
                "{{-- --}}",
                Delimited {
                    open: "{{--",
                    close: "--}}",
                    single_line: false,
                },
                "",
            ),
            Rule::builtin(
                "{!! !!}",
                Delimited {
                    open: "{!!",
                    close: "!!}",
                    single_line: true,
                },
                "<%- ${1} %>",
            ),
            Rule::builtin(
                "{{ }}",
                Delimited {
                    open: "{{",
                    close: "}}",
                    single_line: true,
                },
                "<%= ${1} %>",
            ),
            Rule::builtin("@elseif", Call("elseif"), "<% elseif ${1} %>"),
            Rule::builtin("@if", Call("if"), "<% if ${1} %>"),
            Rule::builtin("@else", Keyword("else"), "<% else %>"),
            Rule::builtin("@endif", Keyword("endif"), "<% endif %>"),
            Rule::builtin("@foreach", Call("foreach"), "<% foreach ${1} %>"),
            Rule::builtin("@endforeach", Keyword("endforeach"), "<% endforeach %>"),
        ];

        Self { rules }
    }

    /// Insert a regex rule, or overwrite the rule registered under the same
    /// pattern text (keeping its position).
    pub fn add_rule(&mut self, pattern: &str, replacement: &str) -> Result<()> {
        let regex = Regex::new(pattern).map_err(|e| VellumError::InvalidRule {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        let rule = Rule {
            key: pattern.to_string(),
            matcher: Matcher::Pattern(regex),
            replacement: replacement.to_string(),
        };

        match self.rules.iter_mut().find(|r| r.key == pattern) {
            Some(existing) => *existing = rule,
            None => self.rules.push(rule),
        }
        Ok(())
    }

    /// Rule keys in application order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn apply(&self, text: &str) -> String {
        self.rules
            .iter()
            .fold(text.to_string(), |current, rule| rule.apply(&current))
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::new()
    }
}
