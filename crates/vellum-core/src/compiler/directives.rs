//! Directive resolution: extends, include, section and yield
//!
//! Each stage rewrites source directives into compiled tags. Template names
//! stay symbolic (`<% render "layout.base" %>`), so parents and includes are
//! located and compiled only when execution reaches them.

use super::scan::{self, quoted_args};

/// `@extends('parent')` -> removed; one render of each parent appended in
/// textual order after the trimmed body
pub(crate) fn resolve_extends(source: &str) -> String {
    let mut parents = Vec::new();
    let body = scan::replace_calls(source, "extends", |args| {
        let name = single_name(args)?;
        parents.push(name);
        Some(String::new())
    });

    if parents.is_empty() {
        return body;
    }

    let mut compiled = body.trim().to_string();
    for parent in parents {
        compiled.push_str(&render_tag(&parent));
    }
    compiled
}

/// `@include('partial')` -> render of the partial at the same position
pub(crate) fn resolve_includes(source: &str) -> String {
    scan::replace_calls(source, "include", |args| {
        single_name(args).map(|name| render_tag(&name))
    })
}

/// `@section('name') ... @stop | @show | @endsection` -> capture tags.
///
/// The short form `@section('name', 'text')` is a complete `@stop` block.
pub(crate) fn resolve_sections(source: &str) -> String {
    let text = scan::replace_calls(source, "section", |args| {
        let values = quoted_args(args)?;
        if !values.iter().all(|v| tag_safe(v)) {
            return None;
        }
        match values.as_slice() {
            [name] => Some(format!("<% section \"{}\" %>", name)),
            [name, content] => Some(format!(
                "<% section \"{}\" %>{}<% endsection stop %>",
                name, content
            )),
            _ => None,
        }
    });

    close_sections(&text)
}

const SECTION_OPEN: &str = "<% section \"";
const SECTION_CLOSE: &str = "<% endsection ";
const STOP_TAG: &str = "<% endsection stop %>";
const TERMINATORS: [(&str, &str); 3] = [
    ("@stop", STOP_TAG),
    ("@endsection", STOP_TAG),
    ("@show", "<% endsection show %>"),
];

/// Rewrite `@stop`, `@endsection` and `@show` that close an open section.
///
/// Source `<%` is escaped before this stage, so every section tag in the
/// text came from `@section`. Terminators with nothing open stay literal.
/// A `@show` whose section is yielded later in the same template ends as
/// `stop`, leaving the yield as the one place the content appears.
fn close_sections(text: &str) -> String {
    let yields: Vec<(usize, String)> = scan::find_calls(text, "yield")
        .into_iter()
        .filter_map(|(at, args)| Some((at, quoted_args(args)?.into_iter().next()?)))
        .collect();

    let mut output = String::with_capacity(text.len());
    let mut open: Vec<&str> = Vec::new();
    let mut pos = 0;

    while let Some(c) = text[pos..].chars().next() {
        let rest = &text[pos..];
        if let Some(after) = rest.strip_prefix(SECTION_OPEN) {
            let name = after.split('"').next().unwrap_or_default();
            open.push(name);
            output.push_str(SECTION_OPEN);
            pos += SECTION_OPEN.len();
            continue;
        }
        if rest.starts_with(SECTION_CLOSE) {
            open.pop();
            output.push_str(SECTION_CLOSE);
            pos += SECTION_CLOSE.len();
            continue;
        }
        if let Some(&name) = open.last() {
            let terminator = TERMINATORS
                .iter()
                .find(|(needle, _)| scan::keyword_at(rest, needle));
            if let Some((needle, substitute)) = terminator {
                let yielded_later = yields.iter().any(|(at, yielded)| *at > pos && yielded == name);
                if *needle == "@show" && yielded_later {
                    output.push_str(STOP_TAG);
                } else {
                    output.push_str(substitute);
                }
                open.pop();
                pos += needle.len();
                continue;
            }
        }
        output.push(c);
        pos += c.len_utf8();
    }
    output
}

/// `@yield('name')` / `@yield('name', 'default')` -> section table lookup
pub(crate) fn resolve_yields(source: &str) -> String {
    scan::replace_calls(source, "yield", |args| {
        let values = quoted_args(args)?;
        if !values.iter().all(|v| tag_safe(v)) {
            return None;
        }
        match values.as_slice() {
            [name] => Some(format!("<% yield \"{}\" %>", name)),
            [name, default] => Some(format!("<% yield \"{}\" \"{}\" %>", name, default)),
            _ => None,
        }
    })
}

fn render_tag(name: &str) -> String {
    format!("<% render \"{}\" %>", name)
}

fn single_name(args: &str) -> Option<String> {
    match quoted_args(args)?.as_slice() {
        [name] if !name.is_empty() && tag_safe(name) => Some(name.clone()),
        _ => None,
    }
}

/// Whether a value can sit inside a double-quoted tag argument unchanged
fn tag_safe(value: &str) -> bool {
    !["\"", "<%", "%>", "{{", "{!!"]
        .iter()
        .any(|marker| value.contains(marker))
}
