//! Directive scanning shared by the resolver stages and the built-in rules
//!
//! Malformed occurrences (no closing parenthesis, unterminated quote,
//! arguments a directive does not accept) are never errors here: they are
//! left in the text untouched and surface later when the artifact runs.

/// Replace every `@keyword(args)` whose parentheses balance.
///
/// `replace` receives the raw text between the outer parentheses and returns
/// the substitute, or `None` to keep that occurrence literally.
pub(crate) fn replace_calls<F>(text: &str, keyword: &str, mut replace: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    let needle = format!("@{}", keyword);
    let mut output = String::with_capacity(text.len());
    let mut pos = 0;

    while let Some(found) = text[pos..].find(&needle) {
        let start = pos + found;
        let after_keyword = start + needle.len();
        output.push_str(&text[pos..start]);

        let replaced = call_parens(text, after_keyword)
            .and_then(|(open, close)| replace(&text[open + 1..close]).map(|r| (r, close + 1)));

        match replaced {
            Some((substitute, end)) => {
                output.push_str(&substitute);
                pos = end;
            }
            None => {
                output.push_str(&needle);
                pos = after_keyword;
            }
        }
    }

    output.push_str(&text[pos..]);
    output
}

/// Every `@keyword(args)` whose parentheses balance, as (offset of `@`, args)
pub(crate) fn find_calls<'t>(text: &'t str, keyword: &str) -> Vec<(usize, &'t str)> {
    let needle = format!("@{}", keyword);
    text.match_indices(&needle)
        .filter_map(|(start, _)| {
            call_parens(text, start + needle.len())
                .map(|(open, close)| (start, &text[open + 1..close]))
        })
        .collect()
}

/// Replace every bare `@keyword` that is not followed by an identifier character
pub(crate) fn replace_keyword(text: &str, keyword: &str, substitute: &str) -> String {
    let needle = format!("@{}", keyword);
    let mut output = String::with_capacity(text.len());
    let mut pos = 0;

    while let Some(found) = text[pos..].find(&needle) {
        let start = pos + found;
        let end = start + needle.len();
        output.push_str(&text[pos..start]);

        if keyword_at(&text[start..], &needle) {
            output.push_str(substitute);
        } else {
            output.push_str(&needle);
        }
        pos = end;
    }

    output.push_str(&text[pos..]);
    output
}

/// Whether `text` starts with `needle` as a whole word
pub(crate) fn keyword_at(text: &str, needle: &str) -> bool {
    text.strip_prefix(needle).is_some_and(|rest| {
        !rest
            .chars()
            .next()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
    })
}

/// Replace every `open ... close` span; `replace` gets the inner text.
///
/// With `single_line`, a span may not cross a newline (the opener is then
/// kept literally).
pub(crate) fn replace_delimited<F>(
    text: &str,
    open: &str,
    close: &str,
    single_line: bool,
    mut replace: F,
) -> String
where
    F: FnMut(&str) -> String,
{
    let mut output = String::with_capacity(text.len());
    let mut pos = 0;

    while let Some(found) = text[pos..].find(open) {
        let start = pos + found;
        let inner_start = start + open.len();
        output.push_str(&text[pos..start]);

        let inner_end = text[inner_start..]
            .find(close)
            .map(|i| inner_start + i)
            .filter(|&end| !single_line || !text[inner_start..end].contains('\n'));

        match inner_end {
            Some(end) => {
                output.push_str(&replace(&text[inner_start..end]));
                pos = end + close.len();
            }
            None => {
                output.push_str(open);
                pos = inner_start;
            }
        }
    }

    output.push_str(&text[pos..]);
    output
}

/// Parse `'a'`, `"a", 'b'` ... into the quoted strings.
///
/// Anything other than comma separated quoted literals yields `None`.
pub(crate) fn quoted_args(args: &str) -> Option<Vec<String>> {
    let mut values = Vec::new();
    let mut rest = args.trim();

    if rest.is_empty() {
        return None;
    }

    loop {
        let quote = rest.chars().next()?;
        if quote != '\'' && quote != '"' {
            return None;
        }
        let close = rest[1..].find(quote)? + 1;
        values.push(rest[1..close].to_string());

        rest = rest[close + 1..].trim_start();
        if rest.is_empty() {
            return Some(values);
        }
        rest = rest.strip_prefix(',')?.trim_start();
    }
}

fn call_parens(text: &str, after_keyword: usize) -> Option<(usize, usize)> {
    let open = open_paren_after(text, after_keyword)?;
    closing_paren(text, open).map(|close| (open, close))
}

fn open_paren_after(text: &str, pos: usize) -> Option<usize> {
    let skipped = text[pos..].len() - text[pos..].trim_start_matches([' ', '\t']).len();
    let open = pos + skipped;
    text[open..].starts_with('(').then_some(open)
}

/// Index of the `)` matching the `(` at `open`, skipping quoted strings
fn closing_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (offset, c) in text[open..].char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '\'' | '"' => quote = Some(c),
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }

    None
}
