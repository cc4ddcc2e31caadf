//! Template compiler
//!
//! Turns template source into the compiled artifact text in five ordered
//! stages, each consuming the previous stage's output. Before the first
//! stage every `<%` already in the source is rewritten to `<%%`, which the
//! interpreter prints back as plain `<%`.
//!
//! 1. `@extends` -> parent renders appended after the body
//! 2. `@include` -> inline renders
//! 3. `@section ... @stop|@show` -> capture tags
//! 4. `@yield` -> section lookups
//! 5. rule substitution (echo, comments, conditionals, loops, user rules)
//!
//! The compiled form is plain text with `<% ... %>` tags; see
//! [`crate::template`] for how it executes.

mod directives;
pub mod rules;
mod scan;

pub use rules::RuleTable;

use crate::error::Result;
use crate::template::engine::ESCAPED_OPEN;

#[derive(Debug, Clone, Default)]
pub struct Compiler {
    rules: RuleTable,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_rule(&mut self, pattern: &str, replacement: &str) -> Result<()> {
        self.rules.add_rule(pattern, replacement)?;
        log::debug!("rule '{}' registered ({} in table)", pattern, self.rules.len());
        Ok(())
    }

    pub fn compile(&self, source: &str) -> String {
        let text = source.replace("<%", ESCAPED_OPEN);
        let text = directives::resolve_extends(&text);
        let text = directives::resolve_includes(&text);
        let text = directives::resolve_sections(&text);
        let text = directives::resolve_yields(&text);
        self.rules.apply(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_template_pipeline() {
        let source = "@extends('layout')\n@section('title')Hello {{ $name }}@stop\n";
        let compiled = Compiler::new().compile(source);

        assert_eq!(
            compiled,
            "<% section \"title\" %>Hello <%= $name %><% endsection stop %><% render \"layout\" %>"
        );
    }

    #[test]
    fn test_layout_pipeline() {
        let source = "<title>@yield('title', 'Site')</title>\n@include('footer')";
        let compiled = Compiler::new().compile(source);

        assert_eq!(
            compiled,
            "<title><% yield \"title\" \"Site\" %></title>\n<% render \"footer\" %>"
        );
    }

    #[test]
    fn test_compile_is_deterministic() {
        let source = "@if($a)@include('x')@endif {{-- c --}}";
        let compiler = Compiler::new();

        assert_eq!(compiler.compile(source), compiler.compile(source));
    }

    #[test]
    fn test_user_rule_applies_in_pipeline() {
        let mut compiler = Compiler::new();
        compiler.add_rule(r"@csrf\b", "<input type=\"hidden\">").unwrap();

        assert_eq!(compiler.compile("<form>@csrf</form>"), "<form><input type=\"hidden\"></form>");
    }

    #[test]
    fn test_source_tag_markers_are_escaped() {
        let compiled = Compiler::new().compile("<% if x %> {{ $y }}");
        assert_eq!(compiled, "<%% if x %> <%= $y %>");
    }

    #[test]
    fn test_malformed_directives_pass_through() {
        let source = "@include(nav) @section('a' @yield(";
        assert_eq!(Compiler::new().compile(source), source);
    }
}
