//! End-to-end render tests: source templates on disk through the full
//! locate -> compile -> cache -> execute pipeline

use std::sync::Arc;
use std::thread;
use toml::toml;
use vellum_core::{Bindings, VellumError, View};
use vellum_testkit::ViewFixture;

fn view_for(fixture: &ViewFixture) -> View {
    View::new(fixture.views(), fixture.cache())
}

fn layout(fixture: &ViewFixture) {
    fixture.template(
        "layouts.base",
        "<html><title>@section('title')Base Title@show</title>\
         <body>@yield('content')</body>@yield('footer', 'no footer')</html>",
    );
}

#[test]
fn test_escaped_and_raw_interpolation() {
    let fixture = ViewFixture::new();
    fixture.template("page", "{{ $html }}|{!! $html !!}");
    let view = view_for(&fixture);

    let out = view.make("page").with("html", "<b>hi</b>").render().unwrap();
    assert_eq!(out, "&lt;b&gt;hi&lt;/b&gt;|<b>hi</b>");
}

#[test]
fn test_child_section_overrides_parent() {
    let fixture = ViewFixture::new();
    layout(&fixture);
    fixture.template(
        "pages.about",
        "@extends('layouts.base')\n\
         @section('title')About {{ $name }}@stop\n\
         @section('content')<p>Hello</p>@stop\n",
    );
    let view = view_for(&fixture);

    let out = view.make("pages.about").with("name", "Us").render().unwrap();
    assert!(out.contains("<title>About Us</title>"), "got: {}", out);
    assert!(!out.contains("Base Title"), "got: {}", out);
    assert!(out.contains("<body><p>Hello</p></body>"), "got: {}", out);
}

#[test]
fn test_show_default_appears_once() {
    let fixture = ViewFixture::new();
    layout(&fixture);
    fixture.template(
        "pages.plain",
        "@extends('layouts.base')\n@section('content')body@stop",
    );
    let view = view_for(&fixture);

    let out = view.render("pages.plain", &Bindings::new()).unwrap();
    assert_eq!(out.matches("Base Title").count(), 1, "got: {}", out);
    assert!(out.contains("<title>Base Title</title>"));
}

#[test]
fn test_yield_default_and_short_section() {
    let fixture = ViewFixture::new();
    layout(&fixture);
    fixture.template(
        "pages.short",
        "@extends('layouts.base')\n@section('title', 'Short')",
    );
    let view = view_for(&fixture);

    let out = view.render("pages.short", &Bindings::new()).unwrap();
    assert!(out.contains("<title>Short</title>"), "got: {}", out);
    assert!(out.contains("<body></body>"), "got: {}", out);
    assert!(out.contains("no footer"), "got: {}", out);
}

#[test]
fn test_endsection_is_alias_of_stop() {
    let fixture = ViewFixture::new();
    layout(&fixture);
    fixture.template(
        "pages.alias",
        "@extends('layouts.base')\n@section('footer')F@endsection",
    );
    let view = view_for(&fixture);

    let out = view.render("pages.alias", &Bindings::new()).unwrap();
    assert!(out.ends_with("F</html>"), "got: {}", out);
}

#[test]
fn test_three_level_inheritance() {
    let fixture = ViewFixture::new();
    layout(&fixture);
    fixture.template(
        "layouts.docs",
        "@extends('layouts.base')\n@section('title')Docs@stop\n@section('footer')Docs footer@stop",
    );
    fixture.template(
        "docs.intro",
        "@extends('layouts.docs')\n@section('title')Intro@stop\n@section('content')Read me@stop",
    );
    let view = view_for(&fixture);

    let out = view.render("docs.intro", &Bindings::new()).unwrap();
    assert!(out.contains("<title>Intro</title>"), "got: {}", out);
    assert!(out.contains("<body>Read me</body>"), "got: {}", out);
    assert!(out.contains("Docs footer</html>"), "got: {}", out);
}

#[test]
fn test_include_keeps_surrounding_order() {
    let fixture = ViewFixture::new();
    fixture.template("partials.nav", "[nav {{ $user }}]");
    fixture.template("page", "before @include('partials.nav') after");
    let view = view_for(&fixture);

    let out = view.make("page").with("user", "ada").render().unwrap();
    assert_eq!(out, "before [nav ada] after");
}

#[test]
fn test_included_template_is_fully_resolved() {
    let fixture = ViewFixture::new();
    fixture.template("partials.frame", "<div>@yield('inner', 'empty')</div>");
    fixture.template(
        "partials.card",
        "@extends('partials.frame')\n@section('inner')card@stop",
    );
    fixture.template("page", "A@include('partials.card')B");
    let view = view_for(&fixture);

    assert_eq!(view.render("page", &Bindings::new()).unwrap(), "A<div>card</div>B");
}

#[test]
fn test_control_flow_and_comments() {
    let fixture = ViewFixture::new();
    fixture.template(
        "list",
        "{{-- list of users --}}\
         @if($users)<ul>@foreach($users as $user)<li>{{ $user.name }}@if($user.admin) (admin)@endif</li>@endforeach</ul>\
         @else<p>none</p>@endif",
    );
    let view = view_for(&fixture);

    let bindings = toml! {
        [[users]]
        name = "Ada"
        admin = true

        [[users]]
        name = "Bob"
        admin = false
    };
    let out = view.render("list", &bindings).unwrap();
    assert_eq!(out, "<ul><li>Ada (admin)</li><li>Bob</li></ul>");

    let mut empty = Bindings::new();
    empty.insert("users".to_string(), toml::Value::Array(Vec::new()));
    assert_eq!(view.render("list", &empty).unwrap(), "<p>none</p>");
}

#[test]
fn test_if_condition_with_nested_parentheses() {
    let fixture = ViewFixture::new();
    fixture.template(
        "cond",
        "@if(($a > 1) && ($b == 'x'))yes@elseif(!($a > 1))small@else no@endif",
    );
    let view = view_for(&fixture);

    let mut bindings = toml! {
        a = 2
        b = "x"
    };
    assert_eq!(view.render("cond", &bindings).unwrap(), "yes");

    bindings.insert("a".to_string(), toml::Value::Integer(0));
    assert_eq!(view.render("cond", &bindings).unwrap(), "small");
}

#[test]
fn test_user_rule() {
    let fixture = ViewFixture::new();
    fixture.template("form", "<form>@csrf</form>");
    let mut view = view_for(&fixture);
    view.add_rule("@csrf", "<input name=\"_token\" value=\"<%= csrf_token %>\">")
        .unwrap();

    let out = view.make("form").with("csrf_token", "t0k").render().unwrap();
    assert_eq!(out, "<form><input name=\"_token\" value=\"t0k\"></form>");
}

#[test]
fn test_invalid_rule_is_rejected() {
    let fixture = ViewFixture::new();
    let mut view = view_for(&fixture);
    assert!(matches!(
        view.add_rule("@bad(", "x"),
        Err(VellumError::InvalidRule { .. })
    ));
}

#[test]
fn test_missing_template_creates_no_cache_entry() {
    let fixture = ViewFixture::new();
    let view = view_for(&fixture);

    match view.render("does.not.exist", &Bindings::new()) {
        Err(VellumError::TemplateNotFound { name, .. }) => assert_eq!(name, "does.not.exist"),
        other => panic!("Expected TemplateNotFound, got {:?}", other),
    }
    assert!(fixture.cache_entries().is_empty());
}

#[test]
fn test_missing_parent_aborts_whole_render() {
    let fixture = ViewFixture::new();
    fixture.template("child", "@extends('ghost')\n@section('a')x@stop");
    let view = view_for(&fixture);

    assert!(matches!(
        view.render("child", &Bindings::new()),
        Err(VellumError::TemplateNotFound { .. })
    ));
}

#[test]
fn test_suffix_preference() {
    let fixture = ViewFixture::new();
    fixture.write("page", ".html", "html");
    fixture.write("page", ".php", "php");
    fixture.write("page", ".tpl", "tpl");
    let mut view = view_for(&fixture);

    assert_eq!(view.render("page", &Bindings::new()).unwrap(), "html");

    view.add_suffix(".tpl");
    assert_eq!(view.render("page", &Bindings::new()).unwrap(), "tpl");
}

#[test]
fn test_unclosed_section_is_malformed() {
    let fixture = ViewFixture::new();
    fixture.template("broken", "@section('a')never closed");
    let view = view_for(&fixture);

    match view.render("broken", &Bindings::new()) {
        Err(VellumError::MalformedDirective { template, message, .. }) => {
            assert_eq!(template, "broken");
            assert!(message.contains("unclosed"));
        }
        other => panic!("Expected MalformedDirective, got {:?}", other),
    }
}

#[test]
fn test_malformed_directive_passes_through_as_text() {
    let fixture = ViewFixture::new();
    fixture.template("odd", "@include(nav) and @yield(");
    let view = view_for(&fixture);

    assert_eq!(
        view.render("odd", &Bindings::new()).unwrap(),
        "@include(nav) and @yield("
    );
}

#[test]
fn test_tag_syntax_in_source_renders_verbatim() {
    let fixture = ViewFixture::new();
    fixture.template(
        "doc",
        "In ERB write <% if x %> to branch and <%= y %> to print, not {{ $name }}.",
    );
    let view = view_for(&fixture);

    let out = view.make("doc").with("name", "Ada").render().unwrap();
    assert_eq!(
        out,
        "In ERB write <% if x %> to branch and <%= y %> to print, not Ada."
    );
}

#[test]
fn test_source_render_tag_does_not_execute() {
    let fixture = ViewFixture::new();
    fixture.template("secret", "SECRET");
    fixture.template("doc", "<% render \"secret\" %>");
    let view = view_for(&fixture);

    assert_eq!(
        view.render("doc", &Bindings::new()).unwrap(),
        "<% render \"secret\" %>"
    );
}

#[test]
fn test_stray_section_terminators_stay_literal() {
    let fixture = ViewFixture::new();
    fixture.template("news", "Tickets for the @show are sold out, @stop by later.");
    let view = view_for(&fixture);

    assert_eq!(
        view.render("news", &Bindings::new()).unwrap(),
        "Tickets for the @show are sold out, @stop by later."
    );
}

#[test]
fn test_show_section_yielded_later_prints_once_at_yield() {
    let fixture = ViewFixture::new();
    fixture.template(
        "layouts.twice",
        "<h>@section('title')Default@show</h><t>@yield('title')</t>",
    );
    fixture.template(
        "pages.titled",
        "@extends('layouts.twice')\n@section('title')Mine@stop",
    );
    let view = view_for(&fixture);

    assert_eq!(
        view.render("layouts.twice", &Bindings::new()).unwrap(),
        "<h></h><t>Default</t>"
    );
    assert_eq!(
        view.render("pages.titled", &Bindings::new()).unwrap(),
        "<h></h><t>Mine</t>"
    );
}

#[test]
fn test_undefined_echo_fails() {
    let fixture = ViewFixture::new();
    fixture.template("page", "line one\n{{ $nobody }}");
    let view = view_for(&fixture);

    match view.render("page", &Bindings::new()) {
        Err(VellumError::ExecutionFailed { template, reason }) => {
            assert_eq!(template, "page");
            assert!(reason.contains("$nobody"));
            assert!(reason.contains("line 2"));
        }
        other => panic!("Expected ExecutionFailed, got {:?}", other),
    }
}

#[test]
fn test_section_table_is_fresh_per_render() {
    let fixture = ViewFixture::new();
    fixture.template("frame", "[@yield('s', 'default')]");
    fixture.template("with_section", "@extends('frame')\n@section('s')set@stop");
    let view = view_for(&fixture);

    assert_eq!(view.render("with_section", &Bindings::new()).unwrap(), "[set]");
    assert_eq!(view.render("frame", &Bindings::new()).unwrap(), "[default]");
}

#[test]
fn test_concurrent_renders_are_isolated() {
    let fixture = ViewFixture::new();
    fixture.template("shell", "<h1>@yield('title')</h1>");
    fixture.template(
        "leaf",
        "@extends('shell')\n@section('title')Page {{ $n }}@stop",
    );
    let view = Arc::new(view_for(&fixture));

    let handles: Vec<_> = (0..8)
        .map(|n| {
            let view = Arc::clone(&view);
            thread::spawn(move || {
                for _ in 0..10 {
                    let out = view.make("leaf").with("n", n as i64).render().unwrap();
                    assert_eq!(out, format!("<h1>Page {}</h1>", n));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
