//! Block structure tests

use crate::template::engine::blocks::{parse, Branch, LoopHead, Node};
use crate::template::error::TemplateError;

fn malformed(compiled: &str) -> String {
    match parse(compiled) {
        Err(TemplateError::MalformedSyntax { message, .. }) => message,
        other => panic!("Expected MalformedSyntax, got {:?}", other),
    }
}

#[test]
fn test_parse_text_and_echo() {
    let nodes = parse("a<%= $x %>b").unwrap();
    assert_eq!(
        nodes,
        vec![
            Node::Text("a".to_string()),
            Node::Echo {
                expr: "$x".to_string(),
                escape: true,
                line: 1
            },
            Node::Text("b".to_string()),
        ]
    );
}

#[test]
fn test_parse_escaped_open_as_text() {
    let nodes = parse("x <%% endif %> y").unwrap();
    assert_eq!(
        nodes,
        vec![
            Node::Text("x ".to_string()),
            Node::Text("<%".to_string()),
            Node::Text(" endif %> y".to_string()),
        ]
    );
}

#[test]
fn test_parse_if_chain() {
    let nodes = parse("<% if $a %>A<% elseif $b %>B<% else %>C<% endif %>").unwrap();
    assert_eq!(
        nodes,
        vec![Node::If {
            branches: vec![
                Branch {
                    condition: "$a".to_string(),
                    line: 1,
                    body: vec![Node::Text("A".to_string())],
                },
                Branch {
                    condition: "$b".to_string(),
                    line: 1,
                    body: vec![Node::Text("B".to_string())],
                },
            ],
            otherwise: Some(vec![Node::Text("C".to_string())]),
        }]
    );
}

#[test]
fn test_parse_foreach_heads() {
    let nodes = parse("<% foreach $items as $item %><% endforeach %>").unwrap();
    assert_eq!(
        nodes,
        vec![Node::Foreach {
            head: LoopHead {
                source: "$items".to_string(),
                key: None,
                value: "item".to_string(),
            },
            body: vec![],
            line: 1,
        }]
    );

    let nodes = parse("<% foreach $map as $k => $v %><% endforeach %>").unwrap();
    match &nodes[0] {
        Node::Foreach { head, .. } => {
            assert_eq!(head.key.as_deref(), Some("k"));
            assert_eq!(head.value, "v");
        }
        other => panic!("Expected Foreach, got {:?}", other),
    }
}

#[test]
fn test_parse_section_tags_stay_flat() {
    let nodes =
        parse(r#"<% section "title" %>T<% endsection show %><% yield "title" "d" %><% render "layout" %>"#)
            .unwrap();
    assert_eq!(
        nodes,
        vec![
            Node::SectionStart {
                name: "title".to_string()
            },
            Node::Text("T".to_string()),
            Node::SectionEnd { show: true, line: 1 },
            Node::Yield {
                name: "title".to_string(),
                default: Some("d".to_string())
            },
            Node::Render {
                name: "layout".to_string(),
                line: 1
            },
        ]
    );
}

#[test]
fn test_unbalanced_blocks() {
    assert!(malformed("<% if $a %>x").contains("never closed"));
    assert!(malformed("<% foreach $a as $b %>x").contains("never closed"));
    assert!(malformed("x<% endif %>").contains("without a matching 'if'"));
    assert!(malformed("<% endforeach %>").contains("without a matching 'foreach'"));
    assert!(malformed("<% else %>").contains("without a matching 'if'"));
    assert!(malformed("<% if $a %><% else %><% else %><% endif %>").contains("after 'else'"));
    assert!(malformed("<% foreach $a as $b %><% endif %><% endforeach %>").contains("'endif'"));
}

#[test]
fn test_bad_tag_arguments() {
    assert!(malformed("<% bogus %>").contains("unknown tag"));
    assert!(malformed("<% if %><% endif %>").contains("without a condition"));
    assert!(malformed("<% foreach $items %><% endforeach %>").contains("expected 'foreach"));
    assert!(malformed("<% foreach $items as 1x %><% endforeach %>").contains("not a valid"));
    assert!(malformed("<% section title %>").contains("invalid section name"));
    assert!(malformed("<% endsection maybe %>").contains("'stop' or 'show'"));
    assert!(malformed("<% render %>").contains("invalid render target"));
    assert!(malformed("<%= %>").contains("empty echo"));
}

#[test]
fn test_error_line_points_at_opening_tag() {
    match parse("a\nb\n<% if $x %>\n") {
        Err(TemplateError::MalformedSyntax { line, .. }) => assert_eq!(line, 3),
        other => panic!("Expected MalformedSyntax, got {:?}", other),
    }
}
