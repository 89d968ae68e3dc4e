use proptest::prelude::*;

use super::*;
use crate::record::{Address, Person};

fn node(id: &str, order: i64, body: Option<&str>, fallback: &str) -> TemplateNode {
    TemplateNode {
        id: id.to_string(),
        order,
        body_template: body.map(str::to_string),
        fallback_text: fallback.to_string(),
        ..TemplateNode::default()
    }
}

fn record() -> CanonicalDataRecord {
    let mut record = CanonicalDataRecord::default();
    record.personal.first_name = "Jane".to_string();
    record.personal.last_name = "Doe".to_string();
    record.kids.push(Person {
        id: "kid-1".to_string(),
        first_name: "Ava".to_string(),
        last_name: "Doe".to_string(),
        address: Address {
            city: "Ottawa".to_string(),
            ..Address::default()
        },
        ..Person::default()
    });
    record
}

#[test]
fn siblings_sorted_by_order_then_declaration() {
    let nodes = vec![
        node("c", 3, Some("C"), ""),
        node("a1", 1, Some("A1"), ""),
        node("b", 2, Some("B"), ""),
        node("a2", 1, Some("A2"), ""),
    ];
    let config = EngineConfig::default();
    assert_eq!(render(&nodes, &record(), &config), "A1A2BC");
}

#[test]
fn parent_text_precedes_children() {
    let mut parent = node("parent", 1, Some("<h1>Will</h1>"), "");
    parent.title_template = Some("<title>${{ .personal.last_name }}</title>".to_string());
    parent.children = vec![node("second", 2, Some("[2]"), ""), node("first", 1, Some("[1]"), "")];
    let nodes = vec![parent, node("after", 2, Some("<p>end</p>"), "")];

    let config = EngineConfig::default();
    let document = render_with_report(&nodes, &record(), &config);
    assert_eq!(document.body, "<title>Doe</title><h1>Will</h1>[1][2]<p>end</p>");
    let ids: Vec<&str> = document.visits.iter().map(|visit| visit.id.as_str()).collect();
    assert_eq!(ids, vec!["parent", "first", "second", "after"]);
}

#[test]
fn fallback_when_body_missing_broken_or_blank() {
    let nodes = vec![
        node("missing", 1, None, "<p>[missing]</p>"),
        node("broken", 2, Some("${{ if .kids }}never closed"), "<p>[broken]</p>"),
        node("blank", 3, Some("${{ .spouse_info.first_name }}"), "<p>[blank]</p>"),
        node("partial", 4, Some("Hi ${{ .personal.nickname }}"), "<p>[partial]</p>"),
        node("empty_choice", 5, Some("${{ if .spouse_info }}married${{ end }}"), "<p>[empty]</p>"),
    ];
    let config = EngineConfig::default();
    let document = render_with_report(&nodes, &record(), &config);
    assert_eq!(document.body, "<p>[missing]</p><p>[broken]</p><p>[blank]</p>Hi ");
    assert_eq!(document.fallback_ids().collect::<Vec<_>>(), vec!["missing", "broken", "blank"]);
}

#[test]
fn failed_clause_without_fallback_leaves_a_label() {
    let mut section = node("section", 1, None, "");
    section.title_template = Some("<h2>Gifts</h2>".to_string());
    let nodes = vec![
        section,
        node("gifts", 2, Some("${{ .spouse_info.first_name }}"), ""),
        node("empty_choice", 3, Some("${{ if .pets }}pets${{ end }}"), ""),
    ];
    let config = EngineConfig {
        omitted_clause_label: "[Gift clause & schedule pending]".to_string(),
        ..EngineConfig::default()
    };
    let document = render_with_report(&nodes, &record(), &config);
    assert_eq!(document.body, "<h2>Gifts</h2><p>[Gift clause &amp; schedule pending]</p>");
    assert_eq!(document.fallback_ids().collect::<Vec<_>>(), vec!["section", "gifts"]);

    let default_label = render(&nodes[1..2], &record(), &EngineConfig::default());
    assert_eq!(default_label, "<p>[This clause could not be completed.]</p>");
}

#[test]
fn unknown_reference_still_renders_text() {
    let nodes = vec![node(
        "guardian",
        1,
        Some("<p>I appoint ${{ describe(\"Nobody Known\") }} as guardian.</p>"),
        "<p>[guardian]</p>",
    )];
    let config = EngineConfig::default();
    let document = render_with_report(&nodes, &record(), &config);
    assert_eq!(document.body, "<p>I appoint [UNKNOWN PERSON] as guardian.</p>");
    assert_eq!(document.visits[0].outcome, NodeOutcome::Rendered);
}

#[test]
fn lint_reports_authoring_defects() {
    let mut parent = node("intro", 1, Some("${{ .personal.first_name }} ${{ names(.kids) }}"), "");
    parent.depends_on = vec!["personal.first_name".to_string()];
    parent.children = vec![
        node("dup", 1, Some("x"), ""),
        node("dup", 1, Some("${{ nope(1) }}"), ""),
    ];
    let issues = lint(&[parent]);

    assert!(issues.contains(&LintIssue::UndeclaredDependency {
        id: "intro".to_string(),
        field: "kids".to_string(),
    }));
    assert!(issues.contains(&LintIssue::DuplicateOrder {
        order: 1,
        first: "dup".to_string(),
        second: "dup".to_string(),
    }));
    assert!(issues.contains(&LintIssue::DuplicateId { id: "dup".to_string() }));
    assert!(issues
        .iter()
        .any(|issue| matches!(issue, LintIssue::Unparsable { field: "body_template", .. })));
    assert_eq!(issues.len(), 4);
}

#[test]
fn lint_accepts_clean_tree() {
    let mut intro = node("intro", 1, Some("${{ each .kids as $kid }}${{ $kid.first_name }}${{ end }}"), "");
    intro.depends_on = vec![".kids[0].first_name".to_string()];
    assert!(lint(&[intro, node("end", 2, Some("fin"), "")]).is_empty());
}

const BODIES: [&str; 6] = [
    "Hello ${{ .personal.first_name }}",
    "${{ .personal.nickname }}",
    "${{ if .kids }}kids${{ else }}none${{ end }}",
    "${{ broken",
    "${{ each .kids as $k }}${{ describe($k.id) }}${{ end }}",
    "plain",
];

fn arb_node() -> impl Strategy<Value = TemplateNode> {
    (
        0i64..4,
        prop::option::of(prop::sample::select(BODIES.to_vec())),
        "[a-z]{0,4}",
    )
        .prop_map(|(order, body, fallback)| TemplateNode {
            order,
            body_template: body.map(str::to_string),
            fallback_text: fallback,
            ..TemplateNode::default()
        })
}

fn arb_tree() -> impl Strategy<Value = Vec<TemplateNode>> {
    let tree = arb_node().prop_recursive(3, 32, 4, |inner| {
        (arb_node(), prop::collection::vec(inner, 0..4)).prop_map(|(mut node, children)| {
            node.children = children;
            node
        })
    });
    prop::collection::vec(tree, 0..5).prop_map(|mut nodes| {
        let mut next_id = 0;
        assign_ids(&mut nodes, &mut next_id);
        nodes
    })
}

fn assign_ids(nodes: &mut [TemplateNode], next_id: &mut usize) {
    for node in nodes {
        node.id = format!("n{}", next_id);
        *next_id += 1;
        assign_ids(&mut node.children, next_id);
    }
}

fn all_ids(nodes: &[TemplateNode], ids: &mut Vec<String>) {
    for node in nodes {
        ids.push(node.id.clone());
        all_ids(&node.children, ids);
    }
}

proptest! {
    #[test]
    fn render_is_deterministic(nodes in arb_tree()) {
        let config = EngineConfig::default();
        let record = record();
        let first = render_with_report(&nodes, &record, &config);
        let second = render_with_report(&nodes, &record, &config);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn every_node_visited_exactly_once(nodes in arb_tree()) {
        let config = EngineConfig::default();
        let document = render_with_report(&nodes, &record(), &config);

        let mut expected = Vec::new();
        all_ids(&nodes, &mut expected);
        expected.sort();
        let mut visited: Vec<String> = document.visits.iter().map(|visit| visit.id.clone()).collect();
        visited.sort();

        prop_assert_eq!(visited.len(), TemplateNode::count(&nodes));
        prop_assert_eq!(visited, expected);
        prop_assert!(!document.body.contains("${{"));
    }
}
