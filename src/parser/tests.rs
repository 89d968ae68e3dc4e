use super::*;
use crate::ast::ExprQuery;

fn parse(input: &str) -> Result<Template, ParseError> {
    TemplateParser::new().parse(input)
}

fn literal(text: &str) -> Directive {
    Directive::Literal(text.to_string())
}

#[test]
fn plain_text_is_one_literal() {
    let template = parse("I, the undersigned, declare.").unwrap();
    assert_eq!(template.directives, vec![literal("I, the undersigned, declare.")]);
}

#[test]
fn interpolation_splits_text() {
    let template = parse("I, ${{ .personal.first_name }}, declare.").unwrap();
    assert_eq!(template.directives.len(), 3);
    assert_eq!(template.directives[0], literal("I, "));
    assert!(matches!(template.directives[1], Directive::Invocation(Expr::Query(ExprQuery::Index(_)))));
    assert_eq!(template.directives[2], literal(", declare."));
}

#[test]
fn conditional_with_else_if_and_else() {
    let template = parse("${{ if .a }}A${{ else if .b }}B${{ else }}C${{ end }}").unwrap();
    let [Directive::Conditional(conditional)] = template.directives.as_slice() else {
        panic!("expected one conditional, got {:?}", template.directives);
    };
    assert_eq!(conditional.branches.len(), 2);
    assert_eq!(conditional.branches[0].body, vec![literal("A")]);
    assert_eq!(conditional.branches[1].body, vec![literal("B")]);
    assert_eq!(conditional.otherwise, vec![literal("C")]);
}

#[test]
fn nested_blocks() {
    let template = parse("${{ each .kids as $kid }}${{ if $kid.city }}<${{ $kid.city }}>${{ end }}${{ end }}").unwrap();
    let [Directive::Iteration(iteration)] = template.directives.as_slice() else {
        panic!("expected one iteration, got {:?}", template.directives);
    };
    assert_eq!(iteration.binding, "kid");
    let [Directive::Conditional(conditional)] = iteration.body.as_slice() else {
        panic!("expected nested conditional, got {:?}", iteration.body);
    };
    assert_eq!(conditional.branches[0].body.len(), 3);
}

#[test]
fn each_group_builds_grouped_iteration() {
    let template = parse("${{ each_group .role_lists.executors as $cohort }}x${{ end }}").unwrap();
    assert!(matches!(template.directives[0], Directive::GroupedIteration(_)));
}

#[test]
fn closing_braces_inside_string_do_not_end_tag() {
    let template = parse(r#"${{ concat("}}", "x") }}!"#).unwrap();
    assert_eq!(template.directives.len(), 2);
    assert_eq!(template.directives[1], literal("!"));
}

#[test]
fn single_quoted_strings() {
    let template = parse("${{ concat('my ', 'estate}}') }}.").unwrap();
    let [Directive::Invocation(Expr::Call(call)), Directive::Literal(rest)] = template.directives.as_slice() else {
        panic!("expected call then literal, got {:?}", template.directives);
    };
    assert_eq!(call.args[1], Expr::String("estate}}".to_string()));
    assert_eq!(rest, ".");
}

#[test]
fn structural_errors() {
    assert_eq!(parse("a ${{ .x "), Err(ParseError::UnterminatedTag { offset: 2 }));
    assert_eq!(parse("${{ if .x }}open"), Err(ParseError::UnclosedBlock { offset: 0 }));
    assert_eq!(
        parse("text${{ end }}"),
        Err(ParseError::UnmatchedTag { tag: "end", offset: 4 })
    );
    assert_eq!(
        parse("${{ each .kids as $k }}${{ else }}${{ end }}"),
        Err(ParseError::UnmatchedTag { tag: "else", offset: 23 })
    );
    assert!(matches!(parse("${{ nope( }}"), Err(ParseError::InvalidTag { offset: 0, .. })));
}
