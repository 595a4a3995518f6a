use super::*;

#[test]
fn render_rule_notation() {
    let g = Grammar::new("T")
        .token("ID", None)
        .token("PLUS", Some("+"))
        .rule(
            "s",
            vec![
                alt([labeled("x", token("ID")), optional(vec![alt([token("PLUS")]), alt([])])]),
                alt([rule_call("t", "$v"), star(vec![alt([set(&["ID", "PLUS"])])])]).labeled("Call"),
                alt([not_set(&["ID"]), wildcard(), predicate(1), action(0)]).right_assoc(),
            ],
        );

    insta::assert_snapshot!(
        g.to_string(),
        @"s : x=ID ( PLUS |  )? | t[$v] ( (ID | PLUS) )* # Call | <assoc=right> ~(ID) . {pred 1}? {action 0} ;"
    );
}

#[test]
fn precedence_shows_as_argument() {
    let mut call = rule_ref("e");
    if let Element::Rule { precedence, .. } = &mut call {
        *precedence = Some(3);
    }
    assert_eq!(call.to_string(), "e[3]");
    assert_eq!(precpred(2).to_string(), "{precpred 2}?");
}
