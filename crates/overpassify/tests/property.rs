use overpassify::advanced::{parse, parse_expr};
use overpassify::{SetExpr, SetKind, Statement, TranslateConfig, overpassify, translate};
use proptest::prelude::*;

const NAMES: [&str; 4] = ["a", "b", "c", "d"];

fn arb_name() -> impl Strategy<Value = String> {
    prop::sample::select(NAMES.to_vec()).prop_map(str::to_string)
}

/// Source for a set expression over the bound names `a`..`d` and `search`
fn arb_set(depth: u32) -> BoxedStrategy<String> {
    let leaf = prop_oneof![
        arb_name(),
        (1u64..10_000).prop_map(|id| format!("Way({id})")),
        (0usize..3).prop_map(|n| format!("Node(search, amenity=\"{}\")", ["cafe", "bar", "pub"][n])),
    ];
    if depth == 0 {
        return leaf.boxed();
    }
    let nested = (arb_set(depth - 1), prop_oneof![Just("+"), Just("-")], arb_set(depth - 1))
        .prop_map(|(lhs, op, rhs)| format!("({lhs} {op} {rhs})"));
    let ternary = (arb_set(depth - 1), 0i64..100)
        .prop_map(|(then, n)| format!("({then} if count(ways) > {n} else Set())"));
    prop_oneof![leaf, nested, ternary].boxed()
}

fn arb_program() -> impl Strategy<Value = String> {
    prop::collection::vec((arb_name(), arb_set(3)), 1..6).prop_map(|assignments| {
        let mut source = String::from("search = Area(3600134503)\na = Way(1)\nb = Way(2)\nc = Node(3)\nd = Relation(4)\n");
        for (name, value) in assignments {
            source.push_str(&format!("{name} = {value}\n"));
        }
        source.push_str("out(a, count=True)\n");
        source
    })
}

fn nested_union(names: &[String], left_assoc: bool) -> SetExpr {
    let mut operands: Vec<SetExpr> = names.iter().map(SetExpr::var).collect();
    if left_assoc {
        let mut acc = operands.remove(0);
        for operand in operands {
            acc = SetExpr::union(vec![acc, operand]);
        }
        acc
    } else {
        let mut acc = operands.pop().unwrap();
        while let Some(operand) = operands.pop() {
            acc = SetExpr::union(vec![operand, acc]);
        }
        acc
    }
}

proptest! {
    #[test]
    fn translation_is_deterministic(source in arb_program()) {
        let config = TranslateConfig::new();
        let first = overpassify(&source, &config).expect("generated program should compile");
        let second = overpassify(&source, &config).expect("generated program should compile");
        prop_assert_eq!(first, second);
    }

    #[test]
    fn every_statement_is_terminated(source in arb_program()) {
        let compiled = overpassify(&source, &TranslateConfig::new()).unwrap();
        for line in compiled.query.lines() {
            prop_assert!(line.ends_with(';'), "unterminated line: {}", line);
        }
    }

    #[test]
    fn union_grouping_does_not_matter(names in prop::collection::vec(arb_name(), 2..6)) {
        let mut body: Vec<Statement> = NAMES
            .iter()
            .map(|name| Statement::assign(*name, SetExpr::empty(SetKind::Way)))
            .collect();
        body.push(Statement::assign("x", nested_union(&names, true)));
        let left = translate(&body, &TranslateConfig::new()).unwrap().query;
        body.pop();
        body.push(Statement::assign("x", nested_union(&names, false)));
        let right = translate(&body, &TranslateConfig::new()).unwrap().query;
        prop_assert_eq!(left, right);
    }

    #[test]
    fn ternary_with_empty_else_binds_nothing(n in 0i64..1000, name in arb_name()) {
        let source = format!("{name} = Way(1)\nx = {name} if count(ways) > {n} else Set()\n");
        let query = overpassify(&source, &TranslateConfig::new()).unwrap().query;
        prop_assert!(!query.contains("tmp"));
    }

    #[test]
    fn if_else_filters_one_pivot(n in 0i64..1000, id in 1u64..u32::MAX as u64) {
        let config = TranslateConfig::new().with_pivot(SetKind::Node, id);
        let source = format!("if count(ways) > {n}:\n    out()\nelse:\n    out(count=True)\n");
        let query = overpassify(&source, &config).unwrap().query;
        prop_assert_eq!(query.matches(&format!("(node({id});) -> .")).count(), 1);
        prop_assert_eq!(query.matches("foreach.").count(), 2);
        prop_assert_eq!(query.matches("(if: ").count(), 2);
    }

    #[test]
    fn surface_display_reparses(source in arb_set(3)) {
        let parsed = parse_expr(&source).expect("generated expression should parse");
        let reparsed = parse_expr(&parsed.to_string()).expect("display output should reparse");
        prop_assert_eq!(parsed, reparsed);
    }

    #[test]
    fn parser_never_panics(source in "[a-zA-Z0-9_ ()=+\\-.,:\"\n]{0,80}") {
        let _ = parse(&source);
    }
}
