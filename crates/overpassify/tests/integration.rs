//! Black-box integration tests for overpassify
//!
//! Statement trees go through `translate`; source text through the full
//! parse → lower → translate pipeline.

use overpassify::{
    Anchor, Compiled, Cond, Construct, DiagnosticKind, ErrorKind, OverpassifyError, Scalar,
    SetExpr, SetKind, SettingValue, Statement, TagPredicate, TranslateConfig, TranslateError,
    overpassify, translate,
};

fn pivot_config() -> TranslateConfig {
    TranslateConfig::new().with_pivot(SetKind::Relation, 2186646)
}

fn compile(source: &str) -> String {
    overpassify(source, &TranslateConfig::new()).unwrap().query
}

fn compile_with_pivot(source: &str) -> Compiled {
    overpassify(source, &pivot_config()).unwrap()
}

fn translate_err(body: &[Statement]) -> TranslateError {
    translate(body, &TranslateConfig::new()).unwrap_err()
}

fn source_err(source: &str, config: &TranslateConfig) -> TranslateError {
    match overpassify(source, config) {
        Err(OverpassifyError::Translate(err)) => err,
        other => panic!("Expected translate error, got {other:?}"),
    }
}

fn way(id: u64) -> Construct {
    Construct::new(SetKind::Way).by_id(id)
}

// ============ Statement trees ============

#[test]
fn assign_area_by_id() {
    let body = [Statement::assign(
        "search",
        Construct::new(SetKind::Area).by_id(3600134503),
    )];
    let compiled = translate(&body, &TranslateConfig::new()).unwrap();
    assert_eq!(compiled.query, "(area(3600134503);) -> .search;");
    assert!(compiled.diagnostics.is_empty());
}

#[test]
fn assign_tagged_ways_in_area() {
    let body = [
        Statement::assign("search", Construct::new(SetKind::Area).by_id(3600134503)),
        Statement::assign(
            "ways",
            Construct::new(SetKind::Way)
                .within("search")
                .tag("highway", TagPredicate::Exists),
        ),
    ];
    let query = translate(&body, &TranslateConfig::new()).unwrap().query;
    assert_eq!(
        query.lines().nth(1),
        Some(r#"(way["highway"](area.search);) -> .ways;"#)
    );
}

#[test]
fn output_one_statement_per_flag() {
    let body = [
        Statement::assign("ways", way(1)),
        Statement::output(Some(SetExpr::var("ways")), &["count", "geom"]),
    ];
    let query = translate(&body, &TranslateConfig::new()).unwrap().query;
    assert_eq!(query, "(way(1);) -> .ways;\n.ways out count;\n.ways out geom;");
}

#[test]
fn bare_output() {
    let compiled = translate(&[Statement::output(None, &[])], &TranslateConfig::new()).unwrap();
    assert_eq!(compiled.query, "out;");
}

#[test]
fn output_flags_without_target() {
    let compiled = translate(&[Statement::output(None, &["meta", "meta", "qt"])], &TranslateConfig::new())
        .unwrap();
    assert_eq!(compiled.query, "out meta;\nout qt;");
}

#[test]
fn falsy_option_values_still_emit_flags() {
    assert_eq!(
        compile("ways = Way(1)\nout(ways, count=False, geom=0)\n"),
        "(way(1);) -> .ways;\n.ways out count;\n.ways out geom;"
    );
}

#[test]
fn foreach_over_named_set() {
    let body = [
        Statement::assign("ways", way(1)),
        Statement::for_each(
            "way",
            SetExpr::var("ways"),
            vec![Statement::output(Some(SetExpr::var("way")), &["geom"])],
        ),
    ];
    let query = translate(&body, &TranslateConfig::new()).unwrap().query;
    assert_eq!(
        query,
        "(way(1);) -> .ways;\nforeach.ways->.way(\n.way out geom;\n);"
    );
}

#[test]
fn tag_predicates_in_declaration_order() {
    let body = [Statement::assign(
        "roads",
        Construct::new(SetKind::Way)
            .tag("highway", TagPredicate::Regex("^(primary|secondary)$".into()))
            .tag("name", TagPredicate::NotExists)
            .tag("ref", TagPredicate::NotRegex("^A".into()))
            .tag("oneway", TagPredicate::ExactMatch("yes".into())),
    )];
    let query = translate(&body, &TranslateConfig::new()).unwrap().query;
    assert_eq!(
        query,
        r#"(way["highway"~"^(primary|secondary)$"][!"name"]["ref"!~"^A"]["oneway"="yes"];) -> .roads;"#
    );
}

#[test]
fn nested_unions_flatten() {
    let setup = vec![
        Statement::assign("a", way(1)),
        Statement::assign("b", way(2)),
        Statement::assign("c", way(3)),
    ];
    let left = SetExpr::union(vec![
        SetExpr::union(vec![SetExpr::var("a"), SetExpr::var("b")]),
        SetExpr::var("c"),
    ]);
    let right = SetExpr::union(vec![
        SetExpr::var("a"),
        SetExpr::union(vec![SetExpr::var("b"), SetExpr::var("c")]),
    ]);

    let mut body = setup.clone();
    body.push(Statement::assign("x", left));
    let left = translate(&body, &TranslateConfig::new()).unwrap().query;

    let mut body = setup;
    body.push(Statement::assign("x", right));
    let right = translate(&body, &TranslateConfig::new()).unwrap().query;

    assert_eq!(left, right);
    assert!(left.ends_with("((.a; .b; .c);) -> .x;"));
}

#[test]
fn difference_and_filter() {
    let body = [
        Statement::assign("a", way(1)),
        Statement::assign("b", way(2)),
        Statement::assign("d", SetExpr::difference(SetExpr::var("a"), SetExpr::var("b"))),
        Statement::assign("n", SetExpr::filter(SetKind::Node, SetExpr::var("d"))),
        Statement::assign(
            "i",
            SetExpr::Intersect(SetKind::Way, vec![SetExpr::var("a"), SetExpr::var("b")]),
        ),
    ];
    let query = translate(&body, &TranslateConfig::new()).unwrap().query;
    let lines: Vec<&str> = query.lines().collect();
    assert_eq!(lines[2], "((.a - .b);) -> .d;");
    assert_eq!(lines[3], "(node.d;) -> .n;");
    assert_eq!(lines[4], "(way.a.b;) -> .i;");
}

#[test]
fn intersect_of_one_set_narrows_it() {
    let body = [
        Statement::assign(
            "a",
            SetExpr::union(vec![way(1).into(), Construct::new(SetKind::Node).by_id(2).into()]),
        ),
        Statement::assign("w", SetExpr::Intersect(SetKind::Way, vec![SetExpr::var("a")])),
    ];
    let query = translate(&body, &TranslateConfig::new()).unwrap().query;
    assert_eq!(query.lines().last(), Some("(way.a;) -> .w;"));

    let err = translate_err(&[Statement::assign("w", SetExpr::Intersect(SetKind::Way, vec![]))]);
    assert!(matches!(
        err.kind,
        ErrorKind::Arity {
            construct: "Intersect",
            found: 0,
            ..
        }
    ));
}

#[test]
fn empty_set_constructor() {
    let body = [Statement::assign("nothing", SetExpr::empty(SetKind::Generic))];
    let query = translate(&body, &TranslateConfig::new()).unwrap().query;
    assert_eq!(query, "(();) -> .nothing;");
}

#[test]
fn tree_errors() {
    let err = translate_err(&[Statement::assign("tmpx", way(1))]);
    assert_eq!(err.kind, ErrorKind::ReservedName("tmpx".into()));
    assert_eq!(err.location.path, vec![0]);

    let err = translate_err(&[
        Statement::assign("a", way(1)),
        Statement::assign("d", SetExpr::Difference(vec![SetExpr::var("a")])),
    ]);
    assert!(matches!(
        err.kind,
        ErrorKind::Arity {
            construct: "Difference",
            found: 1,
            ..
        }
    ));
    assert_eq!(err.location.path, vec![1]);

    let err = translate_err(&[Statement::assign(
        "f",
        SetExpr::filter(SetKind::Way, way(1).into()),
    )]);
    assert_eq!(
        err.kind,
        ErrorKind::NotNamed {
            construct: "Filter",
            found: "constructor".into()
        }
    );

    let err = translate_err(&[
        Statement::assign("a", way(1)),
        Statement::assign(
            "i",
            SetExpr::Intersect(SetKind::Way, vec![SetExpr::var("a"), way(2).into()]),
        ),
    ]);
    assert!(matches!(err.kind, ErrorKind::NotNamed { construct: "Intersect", .. }));

    let err = translate_err(&[Statement::output(Some(SetExpr::var("missing")), &[])]);
    assert_eq!(err.kind, ErrorKind::UndefinedName("missing".into()));

    let err = translate_err(&[Statement::output(None, &["pretty"])]);
    assert_eq!(
        err.kind,
        ErrorKind::UnknownOption {
            context: "out",
            key: "pretty".into()
        }
    );
}

#[test]
fn settings_must_come_first() {
    let timeout = SettingValue::Scalar(Scalar::Number(25i64.into()));
    let settings = Statement::Settings([("timeout".to_string(), timeout)].into_iter().collect());

    let compiled = translate(
        &[settings.clone(), Statement::output(None, &[])],
        &TranslateConfig::new(),
    )
    .unwrap();
    assert_eq!(compiled.query, "[timeout:25];\nout;");

    let err = translate_err(&[Statement::output(None, &[]), settings.clone()]);
    assert_eq!(err.kind, ErrorKind::Ordering);

    // Only the first top-level position counts
    let nested = Statement::if_else(Cond::Number(1i64.into()), vec![settings], None);
    let err = translate(&[nested], &pivot_config()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Ordering);
    assert_eq!(err.location.path, vec![0, 0]);
}

#[test]
fn pivot_must_be_specific() {
    let config = TranslateConfig::new().with_pivot(SetKind::Generic, 1);
    let body = [Statement::if_else(Cond::Number(1i64.into()), vec![], None)];
    let err = translate(&body, &config).unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::KindMismatch {
            expected: "a specific element kind",
            found: SetKind::Generic
        }
    );
}

#[test]
fn compilations_do_not_share_temporaries() {
    let body = [Statement::for_each(
        "w",
        way(1).into(),
        vec![Statement::output(Some(SetExpr::var("w")), &[])],
    )];
    let first = translate(&body, &TranslateConfig::new()).unwrap();
    let second = translate(&body, &TranslateConfig::new()).unwrap();
    assert_eq!(first, second);
    assert!(first.query.starts_with("(way(1);) -> .tmpfor0;"));
}

// ============ Source text ============

#[test]
fn source_function_body() {
    let source = r#"
from overpassify import overpassify

@overpassify
def query():
    """Highways in Boston."""
    search = Area(3600134503)
    ways = Way(search, highway=...)
    out(ways, geom=True)
"#;
    // The import line is not part of the function
    assert!(overpassify(source, &TranslateConfig::new()).is_err());

    let source = source.replace("from overpassify import overpassify\n", "");
    assert_eq!(
        compile(&source),
        "(area(3600134503);) -> .search;\n(way[\"highway\"](area.search);) -> .ways;\n.ways out geom;"
    );
}

#[test]
fn source_settings_header() {
    let source = "Settings(out=\"json\", timeout=25)\nways = Way(1)\nout(ways)\n";
    assert_eq!(
        compile(source),
        "[out:json][timeout:25];\n(way(1);) -> .ways;\n.ways out;"
    );
}

#[test]
fn source_set_algebra() {
    let source = r#"
a = Way(1)
b = Way(2)
c = Node(3)
u = a + b + c
d = a - b
s = Set(a, c)
nothing = Set()
"#;
    let query = compile(source);
    let lines: Vec<&str> = query.lines().collect();
    assert_eq!(lines[3], "((.a; .b; .c);) -> .u;");
    assert_eq!(lines[4], "((.a - .b);) -> .d;");
    assert_eq!(lines[5], "((.a; .c);) -> .s;");
    assert_eq!(lines[6], "(();) -> .nothing;");
}

#[test]
fn source_query_helpers() {
    let source = r#"
ways = Way(1)
up = ways.recurse_up()
down = Way(2).recurse_down_relations()
areas = is_in(42.36, -71.05)
containing = is_in(ways)
near = Around(ways, 50)
point = Around(100, 42.36, -71.05)
cafes = Node(Around(ways, 50), amenity="cafe")
"#;
    let query = compile(source);
    let lines: Vec<&str> = query.lines().collect();
    assert_eq!(
        &lines[1..],
        &[
            "(.ways <;) -> .up;",
            "(way(2);) -> .tmprec0;",
            "(.tmprec0 >>;) -> .down;",
            "(is_in(42.36,-71.05);) -> .areas;",
            "(.ways is_in;) -> .containing;",
            "(node(around.ways:50);) -> .near;",
            "(node(around:100,42.36,-71.05);) -> .point;",
            r#"(node["amenity"="cafe"](around.ways:50);) -> .cafes;"#,
        ]
    );
}

#[test]
fn ternary_with_empty_else_filters_directly() {
    let source = r#"
a = Way(1)
b = a if t["highway"] == "primary" else Way()
c = Way(2, highway=...) if count(ways) > 0 else Set()
"#;
    let query = compile(source);
    let lines: Vec<&str> = query.lines().collect();
    assert_eq!(
        lines[1],
        r#"(way.a(if: t["highway"] == "primary");) -> .b;"#
    );
    assert_eq!(
        lines[2],
        r#"(way["highway"](2)(if: count(ways) > 0);) -> .c;"#
    );
    assert!(!query.contains("tmp"));
}

#[test]
fn ternary_binds_both_branches() {
    let source = r#"
a = Way(1)
c = Node(2)
b = a if count(ways) > 0 else c
"#;
    let query = compile(source);
    assert_eq!(
        query,
        [
            "(way(1);) -> .a;",
            "(node(2);) -> .c;",
            "(way.a(if: count(ways) > 0);) -> .tmpternary0;",
            "(node.c(if: !(count(ways) > 0));) -> .tmpternary1;",
            "((.tmpternary0; .tmpternary1);) -> .b;",
        ]
        .join("\n")
    );
}

#[test]
fn ternary_on_mixed_set_decomposes() {
    let source = r#"
a = Way(1)
c = Node(2)
s = Set(a, c)
d = s if is_tag("name") else Set()
"#;
    let compiled = overpassify(source, &TranslateConfig::new()).unwrap();
    assert_eq!(
        compiled.query.lines().nth(3),
        Some(
            r#"((node.s(if: is_tag("name")); way.s(if: is_tag("name")); area.s(if: is_tag("name")); relation.s(if: is_tag("name")));) -> .d;"#
        )
    );
    assert_eq!(compiled.diagnostics.len(), 1);
    assert_eq!(compiled.diagnostics[0].kind, DiagnosticKind::KindDecomposition);
    assert_eq!(compiled.diagnostics[0].location.line, Some(5));
}

#[test]
fn if_else_filters_the_pivot() {
    let source = r#"
ways = Way(1)
if count(ways) > 0:
    out(ways)
else:
    out()
"#;
    let compiled = compile_with_pivot(source);
    assert_eq!(
        compiled.query,
        [
            "(way(1);) -> .ways;",
            "(relation(2186646);) -> .tmpif0;",
            "(relation.tmpif0(if: count(ways) > 0);) -> .tmpthen1;",
            "(relation.tmpif0(if: !(count(ways) > 0));) -> .tmpelse2;",
            "foreach.tmpthen1->.tmpbranch3(",
            ".ways out;",
            ");",
            "foreach.tmpelse2->.tmpbranch3(",
            "out;",
            ");",
        ]
        .join("\n")
    );
    assert!(compiled.diagnostics.is_empty());
}

#[test]
fn if_without_else_emits_one_branch() {
    let source = "ways = Way(1)\nif count(ways) > 0:\n    out(ways)\n";
    let query = compile_with_pivot(source).query;
    assert_eq!(query.matches("foreach.").count(), 1);
    assert!(!query.contains("tmpelse"));
}

#[test]
fn elif_nests_in_else_branch() {
    let source = r#"
ways = Way(1)
if count(ways) > 10:
    out(ways, count=True)
elif count(ways) > 0:
    out(ways)
"#;
    let query = compile_with_pivot(source).query;
    assert_eq!(query.matches("(relation(2186646);) -> .tmpif").count(), 2);
    assert_eq!(query.matches("foreach.tmpthen").count(), 2);
    assert_eq!(query.matches("foreach.tmpelse").count(), 1);
}

#[test]
fn loop_with_break_is_guarded() {
    let source = r#"
ways = Way(1)
for w in ways:
    out(w)
    if t["name"] == "x":
        break
    out(w, geom=True)
"#;
    let compiled = compile_with_pivot(source);
    assert_eq!(
        compiled.query,
        [
            "(way(1);) -> .ways;",
            "(relation(2186646);) -> .tmpbrk1;",
            "foreach.ways->.w(",
            "foreach.tmpbrk1->.tmpguard0(",
            ".w out;",
            ");",
            "foreach.tmpbrk1->.tmpguard0(",
            "(relation(2186646);) -> .tmpif2;",
            r#"(relation.tmpif2(if: t["name"] == "x");) -> .tmpthen3;"#,
            "foreach.tmpthen3->.tmpbranch4(",
            "(node.tmpbrk1;) -> .tmpbrk1;",
            ");",
            ");",
            "foreach.tmpbrk1->.tmpguard0(",
            ".w out geom;",
            ");",
            ");",
        ]
        .join("\n")
    );
    assert_eq!(compiled.diagnostics.len(), 1);
    assert_eq!(compiled.diagnostics[0].kind, DiagnosticKind::GuardedLoop);
    assert_eq!(compiled.diagnostics[0].location.line, Some(3));
}

#[test]
fn loop_with_continue_guards_the_rest() {
    let source = r#"
ways = Way(1)
for w in ways:
    if t["name"] == "x":
        continue
    out(w)
"#;
    let compiled = compile_with_pivot(source);
    assert_eq!(
        compiled.query,
        [
            "(way(1);) -> .ways;",
            "foreach.ways->.w(",
            "(relation(2186646);) -> .tmpcont1;",
            "(relation(2186646);) -> .tmpif2;",
            r#"(relation.tmpif2(if: t["name"] == "x");) -> .tmpthen3;"#,
            "foreach.tmpthen3->.tmpbranch4(",
            "(node.tmpcont1;) -> .tmpcont1;",
            ");",
            "foreach.tmpcont1->.tmpguard0(",
            ".w out;",
            ");",
            ");",
        ]
        .join("\n")
    );
}

#[test]
fn loop_else_without_break_is_inline() {
    let source = "ways = Way(1)\nfor w in ways:\n    out(w)\nelse:\n    out()\n";
    assert_eq!(
        compile(source),
        "(way(1);) -> .ways;\nforeach.ways->.w(\n.w out;\n);\nout;"
    );
}

#[test]
fn loop_else_with_break_is_guarded() {
    let source = r#"
ways = Way(1)
for w in ways:
    if t["name"] == "x":
        break
else:
    out()
"#;
    let query = compile_with_pivot(source).query;
    assert!(query.ends_with("foreach.tmpbrk1->.tmpguard0(\nout;\n);"));
}

#[test]
fn break_after_continue_is_guarded_by_both() {
    let source = r#"
ways = Way(1)
for w in ways:
    if count(ways) > 1:
        continue
    break
"#;
    let compiled = compile_with_pivot(source);
    assert_eq!(
        compiled.query,
        [
            "(way(1);) -> .ways;",
            "(relation(2186646);) -> .tmpbrk1;",
            "foreach.ways->.w(",
            "(relation(2186646);) -> .tmpcont2;",
            "foreach.tmpbrk1->.tmpguard0(",
            "(relation(2186646);) -> .tmpif3;",
            "(relation.tmpif3(if: count(ways) > 1);) -> .tmpthen4;",
            "foreach.tmpthen4->.tmpbranch5(",
            "(node.tmpcont2;) -> .tmpcont2;",
            ");",
            ");",
            "foreach.tmpbrk1->.tmpguard0(",
            "foreach.tmpcont2->.tmpguard0(",
            "(node.tmpbrk1;) -> .tmpbrk1;",
            ");",
            ");",
            ");",
        ]
        .join("\n")
    );
    assert_eq!(compiled.diagnostics.len(), 1);
}

#[test]
fn break_in_else_branch_guards_the_rest() {
    let source = r#"
ways = Way(1)
for w in ways:
    if t["name"] == "x":
        out(w)
    else:
        break
    out(w, geom=True)
"#;
    assert_eq!(
        compile_with_pivot(source).query,
        [
            "(way(1);) -> .ways;",
            "(relation(2186646);) -> .tmpbrk1;",
            "foreach.ways->.w(",
            "foreach.tmpbrk1->.tmpguard0(",
            "(relation(2186646);) -> .tmpif2;",
            r#"(relation.tmpif2(if: t["name"] == "x");) -> .tmpthen3;"#,
            r#"(relation.tmpif2(if: !(t["name"] == "x"));) -> .tmpelse4;"#,
            "foreach.tmpthen3->.tmpbranch5(",
            ".w out;",
            ");",
            "foreach.tmpelse4->.tmpbranch5(",
            "(node.tmpbrk1;) -> .tmpbrk1;",
            ");",
            ");",
            "foreach.tmpbrk1->.tmpguard0(",
            ".w out geom;",
            ");",
            ");",
        ]
        .join("\n")
    );
}

#[test]
fn continue_in_nested_loop_else_belongs_to_outer_loop() {
    let source = r#"
ways = Way(1)
for w in ways:
    for n in ways:
        out(n)
    else:
        continue
    out(w)
"#;
    let compiled = compile_with_pivot(source);
    assert_eq!(
        compiled.query,
        [
            "(way(1);) -> .ways;",
            "foreach.ways->.w(",
            "(relation(2186646);) -> .tmpcont1;",
            "foreach.ways->.n(",
            ".n out;",
            ");",
            "(node.tmpcont1;) -> .tmpcont1;",
            "foreach.tmpcont1->.tmpguard0(",
            ".w out;",
            ");",
            ");",
        ]
        .join("\n")
    );
    // Only the outer loop needs guards
    assert_eq!(compiled.diagnostics.len(), 1);
    assert_eq!(compiled.diagnostics[0].location.line, Some(3));
}

#[test]
fn loop_over_inline_set() {
    assert_eq!(
        compile("for w in Way(1):\n    out(w)\n"),
        "(way(1);) -> .tmpfor0;\nforeach.tmpfor0->.w(\n.w out;\n);"
    );
}

// ============ Source errors ============

#[test]
fn reserved_names_rejected() {
    let err = source_err("\ntmpx = Way(1)", &TranslateConfig::new());
    assert_eq!(err.kind, ErrorKind::ReservedName("tmpx".into()));
    assert_eq!(err.location.line, Some(2));

    let err = source_err("for tmpw in Way(1):\n    out()", &TranslateConfig::new());
    assert_eq!(err.kind, ErrorKind::ReservedName("tmpw".into()));
}

#[test]
fn temporaries_cannot_be_referenced() {
    // The loop binds `tmpfor0`; user code still may not name it
    let err = source_err("for w in Way(1):\n    out(w)\nout(tmpfor0)\n", &TranslateConfig::new());
    assert_eq!(err.kind, ErrorKind::ReservedName("tmpfor0".into()));
    assert_eq!(err.location.line, Some(3));

    let err = source_err("x = Way(tmpfor0)\n", &TranslateConfig::new());
    assert_eq!(err.kind, ErrorKind::ReservedName("tmpfor0".into()));
}

#[test]
fn non_set_assignment_rejected() {
    let err = source_err("x = 5", &TranslateConfig::new());
    assert!(matches!(err.kind, ErrorKind::UnsupportedConstruct(_)));
}

#[test]
fn late_settings_rejected() {
    let err = source_err("a = Way(1)\nSettings(timeout=25)", &TranslateConfig::new());
    assert_eq!(err.kind, ErrorKind::Ordering);
    assert_eq!(err.location.line, Some(2));

    let err = source_err("Settings(colour=\"red\")", &TranslateConfig::new());
    assert_eq!(
        err.kind,
        ErrorKind::UnknownOption {
            context: "Settings",
            key: "colour".into()
        }
    );
}

#[test]
fn control_flow_needs_pivot() {
    let err = source_err("if count(ways) > 0:\n    out()", &TranslateConfig::new());
    assert_eq!(err.kind, ErrorKind::MissingPivot);
    assert_eq!(err.location.line, Some(1));

    let err = source_err(
        "ways = Way(1)\nfor w in ways:\n    out(w)\n    break\n",
        &TranslateConfig::new(),
    );
    assert_eq!(err.kind, ErrorKind::MissingPivot);
    assert_eq!(err.location.line, Some(2));
}

#[test]
fn jumps_outside_loops_rejected() {
    let err = source_err("break", &pivot_config());
    assert!(matches!(err.kind, ErrorKind::UnsupportedConstruct(_)));
}

#[test]
fn area_locator_needs_area_set() {
    let err = source_err("a = Way(1)\nb = Node(a)", &TranslateConfig::new());
    assert_eq!(
        err.kind,
        ErrorKind::KindMismatch {
            expected: "Area",
            found: SetKind::Way
        }
    );
}

#[test]
fn around_locator_with_coordinates() {
    let body = [Statement::assign(
        "stops",
        Construct::new(SetKind::Node)
            .around(
                Anchor::Point {
                    lat: 42.36.into(),
                    lon: (-71.05).into(),
                },
                200i64,
            )
            .tag("highway", TagPredicate::ExactMatch("bus_stop".into())),
    )];
    let query = translate(&body, &TranslateConfig::new()).unwrap().query;
    assert_eq!(
        query,
        r#"(node["highway"="bus_stop"](around:200,42.36,-71.05);) -> .stops;"#
    );
}

#[test]
fn parse_errors_surface() {
    match overpassify("ways = Way(1", &TranslateConfig::new()) {
        Err(OverpassifyError::Parse(err)) => assert_eq!(err.line, 1),
        other => panic!("Expected parse error, got {other:?}"),
    }
}

#[test]
fn config_from_json_drives_translation() {
    let config = TranslateConfig::from_json(r#"{"pivot": {"kind": "node", "id": 1}}"#).unwrap();
    let query = overpassify("if 1:\n    out()", &config).unwrap().query;
    assert!(query.starts_with("(node(1);) -> .tmpif0;"));
}
