/*
 * test_valid.rs
 *
 * End-to-end template validation scenarios.
 */

use stratum::{Origin, RootConfig, Template, ValueNode};
use stratum_yaml::parse_str;

fn layered(layers: &[&str]) -> RootConfig {
    let mut config = RootConfig::new();
    for text in layers {
        config.set(parse_str(text).unwrap(), Origin::Overlay);
    }
    config
}

#[test]
fn test_servers_schema_scenario() {
    let config = layered(&["servers:\n  - host: a\n"]);
    let template = Template::sequence(Template::schema([
        ("host", Template::string()),
        ("port", Template::literal(80)),
    ]));
    let result = config.at("servers").get(&template).unwrap();
    let servers = result.as_seq().unwrap();
    assert_eq!(servers.len(), 1);
    let server = servers[0].as_map().unwrap();
    assert_eq!(server["host"].as_str(), Some("a"));
    assert_eq!(server["port"], ValueNode::Int(80));
}

#[test]
fn test_choice_rejection_scenario() {
    let config = layered(&["direction: left\n"]);
    let template = Template::choice(["up".to_string(), "down".to_string()]);
    let err = config.at("direction").get(&template).unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"direction: must be one of ['up', 'down'], not 'left'"
    );
}

#[test]
fn test_sequence_never_merges_across_sources() {
    let config = layered(&["nums: [1, 2, 3]\n", "nums: [9]\n"]);
    let result = config
        .at("nums")
        .get(&Template::sequence(Template::integer()))
        .unwrap();
    assert_eq!(result, ValueNode::Seq(vec![ValueNode::Int(9)]));
}

#[test]
fn test_mapping_values_merges_per_key() {
    let config = layered(&["m:\n  a: 1\n  b: 2\n", "m:\n  b: 20\n  c: 3\n"]);
    let result = config
        .at("m")
        .get(&Template::mapping_values(Template::integer()))
        .unwrap();
    let entries: Vec<(&str, i64)> = result
        .as_map()
        .unwrap()
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_i64().unwrap()))
        .collect();
    assert_eq!(entries, [("a", 1), ("b", 20), ("c", 3)]);
}

#[test]
fn test_schema_fields_resolve_from_different_sources() {
    let config = layered(&[
        "db:\n  host: defaults.example\n  pool: 5\n",
        "db:\n  host: prod.example\n",
    ]);
    let template = Template::schema([
        ("host", Template::string()),
        ("pool", Template::integer()),
    ]);
    let result = config.at("db").get(&template).unwrap();
    assert_eq!(result.as_map().unwrap()["host"].as_str(), Some("prod.example"));
    assert_eq!(result.as_map().unwrap()["pool"], ValueNode::Int(5));
}

#[test]
fn test_nested_error_is_fully_qualified() {
    let config = layered(&["outer:\n  servers:\n    - host: a\n      port: eighty\n"]);
    let template = Template::schema([(
        "servers",
        Template::sequence(Template::schema([
            ("host", Template::string()),
            ("port", Template::integer()),
        ])),
    )]);
    let err = config.at("outer").get(&template).unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"outer.servers#0.port: must be a number, not str"
    );
}

#[test]
fn test_optional_behaviours() {
    let config = layered(&["explicit: null\n"]);

    // Missing, no default: null.
    assert!(config
        .at("missing")
        .get(&Template::optional(Template::string()))
        .unwrap()
        .is_null());

    // Missing with allow_missing = false: error.
    let err = config
        .at("missing")
        .get(&Template::optional_strict(Template::string()))
        .unwrap_err();
    assert_eq!(err.to_string(), "missing not found");

    // Present null is accepted even by the strict form, and yields the
    // subtemplate's own default.
    assert_eq!(
        config
            .at("explicit")
            .get(&Template::optional_strict(Template::string_default("d")))
            .unwrap(),
        ValueNode::from("d")
    );
}

#[test]
fn test_one_error_surfaces_from_whole_tree_get() {
    let config = layered(&["a: 1\nb: two\nc: 3\n"]);
    let template = Template::schema([
        ("a", Template::integer()),
        ("b", Template::integer()),
        ("c", Template::integer()),
    ]);
    let err = config.view().get(&template).unwrap_err();
    assert_eq!(err.to_string(), "b: must be a number, not str");
}

#[test]
fn test_str_seq_template() {
    let config = layered(&["inline: alpha beta\nlisted: [alpha, beta]\n"]);
    let expected = ValueNode::Seq(vec!["alpha".into(), "beta".into()]);
    assert_eq!(config.at("inline").get(&Template::str_seq()).unwrap(), expected);
    assert_eq!(config.at("listed").get(&Template::str_seq()).unwrap(), expected);
}

#[test]
fn test_percent_scalars_survive_validation() {
    let config = layered(&["fmt: %Y-%m-%d\n"]);
    assert_eq!(config.at("fmt").as_str().unwrap(), "%Y-%m-%d");
}
