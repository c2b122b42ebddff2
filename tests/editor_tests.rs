//! Editor-assist (flattened) form tests

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{json, Value};
use std::path::PathBuf;
use xsd2json::converters::{FlatSchema, TOP_KEY};
use xsd2json::{convert, ConflictPolicy, ConverterConfig, Xsd2Json};

fn fixture(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn flatten_fixture(name: &str) -> Value {
    let text = convert(fixture(name), true).expect("conversion should succeed");
    serde_json::from_str(&text).expect("output should be valid JSON")
}

#[test]
fn test_person_flattened() {
    let value = flatten_fixture("person.xsd");

    assert_eq!(value[TOP_KEY], json!(["Root"]));
    assert_eq!(value["Root"]["children"], json!(["Name", "Age"]));
    assert_eq!(value["Age"]["min_occurs"], 0);
    assert_eq!(value["Name"]["children"], json!([]));
    assert_eq!(value["type"], "object");
    assert_eq!(value["schema"], "http://json-schema.org/schema#");
}

#[test]
fn test_top_entry_comes_first() {
    let value = flatten_fixture("person.xsd");
    let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["!top", "Root", "Name", "Age", "schema", "type"]);
}

#[test]
fn test_names_shared_between_parents_are_merged() {
    // Name appears under both Author and Editor
    let value = flatten_fixture("library.xsd");

    assert_eq!(value[TOP_KEY], json!(["Library"]));
    assert_eq!(value["Library"]["children"], json!(["Book"]));
    assert_eq!(
        value["Book"]["children"],
        json!(["Title", "Author", "Editor", "Published", "Isbn"])
    );
    assert_eq!(value["Author"]["children"], json!(["Name", "Born"]));
    assert_eq!(value["Editor"]["children"], json!(["Name", "Born"]));
    assert_eq!(value["Name"]["type"], "string");
}

#[test]
fn test_attribute_enumerations() {
    let value = flatten_fixture("library.xsd");
    assert_eq!(
        value["Book"]["attrs"],
        json!({"genre": ["fiction", "history", "poetry"], "lang": null})
    );
}

#[test]
fn test_union_alternatives_become_conditions() {
    let value = flatten_fixture("library.xsd");
    let isbn = &value["Isbn"];
    assert_eq!(isbn["children"], json!([]));
    assert_eq!(isbn["nillable"], true);
    assert_eq!(
        isbn["conditions"],
        json!([
            {"type": "string", "pattern": ["[0-9]{13}"]},
            {"type": "string", "enumeration": ["none"]}
        ])
    );
}

#[test]
fn test_flatten_is_deterministic() {
    let first = convert(fixture("library.xsd"), true).unwrap();
    let second = convert(fixture("library.xsd"), true).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_flat_schema_from_tree() {
    let tree = Xsd2Json::new().build_tree(fixture("person.xsd")).unwrap();
    let flat = FlatSchema::from_tree(&tree);

    assert_eq!(flat.top.len(), 1);
    assert_eq!(flat.entries.len(), 3);
    let root = flat.get("Root").unwrap();
    assert!(root.children.contains("Name"));
    assert!(root.children.contains("Age"));
    assert!(root.restriction.is_none());
}

#[test]
fn test_empty_schema_flattened() {
    let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"/>"#;
    let value: Value = serde_json::from_str(&convert(xsd, true).unwrap()).unwrap();
    assert_eq!(
        value,
        json!({"!top": [], "schema": "http://json-schema.org/schema#", "type": "object"})
    );
}

const SPLIT_DEFINITIONS: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
    <xs:element name="Root">
        <xs:complexType>
            <xs:sequence>
                <xs:element name="A">
                    <xs:complexType><xs:sequence>
                        <xs:element name="X">
                            <xs:complexType><xs:sequence>
                                <xs:element name="Id" type="xs:string"/>
                            </xs:sequence></xs:complexType>
                        </xs:element>
                    </xs:sequence></xs:complexType>
                </xs:element>
                <xs:element name="B">
                    <xs:complexType><xs:sequence>
                        <xs:element name="X">
                            <xs:complexType><xs:sequence>
                                <xs:element name="Code" type="xs:int"/>
                            </xs:sequence></xs:complexType>
                        </xs:element>
                    </xs:sequence></xs:complexType>
                </xs:element>
            </xs:sequence>
        </xs:complexType>
    </xs:element>
</xs:schema>"#;

fn flatten_with_policy(policy: ConflictPolicy) -> Value {
    let config = ConverterConfig::new()
        .with_flatten(true)
        .with_conflict_policy(policy);
    Xsd2Json::with_config(config)
        .convert_value(SPLIT_DEFINITIONS)
        .expect("conversion should succeed")
}

#[test]
fn test_merge_unions_children_of_every_position() {
    let value = flatten_with_policy(ConflictPolicy::Merge);
    assert_eq!(value["A"]["children"], json!(["X"]));
    assert_eq!(value["B"]["children"], json!(["X"]));
    assert_eq!(value["X"]["children"], json!(["Id", "Code"]));
    assert_eq!(value["Code"]["type"], "int");
}

#[test]
fn test_first_wins_keeps_first_position_only() {
    let value = flatten_with_policy(ConflictPolicy::FirstWins);
    assert_eq!(value["X"]["children"], json!(["Id"]));
    assert_eq!(value["B"]["children"], json!([]));
    assert!(value.get("Code").is_none());
}

fn sequence_schema(names: &[String]) -> String {
    let children: String = names
        .iter()
        .map(|name| format!(r#"<xs:element name="{}" type="xs:string"/>"#, name))
        .collect();
    format!(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:element name="Root">
                <xs:complexType><xs:sequence>{}</xs:sequence></xs:complexType>
            </xs:element>
        </xs:schema>"#,
        children
    )
}

proptest! {
    #[test]
    fn prop_flatten_twice_is_byte_identical(names in prop::collection::vec("E[a-z]{0,6}", 0..8)) {
        let xsd = sequence_schema(&names);
        let first = convert(xsd.as_str(), true).unwrap();
        let second = convert(xsd.as_str(), true).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_children_are_deduplicated_in_first_seen_order(names in prop::collection::vec("E[a-z]{0,3}", 1..8)) {
        let xsd = sequence_schema(&names);
        let value: Value = serde_json::from_str(&convert(xsd.as_str(), true).unwrap()).unwrap();

        let mut expected: Vec<String> = Vec::new();
        for name in &names {
            if !expected.contains(name) {
                expected.push(name.clone());
            }
        }
        prop_assert_eq!(value["Root"]["children"].clone(), json!(expected));
    }
}
