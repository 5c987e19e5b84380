//! Untyped host data converted through `to_value`.

use serde::Serialize;
use serde_json::json;
use xmlrpc_codec::{encode_call, to_value, EncodeError, Request, Value};

#[derive(Serialize)]
struct Product {
    name: String,
    price: f64,
    stock: u32,
    tags: Vec<&'static str>,
    discontinued: Option<bool>,
}

#[derive(Serialize)]
enum Filter {
    Any,
    Category(String),
    Range(i32, i32),
    Near { lat: f64, lon: f64 },
}

#[test]
fn converts_untyped_json() {
    let value = to_value(&json!({
        "count": 10,
        "ratio": 0.5,
        "whole": 3.0,
        "label": "car",
        "missing": null,
        "items": [1, "two", true],
    }))
    .unwrap();

    let map = value.as_struct().unwrap();
    assert_eq!(map["count"], Value::Int(10));
    assert_eq!(map["ratio"], Value::Double(0.5));
    assert_eq!(map["whole"], Value::Int(3));
    assert_eq!(map["label"], Value::from("car"));
    assert_eq!(map["missing"], Value::Nil);
    assert_eq!(map["items"], Value::Array(vec![Value::Int(1), Value::from("two"), Value::Bool(true)]));

    // insertion order of the JSON object is kept
    let names: Vec<&str> = map.keys().map(String::as_str).collect();
    assert_eq!(names, ["count", "ratio", "whole", "label", "missing", "items"]);
}

#[test]
fn converts_structs() {
    let product = Product {
        name: "car".into(),
        price: 9999.0,
        stock: 3,
        tags: vec!["red"],
        discontinued: None,
    };

    let value = to_value(&product).unwrap();
    assert_eq!(value.get("price"), Some(&Value::Int(9999)));
    assert_eq!(value.get("stock"), Some(&Value::Int(3)));
    assert_eq!(value.get("discontinued"), Some(&Value::Nil));

    let xml = Request::new("loadProduct").arg(value).to_xml().unwrap();
    assert!(xml.contains("<member><name>discontinued</name><value><boolean>0</boolean></value></member>"));
}

#[test]
fn converts_enums() {
    assert_eq!(to_value(&Filter::Any).unwrap(), Value::from("Any"));

    let category = to_value(&Filter::Category("cars".into())).unwrap();
    assert_eq!(category.get("Category"), Some(&Value::from("cars")));

    let range = to_value(&Filter::Range(1, 5)).unwrap();
    assert_eq!(range.get("Range"), Some(&Value::Array(vec![Value::Int(1), Value::Int(5)])));

    let near = to_value(&Filter::Near { lat: 52.5, lon: 13.0 }).unwrap();
    let fields = near.get("Near").unwrap();
    assert_eq!(fields.get("lat"), Some(&Value::Double(52.5)));
    assert_eq!(fields.get("lon"), Some(&Value::Int(13)));
}

#[test]
fn rejects_unrepresentable_data() {
    assert!(matches!(to_value(&json!(u64::MAX)), Err(EncodeError::UnsupportedValueKind(_))));

    let err = to_value(&std::collections::HashMap::from([((1, 2), "pair key")])).unwrap_err();
    assert!(err.to_string().starts_with("unsupported value kind"));
}

#[test]
fn converted_values_encode() {
    let args = vec![to_value(&json!(["car", 10])).unwrap()];
    let xml = encode_call("searchProduct", &args).unwrap();
    assert!(xml.contains(
        "<array><data><value><string><![CDATA[car]]></string></value><value><int>10</int></value></data></array>"
    ));
}
