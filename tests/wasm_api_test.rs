//! WASM API test
//!
//! Exercises the exported functions in a browser, where the editor state and
//! the JS value conversions are real.

#![cfg(target_arch = "wasm32")]

use table_editor_wasm::api::*;
use serde::Serialize;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const TWO_BY_TWO: &str = r#"{
  "type": "doc",
  "content": [
    {"type": "table", "content": [
      {"type": "tableRow", "content": [
        {"type": "tableCell", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "a"}]}]},
        {"type": "tableCell", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "b"}]}]}
      ]},
      {"type": "tableRow", "content": [
        {"type": "tableCell", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "c"}]}]},
        {"type": "tableCell", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "d"}]}]}
      ]}
    ]}
  ]
}"#;

fn command(json: &str) -> JsValue {
    let value: serde_json::Value = serde_json::from_str(json).unwrap();
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap()
}

#[wasm_bindgen_test]
fn test_commands_through_js_values() {
    enable_tables();
    load_document(TWO_BY_TWO).unwrap();
    assert!(set_text_selection(4, 4));

    assert!(execute_command(command(r#"{"command": "insertRow", "side": 1}"#)).unwrap());
    assert!(execute_command(command(
        r#"{"command": "setTableDefault", "attr": "border", "value": "1px solid"}"#
    ))
    .unwrap());
    assert!(execute_command(command(r#"{"command": "bogus"}"#)).is_err());

    let doc = get_document_value().unwrap();
    assert!(doc.is_object());
    let json = get_document().unwrap();
    assert_eq!(json.matches("1px solid").count(), 7);

    assert!(!fix_table());
    assert!(disable_tables());
}

#[wasm_bindgen_test]
fn test_bad_input_is_rejected() {
    enable_tables();
    assert!(load_document("not json").is_err());
    assert!(configure(r#"{"bandingColor": 5}"#).is_err());
    assert!(configure(r##"{"bandingColor": "#eee"}"##).is_ok());
    assert!(!set_table_default("padding", Some("1px".to_string())));
    disable_tables();
}
