//! Shared helpers for the WASM API
//!
//! Global editor access plus serialization across the JS boundary.

use crate::commands::TableEditor;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Mutex, PoisonError};
use wasm_bindgen::prelude::*;

use lazy_static::lazy_static;

// WASM-owned editor (canonical document, selection and repair snapshot)
lazy_static! {
    static ref EDITOR: Mutex<Option<TableEditor>> = Mutex::new(None);
}

/// Run `f` on the editor; `fallback` when tables are disabled
pub fn with_editor<T>(fallback: T, f: impl FnOnce(&mut TableEditor) -> T) -> T {
    let mut guard = EDITOR.lock().unwrap_or_else(PoisonError::into_inner);
    match guard.as_mut() {
        Some(editor) => f(editor),
        None => {
            log::warn!("table editing is disabled");
            fallback
        }
    }
}

/// Create the editor if there is none; returns whether one was created
pub fn install_editor() -> bool {
    let mut guard = EDITOR.lock().unwrap_or_else(PoisonError::into_inner);
    if guard.is_some() {
        return false;
    }
    *guard = Some(TableEditor::default());
    true
}

/// Drop the editor with its document and snapshot
pub fn remove_editor() -> bool {
    let mut guard = EDITOR.lock().unwrap_or_else(PoisonError::into_inner);
    guard.take().is_some()
}

pub fn has_editor() -> bool {
    EDITOR
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .is_some()
}

// ============================================================================
// Serialization/Deserialization Helpers
// ============================================================================

/// Deserialize a value from JavaScript, logging failures
pub fn deserialize<T: DeserializeOwned>(value: JsValue, error_context: &str) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| js_error(format!("{}: {}", error_context, e)))
}

/// Serialize a value to plain JS objects (maps become objects, not `Map`)
pub fn serialize<T: Serialize>(value: &T, error_context: &str) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| js_error(format!("{}: {}", error_context, e)))
}

/// Log `msg` and turn it into a JS error value
pub fn js_error(msg: impl Into<String>) -> JsValue {
    let msg = msg.into();
    log::error!("{}", msg);
    JsValue::from_str(&msg)
}
