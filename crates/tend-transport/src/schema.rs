//! JSON Schema export of the wire contract.
//!
//! Host implementations live outside this workspace; the schema is what they
//! validate against when the catalog changes.

use schemars::schema_for;
use serde_json::{Map, Value};

use tend_core::Result;

use crate::message::{HostWire, UiToHost};

/// Schema of both message directions, keyed `uiToHost` and `hostToUi`.
pub fn protocol_schema() -> Result<Value> {
    let mut root = Map::new();
    root.insert(
        "uiToHost".to_string(),
        serde_json::to_value(schema_for!(UiToHost))?,
    );
    root.insert(
        "hostToUi".to_string(),
        serde_json::to_value(schema_for!(HostWire))?,
    );
    Ok(Value::Object(root))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_has_both_directions() {
        let schema = protocol_schema().unwrap();
        assert!(schema["uiToHost"].is_object());
        assert!(schema["hostToUi"].is_object());
    }

    #[test]
    fn test_schema_names_wire_fields() {
        let text = protocol_schema().unwrap().to_string();
        for name in ["create", "keystroke", "remove", "resize", "ready", "data", "exited"] {
            assert!(text.contains(&format!("\"{name}\"")), "missing {name}");
        }
        assert!(text.contains("exitCode"));
    }
}
