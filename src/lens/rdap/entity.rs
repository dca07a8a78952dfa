//! Registrant extraction from RDAP entity trees
//!
//! RDAP embeds contact information as jCard (`vcardArray`) structures nested
//! inside an `entities` list, where each entity may carry further `entities`
//! of its own. Everything in this module is a pure walk over
//! [`serde_json::Value`] trees; malformed shapes degrade to "no result"
//! instead of erroring, since registries are inconsistent about the details.

use std::collections::HashMap;

use serde_json::Value;

/// jCard fields that can carry a usable registrant name, in priority order.
const NAME_KEYS: [&str; 4] = ["fn", "org", "name", "handle"];

/// Find the registrant name in an RDAP `entities` list.
///
/// Entities at the same depth are scanned before any nested `entities` list
/// is entered, and nested lists are visited in entity order. The first entity
/// with a `"registrant"` role whose vCard yields a non-empty name wins, so a
/// shallow match always beats a deeper one and among same-depth candidates
/// the first listed wins.
///
/// Returns `None` for anything that is not a non-empty entity array.
pub fn resolve_registrant(entities: &Value) -> Option<String> {
    let top = entities.as_array()?;

    // Explicit work stack, one frame per entity list. Children are pushed in
    // reverse so the first-listed subtree is scanned first, matching a
    // recursive scan-level-then-descend traversal without unbounded stack
    // growth on pathological input.
    let mut stack: Vec<&[Value]> = vec![top.as_slice()];
    while let Some(level) = stack.pop() {
        if let Some(name) = level.iter().find_map(registrant_name) {
            return Some(name);
        }
        for entity in level.iter().rev() {
            if let Some(nested) = entity.get("entities").and_then(Value::as_array) {
                if !nested.is_empty() {
                    stack.push(nested.as_slice());
                }
            }
        }
    }
    None
}

/// Name of a single entity, if it has a `"registrant"` role and a vCard with
/// a usable name field.
fn registrant_name(entity: &Value) -> Option<String> {
    let roles = entity.get("roles").and_then(Value::as_array)?;
    if !roles.iter().any(|role| role.as_str() == Some("registrant")) {
        return None;
    }
    let vcard = parse_vcard_array(entity.get("vcardArray")?);
    vcard_name(&vcard)
}

/// Convert a jCard `vcardArray` into a property-name → value map.
///
/// The expected shape is `["vcard", [[name, params, type, value], ...]]`.
/// Properties that are not 4-element arrays with a string name are skipped;
/// duplicate names overwrite (last occurrence wins). Any other shape yields
/// an empty map.
pub(crate) fn parse_vcard_array(vcard_array: &Value) -> HashMap<String, Value> {
    let Some(parts) = vcard_array.as_array() else {
        return HashMap::new();
    };
    if parts.len() != 2 || parts[0].as_str() != Some("vcard") {
        return HashMap::new();
    }
    let Some(properties) = parts[1].as_array() else {
        return HashMap::new();
    };

    let mut vcard = HashMap::new();
    for property in properties {
        let Some(tuple) = property.as_array() else {
            continue;
        };
        if tuple.len() != 4 {
            continue;
        }
        let Some(name) = tuple[0].as_str() else {
            continue;
        };
        // (name, params, type, value): only name -> value is retained
        vcard.insert(name.to_string(), tuple[3].clone());
    }
    vcard
}

/// First present, non-empty name field of a parsed vCard.
pub(crate) fn vcard_name(vcard: &HashMap<String, Value>) -> Option<String> {
    NAME_KEYS.iter().find_map(|key| {
        vcard
            .get(*key)
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registrant_entity(name_field: &str, name: &str) -> Value {
        json!({
            "roles": ["registrant"],
            "vcardArray": ["vcard", [[name_field, {}, "text", name]]]
        })
    }

    #[test]
    fn test_resolve_top_level_registrant() {
        let entities = json!([registrant_entity("fn", "Example Org")]);
        assert_eq!(
            resolve_registrant(&entities),
            Some("Example Org".to_string())
        );
    }

    #[test]
    fn test_resolve_nested_registrant() {
        // No vCard on the outer entity, registrant hides one level down
        let entities = json!([{
            "roles": ["administrative"],
            "entities": [registrant_entity("fn", "Nested Org")]
        }]);
        assert_eq!(
            resolve_registrant(&entities),
            Some("Nested Org".to_string())
        );
    }

    #[test]
    fn test_shallow_match_beats_deeper_one() {
        let entities = json!([
            {
                "roles": ["technical"],
                "entities": [registrant_entity("fn", "Deep Org")]
            },
            registrant_entity("fn", "Shallow Org")
        ]);
        assert_eq!(
            resolve_registrant(&entities),
            Some("Shallow Org".to_string())
        );
    }

    #[test]
    fn test_first_listed_subtree_wins() {
        let first = json!({
            "roles": ["abuse"],
            "entities": [registrant_entity("fn", "First Subtree")]
        });
        let second = json!({
            "roles": ["abuse"],
            "entities": [registrant_entity("fn", "Second Subtree")]
        });
        let entities = json!([first, second]);
        assert_eq!(
            resolve_registrant(&entities),
            Some("First Subtree".to_string())
        );
    }

    #[test]
    fn test_resolve_ignores_non_registrant_roles() {
        let entities = json!([{
            "roles": ["administrative", "technical"],
            "vcardArray": ["vcard", [["fn", {}, "text", "Admin Only"]]]
        }]);
        assert_eq!(resolve_registrant(&entities), None);
    }

    #[test]
    fn test_resolve_registrant_without_vcard_is_skipped() {
        let entities = json!([
            { "roles": ["registrant"] },
            registrant_entity("fn", "Has VCard")
        ]);
        assert_eq!(resolve_registrant(&entities), Some("Has VCard".to_string()));
    }

    #[test]
    fn test_resolve_empty_and_malformed_input() {
        assert_eq!(resolve_registrant(&json!([])), None);
        assert_eq!(resolve_registrant(&json!(null)), None);
        assert_eq!(resolve_registrant(&json!("entities")), None);
        assert_eq!(resolve_registrant(&json!({"roles": ["registrant"]})), None);
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let entities = json!([
            registrant_entity("org", "Org A"),
            registrant_entity("org", "Org B")
        ]);
        let first = resolve_registrant(&entities);
        let second = resolve_registrant(&entities);
        assert_eq!(first, Some("Org A".to_string()));
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_vcard_array() {
        let vcard_array = json!(["vcard", [
            ["version", {}, "text", "4.0"],
            ["fn", {}, "text", "Example Org"]
        ]]);
        let vcard = parse_vcard_array(&vcard_array);
        assert_eq!(vcard.len(), 2);
        assert_eq!(vcard["fn"], json!("Example Org"));
    }

    #[test]
    fn test_parse_vcard_array_skips_short_property() {
        // 3-element property tuple is dropped, the rest still parses
        let vcard_array = json!(["vcard", [
            ["fn", {}, "text"],
            ["org", {}, "text", "Example Org"]
        ]]);
        let vcard = parse_vcard_array(&vcard_array);
        assert!(!vcard.contains_key("fn"));
        assert_eq!(vcard["org"], json!("Example Org"));
    }

    #[test]
    fn test_parse_vcard_array_rejects_wrong_shapes() {
        assert!(parse_vcard_array(&json!(null)).is_empty());
        assert!(parse_vcard_array(&json!("vcard")).is_empty());
        assert!(parse_vcard_array(&json!(["vcard"])).is_empty());
        assert!(parse_vcard_array(&json!(["jcard", []])).is_empty());
        assert!(parse_vcard_array(&json!(["vcard", "not-a-list"])).is_empty());
        assert!(parse_vcard_array(&json!(["vcard", [], []])).is_empty());
    }

    #[test]
    fn test_parse_vcard_array_last_duplicate_wins() {
        let vcard_array = json!(["vcard", [
            ["fn", {}, "text", "First"],
            ["fn", {}, "text", "Second"]
        ]]);
        let vcard = parse_vcard_array(&vcard_array);
        assert_eq!(vcard["fn"], json!("Second"));
    }

    #[test]
    fn test_vcard_name_priority_order() {
        let entities = json!([registrant_entity("org", "Org Name")]);
        assert_eq!(resolve_registrant(&entities), Some("Org Name".to_string()));

        // fn beats org when both are present
        let both = json!([{
            "roles": ["registrant"],
            "vcardArray": ["vcard", [
                ["org", {}, "text", "Org Name"],
                ["fn", {}, "text", "Formatted Name"]
            ]]
        }]);
        assert_eq!(
            resolve_registrant(&both),
            Some("Formatted Name".to_string())
        );
    }

    #[test]
    fn test_vcard_name_skips_empty_values() {
        let mut vcard = HashMap::new();
        vcard.insert("fn".to_string(), json!(""));
        vcard.insert("handle".to_string(), json!("NET-HANDLE"));
        assert_eq!(vcard_name(&vcard), Some("NET-HANDLE".to_string()));

        let empty: HashMap<String, Value> = HashMap::new();
        assert_eq!(vcard_name(&empty), None);
    }

    #[test]
    fn test_vcard_name_ignores_non_string_values() {
        let mut vcard = HashMap::new();
        vcard.insert("fn".to_string(), json!(["not", "a", "string"]));
        vcard.insert("org".to_string(), json!("Example Org"));
        assert_eq!(vcard_name(&vcard), Some("Example Org".to_string()));
    }
}
