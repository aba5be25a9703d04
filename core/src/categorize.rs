//! Reorganize a flat formula object into fixed display sections.

use std::collections::HashSet;

use serde_json::{Map, Value, json};

pub const ADDITIONAL_INFORMATION: &str = "Additional Information";
pub const PLACEHOLDER_TEXT: &str = "No information available for this section";

/// Canonical sections with their recognized keys, in matching priority order.
pub const SECTIONS: &[(&str, &[&str])] = &[
    (
        "Product Name",
        &[
            "product_name",
            "name",
            "title",
            "productName",
            "product name",
            "product_title",
        ],
    ),
    (
        "Description",
        &[
            "description",
            "desc",
            "summary",
            "overview",
            "product_description",
            "product_desc",
        ],
    ),
    (
        "Ingredients",
        &[
            "ingredients",
            "ingredient_list",
            "components",
            "formula",
            "ingredient",
            "formulation",
        ],
    ),
    (
        "Instructions",
        &[
            "instructions",
            "usage",
            "how_to_use",
            "directions",
            "application",
            "instructions_for_use",
            "how to use",
            "usage_instructions",
        ],
    ),
    (
        "Packaging",
        &[
            "packaging",
            "container",
            "bottle",
            "tube",
            "packaging_suggestions",
            "container_type",
        ],
    ),
    (
        "Safety",
        &[
            "safety",
            "warnings",
            "precautions",
            "regulatory",
            "safety_information",
            "safety_and_regulatory",
            "safety_warnings",
            "regulatory_information",
        ],
    ),
    (
        "Notes",
        &[
            "notes",
            "additional_notes",
            "tips",
            "recommendations",
            "additional_information",
            "extra_notes",
            "additional_info",
        ],
    ),
];

/// Map an object's keys onto the canonical sections.
///
/// Each alias claims at most one key: an unclaimed exact (case-insensitive)
/// match, else the first unclaimed key containing the alias. Sections with no
/// claimed key hold a placeholder; leftovers go under "Additional Information".
/// Anything other than an object is returned as-is.
pub fn categorize(formula: &Value) -> Value {
    let Value::Object(fields) = formula else {
        return formula.clone();
    };

    let lowered: Vec<(&String, String)> =
        fields.keys().map(|key| (key, key.to_lowercase())).collect();
    let mut claimed: HashSet<&str> = HashSet::new();
    let mut formatted = Map::new();

    for (section, aliases) in SECTIONS {
        let mut bucket = Map::new();
        for alias in *aliases {
            let alias = alias.to_lowercase();
            let unclaimed = || {
                lowered
                    .iter()
                    .filter(|(key, _)| !claimed.contains(key.as_str()))
            };
            let hit = unclaimed()
                .find(|(_, lower)| *lower == alias)
                .or_else(|| unclaimed().find(|(_, lower)| lower.contains(&alias)))
                .map(|(key, _)| *key);

            if let Some(key) = hit {
                claimed.insert(key.as_str());
                bucket.insert(key.clone(), fields[key.as_str()].clone());
            }
        }

        let value = if bucket.is_empty() {
            placeholder()
        } else {
            Value::Object(bucket)
        };
        formatted.insert((*section).to_string(), value);
    }

    let remaining: Map<String, Value> = fields
        .iter()
        .filter(|(key, _)| !claimed.contains(key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    if !remaining.is_empty() {
        formatted.insert(ADDITIONAL_INFORMATION.to_string(), Value::Object(remaining));
    }

    Value::Object(formatted)
}

/// JSON truthiness: null, false, zero, and empty strings/arrays/objects are empty.
pub fn has_content(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

fn placeholder() -> Value {
    json!({ "placeholder": PLACEHOLDER_TEXT })
}
