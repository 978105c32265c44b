// 📐 Enrollment Schema - static form configuration + shape checks
// The schema block is merged into the document verbatim. Nothing in the
// pipeline computes it.

use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::LazyLock;

// ============================================================================
// MEMBERSHIP ENROLLMENT SCHEMA
// ============================================================================

pub static ENROLLMENT_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "form_name": "Membership Enrollment",
        "datasets": {
            "title_options": [
                { "value": "Mr", "label": "Mr." },
                { "value": "Miss", "label": "Miss" },
                { "value": "Ms", "label": "Ms." },
                { "value": "Mrs", "label": "Mrs." }
            ],
            "suffix_options": [
                { "value": "Jr", "label": "Jr." },
                { "value": "Sr", "label": "Sr." },
                { "value": "II", "label": "II" },
                { "value": "III", "label": "III" },
                { "value": "IV", "label": "IV" }
            ],
            "relationship_options": [
                { "value": "self", "label": "Self" },
                { "value": "spouse_partner", "label": "Spouse/Partner" },
                { "value": "dependent", "label": "Dependent" }
            ],
            "yes_no": [
                { "value": "yes", "label": "Yes" },
                { "value": "no", "label": "No" }
            ],
            "tshirt_sizes": [
                { "value": "YS", "label": "Youth Small" },
                { "value": "YM", "label": "Youth Medium" },
                { "value": "YL", "label": "Youth Large" },
                { "value": "S", "label": "Small" },
                { "value": "M", "label": "Medium" },
                { "value": "L", "label": "Large" },
                { "value": "XL", "label": "XL" },
                { "value": "2XL", "label": "2XL" },
                { "value": "3XL", "label": "3XL" }
            ],
            "tshirt_prices": [
                { "value": "10.00", "label": "$10.00" }
            ]
        },
        "steps": [
            { "index": 1, "id": "step_zip", "title": "Zip Code" },
            { "index": 2, "id": "step_personal", "title": "Personal Information" },
            { "index": 3, "id": "step_contact", "title": "Contact Information" },
            { "index": 4, "id": "step_household", "title": "Household" },
            { "index": 5, "id": "step_collection", "title": "Family Collection" },
            { "index": 6, "id": "step_summary", "title": "Order Summary" }
        ],
        "fields": [
            { "id": "zip_entry", "name": "zip_entry", "label": "Zip Code", "type": "text", "steps": [1], "required": true },

            { "id": "title", "name": "title", "label": "Title", "type": "select", "options_dataset": "title_options", "steps": [2] },
            { "id": "first_name", "name": "first_name", "label": "First Name", "type": "text", "steps": [2], "required": true },
            { "id": "middle_name", "name": "middle_name", "label": "Middle Name", "type": "text", "steps": [2] },
            { "id": "last_name", "name": "last_name", "label": "Last Name", "type": "text", "steps": [2], "required": true },
            { "id": "suffix", "name": "suffix", "label": "Suffix", "type": "select", "options_dataset": "suffix_options", "steps": [2] },

            { "id": "relationship", "name": "relationship", "label": "Relationship", "type": "select", "options_dataset": "relationship_options", "steps": [2], "required": true },
            { "id": "dob", "name": "dob", "label": "Date of Birth", "type": "date", "steps": [2], "required": true },

            { "id": "food_allergies", "name": "food_allergies", "label": "Food Allergies", "type": "select", "options_dataset": "yes_no", "steps": [2], "required": true },
            { "id": "food_allergies_details", "name": "food_allergies_details", "label": "If Yes, list allergies (optional)", "type": "text", "steps": [2] },

            { "id": "address_line_1", "name": "address_line_1", "label": "Address", "type": "text", "steps": [3], "required": true },

            { "id": "city", "name": "city", "label": "City", "type": "text", "steps": [3], "required": true, "readonly": true },
            { "id": "state", "name": "state", "label": "State", "type": "text", "steps": [3], "required": true, "readonly": true },
            { "id": "zip_confirm", "name": "zip_confirm", "label": "Zip Code", "type": "text", "steps": [3], "required": true, "readonly": true },

            { "id": "email", "name": "email", "label": "Email Address", "type": "email", "steps": [3], "required": true },
            { "id": "phone", "name": "phone", "label": "Phone Number", "type": "tel", "steps": [3], "required": true },

            { "id": "region", "name": "region", "label": "Region", "type": "text", "steps": [6], "readonly": true },
            { "id": "division", "name": "division", "label": "Division", "type": "text", "steps": [6], "readonly": true },
            { "id": "fips_code", "name": "fips_code", "label": "FIPS Code", "type": "text", "steps": [6], "readonly": true },

            { "id": "household_first_name", "name": "household_first_name", "label": "First Name", "type": "text", "steps": [4] },
            { "id": "household_last_name", "name": "household_last_name", "label": "Last Name", "type": "text", "steps": [4] },
            { "id": "household_dob", "name": "household_dob", "label": "Date of Birth", "type": "date", "steps": [4] },
            { "id": "household_relationship", "name": "household_relationship", "label": "Relationship", "type": "select", "options_dataset": "relationship_options", "steps": [4] },
            { "id": "household_food_allergies", "name": "household_food_allergies", "label": "Food Allergies", "type": "select", "options_dataset": "yes_no", "steps": [4] },

            { "id": "tshirt_size", "name": "tshirt_size", "label": "T-Shirt Size", "type": "select", "options_dataset": "tshirt_sizes", "steps": [5], "required": true },
            { "id": "tshirt_price", "name": "tshirt_price", "label": "T-Shirt Price", "type": "select", "options_dataset": "tshirt_prices", "steps": [5], "required": true },

            { "id": "order_summary", "name": "order_summary", "label": "Order Summary", "type": "summary", "steps": [6] }
        ]
    })
});

/// The schema merged into every written document
pub fn enrollment_schema() -> &'static Value {
    &ENROLLMENT_SCHEMA
}

// ============================================================================
// SHAPE CHECKS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIssue {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl SchemaIssue {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        SchemaIssue {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Check that a form schema is internally consistent. An empty result
/// means every field references defined steps and option datasets.
pub fn validate_schema(schema: &Value) -> Vec<SchemaIssue> {
    let mut issues = Vec::new();

    let Some(root) = schema.as_object() else {
        issues.push(SchemaIssue::new("schema", "must be an object"));
        return issues;
    };

    let datasets: HashSet<&str> = match root.get("datasets").and_then(Value::as_object) {
        Some(map) => map.keys().map(String::as_str).collect(),
        None => {
            issues.push(SchemaIssue::new("datasets", "missing or not an object"));
            HashSet::new()
        }
    };

    let steps: HashSet<u64> = match root.get("steps").and_then(Value::as_array) {
        Some(list) => list
            .iter()
            .filter_map(|s| s.get("index").and_then(Value::as_u64))
            .collect(),
        None => {
            issues.push(SchemaIssue::new("steps", "missing or not a list"));
            HashSet::new()
        }
    };

    let Some(fields) = root.get("fields").and_then(Value::as_array) else {
        issues.push(SchemaIssue::new("fields", "missing or not a list"));
        return issues;
    };

    let mut seen_ids = HashSet::new();
    for (idx, field) in fields.iter().enumerate() {
        let id = field
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("fields[{}]", idx));

        if field.get("id").and_then(Value::as_str).is_none() {
            issues.push(SchemaIssue::new(&id, "field has no id"));
        } else if !seen_ids.insert(id.clone()) {
            issues.push(SchemaIssue::new(&id, "duplicate field id"));
        }

        if let Some(dataset) = field.get("options_dataset").and_then(Value::as_str) {
            if !datasets.contains(dataset) {
                issues.push(SchemaIssue::new(
                    &id,
                    format!("options_dataset '{}' is not defined", dataset),
                ));
            }
        }

        for step in field.get("steps").and_then(Value::as_array).into_iter().flatten() {
            match step.as_u64() {
                Some(index) if steps.contains(&index) => {}
                _ => issues.push(SchemaIssue::new(
                    &id,
                    format!("references undefined step {}", step),
                )),
            }
        }
    }

    issues
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enrollment_schema_is_consistent() {
        let issues = validate_schema(enrollment_schema());
        assert!(issues.is_empty(), "Unexpected issues: {:?}", issues);
    }

    #[test]
    fn test_enrollment_schema_shape() {
        let schema = enrollment_schema();
        assert_eq!(schema["form_name"], "Membership Enrollment");
        assert_eq!(schema["steps"].as_array().unwrap().len(), 6);
        assert_eq!(schema["fields"][0]["id"], "zip_entry");
        assert_eq!(schema["datasets"]["tshirt_prices"][0]["label"], "$10.00");
    }

    #[test]
    fn test_schema_key_order_is_stable() {
        let keys: Vec<_> = enrollment_schema().as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["form_name", "datasets", "steps", "fields"]);
    }

    #[test]
    fn test_undefined_dataset_and_step() {
        let schema = json!({
            "datasets": { "yes_no": [] },
            "steps": [ { "index": 1 } ],
            "fields": [
                { "id": "a", "options_dataset": "colors", "steps": [1] },
                { "id": "b", "steps": [7] },
                { "id": "a", "steps": [1] }
            ]
        });

        let issues = validate_schema(&schema);

        assert_eq!(issues.len(), 3);
        assert!(issues.iter().any(|i| i.field == "a" && i.message.contains("colors")));
        assert!(issues.iter().any(|i| i.field == "b" && i.message.contains("step 7")));
        assert!(issues.iter().any(|i| i.message == "duplicate field id"));
    }

    #[test]
    fn test_non_object_schema() {
        let issues = validate_schema(&json!([1, 2, 3]));
        assert_eq!(issues, vec![SchemaIssue::new("schema", "must be an object")]);
    }

    #[test]
    fn test_missing_sections() {
        let issues = validate_schema(&json!({}));
        let fields: Vec<_> = issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["datasets", "steps", "fields"]);
    }
}
