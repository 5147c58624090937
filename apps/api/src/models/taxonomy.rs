use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One row of the skills taxonomy: a broad function/unit label and a
/// specific specialisation under it. Rows are not unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyEntry {
    pub function_unit_skill: String,
    pub specialisation_unit: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
impl TaxonomyEntry {
    pub fn new(function: &str, specialisation: &str) -> Self {
        Self {
            function_unit_skill: function.to_string(),
            specialisation_unit: specialisation.to_string(),
            extra: Map::new(),
        }
    }
}
