use serde_json::{Deserializer, Map, Value};

/// Outcome of pulling a JSON object out of a model reply.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonExtract {
    Object(Map<String, Value>),
    Unparseable,
}

impl JsonExtract {
    pub fn into_object(self) -> Option<Map<String, Value>> {
        match self {
            JsonExtract::Object(map) => Some(map),
            JsonExtract::Unparseable => None,
        }
    }
}

/// Find the first well-formed JSON object in `text`.
///
/// Models wrap their JSON in prose or markdown fences often enough that the
/// reply can't be parsed as a whole. Each `{` is tried as the start of an
/// object and the first one that parses wins; trailing text is ignored.
pub fn extract_json_object(text: &str) -> JsonExtract {
    for (start, _) in text.match_indices('{') {
        let mut stream = Deserializer::from_str(&text[start..]).into_iter::<Value>();
        if let Some(Ok(Value::Object(map))) = stream.next() {
            return JsonExtract::Object(map);
        }
    }
    JsonExtract::Unparseable
}
