use serde::{Deserialize, Serialize};

/// One platform delivery: a source and the payload fragments it carried
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub source: String,
    #[serde(default)]
    pub parts: Vec<String>,
}

impl InboundEvent {
    pub fn new(source: impl Into<String>, parts: Vec<String>) -> Self {
        Self {
            source: source.into(),
            parts,
        }
    }

    /// Fragments joined in delivery order
    pub fn payload(&self) -> String {
        concat_parts(&self.parts)
    }
}

pub(crate) fn concat_parts<S: AsRef<str>>(parts: &[S]) -> String {
    parts.iter().map(AsRef::as_ref).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_concatenates_in_order() {
        let event = InboundEvent::new(
            "10086",
            vec!["part one, ".to_string(), "part two".to_string()],
        );
        assert_eq!(event.payload(), "part one, part two");
    }

    #[test]
    fn test_deserialize_without_parts() {
        let event: InboundEvent = serde_json::from_str(r#"{"source": "10086"}"#).unwrap();
        assert!(event.parts.is_empty());
        assert_eq!(event.payload(), "");
    }
}
