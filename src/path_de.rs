use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::descriptor::Descriptor;

#[derive(Debug, Error)]
#[error("at JSON path {path} → {source}")]
pub struct PathError {
    pub path: String,
    #[source]
    pub source: serde_json::Error,
}

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, PathError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| PathError {
        path: err.path().to_string(),
        source: err.into_inner(),
    })
}

pub fn descriptor_from_str(src: &str) -> Result<Descriptor, PathError> {
    from_str_with_path(src)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Primitive;

    #[test]
    fn error_points_inside_nested_descriptor() {
        let err = descriptor_from_str(r#"{"dict": {"key": "int", "value": {"any": ["int", "nope"]}}}"#)
            .unwrap_err();
        assert!(err.path.contains("value"), "{err}");
        assert!(err.path.contains("any"), "{err}");
        assert!(err.to_string().starts_with("at JSON path "));
    }

    #[test]
    fn error_path_names_shorthand_tags() {
        let err = descriptor_from_str(r#"{"list": {"any": ["int", "nope"]}}"#).unwrap_err();
        assert_eq!(err.path, "list.any[1]");
    }

    #[test]
    fn parses_primitive() {
        assert_eq!(descriptor_from_str(r#""float""#).unwrap(), Descriptor::from(Primitive::Float));
    }
}
