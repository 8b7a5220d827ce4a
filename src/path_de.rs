use serde::de::DeserializeOwned;

use crate::document::SourceFormat;
use crate::error::Error;

/// Deserialize JSON with document-path context in error messages.
pub fn from_json_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, Error> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| path_error(SourceFormat::Json, err))
}

/// Deserialize YAML with document-path context in error messages.
pub fn from_yaml_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, Error> {
    let de = serde_yaml::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| path_error(SourceFormat::Yaml, err))
}

fn path_error<E: std::fmt::Display>(format: SourceFormat, err: serde_path_to_error::Error<E>) -> Error {
    let path = err.path().to_string();
    Error::Parse {
        format,
        path,
        message: err.into_inner().to_string(),
    }
}
