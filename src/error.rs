use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum VizError {
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("invalid speed value {0:?}")]
    InvalidSpeed(String),

    #[error("missing element #{0}")]
    MissingElement(String),

    #[error("graphics error: {0}")]
    Graphics(String),

    #[error("mesh has {0} vertices, more than a u16 index can address")]
    MeshTooLarge(usize),
}

impl From<VizError> for JsValue {
    fn from(err: VizError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
