use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(
        "chains [{}] are present in the latest model but not in the previous model",
        .chain_ids.join(", ")
    )]
    UnsupportedTopology { chain_ids: Vec<String> },

    #[error("model version {version} has no usable chains after filtering")]
    EmptyModel { version: usize },
}
