pub mod plan;

pub mod errors {
    use rebar_core::CalculationError;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum EngineError {
        #[error("layer {0:?} contains no quadrilateral entities")]
        EmptyLayer(String),
        #[error(transparent)]
        Calculation(#[from] CalculationError),
    }
}
