use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartError {
    #[error("invalid cap count: {cap} (must be >= 0)")]
    InvalidCapCount { cap: i64 },

    #[error("composite chart does not report its own axis extent; query its children")]
    CompositeAxisExtent,

    #[error("chart `{chart}` is missing mandatory attribute `{attribute}`")]
    MissingAttribute {
        chart: String,
        attribute: &'static str,
    },

    #[error("value accessor failed: {0}")]
    Accessor(String),

    #[error("chart `{chart}` is already borrowed by an in-flight operation")]
    ChartBusy { chart: String },

    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl ChartError {
    /// Returns `true` for errors caused by wiring charts up incorrectly.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidCapCount { .. } | Self::CompositeAxisExtent | Self::MissingAttribute { .. }
        )
    }
}
