use thiserror::Error;
#[derive(Debug, Error)]
pub enum SignalError {
    #[error("window capacity must be greater than zero")]
    InvalidCapacity,
    #[error("feed period must be greater than zero")]
    InvalidPeriod,
    #[error("nothing to plot: {0} series is empty")]
    EmptySeries(&'static str),
    #[error("failed to render plot: {0}")]
    Plot(String),
    #[error("failed to spawn feed worker: {0}")]
    Spawn(#[from] std::io::Error),
}
impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for SignalError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        SignalError::Plot(format!("{value:?}"))
    }
}
impl From<image::ImageError> for SignalError {
    fn from(value: image::ImageError) -> Self {
        SignalError::Plot(value.to_string())
    }
}
