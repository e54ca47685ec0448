use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetricsError {
    #[error("invalid week key `{0}`, expected DD/MM/YYYY")]
    InvalidWeekKey(String),

    #[error("invalid date `{0}`")]
    InvalidDate(String),
}

pub type Result<T> = std::result::Result<T, MetricsError>;
