use thiserror::Error;

/// Rejections raised locally, before anything is sent to the service.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Add at least one teacher before generating a timetable.")]
    NoTeachers,

    #[error("Add at least one class before generating a timetable.")]
    NoClasses,

    #[error("Add at least one room before generating a timetable.")]
    NoRooms,

    #[error("Select at least one working day.")]
    NoWorkingDays,

    #[error("The day must start before it ends (start {start:.2}, end {end:.2}).")]
    InvalidTimeWindow { start: f64, end: f64 },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("HTTP error {status}")]
    Http { status: u16 },

    #[error("{0}")]
    Service(String),

    /// The transport detail stays in the source chain for the log.
    #[error("Could not reach the scheduling service.")]
    Network(#[from] reqwest::Error),

    #[error("The scheduling service sent an unreadable response.")]
    Decode(#[from] serde_json::Error),

    #[error("The scheduling service sent an inconsistent result: {0}")]
    InvalidResponse(String),

    #[error("A timetable is already being generated.")]
    SubmissionInProgress,
}

impl Error {
    /// Short machine-readable tag, used in logs and error banners.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation",
            Error::Http { .. } => "http",
            Error::Service(_) => "service",
            Error::Network(_) => "network",
            Error::Decode(_) | Error::InvalidResponse(_) => "decode",
            Error::SubmissionInProgress => "busy",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
