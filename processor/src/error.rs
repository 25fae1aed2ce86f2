use htmlpp::Report;

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// A reported condition reached the configured severity threshold.
    #[error("{0}")]
    Aborted(Report),
    #[error("more than {0} directives expanded; does a file include itself?")]
    ExpansionLimit(usize),
}

impl ProcessError {
    /// Process exit code associated with this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            ProcessError::Aborted(report) => report.exit_code(),
            ProcessError::ExpansionLimit(_) => 1,
        }
    }

    pub fn report(&self) -> Option<&Report> {
        match self {
            ProcessError::Aborted(report) => Some(report),
            ProcessError::ExpansionLimit(_) => None,
        }
    }
}
