use histfill_core::{BackfillError, GatewayError, GatewayErrorKind, SinkError, ValidationError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<BackfillError> for CliError {
    fn from(error: BackfillError) -> Self {
        match error {
            BackfillError::Validation(error) => Self::Validation(error),
            BackfillError::Gateway(error) => Self::Gateway(error),
            BackfillError::Sink(error) => Self::Sink(error),
        }
    }
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Gateway(error) => match error.kind() {
                GatewayErrorKind::Connection => 3,
                GatewayErrorKind::Request => 4,
                GatewayErrorKind::Timeout => 5,
                GatewayErrorKind::Protocol => 6,
            },
            Self::Serialization(_) => 7,
            Self::Sink(_) | Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_kinds_have_distinct_exit_codes() {
        let codes: Vec<u8> = [
            GatewayError::connection("refused"),
            GatewayError::request(162, "pacing violation"),
            GatewayError::timeout("slow"),
            GatewayError::protocol("bad frame"),
        ]
        .into_iter()
        .map(|error| CliError::from(BackfillError::from(error)).exit_code())
        .collect();

        assert_eq!(codes, vec![3, 4, 5, 6]);
    }

    #[test]
    fn validation_exits_with_two() {
        let error = CliError::from(BackfillError::from(ValidationError::EmptyHorizon));
        assert_eq!(error.exit_code(), 2);
        assert_eq!(error.to_string(), "horizon must be greater than zero");
    }
}
