#![forbid(unsafe_code)]

//! Unified error type for the facade.
//!
//! Each layer keeps its own typed error; this enum only gathers them so an
//! application can use one `?`-friendly result type.

use std::fmt;

use waymark_core::config::ConfigError;
use waymark_core::options::OptionError;
use waymark_marker::MarkerError;
use waymark_tour::TourError;

/// Top-level error type for Waymark hosts.
#[derive(Debug)]
pub enum Error {
    /// Malformed option mini-language input.
    Option(OptionError),
    /// Configuration could not be loaded or failed validation.
    Config(ConfigError),
    /// Marker settings or lifecycle failure.
    Marker(MarkerError),
    /// Tour, spot or extension failure.
    Tour(TourError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Option(err) => write!(f, "options: {err}"),
            Self::Config(err) => write!(f, "config: {err}"),
            Self::Marker(err) => write!(f, "marker: {err}"),
            Self::Tour(err) => write!(f, "tour: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Option(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Marker(err) => Some(err),
            Self::Tour(err) => Some(err),
        }
    }
}

impl From<OptionError> for Error {
    fn from(err: OptionError) -> Self {
        Self::Option(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<MarkerError> for Error {
    fn from(err: MarkerError) -> Self {
        Self::Marker(err)
    }
}

impl From<TourError> for Error {
    fn from(err: TourError) -> Self {
        Self::Tour(err)
    }
}

/// Standard result type for Waymark APIs.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use waymark_core::event::TourId;

    #[test]
    fn question_mark_converts_each_layer() {
        fn parse() -> Result<()> {
            waymark_core::options::OptionSet::parse("novalue")?;
            Ok(())
        }
        assert!(matches!(parse(), Err(Error::Option(_))));

        let err: Error = TourError::UnknownTour(TourId(7)).into();
        assert!(err.to_string().starts_with("tour: "));
        assert!(err.source().is_some());
    }

    #[test]
    fn config_validation_is_wrapped() {
        let err: Error = ConfigError::Validation(vec!["bad".into()]).into();
        assert_eq!(err.to_string(), "config: validation errors: bad");
    }
}
