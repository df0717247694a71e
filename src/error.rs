use std::fmt::{Debug, Display};

pub struct Error {
    kind: ErrorKind,
    context: Vec<String>,
}

pub enum ErrorKind {
    Io(std::io::Error),
    FantocciniNewSession(fantoccini::error::NewSessionError),
    FantocciniCmd(fantoccini::error::CmdError),
    FantocciniPrint(fantoccini::error::PrintConfigurationError),
    Template(minijinja::Error),
    Json(serde_json::Error),
    /// The external receipt store rejected or failed a request
    Store(String),
    /// A record or form failed validation before it reached the store
    Validation(String),
    Other(String),
}

pub trait AddContext<T> {
    fn add_context(self, ctx: &str) -> Result<T, Error>;
}

impl Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut context = self.context.clone();
        context.reverse();
        let context = if context.is_empty() {
            String::from("no context")
        } else {
            context.join(" -> ")
        };
        write!(f, "{context}")
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error {
            context: vec![format!("{:?}", value)],
            kind: ErrorKind::Io(value),
        }
    }
}

impl From<fantoccini::error::PrintConfigurationError> for Error {
    fn from(value: fantoccini::error::PrintConfigurationError) -> Self {
        Error {
            context: vec![format!("{:?}", value)],
            kind: ErrorKind::FantocciniPrint(value),
        }
    }
}

impl From<fantoccini::error::NewSessionError> for Error {
    fn from(value: fantoccini::error::NewSessionError) -> Self {
        Error {
            context: vec![format!("{:?}", value)],
            kind: ErrorKind::FantocciniNewSession(value),
        }
    }
}

impl From<fantoccini::error::CmdError> for Error {
    fn from(value: fantoccini::error::CmdError) -> Self {
        Error {
            context: vec![format!("{:?}", value)],
            kind: ErrorKind::FantocciniCmd(value),
        }
    }
}

impl From<minijinja::Error> for Error {
    fn from(value: minijinja::Error) -> Self {
        Error {
            context: vec![value.to_string()],
            kind: ErrorKind::Template(value),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error {
            context: vec![value.to_string()],
            kind: ErrorKind::Json(value),
        }
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error {
            context: vec![value.to_string()],
            kind: ErrorKind::Other(value),
        }
    }
}

impl Error {
    /// Build an error describing a failed call against the external receipt store.
    pub fn store(message: impl Into<String>) -> Error {
        let message = message.into();
        Error {
            context: vec![message.clone()],
            kind: ErrorKind::Store(message),
        }
    }

    /// Build an error for input rejected before it is written anywhere.
    pub fn validation(message: impl Into<String>) -> Error {
        let message = message.into();
        Error {
            context: vec![message.clone()],
            kind: ErrorKind::Validation(message),
        }
    }

    /// The underlying cause of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// `true` when the error came from the external store. Callers surface these as a transient
    /// notification and do not retry.
    pub fn is_store(&self) -> bool {
        matches!(self.kind, ErrorKind::Store(_))
    }

    /// Add more context to the given error. This context will ultimately be displayed to the user
    /// and could be useful for correcting bad input or filing a help ticket.
    ///
    /// Generally a single layer of context should be added for every level that an error is
    /// surfaced. If the error is surfaced all the way to main and not handled there, then all the
    /// context will be displayed to the user in reverse order
    ///
    /// # Arguments
    /// * `context` - Any additional information that would be useful for the user to see if the
    /// error is surfaced to them
    pub fn add_context(self, context: &str) -> Error {
        let mut existing = self.context.clone();
        existing.push(context.to_string());
        Self {
            context: existing,
            ..self
        }
    }
}

impl<T> AddContext<T> for Result<T, Error> {
    fn add_context(self, ctx: &str) -> Result<T, Error> {
        match self {
            Ok(d) => Ok(d),
            Err(e) => Err(e.add_context(ctx)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_is_displayed_outermost_first() {
        let err: Result<(), Error> = Err(Error::store("connection reset"));
        let err = err
            .add_context("inserting receipt")
            .add_context("creating receipt")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "creating receipt -> inserting receipt -> connection reset"
        );
        assert!(err.is_store());
    }

    #[test]
    fn validation_errors_are_not_store_errors() {
        let err = Error::validation("Client name is required");
        assert!(!err.is_store());
        assert!(matches!(err.kind(), ErrorKind::Validation(m) if m == "Client name is required"));
    }
}
