use core::fmt;
use std::{borrow::Cow, ops::Deref};

use crate::accounts::AccountError;

/// An error that can occur while exporting or persisting research results.
#[derive(Clone)]
pub struct Error(Box<Repr>);

#[derive(Clone)]
enum Repr {
    /// Just a message.
    Msg(Cow<'static, str>),
    /// The document could not be packed into a binary file.
    Package(Cow<'static, str>),
    /// A stored record could not be read or written.
    Storage(Cow<'static, str>),
    /// An account operation was refused.
    Account(AccountError),
}

impl Error {
    /// Creates an error reporting that the document packaging step failed.
    pub fn package(msg: impl Into<Cow<'static, str>>) -> Self {
        Error(Box::new(Repr::Package(msg.into())))
    }

    /// Creates an error reporting that the key-value store failed.
    pub fn storage(msg: impl Into<Cow<'static, str>>) -> Self {
        Error(Box::new(Repr::Storage(msg.into())))
    }

    /// Returns the account error, if this error was caused by one.
    pub fn as_account(&self) -> Option<&AccountError> {
        match self.0.deref() {
            Repr::Account(e) => Some(e),
            _ => None,
        }
    }

    /// Whether this error was raised while packing a document.
    pub fn is_package(&self) -> bool {
        matches!(self.0.deref(), Repr::Package(..))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.deref() {
            Repr::Msg(s) => write!(f, "{s}"),
            Repr::Package(s) => write!(f, "failed to pack document: {s}"),
            Repr::Storage(s) => write!(f, "storage error: {s}"),
            Repr::Account(e) => write!(f, "{e}"),
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        <Self as fmt::Display>::fmt(self, f)
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::storage(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::storage(format!("malformed record: {e}"))
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error(Box::new(Repr::Msg(format!("invalid config: {e}").into())))
    }
}

impl From<AccountError> for Error {
    fn from(e: AccountError) -> Self {
        Error(Box::new(Repr::Account(e)))
    }
}

impl From<&'static str> for Error {
    fn from(s: &'static str) -> Self {
        Error(Box::new(Repr::Msg(s.into())))
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error(Box::new(Repr::Msg(s.into())))
    }
}

impl From<Cow<'static, str>> for Error {
    fn from(s: Cow<'static, str>) -> Self {
        Error(Box::new(Repr::Msg(s)))
    }
}
