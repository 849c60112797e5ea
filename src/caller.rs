use std::{fmt, panic::Location};

/// Where a subscription was created. Attached to every subscriber record so
/// that panics and leaked subscriptions can be traced back to their origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerData {
    pub file: &'static str,
    pub line: u32,
    pub column: u32,
}

impl CallerData {
    #[track_caller]
    pub fn caller() -> Self {
        Location::caller().into()
    }
}

impl From<&'static Location<'static>> for CallerData {
    fn from(location: &'static Location<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
            column: location.column(),
        }
    }
}

impl fmt::Display for CallerData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}
