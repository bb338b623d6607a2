//! User-visible messages.
//!
//! Every failure the page can hit ends up as a [`Notice`]. The
//! [`NoticeKind`] is what lets a front end style an error differently from
//! an empty result or a login prompt.

use strum_macros::{AsRefStr, Display};

/// How a notice should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum NoticeKind {
    /// An action completed.
    Success,
    /// Neutral information.
    Info,
    /// The request worked but matched nothing.
    Empty,
    /// Input was rejected before any request was sent.
    Validation,
    /// The user has to log in first.
    AuthRequired,
    /// Something failed.
    Error,
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Presentation category.
    pub kind: NoticeKind,
    /// Text shown to the user.
    pub message: String,
}

impl Notice {
    /// Creates a notice of the given kind.
    #[must_use]
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// A [`NoticeKind::Success`] notice.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, message)
    }

    /// A [`NoticeKind::Info`] notice.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Info, message)
    }

    /// A [`NoticeKind::Empty`] notice.
    #[must_use]
    pub fn empty(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Empty, message)
    }

    /// A [`NoticeKind::Validation`] notice.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Validation, message)
    }

    /// A [`NoticeKind::AuthRequired`] notice.
    #[must_use]
    pub fn auth_required(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::AuthRequired, message)
    }

    /// A [`NoticeKind::Error`] notice.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Error, message)
    }

    /// Returns `true` for [`NoticeKind::Error`].
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

/// Converts a component error into what the user sees.
pub trait ToNotice {
    /// The notice to show for this value.
    fn to_notice(&self) -> Notice;
}
