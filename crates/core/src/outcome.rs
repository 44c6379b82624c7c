//! Uniform result type returned by every service operation.
//!
//! An [`Outcome`] is either a [`Success`] carrying the operation payload or a
//! [`CoreError`] carrying the failure kind. Both sides expose a status code
//! and message so the gateway can translate them 1:1.

use crate::error::CoreError;

/// Successful operation result.
#[derive(Debug, Clone, PartialEq)]
pub struct Success<T> {
    pub status_code: u16,
    pub message: String,
    pub payload: T,
}

pub type Outcome<T> = Result<Success<T>, CoreError>;

impl<T> Success<T> {
    /// 200 OK.
    pub fn ok(message: impl Into<String>, payload: T) -> Self {
        Self {
            status_code: 200,
            message: message.into(),
            payload,
        }
    }

    /// 201 Created.
    pub fn created(message: impl Into<String>, payload: T) -> Self {
        Self {
            status_code: 201,
            message: message.into(),
            payload,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Success<U> {
        Success {
            status_code: self.status_code,
            message: self.message,
            payload: f(self.payload),
        }
    }
}
