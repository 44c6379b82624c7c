//! Wire envelope for application outcomes.
//!
//! Every RPC answers HTTP 200 with
//! `{ "ok": bool, "statusCode": u16, "message": string, "data": T | null }`.
//! Anything else is a transport-level fault (see [`crate::error::RpcError`]).

use loanhub_core::error::CoreError;
use loanhub_core::outcome::{Outcome, Success};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Message used whenever a reply cannot be interpreted.
pub const UNEXPECTED_RESPONSE: &str = "Unexpected service response";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply<T> {
    pub ok: bool,
    pub status_code: u16,
    pub message: String,
    pub data: Option<T>,
}

impl<T> From<Outcome<T>> for Reply<T> {
    fn from(outcome: Outcome<T>) -> Self {
        match outcome {
            Ok(success) => Reply {
                ok: true,
                status_code: success.status_code,
                message: success.message,
                data: Some(success.payload),
            },
            Err(err) => Reply {
                ok: false,
                status_code: err.status_code(),
                message: err.message().to_string(),
                data: None,
            },
        }
    }
}

impl<T: DeserializeOwned> Reply<T> {
    /// Convert back into an [`Outcome`], preserving status code and message.
    ///
    /// A unit payload serializes as `null`, so a missing `data` on success is
    /// accepted whenever `T` can be built from `null`.
    pub fn into_outcome(self) -> Outcome<T> {
        if !self.ok {
            if self.status_code < 400 {
                return Err(CoreError::Internal(UNEXPECTED_RESPONSE.into()));
            }
            return Err(CoreError::from_status(self.status_code, self.message));
        }

        let payload = match self.data {
            Some(data) => data,
            None => T::deserialize(serde_json::Value::Null)
                .map_err(|_| CoreError::Internal(UNEXPECTED_RESPONSE.into()))?,
        };

        Ok(Success {
            status_code: self.status_code,
            message: self.message,
            payload,
        })
    }
}
