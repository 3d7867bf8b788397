/*
    Copyright 2025 MydriaTech AB

    Licensed under the Apache License 2.0 with Free world makers exception
    1.0.0 (the "License"); you may not use this file except in compliance with
    the License. You should have obtained a copy of the License with the source
    or binary distribution in file named

        LICENSE-Apache-2.0-with-FWM-Exception-1.0.0

    Unless required by applicable law or agreed to in writing, software
    distributed under the License is distributed on an "AS IS" BASIS,
    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
    See the License for the specific language governing permissions and
    limitations under the License.
*/

//! Coordination errors.

use std::error::Error;
use std::fmt;

/// Cause of error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinationErrorKind {
    /// The store could not be reached or did not answer in time.
    ///
    /// Transient. Safe to retry with backoff.
    StoreUnavailable,
    /// The store answered with something that could not be interpreted.
    StoreProtocolError,
    /// More version identifiers were requested in a date bucket than the
    /// sequence format can represent.
    SequenceOverflow,
    /// The lock is no longer held by the presented fencing token.
    ///
    /// This is the expected outcome of a release or renew racing with lease
    /// expiry and should be treated as informational.
    LockAlreadyLost,
    /// The caller provided an argument that can never succeed.
    InvalidArgument,
    /// The application configuration can't be used.
    InvalidConfiguration,
}

impl CoordinationErrorKind {
    /// Create a new instance with an error message.
    pub fn error_with_msg<S: AsRef<str>>(self, msg: S) -> CoordinationError {
        CoordinationError {
            kind: self,
            msg: Some(msg.as_ref().to_string()),
        }
    }

    /// Create a new instance without an error message.
    pub fn error(self) -> CoordinationError {
        CoordinationError {
            kind: self,
            msg: None,
        }
    }
}

impl fmt::Display for CoordinationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/** Coordination error.

Create a new instance via [CoordinationErrorKind].
*/
#[derive(Debug)]
pub struct CoordinationError {
    kind: CoordinationErrorKind,
    msg: Option<String>,
}

impl CoordinationError {
    /// Return the type of error.
    pub fn kind(&self) -> &CoordinationErrorKind {
        &self.kind
    }

    /// Return `true` when the failed call may succeed if retried later.
    pub fn is_retryable(&self) -> bool {
        self.kind == CoordinationErrorKind::StoreUnavailable
    }
}

impl fmt::Display for CoordinationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(msg) = &self.msg {
            write!(f, "{} {}", self.kind, msg)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

impl AsRef<CoordinationError> for CoordinationError {
    fn as_ref(&self) -> &CoordinationError {
        self
    }
}

impl Error for CoordinationError {}
