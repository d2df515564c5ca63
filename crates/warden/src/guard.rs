//! Validation wrapping: check, run, report.

use std::future::Future;

use warden_common::{Decision, LockoutKey, WardenError};

use crate::keys::KeyDeriver;
use crate::store::AttemptStore;
use crate::tracker::LockoutTracker;

/// Why a guarded validation attempt did not produce a value.
///
/// The three outcomes are deliberately distinct variants so callers handle
/// them exhaustively: a lockout renders differently from a validation
/// failure and must not be counted as a new failed attempt.
#[derive(Debug)]
pub enum GuardError<E> {
    /// The key is locked. The wrapped validation was never run and the
    /// attempt was not counted.
    LockedOut {
        /// Remaining penalty time in seconds
        retry_after_secs: u64,
    },

    /// The wrapped validation rejected the input; propagated verbatim.
    Validation(E),

    /// The tracking layer itself failed. The attempt record may not have
    /// been durably updated.
    Tracking(WardenError),
}

impl<E> From<WardenError> for GuardError<E> {
    fn from(err: WardenError) -> Self {
        Self::Tracking(err)
    }
}

impl<E: std::fmt::Display> std::fmt::Display for GuardError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LockedOut { retry_after_secs } => {
                write!(f, "too many failed attempts, retry in {retry_after_secs} seconds")
            }
            Self::Validation(err) => write!(f, "validation failed: {err}"),
            Self::Tracking(err) => write!(f, "lockout tracking failed: {err}"),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for GuardError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::LockedOut { .. } => None,
            Self::Validation(err) => Some(err),
            Self::Tracking(err) => Some(err),
        }
    }
}

/// Runs validations under lockout tracking.
pub struct Guard<S> {
    tracker: LockoutTracker<S>,
    deriver: KeyDeriver,
}

impl<S: AttemptStore> Guard<S> {
    pub fn new(tracker: LockoutTracker<S>, deriver: KeyDeriver) -> Self {
        Self { tracker, deriver }
    }

    /// Run `validate` for `identity`, enforcing the lockout policy.
    ///
    /// An empty identity is not tracked: the validation runs unconditionally
    /// and its failures are never recorded. The current time is taken once
    /// per attempt and shared by the check and any recorded failure.
    pub async fn run<F, Fut, T, E>(&self, identity: &str, validate: F) -> Result<T, GuardError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let Some(key) = self.deriver.derive(identity) else {
            return validate().await.map_err(GuardError::Validation);
        };

        let now = chrono::Utc::now().timestamp();
        self.run_at(&key, now, validate).await
    }

    /// Like [`run`](Self::run) with an explicit key and timestamp.
    pub async fn run_at<F, Fut, T, E>(
        &self,
        key: &LockoutKey,
        now: i64,
        validate: F,
    ) -> Result<T, GuardError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Decision::Reject { retry_after_secs } = self.tracker.check(key, now).await? {
            return Err(GuardError::LockedOut { retry_after_secs });
        }

        match validate().await {
            Ok(value) => {
                self.tracker.on_success(key).await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(store_err) = self.tracker.on_failure(key, now).await {
                    tracing::error!(key = %key, error = %store_err, "Failed attempt not recorded");
                    return Err(GuardError::Tracking(store_err));
                }
                Err(GuardError::Validation(err))
            }
        }
    }

    pub fn tracker(&self) -> &LockoutTracker<S> {
        &self.tracker
    }
}
