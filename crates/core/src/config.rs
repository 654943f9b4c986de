//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into core services. Nothing
//! in this crate reads environment variables while handling a request; the `*_from_env_value`
//! helpers only parse values the binary has already read.

use crate::constants::{
    DEFAULT_MAX_CONCURRENT_SENDS, DEFAULT_SMS_TIMEOUT_SECS, DEFAULT_TWILIO_API_BASE,
};
use crate::dispatch::MatchPolicy;
use crate::{CoreError, CoreResult};
use raktmap_types::{NonEmptyText, PhoneNumber};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    match_policy: MatchPolicy,
    max_concurrent_sends: NonZeroUsize,
}

impl CoreConfig {
    pub fn new(
        data_dir: PathBuf,
        match_policy: MatchPolicy,
        max_concurrent_sends: NonZeroUsize,
    ) -> CoreResult<Self> {
        if data_dir.as_os_str().is_empty() {
            return Err(CoreError::InvalidInput("data_dir cannot be empty".into()));
        }

        Ok(Self {
            data_dir,
            match_policy,
            max_concurrent_sends,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn match_policy(&self) -> MatchPolicy {
        self.match_policy
    }

    pub fn max_concurrent_sends(&self) -> NonZeroUsize {
        self.max_concurrent_sends
    }
}

/// Sender identity and credentials for the SMS gateway.
#[derive(Clone)]
pub struct SmsConfig {
    account_sid: NonEmptyText,
    auth_token: NonEmptyText,
    from_number: PhoneNumber,
    api_base: String,
    timeout: Duration,
}

impl SmsConfig {
    /// # Errors
    ///
    /// Returns `CoreError::Text` if the SID or token is blank or the sender number is not a
    /// dialable phone number, and `CoreError::InvalidInput` if `api_base` is not http(s).
    pub fn new(
        account_sid: &str,
        auth_token: &str,
        from_number: &str,
        api_base: Option<String>,
        timeout: Duration,
    ) -> CoreResult<Self> {
        let api_base = api_base
            .map(|b| b.trim().trim_end_matches('/').to_string())
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| DEFAULT_TWILIO_API_BASE.to_string());

        if !(api_base.starts_with("https://") || api_base.starts_with("http://")) {
            return Err(CoreError::InvalidInput(format!(
                "SMS api base must be an http(s) URL: {api_base}"
            )));
        }

        Ok(Self {
            account_sid: NonEmptyText::new(account_sid)?,
            auth_token: NonEmptyText::new(auth_token)?,
            from_number: PhoneNumber::new(from_number)?,
            api_base,
            timeout,
        })
    }

    pub fn account_sid(&self) -> &str {
        self.account_sid.as_str()
    }

    pub fn auth_token(&self) -> &str {
        self.auth_token.as_str()
    }

    pub fn from_number(&self) -> &str {
        self.from_number.as_str()
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

// Keeps the auth token out of logs.
impl std::fmt::Debug for SmsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmsConfig")
            .field("account_sid", &self.account_sid.as_str())
            .field("auth_token", &"<redacted>")
            .field("from_number", &self.from_number.as_str())
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the matching policy from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default policy.
pub fn match_policy_from_env_value(value: Option<String>) -> CoreResult<MatchPolicy> {
    non_blank(value)
        .map(|v| v.parse::<MatchPolicy>())
        .transpose()
        .map(Option::unwrap_or_default)
}

/// Parse the fan-out cap from an optional string value. Zero is rejected.
pub fn max_concurrent_sends_from_env_value(value: Option<String>) -> CoreResult<NonZeroUsize> {
    let Some(value) = non_blank(value) else {
        return NonZeroUsize::new(DEFAULT_MAX_CONCURRENT_SENDS)
            .ok_or_else(|| CoreError::InvalidInput("default concurrency is zero".into()));
    };

    value
        .parse::<usize>()
        .ok()
        .and_then(NonZeroUsize::new)
        .ok_or_else(|| {
            CoreError::InvalidInput(format!(
                "max concurrent sends must be a positive integer: {value}"
            ))
        })
}

/// Parse the SMS timeout in whole seconds from an optional string value.
pub fn sms_timeout_from_env_value(value: Option<String>) -> CoreResult<Duration> {
    match non_blank(value) {
        None => Ok(Duration::from_secs(DEFAULT_SMS_TIMEOUT_SECS)),
        Some(v) => v
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or_else(|| {
                CoreError::InvalidInput(format!("SMS timeout must be a positive integer: {v}"))
            }),
    }
}
