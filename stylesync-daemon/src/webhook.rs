//! Webhook request evaluation, independent of the HTTP framework.
//!
//! A request is accepted when its `Authorization` header equals the configured
//! secret and its body names a target revision. The body is either empty
//! (target `HEAD`) or `application/x-www-form-urlencoded` with a `payload`
//! field holding JSON such as `{"commit": "abc123"}`.

use serde::Deserialize;

use stylesync_core::Revision;

use crate::error::DaemonError;

/// Verdict for one webhook request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Respond 200 and sync to this revision.
    Accepted(Revision),
    /// Respond 400 and do nothing.
    Rejected(String),
}

impl Outcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted(_))
    }
}

#[derive(Deserialize)]
struct Form {
    payload: String,
}

#[derive(Deserialize)]
struct Payload {
    commit: String,
}

/// True when a secret is configured and the header carries exactly that value.
pub fn authorize(authorization: Option<&str>, secret: Option<&str>) -> bool {
    match (authorization, secret) {
        (Some(given), Some(expected)) => given == expected,
        _ => false,
    }
}

/// Extract the target revision from a request body.
pub fn parse_target(body: &[u8]) -> Result<Revision, DaemonError> {
    if body.is_empty() {
        return Ok(Revision::head());
    }

    let form: Form = serde_urlencoded::from_bytes(body)
        .map_err(|err| DaemonError::MalformedPayload(format!("form body: {err}")))?;
    let payload: Payload = serde_json::from_str(&form.payload)
        .map_err(|err| DaemonError::MalformedPayload(format!("payload JSON: {err}")))?;

    let commit = payload.commit.trim();
    if commit.is_empty() {
        return Err(DaemonError::MalformedPayload("empty commit".to_string()));
    }
    Ok(Revision::from(commit))
}

/// Authorization first, then body parsing.
pub fn evaluate(authorization: Option<&str>, secret: Option<&str>, body: &[u8]) -> Outcome {
    if !authorize(authorization, secret) {
        return Outcome::Rejected("authorization mismatch".to_string());
    }
    match parse_target(body) {
        Ok(revision) => Outcome::Accepted(revision),
        Err(err) => Outcome::Rejected(err.to_string()),
    }
}
