//! Optional observability helpers for gate operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `captcha_gate.operation` with the
//!   `operation`, `subject` (input fingerprint) and `mocked` fields, plus a `warn` event for
//!   every failure carrying the `error_kind` and `reason` labels.
//! - Enable `metrics` to increment the `captcha_gate_operation_total` counter for every
//!   attempt/success/bypass/failure, labeled by `operation` + `outcome`; failures also carry
//!   `error_kind` + `reason`.
//!
//! Challenge responses, tokens, and secrets are never recorded; use [`fingerprint`] to
//! correlate events instead.

mod metrics;
mod tracing;

pub use self::{metrics::*, tracing::*};

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::_prelude::*;

const FINGERPRINT_BYTES: usize = 9;

/// Gate operations observed by the instrumentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
	/// Challenge verification followed by token issuance.
	IssueForChallenge,
	/// Token issuance without a challenge.
	IssueToken,
	/// Signature + expiry verification.
	VerifyToken,
	/// Verification followed by a content comparison.
	VerifyContent,
	/// Verification followed by content extraction.
	ExtractContent,
}
impl OperationKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationKind::IssueForChallenge => "issue_for_challenge",
			OperationKind::IssueToken => "issue_token",
			OperationKind::VerifyToken => "verify_token",
			OperationKind::VerifyContent => "verify_content",
			OperationKind::ExtractContent => "extract_content",
		}
	}
}
impl Display for OperationKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
	/// Entry to a gate operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Successful completion through a mock bypass.
	Bypassed,
	/// Failure propagated back to the caller.
	Failure,
}
impl Outcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Outcome::Attempt => "attempt",
			Outcome::Success => "success",
			Outcome::Bypassed => "bypassed",
			Outcome::Failure => "failure",
		}
	}
}
impl Display for Outcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Observes one gate operation from entry to its final outcome.
#[derive(Debug)]
pub struct OperationRecord {
	kind: OperationKind,
	bypassed: bool,
	span: OperationSpan,
}
impl OperationRecord {
	/// Records the attempt and opens the operation span.
	///
	/// `subject` is the caller's input (challenge response or token); only its
	/// [`fingerprint`] is kept. `bypassed` marks operations short-circuited by a mock flag.
	pub fn start(kind: OperationKind, subject: Option<&str>, bypassed: bool) -> Self {
		let subject = subject.map(fingerprint);

		record_operation_outcome(kind, Outcome::Attempt, None);

		Self { kind, bypassed, span: OperationSpan::new(kind, subject.as_deref(), bypassed) }
	}

	/// Span covering the operation.
	pub fn span(&self) -> &OperationSpan {
		&self.span
	}

	/// Records the final outcome and passes `result` through unchanged.
	pub fn finish<T>(self, result: Result<T>) -> Result<T> {
		match &result {
			Ok(_) if self.bypassed => record_operation_outcome(self.kind, Outcome::Bypassed, None),
			Ok(_) => record_operation_outcome(self.kind, Outcome::Success, None),
			Err(e) => {
				record_operation_outcome(self.kind, Outcome::Failure, Some(e));
				self.span.in_scope(|| trace_failure(self.kind, e));
			},
		}

		result
	}
}

/// Returns a short, non-reversible identifier for `value`.
///
/// The identifier is the URL-safe base64 (no padding) encoding of the first bytes of the
/// value's SHA-256 digest, so equal inputs correlate across log lines without exposing them.
pub fn fingerprint(value: &str) -> String {
	let mut hasher = Sha256::new();

	hasher.update(value.as_bytes());

	let digest = hasher.finalize();

	URL_SAFE_NO_PAD.encode(&digest[..FINGERPRINT_BYTES])
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn fingerprint_is_stable_and_short() {
		let first = fingerprint("some_captcha");

		assert_eq!(first, fingerprint("some_captcha"));
		assert_ne!(first, fingerprint("other_captcha"));
		assert_eq!(first.len(), 12);
		assert!(!first.contains("captcha"));
	}

	#[test]
	fn record_passes_results_through() {
		let record = OperationRecord::start(OperationKind::VerifyToken, Some("token"), false);

		assert_eq!(record.finish(Ok(3)).expect("Success should pass through."), 3);

		let record = OperationRecord::start(OperationKind::VerifyContent, Some("token"), false);
		let err = record.finish::<()>(Err(Error::ContentMismatch)).expect_err("Failure too.");

		assert!(matches!(err, Error::ContentMismatch));
	}
}
