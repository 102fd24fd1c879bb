// self
use crate::{
	_prelude::*,
	obs::{OperationKind, Outcome},
};

/// Labels describing why an operation failed.
///
/// `error_kind` is the [`Error::kind`] label. `reason` narrows challenge rejections down to
/// the [`ChallengeError::kind`](crate::error::ChallengeError::kind) cause and repeats
/// `error_kind` for every other failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FailureLabels {
	/// Variant label of the gate error.
	pub error_kind: &'static str,
	/// Finer-grained cause.
	pub reason: &'static str,
}
impl FailureLabels {
	/// Derives the labels for `error`.
	pub fn of(error: &Error) -> Self {
		let reason = match error {
			Error::ChallengeRejected(e) => e.kind(),
			other => other.kind(),
		};

		Self { error_kind: error.kind(), reason }
	}
}

/// Increments `captcha_gate_operation_total` for `outcome` (when metrics are enabled).
///
/// Failures carry the extra `error_kind` and `reason` labels so declined challenges, unreachable
/// endpoints and expired or forged tokens land in separate series.
pub fn record_operation_outcome(kind: OperationKind, outcome: Outcome, error: Option<&Error>) {
	#[cfg(feature = "metrics")]
	match error.map(FailureLabels::of) {
		Some(FailureLabels { error_kind, reason }) => metrics::counter!(
			"captcha_gate_operation_total",
			"operation" => kind.as_str(),
			"outcome" => outcome.as_str(),
			"error_kind" => error_kind,
			"reason" => reason
		)
		.increment(1),
		None => metrics::counter!(
			"captcha_gate_operation_total",
			"operation" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1),
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome, error);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::{ChallengeError, TransportError};

	#[test]
	fn challenge_failures_are_split_by_cause() {
		let declined = Error::from(ChallengeError::Declined { error_codes: Vec::new() });
		let unreachable = Error::from(ChallengeError::from(TransportError::Io(
			std::io::Error::other("connection refused"),
		)));

		assert_eq!(
			FailureLabels::of(&declined),
			FailureLabels { error_kind: "challenge_rejected", reason: "declined" }
		);
		assert_eq!(FailureLabels::of(&unreachable).reason, "transport");
	}

	#[test]
	fn token_failures_reuse_error_kind() {
		let expired = Error::TokenExpired { expired_at: OffsetDateTime::UNIX_EPOCH };

		assert_eq!(
			FailureLabels::of(&expired),
			FailureLabels { error_kind: "token_expired", reason: "token_expired" }
		);
	}

	#[test]
	fn recording_never_panics() {
		record_operation_outcome(OperationKind::VerifyToken, Outcome::Attempt, None);
		record_operation_outcome(
			OperationKind::VerifyContent,
			Outcome::Failure,
			Some(&Error::ContentMismatch),
		);
	}
}
