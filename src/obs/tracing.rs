// self
use crate::{_prelude::*, obs::OperationKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOperation<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOperation<F> = F;

/// `captcha_gate.operation` span covering one gate call.
///
/// The span records the operation label, whether a mock bypass is active, and the fingerprint
/// of the caller's input. The input itself never reaches the span.
#[derive(Clone, Debug)]
pub struct OperationSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OperationSpan {
	/// Opens a span for `kind`; `subject` must already be a fingerprint.
	pub fn new(kind: OperationKind, subject: Option<&str>, mocked: bool) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"captcha_gate.operation",
				operation = kind.as_str(),
				subject,
				mocked
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, subject, mocked);

			Self {}
		}
	}

	/// Runs `f` inside the span.
	pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
		#[cfg(feature = "tracing")]
		{
			self.span.in_scope(f)
		}
		#[cfg(not(feature = "tracing"))]
		{
			f()
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOperation<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a `warn` event describing `error` through its labels only.
///
/// Error messages are not rendered because transport sources may echo request data.
pub fn trace_failure(kind: OperationKind, error: &Error) {
	#[cfg(feature = "tracing")]
	{
		let crate::obs::FailureLabels { error_kind, reason } = crate::obs::FailureLabels::of(error);

		tracing::warn!(operation = kind.as_str(), error_kind, reason, "Gate operation failed.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, error);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn span_runs_closures_in_scope() {
		let span = OperationSpan::new(OperationKind::IssueToken, None, false);

		assert_eq!(span.in_scope(|| 7), 7);

		trace_failure(OperationKind::IssueToken, &Error::ContentMismatch);
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = OperationSpan::new(OperationKind::VerifyToken, Some("fp"), true);
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
