// self
use crate::{_prelude::*, obs::FlowKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by provider flows.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided flow kind + stage.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("oauth1_provider.flow", flow = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
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

/// Emits a `debug` event for a rejected request; only the error code and message are logged.
pub fn trace_rejection(kind: FlowKind, error: &Error) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(flow = kind.as_str(), error = error.error_code(), "{error}");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, error);
	}
}

/// Emits a `debug` event for one resolved validation step.
///
/// Callers pass public identifiers only (client keys, token keys, nonces, realms). Events are
/// emitted inside the flow span, which carries the flow and stage fields.
pub fn trace_step(step: &'static str, value: &str) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(step, value, "Validation step resolved.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (step, value);
	}
}

/// Emits a `debug` event for an issued credential identified by its public key.
pub fn trace_issued(kind: FlowKind, client_key: &str, token: &str) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(flow = kind.as_str(), client_key, token, "Issued credential.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, client_key, token);
	}
}
