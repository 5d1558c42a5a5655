//! Handler invocation: group-factory resolution, the entry-point call, and
//! fault capture.

use std::sync::Arc;

use futures_util::FutureExt;

use crate::args::Args;
use crate::command::Command;
use crate::context::InvocationContext;
use crate::provider::DependencyProvider;

/// Builds the handler instance and runs the entry point.
///
/// Anything that goes wrong here is a fault: a factory that cannot build
/// its instance, a handler returning an error, or a handler panicking. The
/// panic is caught and flattened into the error so one dispatch can never
/// take the host down.
pub(crate) async fn invoke(
	command: &Arc<Command>,
	ctx: InvocationContext,
	args: Args,
	provider: &dyn DependencyProvider,
) -> anyhow::Result<serde_json::Value> {
	let instance = command.group().instantiate(provider)?;
	let call = (command.entry())(instance, ctx, args);
	match std::panic::AssertUnwindSafe(call).catch_unwind().await {
		Ok(outcome) => outcome,
		Err(panic) => Err(anyhow::anyhow!(
			"handler panicked: {}",
			panic_message(panic.as_ref())
		)),
	}
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
	if let Some(message) = panic.downcast_ref::<&str>() {
		message
	} else if let Some(message) = panic.downcast_ref::<String>() {
		message
	} else {
		"non-string panic payload"
	}
}
