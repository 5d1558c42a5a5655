//! Argument binding: assigning tokens to parameter slots and converting
//! them, in declaration order, stopping at the first failure.

use std::sync::Arc;

use adjutant_types::ParsedInput;

use crate::args::{Args, Slot};
use crate::cancel::CancelToken;
use crate::command::{Command, Parameter};
use crate::context::InvocationContext;
use crate::convert::ConverterRegistry;

pub(crate) enum BindFailure {
	Conversion { parameter: String, reason: String },
	Cancelled,
}

/// Binds every parameter of the matched overload.
///
/// A named token claims its slot outright; positional tokens fill the
/// remaining slots left to right; the trailing remainder absorbs whatever
/// is left, rejoined with single spaces, as one token. An empty token on a
/// nullable or optional parameter binds the default without touching the
/// converter, or leaves the slot empty. Unfilled optionals take their
/// default the same way, converted fresh on every call.
pub(crate) async fn bind(
	command: &Arc<Command>,
	input: &ParsedInput,
	converters: &ConverterRegistry,
	ctx: &InvocationContext,
	cancel: &CancelToken,
) -> Result<Args, BindFailure> {
	let mut slots = Vec::with_capacity(command.parameters().len());
	let mut positional = input.positional.iter();

	for parameter in command.parameters() {
		if cancel.is_cancelled() {
			return Err(BindFailure::Cancelled);
		}

		let flags = parameter.flags();
		let raw: Option<String> = if let Some(value) = input.named_value(parameter.name()) {
			Some(value.to_string())
		} else if flags.remainder {
			let rest: Vec<&str> = positional.by_ref().map(String::as_str).collect();
			if rest.is_empty() {
				None
			} else {
				Some(rest.join(" "))
			}
		} else {
			positional.next().cloned()
		};

		let slot = match raw {
			Some(token) if token.is_empty() && (flags.nullable || flags.optional) => {
				match parameter.default_token() {
					Some(default) => convert(command, parameter, default, converters, ctx).await?,
					None => Slot::Empty,
				}
			}
			Some(token) => convert(command, parameter, &token, converters, ctx).await?,
			None => match parameter.default_token() {
				Some(default) => convert(command, parameter, default, converters, ctx).await?,
				None => Slot::Empty,
			},
		};
		slots.push(slot);
	}

	Ok(Args::new(command.clone(), slots))
}

async fn convert(
	command: &Command,
	parameter: &Parameter,
	token: &str,
	converters: &ConverterRegistry,
	ctx: &InvocationContext,
) -> Result<Slot, BindFailure> {
	let ty = parameter.ty();
	let converter = converters
		.resolve(&ty)
		.ok_or_else(|| BindFailure::Conversion {
			parameter: parameter.name().to_string(),
			reason: format!(
				"no converter registered for type {} (command '{}')",
				ty.name(),
				command.name()
			),
		})?;
	match converter.convert(token, ctx).await {
		Ok(value) => Ok(Slot::Value(value)),
		Err(reason) => Err(BindFailure::Conversion {
			parameter: parameter.name().to_string(),
			reason,
		}),
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicUsize, Ordering};

	use super::*;
	use crate::BoxFut;
	use crate::command::{CommandBuilder, ParameterFlags, RegistryBuilder};
	use crate::convert::{ArgType, ArgValue, TypeConverter};
	use crate::registry::CommandRegistry;
	use crate::resolve::{self, MatchOutcome};
	use crate::tokenize;

	fn noop(
		_ctx: InvocationContext,
		_args: Args,
	) -> std::future::Ready<anyhow::Result<serde_json::Value>> {
		std::future::ready(Ok(serde_json::Value::Null))
	}

	async fn bind_line(registry: &CommandRegistry, line: &str) -> Result<Args, BindFailure> {
		let input = tokenize::parse(line);
		let command = match resolve::resolve(&input, registry) {
			MatchOutcome::Matched(command) => command,
			other => panic!("input {line:?} did not match: {other:?}"),
		};
		bind(
			&command,
			&input,
			&ConverterRegistry::new(),
			&InvocationContext::new(),
			&CancelToken::new(),
		)
		.await
	}

	fn args(result: Result<Args, BindFailure>) -> Args {
		match result {
			Ok(args) => args,
			Err(BindFailure::Conversion { parameter, reason }) => {
				panic!("conversion failed on '{parameter}': {reason}")
			}
			Err(BindFailure::Cancelled) => panic!("binding was cancelled"),
		}
	}

	fn ban_registry() -> CommandRegistry {
		RegistryBuilder::new()
			.command(
				CommandBuilder::new("ban")
					.required("user", ArgType::text())
					.optional_or("days", ArgType::of::<i64>(), "30")
					.remainder("reason", ArgType::text())
					.handler(noop),
			)
			.build()
			.unwrap()
	}

	#[tokio::test]
	async fn positional_tokens_fill_in_order() {
		let registry = ban_registry();
		let args = args(bind_line(&registry, "ban alice 3 spamming the lobby").await);
		assert_eq!(args.get::<String>("user").unwrap(), "alice");
		assert_eq!(*args.get::<i64>("days").unwrap(), 3);
		assert_eq!(args.get::<String>("reason").unwrap(), "spamming the lobby");
	}

	#[tokio::test]
	async fn named_tokens_claim_their_slot() {
		let registry = ban_registry();
		let args = args(bind_line(&registry, "ban days:7 alice").await);
		assert_eq!(args.get::<String>("user").unwrap(), "alice");
		assert_eq!(*args.get::<i64>("days").unwrap(), 7);
	}

	#[tokio::test]
	async fn unfilled_optional_takes_its_default() {
		let registry = ban_registry();
		let args = args(bind_line(&registry, "ban alice").await);
		assert_eq!(*args.get::<i64>("days").unwrap(), 30);
		assert!(args.is_set("days"));
	}

	#[tokio::test]
	async fn unfilled_optional_without_default_stays_empty() {
		let registry = RegistryBuilder::new()
			.command(
				CommandBuilder::new("ban")
					.required("user", ArgType::text())
					.optional("days", ArgType::of::<i64>())
					.handler(noop),
			)
			.build()
			.unwrap();
		let args = args(bind_line(&registry, "ban alice").await);
		assert!(args.opt::<i64>("days").is_none());
		assert!(!args.is_set("days"));
	}

	#[tokio::test]
	async fn empty_token_on_nullable_stays_empty() {
		let registry = RegistryBuilder::new()
			.command(
				CommandBuilder::new("greet")
					.nullable("name", ArgType::text())
					.handler(noop),
			)
			.build()
			.unwrap();
		let args = args(bind_line(&registry, r#"greet """#).await);
		assert!(args.opt::<String>("name").is_none());
	}

	#[tokio::test]
	async fn empty_token_with_default_binds_the_default() {
		let registry = ban_registry();
		// An empty named value on an optional parameter falls back to the
		// declared default instead of reaching the i64 converter.
		let args = args(bind_line(&registry, "ban alice days:").await);
		assert_eq!(*args.get::<i64>("days").unwrap(), 30);
	}

	#[tokio::test]
	async fn empty_token_on_plain_required_reaches_the_converter() {
		let registry = RegistryBuilder::new()
			.command(
				CommandBuilder::new("echo")
					.required("text", ArgType::text())
					.handler(noop),
			)
			.build()
			.unwrap();
		let args = args(bind_line(&registry, r#"echo """#).await);
		assert_eq!(args.get::<String>("text").unwrap(), "");
	}

	#[tokio::test]
	async fn remainder_rejoins_with_single_spaces() {
		let registry = ban_registry();
		let args = args(bind_line(&registry, r#"ban alice 3 spam   and "more  spam""#).await);
		assert_eq!(
			args.get::<String>("reason").unwrap(),
			"spam and more  spam"
		);
	}

	#[tokio::test]
	async fn absent_remainder_stays_empty() {
		let registry = ban_registry();
		let args = args(bind_line(&registry, "ban alice 3").await);
		assert!(args.opt::<String>("reason").is_none());
	}

	#[tokio::test]
	async fn conversion_failure_names_parameter_and_reason() {
		let registry = ban_registry();
		match bind_line(&registry, "ban alice soon").await {
			Err(BindFailure::Conversion { parameter, reason }) => {
				assert_eq!(parameter, "days");
				assert_eq!(reason, "'soon' is not a valid i64");
			}
			_ => panic!("expected a conversion failure"),
		}
	}

	#[tokio::test]
	async fn wrong_type_lookup_is_reported() {
		let registry = ban_registry();
		let args = args(bind_line(&registry, "ban alice 3").await);
		let err = args.get::<bool>("days").unwrap_err();
		assert_eq!(
			err.to_string(),
			"parameter 'days' holds a i64, not a bool"
		);
	}

	#[tokio::test]
	async fn conversion_stops_at_first_failure() {
		static CALLS: AtomicUsize = AtomicUsize::new(0);

		struct Tracked;
		struct TrackedConverter;

		impl TypeConverter for TrackedConverter {
			fn convert<'a>(
				&'a self,
				_token: &'a str,
				_ctx: &'a InvocationContext,
			) -> BoxFut<'a, Result<ArgValue, String>> {
				CALLS.fetch_add(1, Ordering::SeqCst);
				Box::pin(std::future::ready(Ok(ArgValue::new(Tracked))))
			}
		}

		let registry = RegistryBuilder::new()
			.command(
				CommandBuilder::new("mix")
					.required("count", ArgType::of::<i64>())
					.required("tracked", ArgType::of::<Tracked>())
					.handler(noop),
			)
			.build()
			.unwrap();
		let converters = ConverterRegistry::new();
		converters.register::<Tracked>(TrackedConverter);

		let input = tokenize::parse("mix nope anything");
		let command = match resolve::resolve(&input, &registry) {
			MatchOutcome::Matched(command) => command,
			other => panic!("expected a match, got {other:?}"),
		};
		let outcome = bind(
			&command,
			&input,
			&converters,
			&InvocationContext::new(),
			&CancelToken::new(),
		)
		.await;

		assert!(matches!(
			outcome,
			Err(BindFailure::Conversion { parameter, .. }) if parameter == "count"
		));
		assert_eq!(CALLS.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn cancellation_preempts_binding() {
		let registry = ban_registry();
		let input = tokenize::parse("ban alice");
		let command = match resolve::resolve(&input, &registry) {
			MatchOutcome::Matched(command) => command,
			other => panic!("expected a match, got {other:?}"),
		};
		let cancel = CancelToken::new();
		cancel.cancel();
		let outcome = bind(
			&command,
			&input,
			&ConverterRegistry::new(),
			&InvocationContext::new(),
			&cancel,
		)
		.await;
		assert!(matches!(outcome, Err(BindFailure::Cancelled)));
	}

	#[tokio::test]
	async fn remainder_default_via_explicit_flags() {
		let registry = RegistryBuilder::new()
			.command(
				CommandBuilder::new("say")
					.parameter(
						"text",
						ArgType::text(),
						ParameterFlags {
							remainder: true,
							..Default::default()
						},
						Some("...".to_string()),
					)
					.handler(noop),
			)
			.build()
			.unwrap();
		let args = args(bind_line(&registry, "say").await);
		assert_eq!(args.get::<String>("text").unwrap(), "...");
	}
}
