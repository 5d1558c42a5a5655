//! Fluent construction and validation of a command table.
//!
//! Declarations flow `RegistryBuilder` -> `GroupBuilder` -> `CommandBuilder`
//! and are checked once at [`RegistryBuilder::build`]: parameter ordering
//! rules per overload, then signature uniqueness across every lookup key.
//! Registration order is preserved because it is the final tie-breaker
//! during resolution.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use super::{
	Command, EntryPoint, Group, GroupFactory, Instance, Parameter, ParameterFlags, Signature,
	unit_factory,
};
use crate::args::Args;
use crate::context::InvocationContext;
use crate::convert::ArgType;
use crate::error::ConfigError;
use crate::precondition::Precondition;
use crate::provider::DependencyProvider;
use crate::registry::CommandRegistry;

/// Declares one command overload.
pub struct CommandBuilder {
	name: String,
	aliases: Vec<String>,
	summary: String,
	parameters: Vec<Parameter>,
	preconditions: Vec<Arc<dyn Precondition>>,
	entry: Option<EntryPoint>,
}

impl CommandBuilder {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			aliases: Vec::new(),
			summary: String::new(),
			parameters: Vec::new(),
			preconditions: Vec::new(),
			entry: None,
		}
	}

	/// Adds an alternative name resolving to this command.
	pub fn alias(mut self, alias: impl Into<String>) -> Self {
		self.aliases.push(alias.into());
		self
	}

	/// One-line description shown in help output.
	pub fn summary(mut self, text: impl Into<String>) -> Self {
		self.summary = text.into();
		self
	}

	/// Declares a required positional parameter.
	pub fn required(self, name: impl Into<String>, ty: ArgType) -> Self {
		self.parameter(name, ty, ParameterFlags::default(), None)
	}

	/// Declares an optional parameter with no default; unfilled, it reads
	/// back as `None`.
	pub fn optional(self, name: impl Into<String>, ty: ArgType) -> Self {
		self.parameter(
			name,
			ty,
			ParameterFlags {
				optional: true,
				..Default::default()
			},
			None,
		)
	}

	/// Declares an optional parameter that falls back to `default` when
	/// unfilled. The default is kept as a token and converted per call.
	pub fn optional_or(
		self,
		name: impl Into<String>,
		ty: ArgType,
		default: impl Into<String>,
	) -> Self {
		self.parameter(
			name,
			ty,
			ParameterFlags {
				optional: true,
				..Default::default()
			},
			Some(default.into()),
		)
	}

	/// Declares a required parameter that accepts an empty token as null.
	pub fn nullable(self, name: impl Into<String>, ty: ArgType) -> Self {
		self.parameter(
			name,
			ty,
			ParameterFlags {
				nullable: true,
				..Default::default()
			},
			None,
		)
	}

	/// Declares the trailing remainder parameter. It absorbs every leftover
	/// positional token, rejoined with single spaces, as one value.
	pub fn remainder(self, name: impl Into<String>, ty: ArgType) -> Self {
		self.parameter(
			name,
			ty,
			ParameterFlags {
				remainder: true,
				..Default::default()
			},
			None,
		)
	}

	/// Declares a parameter with explicit flags. The named shorthands cover
	/// the common shapes; this is the escape hatch for combinations.
	pub fn parameter(
		mut self,
		name: impl Into<String>,
		ty: ArgType,
		flags: ParameterFlags,
		default: Option<String>,
	) -> Self {
		self.parameters.push(Parameter::new(
			name.into(),
			ty,
			flags,
			default,
			String::new(),
		));
		self
	}

	/// Describes the most recently declared parameter for help output.
	pub fn help(mut self, text: impl Into<String>) -> Self {
		if let Some(parameter) = self.parameters.last_mut() {
			parameter.summary = text.into();
		}
		self
	}

	/// Adds a gate checked for this command only, after the group's gates.
	pub fn precondition(mut self, gate: impl Precondition + 'static) -> Self {
		self.preconditions.push(Arc::new(gate));
		self
	}

	/// Stateless handler: the closure sees only the context and arguments.
	pub fn handler<F, Fut>(mut self, f: F) -> Self
	where
		F: Fn(InvocationContext, Args) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = anyhow::Result<serde_json::Value>> + Send + 'static,
	{
		self.entry = Some(Arc::new(move |_instance, ctx, args| Box::pin(f(ctx, args))));
		self
	}

	/// Handler bound to the instance built by the group factory.
	///
	/// `G` must be the type the factory produces; a mismatch surfaces as an
	/// invocation fault rather than a handler call.
	pub fn handler_with<G, F, Fut>(mut self, f: F) -> Self
	where
		G: Any + Send + Sync,
		F: Fn(Arc<G>, InvocationContext, Args) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = anyhow::Result<serde_json::Value>> + Send + 'static,
	{
		self.entry = Some(Arc::new(move |instance, ctx, args| {
			match instance.downcast::<G>() {
				Ok(instance) => Box::pin(f(instance, ctx, args)),
				Err(_) => Box::pin(std::future::ready(Err(anyhow::anyhow!(
					"group factory built a different type than the handler expects"
				)))),
			}
		}));
		self
	}

	/// Finalizes this declaration against `group` without registering it,
	/// for hosts assembling a table through
	/// [`CommandRegistry::from_commands_unchecked`].
	pub fn into_command(self, group: Arc<Group>) -> Result<Command, ConfigError> {
		self.finish(group)
	}

	fn finish(self, group: Arc<Group>) -> Result<Command, ConfigError> {
		if self.name.is_empty() {
			return Err(ConfigError::EmptyCommandName);
		}
		let entry = self.entry.ok_or_else(|| ConfigError::MissingHandler {
			command: self.name.clone(),
		})?;

		let mut seen_optional = false;
		let mut seen_remainder = false;
		for (index, parameter) in self.parameters.iter().enumerate() {
			if self.parameters[..index]
				.iter()
				.any(|earlier| earlier.key() == parameter.key())
			{
				return Err(ConfigError::DuplicateParameter {
					command: self.name,
					parameter: parameter.name().to_string(),
				});
			}
			if seen_remainder {
				return Err(ConfigError::ParameterAfterRemainder {
					command: self.name,
					parameter: parameter.name().to_string(),
				});
			}
			let flags = parameter.flags();
			if flags.remainder {
				seen_remainder = true;
			} else if flags.optional {
				seen_optional = true;
			} else if seen_optional {
				return Err(ConfigError::RequiredAfterOptional {
					command: self.name,
					parameter: parameter.name().to_string(),
				});
			}
		}

		Ok(Command {
			name: self.name,
			aliases: self.aliases,
			summary: self.summary,
			parameters: self.parameters,
			preconditions: self.preconditions,
			group,
			entry,
			registration: 0,
		})
	}
}

/// Declares a group: shared gates, a shared handler factory, and the
/// commands under it.
pub struct GroupBuilder {
	name: String,
	preconditions: Vec<Arc<dyn Precondition>>,
	factory: Option<GroupFactory>,
	commands: Vec<CommandBuilder>,
}

impl GroupBuilder {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			preconditions: Vec::new(),
			factory: None,
			commands: Vec::new(),
		}
	}

	/// Adds a gate checked before every command in the group.
	pub fn precondition(mut self, gate: impl Precondition + 'static) -> Self {
		self.preconditions.push(Arc::new(gate));
		self
	}

	/// Typed handler factory. Runs once per invocation against the
	/// dependency provider; its product is what `handler_with` closures
	/// receive.
	pub fn factory<G, F>(mut self, f: F) -> Self
	where
		G: Any + Send + Sync,
		F: Fn(&dyn DependencyProvider) -> anyhow::Result<G> + Send + Sync + 'static,
	{
		self.factory = Some(Arc::new(move |provider| {
			f(provider).map(|instance| Arc::new(instance) as Instance)
		}));
		self
	}

	pub fn command(mut self, command: CommandBuilder) -> Self {
		self.commands.push(command);
		self
	}
}

enum Declaration {
	Group(GroupBuilder),
	Loose(CommandBuilder),
}

/// Builds a validated [`CommandRegistry`].
#[derive(Default)]
pub struct RegistryBuilder {
	declarations: Vec<Declaration>,
}

impl RegistryBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn group(mut self, group: GroupBuilder) -> Self {
		self.declarations.push(Declaration::Group(group));
		self
	}

	/// Registers a command outside any group. It shares an implicit group
	/// with no gates and a unit factory.
	pub fn command(mut self, command: CommandBuilder) -> Self {
		self.declarations.push(Declaration::Loose(command));
		self
	}

	pub fn build(self) -> Result<CommandRegistry, ConfigError> {
		let mut commands = Vec::new();
		let mut loose_group: Option<Arc<Group>> = None;

		for declaration in self.declarations {
			match declaration {
				Declaration::Group(group) => {
					let factory = group.factory.unwrap_or_else(unit_factory);
					let shared = Arc::new(Group::new(group.name, group.preconditions, factory));
					for command in group.commands {
						commands.push(command.finish(shared.clone())?);
					}
				}
				Declaration::Loose(command) => {
					let shared = loose_group
						.get_or_insert_with(|| {
							Arc::new(Group::new(String::new(), Vec::new(), unit_factory()))
						})
						.clone();
					commands.push(command.finish(shared)?);
				}
			}
		}

		validate_signatures(&commands)?;
		Ok(CommandRegistry::from_validated(commands))
	}
}

/// Rejects overloads that resolution could never tell apart: same lookup
/// key, same signature.
fn validate_signatures(commands: &[Command]) -> Result<(), ConfigError> {
	let mut buckets: HashMap<String, Vec<Signature>> = HashMap::new();
	for command in commands {
		let signature = command.signature();
		let mut keys: Vec<String> = command.lookup_keys().collect();
		keys.sort();
		keys.dedup();
		for key in keys {
			let bucket = buckets.entry(key.clone()).or_default();
			let duplicates = bucket.iter().filter(|other| **other == signature).count();
			if duplicates > 0 {
				return Err(ConfigError::DuplicateSignature {
					name: key,
					count: duplicates + 1,
				});
			}
			bucket.push(signature.clone());
		}
	}
	Ok(())
}
