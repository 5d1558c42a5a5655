//! Command declarations: parameters, groups, overload signatures, and the
//! type-erased handler entry point.

mod builder;

pub use builder::{CommandBuilder, GroupBuilder, RegistryBuilder};

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::BoxFut;
use crate::args::Args;
use crate::context::InvocationContext;
use crate::convert::ArgType;
use crate::precondition::Precondition;
use crate::provider::DependencyProvider;

/// How a parameter binds to input tokens.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ParameterFlags {
	/// May be left unfilled; an unfilled optional takes its default, or
	/// stays empty when there is none.
	pub optional: bool,
	/// An empty token binds the default instead of invoking the converter,
	/// or leaves the slot empty when there is none.
	pub nullable: bool,
	/// Absorbs all remaining positional tokens, rejoined with single
	/// spaces, as one value. Must be declared last.
	pub remainder: bool,
}

/// One declared parameter of a command overload.
#[derive(Debug)]
pub struct Parameter {
	name: String,
	key: String,
	ty: ArgType,
	flags: ParameterFlags,
	default: Option<String>,
	summary: String,
}

impl Parameter {
	pub(crate) fn new(
		name: String,
		ty: ArgType,
		flags: ParameterFlags,
		default: Option<String>,
		summary: String,
	) -> Self {
		let key = name.to_lowercase();
		Self {
			name,
			key,
			ty,
			flags,
			default,
			summary,
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Lowercased name, the form named tokens arrive in.
	pub(crate) fn key(&self) -> &str {
		&self.key
	}

	pub fn ty(&self) -> ArgType {
		self.ty
	}

	pub fn flags(&self) -> ParameterFlags {
		self.flags
	}

	/// Default value as an unconverted token; converted on each use.
	pub fn default_token(&self) -> Option<&str> {
		self.default.as_deref()
	}

	pub fn summary(&self) -> &str {
		&self.summary
	}

	/// Whether the input must supply this parameter for the overload to
	/// match.
	pub fn is_required(&self) -> bool {
		!self.flags.optional && !self.flags.remainder
	}
}

/// Shared handler instance, type-erased.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Builds the handler instance for a group at invocation time.
pub type GroupFactory =
	Arc<dyn Fn(&dyn DependencyProvider) -> anyhow::Result<Instance> + Send + Sync>;

/// Type-erased handler call; produced by the builder from a typed closure.
pub(crate) type EntryPoint = Arc<
	dyn Fn(Instance, InvocationContext, Args) -> BoxFut<'static, anyhow::Result<serde_json::Value>>
		+ Send
		+ Sync,
>;

/// A named set of commands sharing preconditions and a handler factory.
///
/// The factory runs once per invocation and pulls collaborators out of the
/// dependency provider; a factory error surfaces as an invocation fault.
pub struct Group {
	name: String,
	preconditions: Vec<Arc<dyn Precondition>>,
	factory: GroupFactory,
}

impl Group {
	pub fn new(
		name: impl Into<String>,
		preconditions: Vec<Arc<dyn Precondition>>,
		factory: GroupFactory,
	) -> Self {
		Self {
			name: name.into(),
			preconditions,
			factory,
		}
	}

	/// Group with no gates and a unit factory, for stateless handlers.
	pub fn stateless(name: impl Into<String>) -> Self {
		Self::new(name, Vec::new(), unit_factory())
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn preconditions(&self) -> &[Arc<dyn Precondition>] {
		&self.preconditions
	}

	pub(crate) fn instantiate(&self, provider: &dyn DependencyProvider) -> anyhow::Result<Instance> {
		(self.factory)(provider)
	}
}

impl fmt::Debug for Group {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Group")
			.field("name", &self.name)
			.field("preconditions", &self.preconditions.len())
			.finish_non_exhaustive()
	}
}

pub(crate) fn unit_factory() -> GroupFactory {
	Arc::new(|_| Ok(Arc::new(()) as Instance))
}

/// Structural identity of an overload: parameter types and flags in order.
///
/// Two overloads under the same lookup key with equal signatures cannot be
/// told apart by resolution, which is why the builder rejects them.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature(Vec<(TypeId, ParameterFlags)>);

/// One registered command overload.
pub struct Command {
	name: String,
	aliases: Vec<String>,
	summary: String,
	parameters: Vec<Parameter>,
	preconditions: Vec<Arc<dyn Precondition>>,
	group: Arc<Group>,
	entry: EntryPoint,
	/// Position in registration order; the final resolution tie-breaker.
	pub(crate) registration: usize,
}

impl Command {
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn aliases(&self) -> &[String] {
		&self.aliases
	}

	pub fn summary(&self) -> &str {
		&self.summary
	}

	pub fn parameters(&self) -> &[Parameter] {
		&self.parameters
	}

	/// Preconditions declared on this command only; the group's run first.
	pub fn preconditions(&self) -> &[Arc<dyn Precondition>] {
		&self.preconditions
	}

	pub fn group(&self) -> &Group {
		&self.group
	}

	pub(crate) fn entry(&self) -> &EntryPoint {
		&self.entry
	}

	/// Case-insensitive parameter lookup, returning the declaration index.
	pub fn parameter(&self, name: &str) -> Option<(usize, &Parameter)> {
		let key = name.to_lowercase();
		self.parameters
			.iter()
			.enumerate()
			.find(|(_, p)| p.key == key)
	}

	/// Whether the final parameter absorbs trailing tokens.
	pub fn has_remainder(&self) -> bool {
		self.parameters
			.last()
			.is_some_and(|p| p.flags().remainder)
	}

	/// Every name this command resolves under, lowercased.
	pub(crate) fn lookup_keys(&self) -> impl Iterator<Item = String> + '_ {
		std::iter::once(&self.name)
			.chain(self.aliases.iter())
			.map(|name| name.to_lowercase())
	}

	pub fn signature(&self) -> Signature {
		Signature(
			self.parameters
				.iter()
				.map(|p| (p.ty().id(), p.flags()))
				.collect(),
		)
	}

	/// One-line usage string: `ban <user> [days] [reason...]`.
	pub fn usage(&self) -> String {
		let mut out = self.name.clone();
		for parameter in &self.parameters {
			out.push(' ');
			let flags = parameter.flags();
			if flags.remainder {
				out.push_str(&format!("[{}...]", parameter.name()));
			} else if flags.optional {
				out.push_str(&format!("[{}]", parameter.name()));
			} else {
				out.push_str(&format!("<{}>", parameter.name()));
			}
		}
		out
	}
}

impl fmt::Debug for Command {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Command")
			.field("name", &self.name)
			.field("aliases", &self.aliases)
			.field("group", &self.group.name())
			.field("parameters", &self.parameters)
			.finish_non_exhaustive()
	}
}
