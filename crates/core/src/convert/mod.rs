//! Argument type tags, converted values, and the converter registry.
//!
//! Every declared parameter carries an [`ArgType`]. At dispatch time the
//! [`ConverterRegistry`] maps that tag to a [`TypeConverter`], which turns
//! one raw token into a typed [`ArgValue`]. Converters for enumerated
//! argument types are not registered up front; the tag carries a factory and
//! the registry builds and caches the converter on first use.

mod builtin;
mod enums;

pub use builtin::FromStrConverter;
pub use enums::EnumArgument;

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

use crate::BoxFut;
use crate::context::InvocationContext;

/// Semantic type tag for a declared parameter.
///
/// Compares by target type only; the converter factory is bookkeeping. The
/// plain text type doubles as the catch-all: overload ranking treats it as
/// less specific than any other tag.
#[derive(Clone, Copy)]
pub struct ArgType {
	id: TypeId,
	name: &'static str,
	factory: Option<fn() -> Arc<dyn TypeConverter>>,
}

impl ArgType {
	/// Tag for an arbitrary target type with a registered converter.
	pub fn of<T: Any>() -> Self {
		Self {
			id: TypeId::of::<T>(),
			name: short_type_name::<T>(),
			factory: None,
		}
	}

	/// Tag for plain text. Accepts any token; ranks below every other type.
	pub fn text() -> Self {
		Self::of::<String>()
	}

	/// Tag for an enumerated argument type. Carries the factory that builds
	/// the name-table converter on first use.
	pub fn enum_of<T: EnumArgument>() -> Self {
		Self {
			id: TypeId::of::<T>(),
			name: short_type_name::<T>(),
			factory: Some(enums::converter_factory::<T>),
		}
	}

	pub fn id(&self) -> TypeId {
		self.id
	}

	/// Display name of the target type, path segments trimmed.
	pub fn name(&self) -> &'static str {
		self.name
	}

	pub fn is_catch_all(&self) -> bool {
		self.id == TypeId::of::<String>()
	}

	fn factory(&self) -> Option<fn() -> Arc<dyn TypeConverter>> {
		self.factory
	}
}

impl PartialEq for ArgType {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for ArgType {}

impl std::hash::Hash for ArgType {
	fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}

impl fmt::Debug for ArgType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "ArgType({})", self.name)
	}
}

pub(crate) fn short_type_name<T>() -> &'static str {
	let full = std::any::type_name::<T>();
	full.rsplit("::").next().unwrap_or(full)
}

/// A successfully converted argument.
///
/// Type-erased so one binding path serves every parameter type; handlers
/// recover the concrete type through [`Args`](crate::args::Args) accessors.
pub struct ArgValue {
	value: Box<dyn Any + Send + Sync>,
	type_name: &'static str,
}

impl ArgValue {
	pub fn new<T: Any + Send + Sync>(value: T) -> Self {
		Self {
			value: Box::new(value),
			type_name: short_type_name::<T>(),
		}
	}

	pub fn is<T: Any>(&self) -> bool {
		self.value.is::<T>()
	}

	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		self.value.downcast_ref::<T>()
	}

	/// Recovers the concrete value, or returns `self` unchanged if the type
	/// does not match.
	pub fn downcast<T: Any>(self) -> Result<T, Self> {
		match self.value.downcast::<T>() {
			Ok(boxed) => Ok(*boxed),
			Err(value) => Err(Self {
				value,
				type_name: self.type_name,
			}),
		}
	}

	/// Display name of the contained type.
	pub fn type_name(&self) -> &'static str {
		self.type_name
	}
}

impl fmt::Debug for ArgValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "ArgValue({})", self.type_name)
	}
}

/// Converts one raw token into a typed value.
///
/// Conversion is async so converters can consult external state (a user
/// lookup, a database). `Err` carries the human-readable rejection reason
/// that ends up in the conversion-failure result verbatim.
pub trait TypeConverter: Send + Sync {
	fn convert<'a>(
		&'a self,
		token: &'a str,
		ctx: &'a InvocationContext,
	) -> BoxFut<'a, Result<ArgValue, String>>;
}

/// Converter lookup table keyed by target type.
///
/// [`new`](Self::new) starts with converters for the standard scalar types;
/// hosts register their own per target type before the service starts.
/// Enum converters are built lazily from the tag's factory and cached with
/// an insert-if-absent, so a racing first use constructs twice and keeps
/// one, which is wasteful but harmless.
pub struct ConverterRegistry {
	converters: DashMap<TypeId, Arc<dyn TypeConverter>>,
}

impl Default for ConverterRegistry {
	fn default() -> Self {
		Self::new()
	}
}

impl ConverterRegistry {
	/// Registry with the standard scalar converters installed.
	pub fn new() -> Self {
		let registry = Self::empty();
		builtin::install(&registry);
		registry
	}

	/// Registry with no converters at all.
	pub fn empty() -> Self {
		Self {
			converters: DashMap::new(),
		}
	}

	/// Registers a converter for target type `T`, replacing any existing
	/// one.
	pub fn register<T: Any>(&self, converter: impl TypeConverter + 'static) {
		self.register_arc::<T>(Arc::new(converter));
	}

	pub fn register_arc<T: Any>(&self, converter: Arc<dyn TypeConverter>) {
		self.converters.insert(TypeId::of::<T>(), converter);
	}

	/// Looks up the converter for `ty`, building and caching a factory-backed
	/// one on first use.
	pub fn resolve(&self, ty: &ArgType) -> Option<Arc<dyn TypeConverter>> {
		if let Some(found) = self.converters.get(&ty.id()) {
			return Some(found.value().clone());
		}
		let factory = ty.factory()?;
		Some(
			self.converters
				.entry(ty.id())
				.or_insert_with(factory)
				.value()
				.clone(),
		)
	}

	/// Whether `ty` can be converted, without building anything. Used by
	/// startup validation.
	pub fn can_convert(&self, ty: &ArgType) -> bool {
		self.converters.contains_key(&ty.id()) || ty.factory().is_some()
	}
}
