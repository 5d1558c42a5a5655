//! Per-invocation context carried through conversion, authorization, and
//! the handler itself.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

/// Front-end data attached to a single dispatch.
///
/// The pipeline never inspects the contents; it only threads the context
/// through to converters, preconditions, and the matched handler. Hosts put
/// whatever their domain needs here (the message author, the channel, a
/// session handle) keyed by type.
#[derive(Default)]
pub struct InvocationContext {
	tags: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl InvocationContext {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder-style insert for constructing a context inline.
	pub fn with<T: Any + Send + Sync>(mut self, value: T) -> Self {
		self.insert(value);
		self
	}

	/// Stores `value` under its type, replacing any previous value of the
	/// same type.
	pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
		self.tags.insert(TypeId::of::<T>(), Box::new(value));
	}

	pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
		self.tags
			.get(&TypeId::of::<T>())
			.and_then(|boxed| boxed.downcast_ref::<T>())
	}

	pub fn contains<T: Any + Send + Sync>(&self) -> bool {
		self.tags.contains_key(&TypeId::of::<T>())
	}
}

impl fmt::Debug for InvocationContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("InvocationContext")
			.field("tags", &self.tags.len())
			.finish()
	}
}
