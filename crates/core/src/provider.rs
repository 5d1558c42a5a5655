//! Dependency provision for handler-group construction.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Resolves shared service instances by type.
///
/// Group factories receive a provider when a command is invoked and pull
/// their collaborators out of it. The trait is the whole integration surface:
/// hosts with a real container implement `resolve` over it, hosts without one
/// use [`Provider`].
pub trait DependencyProvider: Send + Sync {
	/// Returns the instance registered for `ty`, if any.
	fn resolve(&self, ty: TypeId) -> Option<Arc<dyn Any + Send + Sync>>;
}

/// Typed convenience over [`DependencyProvider::resolve`].
pub trait DependencyProviderExt: DependencyProvider {
	fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
		self.resolve(TypeId::of::<T>())
			.and_then(|instance| instance.downcast::<T>().ok())
	}
}

impl<P: DependencyProvider + ?Sized> DependencyProviderExt for P {}

/// Provider that resolves nothing. For registries whose handlers are
/// self-contained.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyProvider;

impl DependencyProvider for EmptyProvider {
	fn resolve(&self, _ty: TypeId) -> Option<Arc<dyn Any + Send + Sync>> {
		None
	}
}

/// Map-backed provider for hosts without a DI container.
#[derive(Default)]
pub struct Provider {
	entries: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl Provider {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `value`, replacing any previous instance of the same type.
	pub fn with<T: Any + Send + Sync>(mut self, value: T) -> Self {
		self.entries.insert(TypeId::of::<T>(), Arc::new(value));
		self
	}

	/// Registers an instance that is already shared.
	pub fn with_shared<T: Any + Send + Sync>(mut self, value: Arc<T>) -> Self {
		self.entries.insert(TypeId::of::<T>(), value);
		self
	}
}

impl DependencyProvider for Provider {
	fn resolve(&self, ty: TypeId) -> Option<Arc<dyn Any + Send + Sync>> {
		self.entries.get(&ty).cloned()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct Clock(u64);

	#[test]
	fn resolves_registered_type() {
		let provider = Provider::new().with(Clock(42));
		let clock = provider.get::<Clock>().unwrap();
		assert_eq!(clock.0, 42);
	}

	#[test]
	fn missing_type_resolves_none() {
		let provider = Provider::new();
		assert!(provider.get::<Clock>().is_none());
	}

	#[test]
	fn shared_instance_keeps_identity() {
		let clock = Arc::new(Clock(7));
		let provider = Provider::new().with_shared(clock.clone());
		let resolved = provider.get::<Clock>().unwrap();
		assert!(Arc::ptr_eq(&clock, &resolved));
	}

	#[test]
	fn empty_provider_resolves_nothing() {
		assert!(EmptyProvider.get::<Clock>().is_none());
	}
}
