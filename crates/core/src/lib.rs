//! adjutant: text command resolution and execution pipeline
//!
//! Turns one line of user text into a typed, authorized handler call:
//!
//! - **Tokenization**: double quotes, backslash escapes, and `key:value`
//!   named tokens
//! - **Resolution**: case-insensitive lookup with aliases, then structural
//!   overload ranking with deterministic tie-breaking
//! - **Conversion**: pluggable async converters from raw tokens to typed
//!   values, with generated converters for enumerated types
//! - **Authorization**: ordered precondition chains on groups and commands
//! - **Invocation**: handler instances built against a dependency provider,
//!   with panic capture
//!
//! Every expected failure is a value in [`ExecutionResult`]; nothing in the
//! pipeline panics or throws past the dispatch call. Dispatches run
//! concurrently by default and can be serialized per service, and every
//! stage observes cooperative cancellation between steps.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use adjutant::{
//!     ArgType, CancelToken, CommandBuilder, CommandService, ConverterRegistry,
//!     EmptyProvider, InvocationContext, RegistryBuilder, ServiceConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let registry = RegistryBuilder::new()
//!         .command(
//!             CommandBuilder::new("ban")
//!                 .alias("banish")
//!                 .required("user", ArgType::text())
//!                 .optional_or("days", ArgType::of::<i64>(), "30")
//!                 .remainder("reason", ArgType::text())
//!                 .handler(|_ctx, args| async move {
//!                     let user = args.get::<String>("user")?.clone();
//!                     let days = *args.get::<i64>("days")?;
//!                     Ok(serde_json::json!({ "banned": user, "days": days }))
//!                 }),
//!         )
//!         .build()?;
//!
//!     let service = CommandService::new(
//!         registry,
//!         ConverterRegistry::new(),
//!         Arc::new(EmptyProvider),
//!         ServiceConfig::default(),
//!     )?;
//!
//!     let result = service
//!         .execute(
//!             "ban alice days:7 being rude",
//!             InvocationContext::new(),
//!             &CancelToken::new(),
//!         )
//!         .await;
//!     assert!(result.is_success());
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::pin::Pin;

mod bind;
mod invoke;

pub mod args;
pub mod cancel;
pub mod command;
pub mod context;
pub mod convert;
pub mod error;
pub mod precondition;
pub mod provider;
pub mod registry;
pub mod resolve;
pub mod result;
pub mod service;
pub mod tokenize;

// Re-export key types at crate root
pub use adjutant_types::{ExecutionReport, ParsedInput, ReportStatus};
pub use args::{ArgError, Args};
pub use cancel::CancelToken;
pub use command::{
	Command, CommandBuilder, Group, GroupBuilder, GroupFactory, Instance, Parameter,
	ParameterFlags, RegistryBuilder, Signature,
};
pub use context::InvocationContext;
pub use convert::{
	ArgType, ArgValue, ConverterRegistry, EnumArgument, FromStrConverter, TypeConverter,
};
pub use error::ConfigError;
pub use precondition::Precondition;
pub use provider::{DependencyProvider, DependencyProviderExt, EmptyProvider, Provider};
pub use registry::CommandRegistry;
pub use resolve::MatchOutcome;
pub use result::{ExecutionResult, Stage};
pub use service::{CommandService, ExecutionMode, ServiceConfig};

/// Boxing alias: stable async in trait without `async_trait`.
pub type BoxFut<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
