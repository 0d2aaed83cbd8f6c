//! Registry trait for self-registering implementations.
//!
//! Signing capabilities and ledger collaborators are pluggable. Each
//! implementation module exposes a `Registry` type naming the configuration
//! key it answers to and the factory that builds it.

/// Base trait for implementation registries.
pub trait ImplementationRegistry {
	/// Name used in configuration files to select this implementation,
	/// for example `"local"` under `[account]` or `"alloy"` under `[provider]`.
	const NAME: &'static str;

	/// Factory function type this implementation provides.
	type Factory;

	/// Returns the factory that builds the implementation from its
	/// configuration table.
	fn factory() -> Self::Factory;
}
