//! # Pontet Core
//!
//! `pontet-core` is the RPC client layer of the Pontet edge gateway. It turns
//! declarative service configuration into live gRPC client stubs, exposes
//! every backend method behind one uniform awaitable interface, stamps
//! correlation metadata onto each outgoing call and translates transport
//! failures into a stable application error model.
//!
//! ## Key Components
//!
//! * **[`registry::ClientRegistry`]:** The entry point for obtaining stubs.
//!   Eagerly populated from configuration at startup, with single-flight
//!   construction for keys requested later.
//! * **[`caller::Caller`]:** Wraps any stub into an awaitable facade without
//!   per-method bindings, generic over arbitrary service contracts.
//! * **[`error::AppError`] & [`error::ErrorKind`]:** The closed error
//!   taxonomy every failure of this layer is expressed in. Raw transport
//!   errors never cross the crate boundary unwrapped.
//!
//! ## Internal building blocks
//!
//! * **[`factory::ClientFactory`]:** Resolves configured services inside
//!   their descriptor sets and binds lazily-connecting channels.
//! * **[`descriptor::DescriptorLoader`]:** Parses binary descriptor sets,
//!   cached by path.
//! * **[`grpc::client::GrpcClient`]:** The dynamic tonic transport speaking
//!   the JSON codec; agnostic to message shapes.
//!
//! ## Re-exports
//!
//! This crate re-exports `prost_reflect` and `tonic` to ensure that consumers
//! use compatible versions of these underlying dependencies.
pub mod caller;
pub mod clients;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod factory;
pub mod grpc;
pub mod metadata;
pub mod registry;

// Re-exports
pub use prost_reflect;
pub use tonic;

/// Type alias for the standard boxed error used in generic bounds.
type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
