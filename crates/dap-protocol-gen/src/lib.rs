//! # C++ binding generation for the Debug Adapter Protocol
//!
//! Compiles the debug adapter protocol JSON schema into C++ record
//! declarations and typeinfo definitions: one shared header plus one
//! definitions file each for requests, responses, events and the types they
//! use.
//!
//! ## Usage
//!
//! The `dap-protocol-gen` binary fetches the schema from the configured
//! source, writes every artifact and formats them:
//!
//! ```bash
//! cargo run -p dap-protocol-gen -- -c protocol_gen.kdl
//! ```
//!
//! Pass `--schema ./debugProtocol.json` to compile a local copy instead.
//!
//! ## Modules
//!
//! - [`schema`] - Schema document model and `$ref` resolution
//! - [`codegen`] - Record building and dependency-ordered emission
//! - [`fetch`] - Schema sources and the KDL config
//! - [`format`] - Formatting the written artifacts
//! - [`error`] - Error types

pub mod cli;
pub mod codegen;
pub mod error;
pub mod fetch;
pub mod format;
pub mod schema;
