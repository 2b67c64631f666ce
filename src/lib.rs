// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![warn(missing_docs)]                // All public items must be documented
#![warn(dead_code)]                   // Unused code is flagged
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![warn(unused_imports)]              // Unused imports are flagged
#![warn(unused_variables)]            // Unused variables are flagged
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// Tests may unwrap, expect and panic freely
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Forklift
//!
//! Resource-dependency checking and reconciliation planning for declarative
//! container deployments.
//!
//! ## Overview
//!
//! A pallet declares which packages to deploy, and each package declares the
//! resources it provides and requires. Forklift:
//!
//! - Detects resource conflicts between deployments (ports, networks,
//!   services, file exports) and matches every requirement with a provider
//! - Derives ordering constraints between deployments from those matches
//! - Plans the add/update/remove changes that bring a host to the desired
//!   state, and applies them serially or concurrently
//!
//! ## Architecture
//!
//! 1. **Resources**: Typed resource kinds with conflict and match rules
//! 2. **Deployments**: Packages resolved with their enabled features
//! 3. **Checker**: Conflicts and dependency satisfaction across the whole set
//! 4. **Graph**: Deployment dependency graph, closure, cycles
//! 5. **Planner**: Change classification, ordering, execution
//! 6. **Reconciler**: One full check/plan/apply cycle against a runtime
//!
//! ## Modules
//!
//! - [`resources`]: Resource kinds and origin trails
//! - [`deployment`]: Package definitions and deployment resolution
//! - [`checker`]: Conflict and dependency checks
//! - [`graph`]: Dependency graphs
//! - [`planner`]: Reconciliation planning and execution
//! - [`runtime`]: Container runtime integration
//! - [`config`]: Settings, snapshots, hashing
//! - [`reconciler`]: Reconciliation engine
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```yaml
//! packages:
//!   - path: github.com/example/pallet/caddy
//!     deployment:
//!       definition_files: [compose.yml]
//!       provides:
//!         listeners:
//!           - port: 443
//!         services:
//!           - port: 443
//!             protocol: https
//!             tags: [reverse-proxy]
//! deployments:
//!   - name: infra/caddy
//!     package: github.com/example/pallet/caddy
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod checker;
pub mod cli;
pub mod config;
pub mod deployment;
pub mod error;
pub mod graph;
pub mod planner;
pub mod reconciler;
pub mod resources;
pub mod runtime;

// ============================================================================
// Re-exports
// ============================================================================

pub use checker::{ValidationReport, check_conflicts, check_dependencies};
pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{ConfigParser, DefinitionHasher, DeploymentSnapshot, ForkliftConfig};
pub use deployment::{Deployment, LayeredPackageSource, PackageSpec, ResolvedDeployment};
pub use error::{ForkliftError, Result};
pub use graph::DeploymentGraph;
pub use planner::{ExecutionMode, PlanExecutor, Planner, ReconciliationChange, ReconciliationPlan};
pub use reconciler::{ReconciliationResult, Reconciler};
pub use resources::{AttachedResource, Resource, ResourceKind};
pub use runtime::{ContainerRuntime, LiveApp, MemoryRuntime};
