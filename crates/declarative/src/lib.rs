//! # Declarative
//!
//! A framework for declarative management of remote resources.
//!
//! Resource kinds describe their attributes with a [`Schema`] and implement
//! [`Lifecycle`] against some API client. The host collects declared blocks,
//! plans them against tracked [`StateFile`] records and executes the plan.
//!
//! ## Core Concepts
//!
//! - **Lifecycle**: typed create/read/update/delete/import adapter for one kind
//! - **Registry**: ordered set of kinds; order is dependency order
//! - **ExecutionPlan**: per-block actions computed from config, state and a refresh
//! - **Executor**: applies a plan tier by tier with bounded parallelism
//!
//! ## Example
//!
//! ```ignore
//! use declarative::{
//!     Declared, ExecuteOptions, NoProgress, PlanOptions, Registry, StateFile, execute, plan,
//! };
//!
//! let registry = Registry::new().register(Groups).register(Users);
//! let mut state = StateFile::load(path)?;
//! let plan = plan(&registry, &client, &declared, &state, PlanOptions::default())?;
//! let summary = execute(
//!     &registry,
//!     &client,
//!     &plan,
//!     &mut state,
//!     &ExecuteOptions::default(),
//!     &mut NoProgress,
//! )?;
//! state.save(path)?;
//! ```
//!
//! ## Callback Traits
//!
//! - [`ProgressCallback`]: Receives progress updates
//! - [`ConfirmCallback`]: Handles user confirmations
//!
//! This allows the crate to be used without hard dependencies on
//! specific UI frameworks.

pub mod context;
pub mod diff;
pub mod error;
pub mod executor;
pub mod planner;
pub mod resource;
pub mod schema;
pub mod secrets;
pub mod state;
pub mod types;
pub mod validate;

// Re-export main types at crate root
pub use context::{AutoConfirm, AutoDecline, ConfirmCallback, NoProgress, Phase, ProgressCallback};
pub use diff::AttributeChange;
pub use error::{Diagnostic, Error, Result};
pub use executor::execute;
pub use planner::{Declared, ExecutionPlan, PlanOptions, PlannedChange, plan, validate};
pub use resource::{BoxedResource, DynResource, Lifecycle, Registry};
pub use schema::{Attribute, AttributeType, Mode, Schema};
pub use state::{Address, STATE_VERSION, StateError, StateFile, TrackedResource};
pub use types::{Action, ApplyResult, ExecuteOptions, ExecuteSummary};
pub use validate::Diagnostics;
