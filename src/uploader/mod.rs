//! Codecov uploader invocation
//!
//! This module provides a trait-based architecture around the external
//! Codecov uploader binary. The core abstraction is the [`UploaderRunner`]
//! trait; two implementations are provided:
//!
//! - [`CliUploaderRunner`]: executes the real uploader binary
//! - [`DryRunUploader`]: logs the would-be invocation and succeeds, used
//!   when a run is configured as a dry run
//!
//! Each upload is described by an [`InvocationDescriptor`], built fresh per
//! coverage artifact and discarded after the invocation returns.

mod cli;
mod dry_run;
mod invocation;
mod traits;

pub use cli::CliUploaderRunner;
pub use dry_run::DryRunUploader;
pub use invocation::InvocationDescriptor;
pub use traits::UploaderRunner;
