//! Command-line interface components
//!
//! This module contains CLI-specific code for cloudpack: argument parsing,
//! the task registry, the task implementations and download progress.

pub mod args;
pub mod progress;
pub mod registry;
pub mod tasks;

pub use args::{parse_task_args, BuildArgs, Cli, GlobalArgs, LoginArgs, PackageAction, PackageArgs};
pub use progress::DownloadProgress;
pub use registry::{Task, TaskContext, TaskDescriptor, TaskRegistry};
pub use tasks::{
    default_registry, execute_package, LoginTask, LogoutTask, PackageCommand, PackageOptions,
    PackageTask,
};
