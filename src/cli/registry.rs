//! Task registry and dispatcher
//!
//! One task is resolved and run per process. Names are matched exactly
//! before aliases; aliases are scanned in registration order.

use std::collections::HashSet;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use crate::config::AppConfig;
use crate::errors::{Result, UsageError};

/// Everything a task needs, passed explicitly at dispatch
#[derive(Debug, Clone)]
pub struct TaskContext {
    /// Loaded application configuration
    pub config: AppConfig,
    /// Arguments following the task token
    pub args: Vec<String>,
    /// Directory holding the project file; downloads are written here too
    pub working_dir: PathBuf,
    /// Suppress progress bars
    pub quiet: bool,
}

/// A unit of CLI behaviour bound to a task name
#[async_trait]
pub trait Task: Send + Sync {
    async fn run(&self, ctx: TaskContext) -> Result<()>;
}

/// Static description of a registered task
pub struct TaskDescriptor {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub usage: &'static str,
    pub help_line: &'static str,
    pub factory: fn() -> Box<dyn Task>,
}

impl std::fmt::Debug for TaskDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskDescriptor")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("usage", &self.usage)
            .finish_non_exhaustive()
    }
}

/// Ordered, collision-free task table
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: Vec<TaskDescriptor>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task; its name and aliases must not collide with any registered token
    pub fn register(&mut self, descriptor: TaskDescriptor) -> std::result::Result<(), UsageError> {
        let mut taken: HashSet<&str> = self
            .tasks
            .iter()
            .flat_map(|task| std::iter::once(task.name).chain(task.aliases.iter().copied()))
            .collect();

        for token in std::iter::once(descriptor.name).chain(descriptor.aliases.iter().copied()) {
            if !taken.insert(token) {
                return Err(UsageError::DuplicateTask {
                    name: token.to_string(),
                });
            }
        }

        self.tasks.push(descriptor);
        Ok(())
    }

    /// Exact name first, then aliases in registration order
    pub fn resolve(&self, token: &str) -> Option<&TaskDescriptor> {
        self.tasks
            .iter()
            .find(|task| task.name == token)
            .or_else(|| {
                self.tasks
                    .iter()
                    .find(|task| task.aliases.iter().any(|alias| *alias == token))
            })
    }

    pub fn tasks(&self) -> &[TaskDescriptor] {
        &self.tasks
    }

    /// Banner listing every task's name and help line
    pub fn usage_banner(&self) -> String {
        let mut banner = String::from("Usage: cloudpack task args\n\nAvailable tasks:\n");
        for task in &self.tasks {
            banner.push_str(&format!("  {} - {}\n", task.name, task.help_line));
        }
        banner
    }

    /// Resolve `token` and run the task; prints the usage banner on no match
    pub async fn dispatch(&self, token: Option<&str>, ctx: TaskContext) -> Result<()> {
        let descriptor = match token {
            Some(token) => self.resolve(token).ok_or_else(|| UsageError::UnknownTask {
                token: token.to_string(),
            }),
            None => Err(UsageError::NoTask),
        };

        let descriptor = match descriptor {
            Ok(descriptor) => descriptor,
            Err(e) => {
                eprint!("{}", self.usage_banner());
                return Err(e.into());
            }
        };

        info!("Running {} task...", descriptor.name);
        let task = (descriptor.factory)();
        task.run(ctx).await
    }
}
