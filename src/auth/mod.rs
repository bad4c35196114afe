//! Session management for the build service
//!
//! [`SessionManager`] reuses a stored session when one exists and otherwise
//! performs a single interactive login through a [`SessionSource`].
//! [`FileSessionStore`] is the production source, persisting sessions to a
//! JSON file in the user config directory.
//!
//! # Examples
//!
//! ```rust,no_run
//! use cloudpack::app::{ClientConfig, TerminalPrompter};
//! use cloudpack::auth::{FileSessionStore, LoginHint, SessionManager};
//!
//! # async fn example() -> cloudpack::Result<()> {
//! let store = FileSessionStore::new(FileSessionStore::default_path()?, &ClientConfig::default())?;
//! let session = SessionManager::new(&store)
//!     .acquire(&LoginHint::from_env(), &mut TerminalPrompter)
//!     .await?;
//! println!("Logged in as {:?}", session.email());
//! # Ok(())
//! # }
//! ```

pub mod credentials;
pub mod session;

// Re-export main public API
pub use credentials::{resolve_login, FileSessionStore};
pub use session::{LoginHint, Session, SessionManager, SessionSource};
