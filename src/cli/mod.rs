//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `init [path]` | Create the `.zit/` metadata store |
//! | `add <path>...` | Stage new and modified files (`.` for everything) |
//! | `commit <message>` | Record staged files as a commit |
//! | `status` | Show staged, modified, new and deleted files |
//! | `log` | List commits, most recent first |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output; `ZIT_LOG` takes a `tracing`
//! filter directive for finer control:
//! ```bash
//! ZIT_LOG=zit=trace zit status
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod stage;
mod history;

pub use app::{Cli, Commands, run};
pub use output::{Output, OutputFormat};
