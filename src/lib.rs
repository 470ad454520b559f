//! Reader for legacy MPP project files.
//!
//! Four container generations of the format are recognised; the three
//! property-store generations are decoded into a plain [`model`] of tasks,
//! resources, assignments, calendars and dependencies, while the oldest is
//! detected and refused. The caller opens the compound document and hands
//! the crate a [`Container`]; everything inside the container is this
//! crate's problem.
//!
//! ```no_run
//! use mpp_reader::{read_project, MemoryContainer, ReadOptions};
//!
//! # fn open() -> MemoryContainer { MemoryContainer::new() }
//! // The container comes from whatever compound-document parser the
//! // application already uses.
//! let container = open();
//! let project = read_project(&container, &ReadOptions::default())?;
//! for task in &project.tasks {
//!     println!("{:?}: {:?}", task.id, task.name);
//! }
//! # Ok::<(), mpp_reader::MppError>(())
//! ```
//!
//! Damaged or unexpected streams never abort a read wholesale: each entity
//! category fails on its own and leaves a note on the [`ProjectFile`]'s
//! diagnostics list.

pub mod container;
mod decode;
pub mod error;
pub mod model;
pub mod reader;
mod resolve;

pub use container::{Container, MemoryContainer};
pub use error::{MppError, Result};
pub use model::ProjectFile;
pub use reader::{read_project, ReadOptions};
