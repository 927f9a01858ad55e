//! # Editor Hub Library
//!
//! This library keeps track of installed Unity editor versions and the
//! projects that use them. It powers the `editor-hub` command-line tool but
//! can be embedded in any application that needs the same bookkeeping.
//!
//! ## Quick Example
//!
//! ```
//! use editor_hub::version::EditorVersion;
//!
//! let lts = EditorVersion::parse("2021.3.5f1");
//! let beta = EditorVersion::parse("2022.2.0b3");
//!
//! assert!(lts.is_lts());
//! assert!(beta.is_beta());
//! assert!(beta > lts);
//! assert!(EditorVersion::parse("not a version").is_null());
//! ```
//!
//! ## Core Concepts
//!
//! - **Versions (`version`)**: Parsing, ordering and classifying editor
//!   version strings such as `2021.3.5f1`.
//! - **Records (`installation`, `module`, `project`)**: What the hub knows
//!   about each installed editor, its optional modules, and each project.
//! - **Persistence (`settings`, `store`)**: The single JSON state file and the
//!   configuration stored inside it.
//! - **Reconciliation (`reconcile`)**: Rebuilding the installation and
//!   project lists from what is actually on disk.
//! - **Operations (`command`, `orchestrator`)**: Running the hub's headless
//!   installer and other long operations in the background while one task
//!   owns the state.
//!
//! ## Execution Flow
//!
//! `orchestrator::Hub::start` loads the state file and spawns the task that
//! owns it. A refresh scans the install locations off that task, then hands
//! the result back to be merged with records of installs still in progress.
//! Installs and uninstalls run as background operations whose completion is
//! applied to the state the same way.

pub mod command;
pub mod defaults;
pub mod error;
pub mod installation;
pub mod module;
pub mod orchestrator;
pub mod output;
pub mod project;
pub mod reconcile;
pub mod settings;
pub mod store;
pub mod version;

mod version_proptest;
