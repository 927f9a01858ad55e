//! # Operation Orchestrator
//!
//! This module owns the live hub state and runs the long operations against
//! it: installing editors and modules, uninstalling editors, and removing
//! modules.
//!
//! ## State ownership
//!
//! A single Tokio task (the hub actor) owns the `HubState`. Every mutation,
//! whether a user edit, a reconciliation result or an operation completing,
//! arrives as a message on one channel and is applied in order, then the
//! state is saved. `Hub` is the cloneable client for that channel.
//!
//! Slow work never runs on the actor. Filesystem scans run on the blocking
//! pool and only their results are sent back. External commands run on the
//! blocking pool inside a spawned task, which reports completion to the actor
//! as another message.
//!
//! ## Operations
//!
//! At most one operation runs per version:
//!
//! - Starting an install for a version that is already installing returns the
//!   existing `OperationHandle` instead of starting a second command.
//! - Any other request against a busy version fails with `Error::Busy`.
//!
//! An install marks the record `installing` (creating a placeholder record
//! when the version is not installed yet). On success the record gets its
//! real path; on failure, timeout or cancellation a placeholder is removed
//! and an existing record simply stops installing.
//!
//! Uninstalling removes the record immediately and deletes the directory in
//! the background. A crash before the deletion finishes leaves orphaned files
//! that no record points to; the next install of that version overwrites
//! them.
//!
//! ## Scans
//!
//! A scan reads the disk while operations keep running, so by the time its
//! result reaches the actor some versions may have changed underneath it.
//! The actor stamps every version it changes with a generation number; a scan
//! remembers the generation it started at and leaves alone every version
//! changed after that.
//!
//! ## Cancellation
//!
//! `Hub::cancel` stops tracking an install: the placeholder goes away and the
//! handle resolves to `Cancelled`. The external installer process keeps
//! running if it already started; its result is ignored.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::AbortHandle;

use crate::command::{self, CommandLine, CommandRunner, SuccessCheck};
use crate::error::{Error, Result};
use crate::installation::{self, Installation};
use crate::module;
use crate::project::{self, Project};
use crate::reconcile::{self, ScanOutcome};
use crate::settings::HubSettings;
use crate::store::{HubState, Store};
use crate::version::EditorVersion;

const REQUEST_QUEUE_DEPTH: usize = 64;

pub type OperationId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Install,
    Uninstall,
    UninstallModule,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::Install => "install",
            OperationKind::Uninstall => "uninstall",
            OperationKind::UninstallModule => "module removal",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationStatus {
    Running,
    Succeeded,
    /// The command ran but did not report success, or could not be run.
    Failed { output: String },
    TimedOut,
    Cancelled,
}

impl OperationStatus {
    pub fn is_finished(&self) -> bool {
        !matches!(self, OperationStatus::Running)
    }
}

/// Observes one operation. Clones observe the same operation.
#[derive(Debug, Clone)]
pub struct OperationHandle {
    id: OperationId,
    version: EditorVersion,
    kind: OperationKind,
    status: watch::Receiver<OperationStatus>,
}

impl OperationHandle {
    pub fn id(&self) -> OperationId {
        self.id
    }

    pub fn version(&self) -> EditorVersion {
        self.version
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// The status right now.
    pub fn status(&self) -> OperationStatus {
        self.status.borrow().clone()
    }

    /// Waits until the operation finishes.
    ///
    /// Resolves to `Cancelled` if the hub shuts down first.
    pub async fn wait(&self) -> OperationStatus {
        let mut status = self.status.clone();
        let finished = status
            .wait_for(OperationStatus::is_finished)
            .await
            .map(|status| status.clone());
        match finished {
            Ok(status) => status,
            Err(_) => OperationStatus::Cancelled,
        }
    }
}

type Job = Box<dyn FnOnce(&mut HubState) + Send>;

/// What a scan needs to know before it starts.
struct ScanBasis {
    settings: HubSettings,
    generation: u64,
}

enum Request {
    Snapshot(oneshot::Sender<HubState>),
    Update(Job),
    BeginScan(oneshot::Sender<ScanBasis>),
    ApplyScan {
        outcome: ScanOutcome,
        generation: u64,
        reply: oneshot::Sender<Vec<Installation>>,
    },
    ApplyProjects {
        scanned: Vec<PathBuf>,
        surviving: Vec<PathBuf>,
        reply: oneshot::Sender<Vec<Project>>,
    },
    Install {
        version: EditorVersion,
        modules: Vec<String>,
        reply: oneshot::Sender<Result<OperationHandle>>,
    },
    Uninstall {
        version: EditorVersion,
        reply: oneshot::Sender<Result<OperationHandle>>,
    },
    UninstallModule {
        version: EditorVersion,
        module: String,
        reply: oneshot::Sender<Result<OperationHandle>>,
    },
    Cancel {
        version: EditorVersion,
        reply: oneshot::Sender<bool>,
    },
    Completed {
        id: OperationId,
        version: EditorVersion,
        status: OperationStatus,
    },
}

/// Client handle to the hub actor.
///
/// Dropping every clone stops the actor once in-flight completions drain.
#[derive(Clone)]
pub struct Hub {
    tx: mpsc::Sender<Request>,
    runner: Arc<dyn CommandRunner>,
}

impl Hub {
    /// Loads the state from `store` and starts the actor.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(store: Store, runner: Arc<dyn CommandRunner>) -> Self {
        let state = store.load();
        Self::with_state(store, state, runner)
    }

    /// Starts the actor with an already loaded state.
    pub fn with_state(store: Store, mut state: HubState, runner: Arc<dyn CommandRunner>) -> Self {
        clear_interrupted_installs(&mut state);

        let (tx, rx) = mpsc::channel(REQUEST_QUEUE_DEPTH);
        let actor = HubActor {
            state,
            store,
            runner: Arc::clone(&runner),
            in_flight: HashMap::new(),
            next_id: 1,
            generation: 0,
            changed_at: HashMap::new(),
            rx,
            self_tx: tx.downgrade(),
        };
        actor.persist();
        tokio::spawn(actor.run());

        Self { tx, runner }
    }

    async fn call<T>(&self, request: impl FnOnce(oneshot::Sender<T>) -> Request) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(request(reply))
            .await
            .map_err(|_| Error::HubClosed)?;
        response.await.map_err(|_| Error::HubClosed)
    }

    /// A copy of the current state.
    pub async fn snapshot(&self) -> Result<HubState> {
        self.call(Request::Snapshot).await
    }

    /// Applies `edit` on the actor, saves, and returns its result.
    pub async fn update<R, F>(&self, edit: F) -> Result<R>
    where
        F: FnOnce(&mut HubState) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (reply, response) = oneshot::channel();
        let job: Job = Box::new(move |state| {
            let _ = reply.send(edit(state));
        });
        self.tx
            .send(Request::Update(job))
            .await
            .map_err(|_| Error::HubClosed)?;
        response.await.map_err(|_| Error::HubClosed)
    }

    /// Rescans the install locations and merges the result into the state.
    pub async fn refresh_installations(&self) -> Result<Vec<Installation>> {
        let ScanBasis {
            settings,
            generation,
        } = self.call(Request::BeginScan).await?;
        let outcome = tokio::task::spawn_blocking(move || {
            reconcile::scan(&settings.install_location, &settings.custom_install_locations)
        })
        .await?;
        self.call(|reply| Request::ApplyScan {
            outcome,
            generation,
            reply,
        })
        .await
    }

    /// Re-validates every project path.
    pub async fn refresh_projects(&self) -> Result<Vec<Project>> {
        let previous = self.snapshot().await?.projects;
        let scanned: Vec<PathBuf> = previous.iter().map(|p| p.path.clone()).collect();
        let mut paths = scanned.clone();
        let surviving = tokio::task::spawn_blocking(move || {
            reconcile::reconcile_projects(&mut paths, &previous);
            paths
        })
        .await?;
        self.call(|reply| Request::ApplyProjects {
            scanned,
            surviving,
            reply,
        })
        .await
    }

    /// Refreshes installations and projects.
    pub async fn refresh(&self) -> Result<HubState> {
        self.refresh_installations().await?;
        self.refresh_projects().await?;
        self.snapshot().await
    }

    /// Installs `version` with the given modules, or adds the modules when the
    /// version is already installed.
    pub async fn install(
        &self,
        version: EditorVersion,
        modules: Vec<String>,
    ) -> Result<OperationHandle> {
        self.call(|reply| Request::Install {
            version,
            modules,
            reply,
        })
        .await?
    }

    /// Removes the record for `version` and deletes its directory.
    pub async fn uninstall(&self, version: EditorVersion) -> Result<OperationHandle> {
        self.call(|reply| Request::Uninstall { version, reply })
            .await?
    }

    /// Deselects `module` in the installation's `modules.json` and deletes its
    /// payload.
    pub async fn uninstall_module(
        &self,
        version: EditorVersion,
        module: impl Into<String>,
    ) -> Result<OperationHandle> {
        let module = module.into();
        self.call(|reply| Request::UninstallModule {
            version,
            module,
            reply,
        })
        .await?
    }

    /// Stops tracking an in-flight install. Returns false when no install for
    /// `version` is running.
    pub async fn cancel(&self, version: EditorVersion) -> Result<bool> {
        self.call(|reply| Request::Cancel { version, reply }).await
    }

    pub async fn add_custom_install_location(
        &self,
        path: impl Into<PathBuf>,
    ) -> Result<Vec<Installation>> {
        let path = path.into();
        self.update(move |state| state.settings.add_custom_install_location(path))
            .await?;
        self.refresh_installations().await
    }

    pub async fn remove_custom_install_location(
        &self,
        path: impl Into<PathBuf>,
    ) -> Result<Vec<Installation>> {
        let path = path.into();
        self.update(move |state| state.settings.remove_custom_install_location(&path))
            .await?;
        self.refresh_installations().await
    }

    pub async fn set_default_version(&self, version: EditorVersion) -> Result<()> {
        if version.is_null() {
            return Err(Error::InvalidVersion {
                input: version.to_string(),
            });
        }
        self.update(move |state| state.default_version = version).await
    }

    /// Adds the project at `path`, reading its metadata from disk. Adding a
    /// known project returns the stored record.
    pub async fn add_project(&self, path: impl Into<PathBuf>) -> Result<Project> {
        let path = path.into();
        let project = tokio::task::spawn_blocking(move || -> Result<Project> {
            if !path.is_dir() {
                return Err(Error::InvalidProject {
                    path: path.display().to_string(),
                    message: "directory does not exist".to_string(),
                });
            }
            if !project::is_project_dir(&path) {
                return Err(Error::InvalidProject {
                    path: path.display().to_string(),
                    message: format!(
                        "missing {} or {}",
                        project::ASSETS_DIR,
                        project::PROJECT_SETTINGS_DIR
                    ),
                });
            }
            Ok(Project::read_from(path))
        })
        .await??;

        self.update(move |state| {
            if let Some(existing) = state.project(&project.path) {
                return existing.clone();
            }
            state.projects.push(project.clone());
            state.projects.sort_by(|a, b| a.name.cmp(&b.name));
            project
        })
        .await
    }

    pub async fn remove_project(&self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        let removed = self
            .update({
                let path = path.clone();
                move |state| {
                    let before = state.projects.len();
                    state.projects.retain(|project| project.path != path);
                    state.projects.len() != before
                }
            })
            .await?;
        if removed {
            Ok(())
        } else {
            Err(Error::ProjectNotFound {
                path: path.display().to_string(),
            })
        }
    }

    /// Applies `edit` to the stored project record and returns the result.
    pub async fn edit_project<F>(&self, path: impl Into<PathBuf>, edit: F) -> Result<Project>
    where
        F: FnOnce(&mut Project) + Send + 'static,
    {
        let path = path.into();
        let edited = self
            .update({
                let path = path.clone();
                move |state| {
                    let project = state.project_mut(&path)?;
                    edit(project);
                    Some(project.clone())
                }
            })
            .await?;
        edited.ok_or_else(|| Error::ProjectNotFound {
            path: path.display().to_string(),
        })
    }

    /// Launches the editor for the project at `path` without waiting for it.
    pub async fn open_project(&self, path: impl Into<PathBuf>) -> Result<CommandLine> {
        let path = path.into();
        let state = self.snapshot().await?;
        let project = state.project(&path).ok_or_else(|| Error::ProjectNotFound {
            path: path.display().to_string(),
        })?;
        let command = project
            .launch_command(&state.versions)
            .ok_or_else(|| Error::MissingInstallation {
                project: path.display().to_string(),
                version: project.version.to_string(),
            })?;

        let runner = Arc::clone(&self.runner);
        let launch = command.clone();
        tokio::task::spawn_blocking(move || runner.spawn_detached(&launch)).await??;
        info!("Opened {} with {}", path.display(), project.version);
        Ok(command)
    }
}

/// Records left `installing` by an earlier process have no operation behind
/// them anymore.
fn clear_interrupted_installs(state: &mut HubState) {
    state.versions.retain(|install| {
        if install.is_placeholder() {
            warn!("Dropping interrupted install of {}", install.version);
            return false;
        }
        true
    });
    for install in state.versions.iter_mut().filter(|install| install.installing) {
        warn!("Install of {} was interrupted", install.version);
        install.installing = false;
    }
}

struct InFlight {
    id: OperationId,
    kind: OperationKind,
    status: watch::Sender<OperationStatus>,
    created_placeholder: bool,
    task: AbortHandle,
}

impl InFlight {
    fn handle(&self, version: EditorVersion) -> OperationHandle {
        OperationHandle {
            id: self.id,
            version,
            kind: self.kind,
            status: self.status.subscribe(),
        }
    }
}

struct HubActor {
    state: HubState,
    store: Store,
    runner: Arc<dyn CommandRunner>,
    in_flight: HashMap<EditorVersion, InFlight>,
    next_id: OperationId,
    /// Bumped on every change to a version's record.
    generation: u64,
    changed_at: HashMap<EditorVersion, u64>,
    rx: mpsc::Receiver<Request>,
    self_tx: mpsc::WeakSender<Request>,
}

impl HubActor {
    async fn run(mut self) {
        while let Some(request) = self.rx.recv().await {
            self.handle(request);
        }
        debug!("Hub actor stopped");
    }

    fn handle(&mut self, request: Request) {
        match request {
            Request::Snapshot(reply) => {
                let _ = reply.send(self.state.clone());
            }
            Request::Update(job) => {
                job(&mut self.state);
                self.persist();
            }
            Request::BeginScan(reply) => {
                let _ = reply.send(ScanBasis {
                    settings: self.state.settings.clone(),
                    generation: self.generation,
                });
            }
            Request::ApplyScan {
                outcome,
                generation,
                reply,
            } => {
                let _ = reply.send(self.apply_scan(outcome, generation));
            }
            Request::ApplyProjects {
                scanned,
                surviving,
                reply,
            } => {
                let _ = reply.send(self.apply_projects(scanned, surviving));
            }
            Request::Install {
                version,
                modules,
                reply,
            } => {
                let _ = reply.send(self.begin_install(version, modules));
            }
            Request::Uninstall { version, reply } => {
                let _ = reply.send(self.begin_uninstall(version));
            }
            Request::UninstallModule {
                version,
                module,
                reply,
            } => {
                let _ = reply.send(self.begin_uninstall_module(version, &module));
            }
            Request::Cancel { version, reply } => {
                let _ = reply.send(self.cancel(version));
            }
            Request::Completed {
                id,
                version,
                status,
            } => self.complete(id, version, status),
        }
    }

    /// Saves synchronously so that a reply is only sent once the change is
    /// on disk. The state file is small; the actor blocks for one write and
    /// one rename.
    fn persist(&self) {
        if let Err(e) = self.store.save(&self.state) {
            warn!("Could not save hub state to {}: {}", self.store.path().display(), e);
        }
    }

    fn busy_with(&self, version: &EditorVersion) -> Option<OperationKind> {
        self.in_flight.get(version).map(|op| op.kind)
    }

    fn touch(&mut self, version: EditorVersion) {
        self.generation += 1;
        self.changed_at.insert(version, self.generation);
    }

    fn changed_since(&self, version: &EditorVersion, generation: u64) -> bool {
        self.changed_at
            .get(version)
            .is_some_and(|changed| *changed > generation)
    }

    fn apply_scan(&mut self, outcome: ScanOutcome, generation: u64) -> Vec<Installation> {
        let ScanOutcome {
            installations,
            missing_custom_roots,
        } = outcome;

        self.state
            .settings
            .custom_install_locations
            .retain(|root| !missing_custom_roots.contains(root));

        // A directory still being deleted must not come back.
        let scanned: Vec<Installation> = installations
            .into_iter()
            .filter(|install| self.busy_with(&install.version) != Some(OperationKind::Uninstall))
            .filter(|install| !self.changed_since(&install.version, generation))
            .collect();

        let mut merged = reconcile::merge(scanned, &self.state.versions);
        for install in merged.iter_mut() {
            if self.busy_with(&install.version) == Some(OperationKind::Install) {
                install.installing = true;
            }
        }

        // Versions changed while the scan ran keep their live record.
        merged.retain(|install| !self.changed_since(&install.version, generation));
        for install in &self.state.versions {
            if self.changed_since(&install.version, generation) {
                debug!("Keeping record for {}: changed during the scan", install.version);
                merged.push(install.clone());
            }
        }
        installation::sort_newest_first(&mut merged);

        self.state.versions = merged;
        self.persist();
        self.state.versions.clone()
    }

    fn apply_projects(&mut self, scanned: Vec<PathBuf>, surviving: Vec<PathBuf>) -> Vec<Project> {
        let scanned: HashSet<PathBuf> = scanned.into_iter().collect();
        let surviving: HashSet<PathBuf> = surviving.into_iter().collect();

        // Projects added after the scan started are kept as they are.
        self.state
            .projects
            .retain(|project| !scanned.contains(&project.path) || surviving.contains(&project.path));
        self.state.projects.sort_by(|a, b| a.name.cmp(&b.name));
        self.persist();
        self.state.projects.clone()
    }

    fn next_operation_id(&mut self) -> OperationId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn track(
        &mut self,
        version: EditorVersion,
        kind: OperationKind,
        created_placeholder: bool,
        work: impl std::future::Future<Output = OperationStatus> + Send + 'static,
    ) -> OperationHandle {
        let id = self.next_operation_id();
        let reporter = self.self_tx.clone();
        let task = tokio::spawn(async move {
            let status = work.await;
            report(reporter, id, version, status).await;
        });

        let (status, _) = watch::channel(OperationStatus::Running);
        let op = InFlight {
            id,
            kind,
            status,
            created_placeholder,
            task: task.abort_handle(),
        };
        let handle = op.handle(version);
        self.in_flight.insert(version, op);
        handle
    }

    fn begin_install(
        &mut self,
        version: EditorVersion,
        modules: Vec<String>,
    ) -> Result<OperationHandle> {
        if version.is_null() {
            return Err(Error::InvalidVersion {
                input: version.to_string(),
            });
        }
        if let Some(op) = self.in_flight.get(&version) {
            if op.kind == OperationKind::Install {
                debug!("Install of {} already running", version);
                return Ok(op.handle(version));
            }
            return Err(Error::Busy {
                version: version.to_string(),
                operation: op.kind.to_string(),
            });
        }

        let created_placeholder = match self.state.versions.iter_mut().find(|i| i.version == version) {
            Some(existing) => {
                existing.installing = true;
                false
            }
            None => {
                self.state.versions.push(Installation::placeholder(version));
                installation::sort_newest_first(&mut self.state.versions);
                true
            }
        };
        self.touch(version);
        self.persist();

        let command = command::install_command(&self.state.settings.command_base(), &version, &modules);
        info!("Installing {}: {}", version, command);
        let work = run_install(
            Arc::clone(&self.runner),
            command,
            self.state.settings.operation_timeout(),
        );
        Ok(self.track(version, OperationKind::Install, created_placeholder, work))
    }

    fn begin_uninstall(&mut self, version: EditorVersion) -> Result<OperationHandle> {
        if let Some(kind) = self.busy_with(&version) {
            return Err(Error::Busy {
                version: version.to_string(),
                operation: kind.to_string(),
            });
        }
        let index = self
            .state
            .versions
            .iter()
            .position(|install| install.version == version)
            .ok_or_else(|| Error::NotInstalled {
                version: version.to_string(),
            })?;

        let record = self.state.versions.remove(index);
        self.touch(version);
        self.persist();
        info!("Uninstalling {} from {}", version, record.path.display());

        Ok(self.track(version, OperationKind::Uninstall, false, remove_tree(record.path)))
    }

    fn begin_uninstall_module(
        &mut self,
        version: EditorVersion,
        module_id: &str,
    ) -> Result<OperationHandle> {
        if let Some(kind) = self.busy_with(&version) {
            return Err(Error::Busy {
                version: version.to_string(),
                operation: kind.to_string(),
            });
        }
        let record = self
            .state
            .versions
            .iter_mut()
            .find(|install| install.version == version)
            .ok_or_else(|| Error::NotInstalled {
                version: version.to_string(),
            })?;

        let mut modules = module::load_modules(&record.path);
        let payload = module::deselect(&mut modules, module_id).ok_or_else(|| Error::UnknownModule {
            version: version.to_string(),
            module: module_id.to_string(),
        })?;
        module::save_modules(&record.path, &modules)?;
        record.modules = modules;
        let payload_path = record.path.join(payload);
        self.touch(version);
        self.persist();
        info!("Removing module {} from {}", module_id, version);

        Ok(self.track(version, OperationKind::UninstallModule, false, remove_tree(payload_path)))
    }

    fn cancel(&mut self, version: EditorVersion) -> bool {
        if self.busy_with(&version) != Some(OperationKind::Install) {
            return false;
        }
        let Some(op) = self.in_flight.remove(&version) else {
            return false;
        };

        op.task.abort();
        self.discard_install(version, op.created_placeholder);
        self.touch(version);
        self.persist();
        op.status.send_replace(OperationStatus::Cancelled);
        info!("Stopped tracking install of {}", version);
        true
    }

    fn complete(&mut self, id: OperationId, version: EditorVersion, status: OperationStatus) {
        if self.in_flight.get(&version).map(|op| op.id) != Some(id) {
            debug!("Ignoring result of stale operation {} for {}", id, version);
            return;
        }
        let Some(op) = self.in_flight.remove(&version) else {
            return;
        };
        self.touch(version);

        if op.kind == OperationKind::Install {
            match &status {
                OperationStatus::Succeeded => self.mark_installed(version),
                other => {
                    warn!("Install of {} did not succeed: {:?}", version, other);
                    self.discard_install(version, op.created_placeholder);
                }
            }
            self.persist();
        } else if let OperationStatus::Failed { output } = &status {
            warn!("{} for {} failed: {}", op.kind, version, output);
        }

        info!("{} of {} finished: {:?}", op.kind, version, status);
        op.status.send_replace(status);
    }

    fn mark_installed(&mut self, version: EditorVersion) {
        let expected = self
            .state
            .settings
            .install_location
            .join(version.to_string());

        match self.state.versions.iter_mut().find(|i| i.version == version) {
            Some(record) => {
                record.installing = false;
                if record.path.as_os_str().is_empty() || !record.path.exists() {
                    record.path = expected;
                }
                if !reconcile::validate_editor(&record.path) {
                    warn!("Installed {} but {} does not validate yet", version, record.path.display());
                }
                record.reload_modules();
            }
            None => {
                self.state
                    .versions
                    .push(Installation::discovered(version, expected));
                installation::sort_newest_first(&mut self.state.versions);
            }
        }
    }

    fn discard_install(&mut self, version: EditorVersion, created_placeholder: bool) {
        if created_placeholder {
            self.state
                .versions
                .retain(|install| !(install.version == version && install.installing));
        } else if let Some(record) = self.state.versions.iter_mut().find(|i| i.version == version) {
            record.installing = false;
        }
    }
}

async fn report(
    reporter: mpsc::WeakSender<Request>,
    id: OperationId,
    version: EditorVersion,
    status: OperationStatus,
) {
    let Some(tx) = reporter.upgrade() else {
        debug!("Hub stopped before operation {} for {} finished", id, version);
        return;
    };
    if tx
        .send(Request::Completed {
            id,
            version,
            status,
        })
        .await
        .is_err()
    {
        debug!("Hub stopped before operation {} for {} reported", id, version);
    }
}

async fn run_install(
    runner: Arc<dyn CommandRunner>,
    command: CommandLine,
    timeout: Option<Duration>,
) -> OperationStatus {
    let job = tokio::task::spawn_blocking(move || runner.run(&command, &SuccessCheck::install()));
    let joined = match timeout {
        Some(limit) => match tokio::time::timeout(limit, job).await {
            Ok(joined) => joined,
            Err(_) => return OperationStatus::TimedOut,
        },
        None => job.await,
    };

    match joined {
        Ok(Ok(result)) if result.succeeded => OperationStatus::Succeeded,
        Ok(Ok(result)) => OperationStatus::Failed {
            output: result.raw_output,
        },
        Ok(Err(e)) => OperationStatus::Failed {
            output: e.to_string(),
        },
        Err(e) => OperationStatus::Failed {
            output: e.to_string(),
        },
    }
}

async fn remove_tree(path: PathBuf) -> OperationStatus {
    if path.as_os_str().is_empty() {
        return OperationStatus::Succeeded;
    }
    let result = tokio::task::spawn_blocking(move || delete_path(&path)).await;
    match result {
        Ok(Ok(())) => OperationStatus::Succeeded,
        Ok(Err(e)) => OperationStatus::Failed {
            output: e.to_string(),
        },
        Err(e) => OperationStatus::Failed {
            output: e.to_string(),
        },
    }
}

/// Recursively deletes `path`; a path that is already gone counts as deleted.
fn delete_path(path: &Path) -> io::Result<()> {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::ExternalCommandResult;
    use tempfile::TempDir;

    struct SucceedingRunner;

    impl CommandRunner for SucceedingRunner {
        fn run(&self, _command: &CommandLine, _check: &SuccessCheck) -> Result<ExternalCommandResult> {
            Ok(ExternalCommandResult {
                succeeded: true,
                raw_output: "successfully downloaded".to_string(),
            })
        }

        fn spawn_detached(&self, _command: &CommandLine) -> Result<()> {
            Ok(())
        }
    }

    fn write_editor(dir: &Path, version: &str) {
        let plist = installation::info_plist_path(dir);
        fs::create_dir_all(plist.parent().unwrap()).unwrap();
        fs::write(
            plist,
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0"><dict><key>CFBundleIdentifier</key><string>com.unity3d.UnityEditor5.x</string><key>CFBundleVersion</key><string>{version}</string></dict></plist>"#
            ),
        )
        .unwrap();
    }

    fn start_hub(temp: &TempDir, versions: Vec<Installation>) -> Hub {
        let mut state = HubState::default();
        state.settings.install_location = temp.path().join("Editors");
        state.versions = versions;
        let store = Store::new(temp.path().join("HubData.json"));
        Hub::with_state(store, state, Arc::new(SucceedingRunner))
    }

    async fn scan_now(hub: &Hub) -> (ScanOutcome, u64) {
        let basis = hub.call(Request::BeginScan).await.unwrap();
        let outcome = reconcile::scan(
            &basis.settings.install_location,
            &basis.settings.custom_install_locations,
        );
        (outcome, basis.generation)
    }

    async fn apply(hub: &Hub, outcome: ScanOutcome, generation: u64) -> Vec<Installation> {
        hub.call(|reply| Request::ApplyScan {
            outcome,
            generation,
            reply,
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_scan_finished_before_uninstall_does_not_restore_record() {
        let temp = TempDir::new().unwrap();
        let version = EditorVersion::parse("2021.3.5f1");
        let dir = temp.path().join("Editors").join("2021.3.5f1");
        write_editor(&dir, "2021.3.5f1");
        let hub = start_hub(&temp, vec![Installation::discovered(version, &dir)]);

        let (outcome, generation) = scan_now(&hub).await;
        assert_eq!(outcome.installations.len(), 1);

        let handle = hub.uninstall(version).await.unwrap();
        assert_eq!(handle.wait().await, OperationStatus::Succeeded);
        assert!(!dir.exists());

        let versions = apply(&hub, outcome, generation).await;
        assert!(versions.is_empty());
        assert!(hub.snapshot().await.unwrap().versions.is_empty());
    }

    #[tokio::test]
    async fn test_scan_finished_before_install_keeps_new_record() {
        let temp = TempDir::new().unwrap();
        let version = EditorVersion::parse("2022.3.0f1");
        let hub = start_hub(&temp, Vec::new());

        let (outcome, generation) = scan_now(&hub).await;
        assert!(outcome.installations.is_empty());

        let handle = hub.install(version, Vec::new()).await.unwrap();
        assert_eq!(handle.wait().await, OperationStatus::Succeeded);

        let versions = apply(&hub, outcome, generation).await;
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].version, version);
        assert!(!versions[0].installing);
        assert_eq!(versions[0].path, temp.path().join("Editors").join("2022.3.0f1"));
    }

    #[tokio::test]
    async fn test_current_scan_still_applies() {
        let temp = TempDir::new().unwrap();
        let hub = start_hub(&temp, Vec::new());
        let handle = hub
            .install(EditorVersion::parse("2022.3.0f1"), Vec::new())
            .await
            .unwrap();
        handle.wait().await;

        // Taken after the install finished, so it owns the result.
        write_editor(&temp.path().join("Editors").join("2021.3.5f1"), "2021.3.5f1");
        let (outcome, generation) = scan_now(&hub).await;
        let versions = apply(&hub, outcome, generation).await;
        let names: Vec<String> = versions.iter().map(|i| i.version.to_string()).collect();
        assert_eq!(names, vec!["2021.3.5f1"]);
    }

    #[tokio::test]
    async fn test_update_is_saved_before_reply() {
        let temp = TempDir::new().unwrap();
        let hub = start_hub(&temp, Vec::new());
        let version = EditorVersion::parse("2021.3.5f1");
        hub.update(move |state| state.default_version = version)
            .await
            .unwrap();

        let saved = Store::new(temp.path().join("HubData.json")).load();
        assert_eq!(saved.default_version, version);
    }

    #[test]
    fn test_operation_status_finished() {
        assert!(!OperationStatus::Running.is_finished());
        assert!(OperationStatus::Succeeded.is_finished());
        assert!(OperationStatus::TimedOut.is_finished());
        assert!(OperationStatus::Failed {
            output: String::new()
        }
        .is_finished());
    }

    #[test]
    fn test_clear_interrupted_installs() {
        let mut state = HubState::default();
        state
            .versions
            .push(Installation::placeholder(EditorVersion::parse("2022.3.0f1")));
        let mut existing = Installation::placeholder(EditorVersion::parse("2021.3.5f1"));
        existing.path = PathBuf::from("/Editors/2021.3.5f1");
        state.versions.push(existing);

        clear_interrupted_installs(&mut state);
        assert_eq!(state.versions.len(), 1);
        assert!(!state.versions[0].installing);
    }

    #[test]
    fn test_delete_path_missing_is_ok() {
        let temp = tempfile::TempDir::new().unwrap();
        assert!(delete_path(&temp.path().join("nothing-here")).is_ok());
        let file = temp.path().join("file");
        fs::write(&file, "x").unwrap();
        delete_path(&file).unwrap();
        assert!(!file.exists());
    }
}
