//! Background loads for the GUI.
//!
//! Fetch and parse run on a tokio runtime; the results come back over a
//! channel and are attached to [`AppState`] by [`LoadTasks::poll`] on the
//! thread that owns the state.

use std::future::Future;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

use shared::{LoadedModel, PointCloud};
use tokio::runtime::Handle;

use crate::assets::AssetSource;
use crate::error::{LoadError, Result};
use crate::loaders::ModelLoader;
use crate::orchestrator::{attach_model, attach_point_cloud, bim_asset, ply_asset, LoadOrchestrator};
use crate::state::{AppState, LoadKind, PanelAction};

/// Result of a background load
pub enum LoadOutcome {
    Model(Result<LoadedModel>),
    PointCloud { name: String, result: Result<PointCloud> },
}

pub struct LoadTasks<S, L> {
    orchestrator: Arc<LoadOrchestrator<S, L>>,
    runtime: Handle,
    tx: Sender<LoadOutcome>,
    rx: Receiver<LoadOutcome>,
}

impl<S, L> LoadTasks<S, L>
where
    S: AssetSource + Send + Sync + 'static,
    L: ModelLoader + Send + Sync + 'static,
{
    pub fn new(orchestrator: LoadOrchestrator<S, L>, runtime: Handle) -> Self {
        let (tx, rx) = channel();
        Self {
            orchestrator: Arc::new(orchestrator),
            runtime,
            tx,
            rx,
        }
    }

    /// Start the load behind a panel action. Fails with `Busy` if one of the
    /// same kind is still running.
    pub fn start(&self, state: &mut AppState, action: PanelAction) -> Result<()> {
        let orchestrator = Arc::clone(&self.orchestrator);

        match action {
            PanelAction::LoadBim => {
                state.loads.begin(LoadKind::Bim)?;
                let asset = bim_asset(&state.settings.assets);
                tracing::info!("Loading BIM model {}", asset.path);
                let path = asset.path.clone();
                self.spawn_load(
                    path,
                    async move {
                        let name = asset.stem().to_string();
                        orchestrator.fetch_model(&asset, &name).await
                    },
                    LoadOutcome::Model,
                );
            }
            PanelAction::LoadPly => {
                state.loads.begin(LoadKind::PointCloud)?;
                let asset = ply_asset(&state.settings.assets);
                tracing::info!("Loading point cloud {}", asset.path);
                let name = asset.stem().to_string();
                let path = asset.path.clone();
                self.spawn_load(
                    path,
                    async move { orchestrator.fetch_point_cloud(&asset).await },
                    move |result| LoadOutcome::PointCloud { name, result },
                );
            }
        }
        Ok(())
    }

    /// Run `work` on the runtime. An outcome is sent even when `work` panics
    /// or is cancelled.
    fn spawn_load<T, W, F>(&self, path: String, work: W, outcome: F)
    where
        T: Send + 'static,
        W: Future<Output = Result<T>> + Send + 'static,
        F: FnOnce(Result<T>) -> LoadOutcome + Send + 'static,
    {
        let tx = self.tx.clone();
        let work = self.runtime.spawn(work);
        self.runtime.spawn(async move {
            let result = work.await.unwrap_or_else(|e| {
                let message = if e.is_panic() { "task panicked" } else { "task cancelled" };
                tracing::error!("Load of {path} aborted: {e}");
                Err(LoadError::Aborted {
                    path,
                    message: message.to_string(),
                })
            });
            let _ = tx.send(outcome(result));
        });
    }

    /// Attach every finished load. Returns true if the scene changed.
    pub fn poll(&self, state: &mut AppState) -> bool {
        let mut changed = false;
        while let Ok(outcome) = self.rx.try_recv() {
            match outcome {
                LoadOutcome::Model(result) => {
                    state.loads.finish(LoadKind::Bim);
                    match result {
                        Ok(model) => {
                            let name = model.name.clone();
                            attach_model(state, model);
                            state.set_status(format!("Loaded {name}"));
                            changed = true;
                        }
                        Err(e) => {
                            tracing::error!("BIM load failed: {e}");
                            state.set_error(format!("BIM load failed: {e}"));
                        }
                    }
                }
                LoadOutcome::PointCloud { name, result } => {
                    state.loads.finish(LoadKind::PointCloud);
                    match result {
                        Ok(cloud) => {
                            attach_point_cloud(state, cloud, &name);
                            state.set_status(format!("Loaded {name}"));
                            changed = true;
                        }
                        Err(e) => {
                            tracing::error!("Point cloud load failed: {e}");
                            state.set_error(format!("Point cloud load failed: {e}"));
                        }
                    }
                }
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::{Duration, Instant};

    use crate::assets::MemoryAssetSource;
    use crate::fixtures;
    use crate::loaders::BimLoader;
    use crate::state::panel::{SHOW_BIM, SHOW_PLY};

    /// Panics on the first fetch, then serves the Duplex assets
    struct FlakySource {
        panicked: AtomicBool,
        inner: MemoryAssetSource,
    }

    impl AssetSource for FlakySource {
        async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
            if !self.panicked.swap(true, Ordering::SeqCst) {
                panic!("connection reset while fetching {path}");
            }
            self.inner.fetch(path).await
        }
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap()
    }

    fn poll_until<S, L>(tasks: &LoadTasks<S, L>, state: &mut AppState)
    where
        S: AssetSource + Send + Sync + 'static,
        L: ModelLoader + Send + Sync + 'static,
    {
        let deadline = Instant::now() + Duration::from_secs(5);
        while state.loads.any() && Instant::now() < deadline {
            tasks.poll(state);
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_background_loads_attach_on_poll() {
        let runtime = runtime();
        let tasks = LoadTasks::new(
            LoadOrchestrator::new(fixtures::duplex_assets(), BimLoader),
            runtime.handle().clone(),
        );
        let mut state = AppState::default();

        tasks.start(&mut state, PanelAction::LoadBim).unwrap();
        tasks.start(&mut state, PanelAction::LoadPly).unwrap();
        assert!(matches!(
            tasks.start(&mut state, PanelAction::LoadBim),
            Err(LoadError::Busy(LoadKind::Bim))
        ));

        poll_until(&tasks, &mut state);
        assert!(!state.loads.any());
        assert!(state.panel.toggle_target(SHOW_BIM).is_some());
        assert!(state.panel.toggle_target(SHOW_PLY).is_some());
        assert!(!state.status.as_ref().unwrap().is_error);
    }

    #[test]
    fn test_failed_load_sets_error_status() {
        let runtime = runtime();
        let tasks = LoadTasks::new(
            LoadOrchestrator::new(MemoryAssetSource::new(), BimLoader),
            runtime.handle().clone(),
        );
        let mut state = AppState::default();
        let nodes = state.scene.len();

        tasks.start(&mut state, PanelAction::LoadBim).unwrap();
        poll_until(&tasks, &mut state);

        assert_eq!(state.scene.len(), nodes);
        assert!(state.status.as_ref().unwrap().is_error);
    }

    #[test]
    fn test_panicking_load_releases_slot() {
        let runtime = runtime();
        let source = FlakySource {
            panicked: AtomicBool::new(false),
            inner: fixtures::duplex_assets(),
        };
        let tasks = LoadTasks::new(LoadOrchestrator::new(source, BimLoader), runtime.handle().clone());
        let mut state = AppState::default();
        let nodes = state.scene.len();

        tasks.start(&mut state, PanelAction::LoadBim).unwrap();
        poll_until(&tasks, &mut state);

        assert!(!state.loads.is_loading(LoadKind::Bim));
        assert_eq!(state.scene.len(), nodes);
        let status = state.status.as_ref().unwrap();
        assert!(status.is_error);
        assert!(status.text.contains("aborted"));

        // The next attempt is not rejected as busy
        tasks.start(&mut state, PanelAction::LoadBim).unwrap();
        poll_until(&tasks, &mut state);
        assert!(state.panel.toggle_target(SHOW_BIM).is_some());
        assert!(!state.status.as_ref().unwrap().is_error);
    }
}
