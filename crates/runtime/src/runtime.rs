//! High-level runtime orchestrator.
//!
//! The runtime loads content, owns the simulation worker and hands out
//! [`RuntimeHandle`]s for clients to drive it.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use realm_content::ContentFactory;
use realm_core::{AreaData, ContentSnapshot, GameConfig, PcgRng, Registry};

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::config::RuntimeConfig;
use crate::workers::{Simulation, SimulationWorker};

/// Main runtime that orchestrates the simulation
///
/// Runtime owns the worker task; [`RuntimeHandle`] is the cloneable façade.
pub struct Runtime {
    handle: RuntimeHandle,
    sim_worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Loads content and areas from `config.data_dir`, then starts the worker.
    ///
    /// Without a data directory the world starts empty and `config.game_config`
    /// applies.
    pub async fn start(config: RuntimeConfig) -> Result<Self> {
        let factory = config.data_dir.as_ref().map(ContentFactory::new);

        let (content, game_config, areas) = match &factory {
            Some(factory) => load(factory).map_err(RuntimeError::content)?,
            None => (ContentSnapshot::new(), config.game_config.clone(), Vec::new()),
        };

        let sim = Simulation {
            content,
            rng: PcgRng::new(config.seed),
            registry: Registry::new(),
            config: game_config,
            factory,
        };

        let (command_tx, command_rx) = mpsc::channel(config.command_buffer_size.max(1));
        let mut worker = SimulationWorker::new(sim, command_rx, config.tick_ms);
        worker.load_areas(&areas)?;
        let sim_worker_handle = tokio::spawn(worker.run());

        tracing::info!("Runtime started with {} areas", areas.len());

        Ok(Self {
            handle: RuntimeHandle::new(command_tx),
            sim_worker_handle,
        })
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Shutdown the runtime gracefully
    pub async fn shutdown(self) -> Result<()> {
        self.handle.shutdown().await?;
        self.sim_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;
        tracing::info!("Runtime stopped");
        Ok(())
    }
}

fn load(factory: &ContentFactory) -> anyhow::Result<(ContentSnapshot, GameConfig, Vec<AreaData>)> {
    let config = factory.load_config()?;
    let content = factory.load_content()?;
    let areas = factory.load_areas()?;
    Ok((content, config, areas))
}
