//! Simulation worker that owns the authoritative [`World`].
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle), ticks every
//! area on a wall-clock timer and answers queries with saved area records.

use std::future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, warn};

use realm_content::ContentFactory;
use realm_core::{
    Area, AreaData, Character, CharacterData, ContentSnapshot, Env, GameConfig, Identity, PcgRng,
    Registry, Target, sync,
};

use crate::api::{Result, RuntimeError};
use crate::world::World;

/// Commands that can be sent to the simulation worker
pub enum Command {
    /// Build an area tree, or reconcile the existing top-level area with that ID.
    AddArea {
        data: AreaData,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Spawn a character into an area.
    Spawn {
        area: String,
        character: CharacterData,
        reply: oneshot::Sender<Result<Identity>>,
    },
    /// Save one area (read-only).
    QueryArea {
        area: String,
        reply: oneshot::Sender<Result<AreaData>>,
    },
    AreaIds { reply: oneshot::Sender<Vec<String>> },
    /// Advance every area by `delta` milliseconds.
    Step {
        delta: i64,
        reply: oneshot::Sender<()>,
    },
    Shutdown { reply: oneshot::Sender<()> },
}

/// Collaborators the worker lends to every tick through [`Env`].
pub struct Simulation {
    pub content: ContentSnapshot,
    pub rng: PcgRng,
    pub registry: Registry,
    pub config: GameConfig,
    /// Resolves map assets for loaded areas; `None` leaves areas unmapped.
    pub factory: Option<ContentFactory>,
}

/// Background task that processes simulation commands and ticks the world.
pub struct SimulationWorker {
    world: World,
    sim: Simulation,
    command_rx: mpsc::Receiver<Command>,
    tick_ms: u64,
}

impl SimulationWorker {
    pub fn new(sim: Simulation, command_rx: mpsc::Receiver<Command>, tick_ms: u64) -> Self {
        tracing::info!(
            "SimulationWorker initialized: {} content definitions, tick {}ms",
            sim.content.len(),
            tick_ms
        );

        Self {
            world: World::new(),
            sim,
            command_rx,
            tick_ms,
        }
    }

    fn env(&self) -> Env<'_> {
        Env::new(
            &self.sim.content,
            &self.sim.rng,
            &self.sim.registry,
            &self.sim.config,
        )
    }

    /// Builds and adds the areas a runtime starts with.
    pub fn load_areas(&mut self, areas: &[AreaData]) -> Result<()> {
        for data in areas {
            self.add_area(data)?;
        }
        Ok(())
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        let mut ticker = (self.tick_ms > 0).then(|| {
            let mut ticker = time::interval(Duration::from_millis(self.tick_ms));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });
        let mut last = Instant::now();

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    let Some(cmd) = cmd else { break };
                    if !self.handle_command(cmd) {
                        break;
                    }
                }
                now = next_tick(&mut ticker) => {
                    let delta = now.saturating_duration_since(last).as_millis() as i64;
                    last = now;
                    if delta > 0 {
                        self.world.step(delta, &self.env());
                    }
                }
            }
        }

        debug!("SimulationWorker stopped");
    }

    /// Returns `false` once the loop should stop.
    fn handle_command(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::AddArea { data, reply } => {
                let result = self.add_area(&data);
                if reply.send(result).is_err() {
                    debug!("AddArea reply channel closed (caller dropped)");
                }
            }
            Command::Spawn {
                area,
                character,
                reply,
            } => {
                let result = self.spawn(&area, &character);
                if reply.send(result).is_err() {
                    debug!("Spawn reply channel closed (caller dropped)");
                }
            }
            Command::QueryArea { area, reply } => {
                let result = self
                    .world
                    .area(&area)
                    .map(|area| area.data())
                    .ok_or(RuntimeError::AreaNotFound(area));
                if reply.send(result).is_err() {
                    debug!("QueryArea reply channel closed (caller dropped)");
                }
            }
            Command::AreaIds { reply } => {
                if reply.send(self.world.area_ids()).is_err() {
                    debug!("AreaIds reply channel closed (caller dropped)");
                }
            }
            Command::Step { delta, reply } => {
                self.world.step(delta, &self.env());
                if reply.send(()).is_err() {
                    debug!("Step reply channel closed (caller dropped)");
                }
            }
            Command::Shutdown { reply } => {
                if reply.send(()).is_err() {
                    debug!("Shutdown reply channel closed (caller dropped)");
                }
                return false;
            }
        }
        true
    }

    fn add_area(&mut self, data: &AreaData) -> Result<()> {
        let existing = self.world.area(&data.id);
        let area = match existing {
            Some(area) => {
                area.apply(data, &self.env());
                area
            }
            None => Area::from_data(data, &self.env()),
        };
        self.attach_maps(&area)?;
        if self.world.area(&data.id).is_none() {
            self.world.add_area(area);
        }
        tracing::info!(area = %data.id, "area loaded");
        Ok(())
    }

    /// Loads the named map of an area and of every subarea below it.
    fn attach_maps(&self, area: &Arc<Area>) -> Result<()> {
        if let Some(name) = area.map_name() {
            match &self.sim.factory {
                Some(factory) => {
                    let map = factory.load_map(&name).map_err(RuntimeError::content)?;
                    area.set_map(Some(Arc::new(map)));
                }
                None => warn!(area = %area.id(), map = %name, "no data directory, map left unloaded"),
            }
        }
        for subarea in area.subareas() {
            self.attach_maps(&subarea)?;
        }
        Ok(())
    }

    fn spawn(&mut self, area_id: &str, data: &CharacterData) -> Result<Identity> {
        let area = self
            .world
            .area(area_id)
            .ok_or_else(|| RuntimeError::AreaNotFound(area_id.to_string()))?;
        let character = Character::spawn(data, &self.env());
        let identity = sync::read(&character).identity().clone();
        area.add_object(character);
        debug!(area = %area_id, character = %identity, "character spawned");
        Ok(identity)
    }
}

async fn next_tick(ticker: &mut Option<Interval>) -> Instant {
    match ticker {
        Some(ticker) => ticker.tick().await,
        None => future::pending().await,
    }
}
