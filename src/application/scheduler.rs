use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use crate::common::ApplicationResult;
use crate::config::Config;
use crate::domains::logger::DynLogger;
use crate::domains::telemetry::{PublishReport, TelemetryPublisher, TelemetrySink};
use crate::domains::tracking::{
    assign_vectors, compute_vectors, SnapshotSource, TagId, TagRegistry, UpdateEngine, UpdateOutcome,
    UpdateReport,
};
use crate::domains::zone_lights::{ActuatorPort, LightsReport, ZoneLightController};

/// Collaborators the scheduler drives each cycle.
#[derive(Clone)]
pub struct Collaborators {
    pub source: Arc<dyn SnapshotSource>,
    pub actuator: Arc<dyn ActuatorPort>,
    pub sink: Arc<dyn TelemetrySink>,
}

/// Result of one fetch/update/vectors/lights/publish pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    /// `None` when the snapshot fetch failed.
    pub update: Option<UpdateReport>,
    pub lights: LightsReport,
    pub telemetry: PublishReport,
}

impl CycleReport {
    pub fn fetch_failed(&self) -> bool {
        self.update.is_none()
    }
}

/// Owns the tag registry and runs the fixed-cadence cycle.
pub struct Scheduler {
    registry: TagRegistry,
    engine: UpdateEngine,
    lights: ZoneLightController,
    publisher: TelemetryPublisher,
    collaborators: Collaborators,
    logger: DynLogger,
    cycle_interval: Duration,
}

impl Scheduler {
    pub fn new(
        engine: UpdateEngine,
        lights: ZoneLightController,
        publisher: TelemetryPublisher,
        collaborators: Collaborators,
        logger: DynLogger,
        cycle_interval: Duration,
    ) -> Self {
        Self {
            registry: TagRegistry::new(),
            engine,
            lights,
            publisher,
            collaborators,
            logger,
            cycle_interval,
        }
    }

    pub fn from_config(config: &Config, collaborators: Collaborators, logger: DynLogger) -> Self {
        for (i, area) in config.engine.bad_signal_areas.iter().enumerate() {
            logger.info(&format!("Bad-signal area {} configured with {} corners", i, area.len()));
        }
        Self::new(
            UpdateEngine::new(config.engine.fluctuation_threshold, config.engine.admit_new_tags),
            ZoneLightController::new(config.lights.zone_pins(), config.lights.sweep_delay()),
            TelemetryPublisher::new(config.scheduler.publish_delay()),
            collaborators,
            logger,
            config.scheduler.cycle_interval(),
        )
    }

    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TagRegistry {
        &mut self.registry
    }

    /// Light self-test followed by the initial snapshot. A failed fetch
    /// leaves the registry empty; tags are then admitted as they appear.
    pub async fn startup(&mut self) -> UpdateReport {
        self.lights
            .self_test(self.collaborators.actuator.as_ref(), self.logger.as_ref())
            .await;

        match self.collaborators.source.fetch_all().await {
            Ok(records) => {
                let (registry, report) = self.engine.initialize(&records);
                self.registry = registry;
                self.logger.info(&format!(
                    "Initialized {} tags ({} records rejected)",
                    report.created(),
                    report.rejected()
                ));
                report
            }
            Err(e) => {
                self.logger.error(&format!("Failed to initialize tags: {}", e));
                UpdateReport::default()
            }
        }
    }

    pub async fn run_cycle(&mut self) -> CycleReport {
        let update = match self.collaborators.source.fetch_all().await {
            Ok(records) => {
                let report = self.engine.apply_update(&mut self.registry, &records);
                for outcome in &report.outcomes {
                    if let UpdateOutcome::Rejected { reason } = outcome {
                        self.logger.warn(&format!("Skipped snapshot record: {}", reason));
                    }
                }
                Some(report)
            }
            Err(e) => {
                self.logger.error(&format!("Failed to update tags: {}", e));
                None
            }
        };

        let vectors = compute_vectors(&self.registry);
        assign_vectors(&mut self.registry, vectors);

        let commands = self.lights.compute_zone_states(&self.registry);
        let lights = self
            .lights
            .apply(&commands, self.collaborators.actuator.as_ref(), self.logger.as_ref())
            .await;

        let telemetry = self
            .publisher
            .publish(&self.registry, self.collaborators.sink.as_ref(), self.logger.as_ref())
            .await;

        CycleReport {
            update,
            lights,
            telemetry,
        }
    }

    /// Fetch one tag and merge it through the regular update path.
    pub async fn refresh_tag(&mut self, id: TagId) -> ApplicationResult<UpdateReport> {
        let record = self.collaborators.source.fetch_tag(id).await?;
        Ok(self
            .engine
            .apply_update(&mut self.registry, std::slice::from_ref(&record)))
    }

    /// Startup then the cycle loop. `shutdown` is already watched during
    /// startup, so the lights are left safe even if it resolves mid-sweep.
    pub async fn serve<F>(&mut self, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let interrupted = tokio::select! {
            _ = self.startup() => false,
            _ = &mut shutdown => true,
        };
        if interrupted {
            self.logger.warn("Shutdown requested during startup");
            self.shutdown().await;
            return 0;
        }
        self.run(shutdown).await
    }

    /// Cycle forever until `shutdown` resolves, then leave the lights safe.
    /// A panicking cycle is logged and the loop carries on with whatever
    /// state the cycle left behind.
    pub async fn run<F>(&mut self, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut cycles = 0u64;
        loop {
            let outcome = AssertUnwindSafe(self.run_cycle()).catch_unwind().await;
            cycles += 1;
            if outcome.is_err() {
                self.logger.error(&format!("Cycle {} aborted by an unexpected failure", cycles));
            }

            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(self.cycle_interval) => {}
            }
        }
        self.shutdown().await;
        cycles
    }

    pub async fn shutdown(&mut self) -> LightsReport {
        self.logger.info("Shutting down, driving all lights to safe state");
        self.lights
            .drive_safe_state(self.collaborators.actuator.as_ref(), self.logger.as_ref())
            .await
    }
}
