//! Main application state management

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Instant,
};

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use super::{EngineStatus, Exercise, RoundTime, SessionRegistry};
use crate::{
    engine::{RunSummary, TickSnapshot},
    error::{Result, TimerError},
    tasks::{CountdownChannels, CountdownHandle, EngineEvent},
};

/// State shared by the HTTP handlers: the workout being set up plus the
/// channels to the countdown task
#[derive(Debug)]
pub struct AppState {
    /// Rounds edited during setup and handed to the engine on start
    pub registry: Arc<Mutex<SessionRegistry>>,
    /// Command side of the countdown task
    pub countdown: CountdownHandle,
    /// Latest engine status published by the countdown task
    pub status_rx: watch::Receiver<EngineStatus>,
    /// Event stream of the countdown task
    pub events_tx: broadcast::Sender<EngineEvent>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl AppState {
    /// Create an AppState around a spawned countdown task
    pub fn new(port: u16, host: String, registry: SessionRegistry, channels: CountdownChannels) -> Self {
        Self {
            registry: Arc::new(Mutex::new(registry)),
            countdown: channels.handle,
            status_rx: channels.status_rx,
            events_tx: channels.events_tx,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        }
    }

    fn record_action(&self, action: &str) {
        *lock(&self.last_action) = Some(action.to_string());
        *lock(&self.last_action_time) = Some(Utc::now());
    }

    /// Apply an edit to the registry, refusing while a run is active
    pub fn update_registry<T, F>(&self, action: &str, updater: F) -> Result<SessionRegistry>
    where
        F: FnOnce(&mut SessionRegistry) -> Result<T>,
    {
        let mut registry = lock(&self.registry);
        if self.status().is_running() {
            warn!("Rejected '{}': a workout is running", action);
            return Err(TimerError::RunInProgress);
        }

        if let Err(e) = updater(&mut registry) {
            warn!("Rejected '{}': {}", action, e);
            return Err(e);
        }
        let updated = registry.clone();
        drop(registry);

        self.record_action(action);
        Ok(updated)
    }

    pub fn add_round(&self, label: Exercise, time: Option<RoundTime>) -> Result<SessionRegistry> {
        info!("Adding {} round", label);
        self.update_registry("add-round", |registry| {
            registry.add_round_with_time(label, time.unwrap_or_default())
        })
    }

    pub fn remove_round(&self, index: usize) -> Result<SessionRegistry> {
        info!("Removing round {}", index);
        self.update_registry("remove-round", |registry| registry.remove_round(index))
    }

    pub fn set_label(&self, index: usize, label: Exercise) -> Result<SessionRegistry> {
        info!("Setting round {} label to {}", index, label);
        self.update_registry("set-label", |registry| registry.set_label(index, label).map(|_| ()))
    }

    pub fn set_time(&self, index: usize, minutes: u32, seconds: u32) -> Result<SessionRegistry> {
        info!("Setting round {} time to {}:{}", index, minutes, seconds);
        self.update_registry("set-time", |registry| {
            registry.set_time(index, minutes, seconds).map(|_| ())
        })
    }

    pub fn set_time_str(&self, index: usize, time: &str) -> Result<SessionRegistry> {
        info!("Setting round {} time to {}", index, time);
        self.update_registry("set-time", |registry| registry.set_time_str(index, time).map(|_| ()))
    }

    /// Copy of the current rounds
    pub fn get_registry(&self) -> SessionRegistry {
        lock(&self.registry).clone()
    }

    /// Hand the current rounds to the countdown task
    pub async fn start(&self) -> Result<TickSnapshot> {
        let registry = self.get_registry();
        let snapshot = self.countdown.start(registry).await?;
        self.record_action("start");
        Ok(snapshot)
    }

    /// Cancel the active run, if any
    pub async fn stop(&self) -> Result<Option<RunSummary>> {
        let summary = self.countdown.stop().await?;
        self.record_action("stop");
        Ok(summary)
    }

    /// Get current engine status
    pub fn status(&self) -> EngineStatus {
        self.status_rx.borrow().clone()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        (lock(&self.last_action).clone(), *lock(&self.last_action_time))
    }
}
