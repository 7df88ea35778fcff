//! Countdown timer background task
//!
//! The task is the only owner of the [`CountdownEngine`]. Start and stop
//! requests reach it over an mpsc channel; a one-second interval drives
//! the ticks while a run is active.

use std::{
    future,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tokio::{
    sync::{broadcast, mpsc, oneshot, watch},
    time::{interval_at, Instant, Interval, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{
    engine::{CountdownEngine, RunSummary, TickSnapshot},
    error::{Result, TimerError},
    state::{EngineStatus, SessionRegistry},
};

/// Default interval between ticks; every tick counts as one second.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

const COMMAND_BUFFER: usize = 16;
const EVENT_BUFFER: usize = 128;

/// Requests accepted by the countdown task
#[derive(Debug)]
pub enum EngineCommand {
    Start {
        registry: SessionRegistry,
        reply: oneshot::Sender<Result<TickSnapshot>>,
    },
    Stop {
        reply: oneshot::Sender<Option<RunSummary>>,
    },
}

/// Everything observers can see happen during a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum EngineEvent {
    Started(TickSnapshot),
    Tick(TickSnapshot),
    PhaseStarted(TickSnapshot),
    PhaseEnded(TickSnapshot),
    Finished(RunSummary),
    Cancelled(RunSummary),
}

impl EngineEvent {
    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::Started(_) => "started",
            EngineEvent::Tick(_) => "tick",
            EngineEvent::PhaseStarted(_) => "phase_started",
            EngineEvent::PhaseEnded(_) => "phase_ended",
            EngineEvent::Finished(_) => "finished",
            EngineEvent::Cancelled(_) => "cancelled",
        }
    }
}

/// Cloneable sender side used to control the countdown task
#[derive(Debug, Clone)]
pub struct CountdownHandle {
    commands: mpsc::Sender<EngineCommand>,
}

impl CountdownHandle {
    /// Start a run over `registry`
    pub async fn start(&self, registry: SessionRegistry) -> Result<TickSnapshot> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(EngineCommand::Start { registry, reply })
            .await
            .map_err(|_| TimerError::EngineUnavailable)?;
        response.await.map_err(|_| TimerError::EngineUnavailable)?
    }

    /// Cancel the active run; `Ok(None)` when nothing was running
    pub async fn stop(&self) -> Result<Option<RunSummary>> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(EngineCommand::Stop { reply })
            .await
            .map_err(|_| TimerError::EngineUnavailable)?;
        response.await.map_err(|_| TimerError::EngineUnavailable)
    }
}

/// Channels connecting the rest of the application to a spawned task
#[derive(Debug)]
pub struct CountdownChannels {
    pub handle: CountdownHandle,
    pub status_rx: watch::Receiver<EngineStatus>,
    pub events_tx: broadcast::Sender<EngineEvent>,
}

/// Spawn the countdown task on the current tokio runtime
pub fn spawn_countdown(engine: CountdownEngine, tick_period: Duration) -> CountdownChannels {
    let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
    let (status_tx, status_rx) = watch::channel(EngineStatus::idle());
    let (events_tx, _) = broadcast::channel(EVENT_BUFFER);

    tokio::spawn(countdown_timer_task(
        engine,
        commands_rx,
        status_tx,
        events_tx.clone(),
        tick_period,
    ));

    CountdownChannels {
        handle: CountdownHandle {
            commands: commands_tx,
        },
        status_rx,
        events_tx,
    }
}

fn publish(events_tx: &broadcast::Sender<EngineEvent>, event: EngineEvent) {
    // No subscribers is the normal case when nobody is watching.
    if events_tx.send(event).is_err() {
        debug!("No event subscribers");
    }
}

/// Forward engine callbacks onto the event stream
fn attach_event_listeners(
    engine: &mut CountdownEngine,
    events_tx: &broadcast::Sender<EngineEvent>,
    last_summary: &Arc<Mutex<Option<RunSummary>>>,
) {
    let tx = events_tx.clone();
    engine.on_start(move |snapshot| publish(&tx, EngineEvent::Started(snapshot.clone())));

    let tx = events_tx.clone();
    engine.on_tick(move |snapshot| publish(&tx, EngineEvent::Tick(snapshot.clone())));

    let tx = events_tx.clone();
    engine.on_phase_start(move |snapshot| publish(&tx, EngineEvent::PhaseStarted(snapshot.clone())));

    let tx = events_tx.clone();
    engine.on_phase_end(move |snapshot| publish(&tx, EngineEvent::PhaseEnded(snapshot.clone())));

    let tx = events_tx.clone();
    let slot = Arc::clone(last_summary);
    engine.on_finish(move |summary| {
        *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(summary.clone());
        publish(&tx, EngineEvent::Finished(summary.clone()));
    });

    let tx = events_tx.clone();
    let slot = Arc::clone(last_summary);
    engine.on_cancel(move |summary| {
        *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(summary.clone());
        publish(&tx, EngineEvent::Cancelled(summary.clone()));
    });
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => future::pending::<()>().await,
    }
}

/// Background task that owns the engine and serializes every mutation
pub async fn countdown_timer_task(
    mut engine: CountdownEngine,
    mut commands: mpsc::Receiver<EngineCommand>,
    status_tx: watch::Sender<EngineStatus>,
    events_tx: broadcast::Sender<EngineEvent>,
    tick_period: Duration,
) {
    info!("Starting countdown timer task (tick every {:?})", tick_period);

    let last_summary = Arc::new(Mutex::new(None));
    attach_event_listeners(&mut engine, &events_tx, &last_summary);

    let update_status = |engine: &CountdownEngine| {
        let summary = last_summary
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        status_tx.send_replace(EngineStatus::from_engine(engine, summary));
    };

    let mut ticker: Option<Interval> = None;

    loop {
        tokio::select! {
            // Commands first: a stop queued next to a due tick must win.
            biased;

            command = commands.recv() => {
                let Some(command) = command else {
                    info!("Countdown command channel closed, stopping task");
                    break;
                };

                match command {
                    EngineCommand::Start { registry, reply } => {
                        let result = engine.start(&registry);
                        match &result {
                            Ok(_) => {
                                let mut interval = interval_at(Instant::now() + tick_period, tick_period);
                                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                                ticker = Some(interval);
                            }
                            Err(e) => warn!("Rejected start request: {}", e),
                        }
                        update_status(&engine);
                        if reply.send(result).is_err() {
                            warn!("Start requester went away before the reply");
                        }
                    }
                    EngineCommand::Stop { reply } => {
                        ticker = None;
                        let summary = engine.stop();
                        if summary.is_none() {
                            debug!("Stop requested while idle");
                        }
                        update_status(&engine);
                        if reply.send(summary).is_err() {
                            warn!("Stop requester went away before the reply");
                        }
                    }
                }
            }

            _ = next_tick(&mut ticker) => {
                if engine.tick().is_none() || !engine.is_running() {
                    ticker = None;
                }
                update_status(&engine);
            }
        }
    }

    if let Some(summary) = engine.stop() {
        debug!("Discarded active run on shutdown: {:?}", summary.outcome);
    }
}
