//! Countdown engine implementation.
//!
//! The engine is a tick-driven state machine with no internal timer: the
//! owner calls [`CountdownEngine::tick`] once per logical second.
//!
//! ```text
//! Idle -> RunningExercise <-> RunningBreak -> (Finished | Cancelled) -> Idle
//! ```
//!
//! A tick decrements the remaining time if it is above zero and, once it
//! reads zero, performs the phase transition within the same tick.

use tracing::{debug, info};

use super::{
    resolver::{LabelResolver, RandomResolver},
    snapshot::{EngineState, Phase, RunOutcome, RunSummary, TickSnapshot, BREAK_LABEL},
};
use crate::{
    error::{Result, TimerError},
    state::{Exercise, Round, SessionRegistry},
};

/// Rest period inserted after every round, in seconds.
pub const BREAK_DURATION_SECS: u32 = 20;

type SnapshotListener = Box<dyn FnMut(&TickSnapshot) + Send>;
type SummaryListener = Box<dyn FnMut(&RunSummary) + Send>;

#[derive(Default)]
struct Listeners {
    start: Vec<SnapshotListener>,
    tick: Vec<SnapshotListener>,
    finish: Vec<SummaryListener>,
    cancel: Vec<SummaryListener>,
    phase_start: Vec<SnapshotListener>,
    phase_end: Vec<SnapshotListener>,
}

fn emit_snapshot(listeners: &mut [SnapshotListener], snapshot: &TickSnapshot) {
    for listener in listeners.iter_mut() {
        listener(snapshot);
    }
}

fn emit_summary(listeners: &mut [SummaryListener], summary: &RunSummary) {
    for listener in listeners.iter_mut() {
        listener(summary);
    }
}

/// State of one active run. Dropped as soon as the run ends.
#[derive(Debug)]
struct RunState {
    /// Copy of the registry taken at start.
    rounds: Vec<Round>,
    round_index: usize,
    phase: Phase,
    remaining_seconds: u32,
    resolved_label: Exercise,
    resolved_labels: Vec<Exercise>,
    ticks: u64,
}

impl RunState {
    fn completed_count(&self) -> usize {
        match self.phase {
            Phase::Exercise => self.round_index,
            Phase::Break => self.round_index + 1,
        }
    }

    fn is_last_round(&self) -> bool {
        self.round_index + 1 >= self.rounds.len()
    }

    fn snapshot(&self) -> TickSnapshot {
        let (display_label, description) = match self.phase {
            Phase::Exercise => (
                self.resolved_label.to_string(),
                self.resolved_label.description().to_string(),
            ),
            Phase::Break => (BREAK_LABEL.to_string(), String::new()),
        };
        TickSnapshot {
            phase: self.phase,
            resolved_label: self.resolved_label,
            display_label,
            description,
            remaining_seconds: self.remaining_seconds,
            round_index: self.round_index,
            completed_count: self.completed_count(),
            total_rounds: self.rounds.len(),
        }
    }

    fn summary(&self, outcome: RunOutcome) -> RunSummary {
        RunSummary {
            outcome,
            total_rounds: self.rounds.len(),
            completed_rounds: self.completed_count(),
            resolved_labels: self.resolved_labels.clone(),
            ticks: self.ticks,
        }
    }
}

/// What a tick at the zero boundary leads to.
enum Boundary {
    EnterBreak,
    NextRound,
    Finish,
}

/// The single countdown state machine.
pub struct CountdownEngine {
    run: Option<RunState>,
    break_seconds: u32,
    resolver: Box<dyn LabelResolver>,
    listeners: Listeners,
    last_outcome: Option<RunOutcome>,
}

impl CountdownEngine {
    /// Create an idle engine with the standard break and a random resolver
    pub fn new() -> Self {
        Self {
            run: None,
            break_seconds: BREAK_DURATION_SECS,
            resolver: Box::new(RandomResolver::new()),
            listeners: Listeners::default(),
            last_outcome: None,
        }
    }

    pub fn with_break_seconds(mut self, break_seconds: u32) -> Self {
        self.break_seconds = break_seconds;
        self
    }

    pub fn with_resolver(mut self, resolver: impl LabelResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    // ── Listeners ────────────────────────────────────────────────────

    /// Called once when a run begins, ahead of its first phase start.
    pub fn on_start(&mut self, listener: impl FnMut(&TickSnapshot) + Send + 'static) {
        self.listeners.start.push(Box::new(listener));
    }

    /// Called after every processed tick with the resulting state.
    pub fn on_tick(&mut self, listener: impl FnMut(&TickSnapshot) + Send + 'static) {
        self.listeners.tick.push(Box::new(listener));
    }

    /// Called once when the last break of a run elapses.
    pub fn on_finish(&mut self, listener: impl FnMut(&RunSummary) + Send + 'static) {
        self.listeners.finish.push(Box::new(listener));
    }

    /// Called once when an active run is stopped.
    pub fn on_cancel(&mut self, listener: impl FnMut(&RunSummary) + Send + 'static) {
        self.listeners.cancel.push(Box::new(listener));
    }

    /// Called whenever an exercise or break phase begins.
    pub fn on_phase_start(&mut self, listener: impl FnMut(&TickSnapshot) + Send + 'static) {
        self.listeners.phase_start.push(Box::new(listener));
    }

    /// Called whenever an exercise or break phase runs out.
    pub fn on_phase_end(&mut self, listener: impl FnMut(&TickSnapshot) + Send + 'static) {
        self.listeners.phase_end.push(Box::new(listener));
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> EngineState {
        match self.run.as_ref().map(|run| run.phase) {
            None => EngineState::Idle,
            Some(Phase::Exercise) => EngineState::RunningExercise,
            Some(Phase::Break) => EngineState::RunningBreak,
        }
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Current run state, or `None` while idle
    pub fn snapshot(&self) -> Option<TickSnapshot> {
        self.run.as_ref().map(RunState::snapshot)
    }

    /// How the most recent run ended
    pub fn last_outcome(&self) -> Option<RunOutcome> {
        self.last_outcome
    }

    pub fn break_seconds(&self) -> u32 {
        self.break_seconds
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a run over a copy of `registry`'s rounds.
    ///
    /// Fails with `EmptyRegistry` when there is nothing to run and with
    /// `AlreadyRunning` when a run is active; the engine is left as it was.
    pub fn start(&mut self, registry: &SessionRegistry) -> Result<TickSnapshot> {
        if self.run.is_some() {
            return Err(TimerError::AlreadyRunning);
        }
        let rounds = registry.rounds().to_vec();
        let first = rounds.first().ok_or(TimerError::EmptyRegistry)?;

        let resolved_label = self.resolver.resolve(first.label());
        let run = RunState {
            remaining_seconds: first.duration_seconds(),
            rounds,
            round_index: 0,
            phase: Phase::Exercise,
            resolved_label,
            resolved_labels: vec![resolved_label],
            ticks: 0,
        };
        let snapshot = run.snapshot();
        self.run = Some(run);

        info!(
            "Workout started: {} rounds, round 1 is {} for {}s",
            snapshot.total_rounds, resolved_label, snapshot.remaining_seconds
        );
        emit_snapshot(&mut self.listeners.start, &snapshot);
        emit_snapshot(&mut self.listeners.phase_start, &snapshot);
        Ok(snapshot)
    }

    /// Advance the run by one second.
    ///
    /// Returns the state after the tick, or `None` when idle. The tick that
    /// ends the last break returns its final state and leaves the engine idle.
    pub fn tick(&mut self) -> Option<TickSnapshot> {
        let run = self.run.as_mut()?;
        run.ticks += 1;
        if run.remaining_seconds > 0 {
            run.remaining_seconds -= 1;
        }

        if run.remaining_seconds > 0 {
            let snapshot = run.snapshot();
            debug!(
                "Tick: round {} {:?} {}s left",
                snapshot.round_index + 1,
                snapshot.phase,
                snapshot.remaining_seconds
            );
            emit_snapshot(&mut self.listeners.tick, &snapshot);
            return Some(snapshot);
        }

        let ended = run.snapshot();
        emit_snapshot(&mut self.listeners.phase_end, &ended);

        let boundary = match run.phase {
            Phase::Exercise => Boundary::EnterBreak,
            Phase::Break if run.is_last_round() => Boundary::Finish,
            Phase::Break => Boundary::NextRound,
        };

        match boundary {
            Boundary::EnterBreak => {
                run.phase = Phase::Break;
                run.remaining_seconds = self.break_seconds;
                info!(
                    "Round {} complete, resting for {}s",
                    run.round_index + 1,
                    run.remaining_seconds
                );
            }
            Boundary::NextRound => {
                run.round_index += 1;
                run.phase = Phase::Exercise;
                let round = &run.rounds[run.round_index];
                run.resolved_label = self.resolver.resolve(round.label());
                run.remaining_seconds = round.duration_seconds();
                run.resolved_labels.push(run.resolved_label);
                info!(
                    "Round {} of {}: {} for {}s",
                    run.round_index + 1,
                    run.rounds.len(),
                    run.resolved_label,
                    run.remaining_seconds
                );
            }
            Boundary::Finish => {
                let summary = run.summary(RunOutcome::Finished);
                self.run = None;
                self.last_outcome = Some(RunOutcome::Finished);
                info!(
                    "Workout finished: {} rounds in {} ticks",
                    summary.completed_rounds, summary.ticks
                );
                emit_snapshot(&mut self.listeners.tick, &ended);
                emit_summary(&mut self.listeners.finish, &summary);
                return Some(ended);
            }
        }

        let started = run.snapshot();
        emit_snapshot(&mut self.listeners.phase_start, &started);
        emit_snapshot(&mut self.listeners.tick, &started);
        Some(started)
    }

    /// Cancel the active run. A no-op returning `None` while idle.
    pub fn stop(&mut self) -> Option<RunSummary> {
        let run = self.run.take()?;
        let summary = run.summary(RunOutcome::Cancelled);
        self.last_outcome = Some(RunOutcome::Cancelled);
        info!(
            "Workout cancelled during round {} after {} ticks",
            run.round_index + 1,
            run.ticks
        );
        emit_summary(&mut self.listeners.cancel, &summary);
        Some(summary)
    }
}

impl Default for CountdownEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CountdownEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountdownEngine")
            .field("state", &self.state())
            .field("snapshot", &self.snapshot())
            .field("break_seconds", &self.break_seconds)
            .field("last_outcome", &self.last_outcome)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };

    use super::*;
    use crate::{engine::resolver::FixedResolver, state::RoundTime};

    fn registry(rounds: &[(Exercise, &str)]) -> SessionRegistry {
        let mut registry = SessionRegistry::new();
        for (label, time) in rounds {
            registry
                .add_round_with_time(*label, time.parse::<RoundTime>().unwrap())
                .unwrap();
        }
        registry
    }

    fn counter() -> Arc<AtomicUsize> {
        Arc::new(AtomicUsize::new(0))
    }

    fn tick_n(engine: &mut CountdownEngine, n: usize) -> Option<TickSnapshot> {
        let mut last = None;
        for _ in 0..n {
            last = engine.tick();
        }
        last
    }

    #[test]
    fn plank_then_squats_scenario() {
        let mut engine = CountdownEngine::new();
        let finished = counter();
        let hits = Arc::clone(&finished);
        engine.on_finish(move |_| {
            hits.fetch_add(1, Ordering::SeqCst);
        });

        let regs = registry(&[(Exercise::Plank, "00:03"), (Exercise::Squats, "00:02")]);
        let start = engine.start(&regs).unwrap();
        assert_eq!(start.phase, Phase::Exercise);
        assert_eq!(start.remaining_seconds, 3);
        assert_eq!(start.display_label, "Plank");
        assert_eq!(start.description, Exercise::Plank.description());

        let snap = tick_n(&mut engine, 2).unwrap();
        assert_eq!((snap.phase, snap.remaining_seconds), (Phase::Exercise, 1));

        let snap = engine.tick().unwrap();
        assert_eq!(snap.phase, Phase::Break);
        assert_eq!(snap.remaining_seconds, 20);
        assert_eq!(snap.display_label, BREAK_LABEL);
        assert_eq!(snap.description, "");
        assert_eq!(snap.completed_count, 1);

        let snap = tick_n(&mut engine, 20).unwrap();
        assert_eq!(snap.phase, Phase::Exercise);
        assert_eq!(snap.round_index, 1);
        assert_eq!(snap.remaining_seconds, 2);
        assert_eq!(snap.resolved_label, Exercise::Squats);
        assert_eq!(snap.description, Exercise::Squats.description());
        assert_eq!(snap.completed_count, 1);

        let snap = tick_n(&mut engine, 2).unwrap();
        assert_eq!((snap.phase, snap.remaining_seconds), (Phase::Break, 20));
        assert_eq!(snap.completed_count, 2);

        let snap = tick_n(&mut engine, 19).unwrap();
        assert_eq!(snap.remaining_seconds, 1);
        assert_eq!(finished.load(Ordering::SeqCst), 0);

        let last = engine.tick().unwrap();
        assert_eq!(last.completed_count, 2);
        assert_eq!(last.remaining_seconds, 0);
        assert_eq!(finished.load(Ordering::SeqCst), 1);
        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(engine.last_outcome(), Some(RunOutcome::Finished));

        assert!(engine.tick().is_none());
        assert_eq!(finished.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn start_on_empty_registry_stays_idle() {
        let mut engine = CountdownEngine::new();
        assert_eq!(
            engine.start(&SessionRegistry::new()),
            Err(TimerError::EmptyRegistry)
        );
        assert_eq!(engine.state(), EngineState::Idle);
        assert!(engine.snapshot().is_none());
    }

    #[test]
    fn start_while_running_is_rejected() {
        let mut engine = CountdownEngine::new();
        let regs = registry(&[(Exercise::Plank, "00:05")]);
        engine.start(&regs).unwrap();
        engine.tick();

        assert_eq!(engine.start(&regs), Err(TimerError::AlreadyRunning));
        assert_eq!(engine.snapshot().unwrap().remaining_seconds, 4);
    }

    #[test]
    fn stop_cancels_and_silences_listeners() {
        let mut engine = CountdownEngine::new();
        let ticks = counter();
        let finishes = counter();
        let cancels = Arc::new(Mutex::new(Vec::new()));

        let t = Arc::clone(&ticks);
        engine.on_tick(move |_| {
            t.fetch_add(1, Ordering::SeqCst);
        });
        let f = Arc::clone(&finishes);
        engine.on_finish(move |_| {
            f.fetch_add(1, Ordering::SeqCst);
        });
        let c = Arc::clone(&cancels);
        engine.on_cancel(move |summary| c.lock().unwrap().push(summary.clone()));

        engine.start(&registry(&[(Exercise::Lunges, "00:02")])).unwrap();
        engine.tick();
        let summary = engine.stop().unwrap();
        assert_eq!(summary.outcome, RunOutcome::Cancelled);
        assert_eq!(summary.completed_rounds, 0);
        assert_eq!(engine.state(), EngineState::Idle);

        tick_n(&mut engine, 50);
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
        assert_eq!(finishes.load(Ordering::SeqCst), 0);
        assert_eq!(cancels.lock().unwrap().len(), 1);
        assert_eq!(engine.last_outcome(), Some(RunOutcome::Cancelled));
    }

    #[test]
    fn stop_while_idle_is_a_no_op() {
        let mut engine = CountdownEngine::new();
        let cancels = counter();
        let c = Arc::clone(&cancels);
        engine.on_cancel(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        assert!(engine.stop().is_none());
        assert_eq!(cancels.load(Ordering::SeqCst), 0);
        assert_eq!(engine.last_outcome(), None);
    }

    #[test]
    fn random_label_resolved_once_per_round() {
        struct Counting {
            calls: Arc<AtomicUsize>,
            inner: RandomResolver,
        }
        impl LabelResolver for Counting {
            fn resolve(&mut self, label: Exercise) -> Exercise {
                self.calls.fetch_add(1, Ordering::SeqCst);
                self.inner.resolve(label)
            }
        }

        let calls = counter();
        let mut engine = CountdownEngine::new().with_resolver(Counting {
            calls: Arc::clone(&calls),
            inner: RandomResolver::seeded(11),
        });
        engine
            .start(&registry(&[(Exercise::Random, "00:10"), (Exercise::Random, "00:10")]))
            .unwrap();
        let first = engine.snapshot().unwrap().resolved_label;

        let within_round: Vec<_> = (0..9).filter_map(|_| engine.tick()).collect();
        assert!(within_round.iter().all(|s| s.resolved_label == first));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tick_n(&mut engine, 21);
        assert_eq!(engine.snapshot().unwrap().round_index, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_ne!(engine.snapshot().unwrap().resolved_label, Exercise::Random);
    }

    #[test]
    fn registry_edits_after_start_do_not_affect_run() {
        let mut engine = CountdownEngine::new().with_break_seconds(1);
        let mut regs = registry(&[(Exercise::Plank, "00:01"), (Exercise::Squats, "00:01")]);
        engine.start(&regs).unwrap();

        regs.set_time(1, 10, 0).unwrap();
        regs.set_label(1, Exercise::Burpees).unwrap();

        let snap = tick_n(&mut engine, 2).unwrap();
        assert_eq!(snap.resolved_label, Exercise::Squats);
        assert_eq!(snap.remaining_seconds, 1);
    }

    #[test]
    fn zero_length_phases_take_one_tick() {
        let mut engine = CountdownEngine::new().with_break_seconds(0);
        engine.start(&registry(&[(Exercise::Plank, "00:00")])).unwrap();

        let snap = engine.tick().unwrap();
        assert_eq!((snap.phase, snap.remaining_seconds), (Phase::Break, 0));
        assert!(engine.is_running());

        engine.tick();
        assert!(!engine.is_running());
        assert_eq!(engine.last_outcome(), Some(RunOutcome::Finished));
    }

    #[test]
    fn phase_hooks_bracket_every_phase() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut engine = CountdownEngine::new()
            .with_break_seconds(1)
            .with_resolver(FixedResolver(Exercise::Burpees));

        let starts = Arc::clone(&events);
        engine.on_phase_start(move |s| starts.lock().unwrap().push(("start", s.phase)));
        let ends = Arc::clone(&events);
        engine.on_phase_end(move |s| ends.lock().unwrap().push(("end", s.phase)));

        engine
            .start(&registry(&[(Exercise::Random, "00:01"), (Exercise::Plank, "00:01")]))
            .unwrap();
        tick_n(&mut engine, 4);

        let events = events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                ("start", Phase::Exercise),
                ("end", Phase::Exercise),
                ("start", Phase::Break),
                ("end", Phase::Break),
                ("start", Phase::Exercise),
                ("end", Phase::Exercise),
                ("start", Phase::Break),
                ("end", Phase::Break),
            ]
        );
    }

    #[test]
    fn run_start_precedes_first_phase_start() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut engine = CountdownEngine::new();

        let phases = Arc::clone(&events);
        engine.on_phase_start(move |_| phases.lock().unwrap().push("phase_start"));
        let starts = Arc::clone(&events);
        engine.on_start(move |_| starts.lock().unwrap().push("start"));

        engine.start(&registry(&[(Exercise::Plank, "00:02")])).unwrap();
        engine.tick();
        assert_eq!(*events.lock().unwrap(), vec!["start", "phase_start"]);

        assert!(engine.start(&registry(&[(Exercise::Plank, "00:02")])).is_err());
        assert_eq!(events.lock().unwrap().len(), 2);
    }

    #[test]
    fn finish_summary_lists_resolved_labels() {
        let summaries = Arc::new(Mutex::new(Vec::new()));
        let mut engine = CountdownEngine::new()
            .with_break_seconds(2)
            .with_resolver(FixedResolver(Exercise::Lunges));
        let s = Arc::clone(&summaries);
        engine.on_finish(move |summary| s.lock().unwrap().push(summary.clone()));

        engine
            .start(&registry(&[(Exercise::Random, "00:01"), (Exercise::Plank, "00:02")]))
            .unwrap();
        tick_n(&mut engine, 1 + 2 + 2 + 2);

        let summaries = summaries.lock().unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].resolved_labels, vec![Exercise::Lunges, Exercise::Plank]);
        assert_eq!(summaries[0].completed_rounds, 2);
        assert_eq!(summaries[0].ticks, 7);
    }

    #[test]
    fn engine_can_run_again_after_finishing() {
        let mut engine = CountdownEngine::new().with_break_seconds(1);
        let regs = registry(&[(Exercise::Squats, "00:01")]);
        engine.start(&regs).unwrap();
        tick_n(&mut engine, 2);
        assert!(!engine.is_running());

        let again = engine.start(&regs).unwrap();
        assert_eq!(again.round_index, 0);
        assert_eq!(again.remaining_seconds, 1);
    }
}
