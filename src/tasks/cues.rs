//! Audible phase cues

use std::io::Write;

use tracing::{info, warn};

use crate::engine::{CountdownEngine, Phase, TickSnapshot};

const BELL: &[u8] = b"\x07";

fn ring(moment: &str, snapshot: &TickSnapshot) {
    let what = match snapshot.phase {
        Phase::Exercise => snapshot.display_label.as_str(),
        Phase::Break => "break",
    };
    info!("Cue: {} {} (round {})", what, moment, snapshot.round_index + 1);

    let mut stderr = std::io::stderr();
    if let Err(e) = stderr.write_all(BELL).and_then(|_| stderr.flush()) {
        warn!("Failed to ring terminal bell: {}", e);
    }
}

/// Ring the terminal bell whenever a phase starts or ends
pub fn attach_terminal_cues(engine: &mut CountdownEngine) {
    engine.on_phase_start(|snapshot| ring("starts", snapshot));
    engine.on_phase_end(|snapshot| ring("ends", snapshot));
}
