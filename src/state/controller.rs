//! The state controller
//!
//! Owns the one shared [`ViewState`] and is the only code that mutates
//! it. Any number of trigger loops may race for [`Controller::try_start_cycle`];
//! the phase check and the move to Listening happen under one lock, so at
//! most one cycle is ever in flight. The lock is never held across an
//! `.await`, and every capture or speech call happens without it.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::time::{self, Instant};
use tracing::{debug, error, info, warn};

use crate::audio::{self, AudioGateway};
use crate::config::CycleTimings;
use crate::content::ContentStore;
use crate::display::DisplayHandle;
use crate::events::StateEvent;
use crate::speech::{SpeechError, SpeechOutput};

use super::view::{Phase, Script, Trigger, ViewSnapshot, ViewState};

/// External collaborators the controller drives
pub struct Collaborators {
    pub content: ContentStore,
    pub audio: Arc<dyn AudioGateway>,
    pub speech: Arc<dyn SpeechOutput>,
    pub display: DisplayHandle,
}

/// Bookkeeping for the admitted cycle
#[derive(Debug, Clone, Copy)]
struct Admission {
    trigger: Trigger,
    admitted_at: Instant,
    /// Set once `run_cycle` has claimed the cycle
    running: bool,
}

struct Inner {
    view: ViewState,
    admission: Option<Admission>,
}

/// Serializes every phase transition of the appliance
pub struct Controller {
    inner: Mutex<Inner>,
    content: ContentStore,
    audio: Arc<dyn AudioGateway>,
    speech: Arc<dyn SpeechOutput>,
    display: DisplayHandle,
    event_tx: broadcast::Sender<StateEvent>,
    timings: CycleTimings,
    /// Statute announced by the statute lookup script
    statute_code: String,
}

impl Controller {
    /// Create a controller in Idle with the rights recitation selected
    pub fn new(
        collaborators: Collaborators,
        timings: CycleTimings,
        statute_code: String,
        event_tx: broadcast::Sender<StateEvent>,
    ) -> Self {
        let Collaborators {
            content,
            audio,
            speech,
            display,
        } = collaborators;

        Self {
            inner: Mutex::new(Inner {
                view: ViewState::new(Script::default()),
                admission: None,
            }),
            content,
            audio,
            speech,
            display,
            event_tx,
            timings,
            statute_code,
        }
    }

    pub fn phase(&self) -> Phase {
        self.inner.lock().view.phase
    }

    /// The script the next cycle runs, or the one running now
    pub fn active_script(&self) -> Script {
        self.inner.lock().view.active_script
    }

    /// Statute and rights content
    pub fn content(&self) -> &ContentStore {
        &self.content
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.inner.lock().view.snapshot()
    }

    /// Push the current state to the display unconditionally
    pub fn publish_current(&self) {
        let inner = self.inner.lock();
        self.display.publish(inner.view.snapshot());
    }

    /// Admission gate: start a cycle if and only if the controller is Idle
    ///
    /// Returns false, with no state change, when another cycle is in flight.
    pub fn try_start_cycle(&self, script: Script, trigger: Trigger) -> bool {
        let mut inner = self.inner.lock();
        if inner.view.phase != Phase::Idle {
            debug!(%trigger, phase = %inner.view.phase, "admission refused");
            return false;
        }

        inner.view.active_script = script;
        inner.view.message = None;
        inner.view.advance();
        inner.admission = Some(Admission {
            trigger,
            admitted_at: Instant::now(),
            running: false,
        });

        info!(%script, %trigger, "cycle admitted");
        self.display.publish(inner.view.snapshot());
        self.emit(StateEvent::CycleStarted { script, trigger });
        self.emit(StateEvent::PhaseChanged {
            from: Phase::Idle,
            to: Phase::Listening,
        });
        true
    }

    /// Run the admitted cycle through to Idle
    ///
    /// Only the caller that won [`try_start_cycle`](Self::try_start_cycle)
    /// should call this. Any other call finds no unclaimed admission and
    /// returns immediately. Collaborator failures are logged and the cycle
    /// carries on, so the total time is the sum of the fixed waits.
    pub async fn run_cycle(&self) {
        let Some((script, admission)) = self.claim() else {
            return;
        };

        self.listen().await;

        self.advance(Phase::Listening);
        time::sleep(self.timings.think_time).await;

        self.advance(Phase::Processing);
        match script {
            Script::RightsRecitation => self.recite_rights().await,
            Script::StatuteLookup => self.announce_statute().await,
        }

        self.finish(script, admission);
    }

    /// Select a script for the next cycle; refused outside Idle
    pub fn select_script(&self, script: Script) -> bool {
        let mut inner = self.inner.lock();
        if inner.view.phase != Phase::Idle {
            return false;
        }
        if inner.view.active_script != script {
            inner.view.active_script = script;
            self.display.publish(inner.view.snapshot());
        }
        true
    }

    /// Refresh the idle clock; does nothing while a cycle is running
    pub fn publish_idle_refresh(&self) -> bool {
        let mut inner = self.inner.lock();
        if inner.view.phase != Phase::Idle {
            return false;
        }
        inner.view.last_updated = chrono::Local::now();
        self.display.publish(inner.view.snapshot());
        true
    }

    fn claim(&self) -> Option<(Script, Admission)> {
        let mut inner = self.inner.lock();
        let phase = inner.view.phase;
        let script = inner.view.active_script;

        match inner.admission.as_mut() {
            Some(admission) if phase == Phase::Listening && !admission.running => {
                admission.running = true;
                Some((script, *admission))
            }
            _ => {
                warn!(%phase, "run_cycle called without an unclaimed admission");
                None
            }
        }
    }

    /// Listening: capture for the listen window, bounded by the capture limit
    async fn listen(&self) {
        let window = time::sleep(self.timings.listen_window);
        let presence = audio::capture_or_absent(
            self.audio.as_ref(),
            self.timings.listen_window,
            self.timings.capture_limit(),
        )
        .await;
        debug!(
            present = presence.present,
            captured_bytes = presence.captured_bytes,
            "listening capture finished"
        );
        window.await;
    }

    async fn recite_rights(&self) {
        for (index, line) in self.content.rights_script().iter().enumerate() {
            self.show_message(line);
            self.say(index, line).await;
            time::sleep(self.timings.line_hold).await;
        }
    }

    async fn announce_statute(&self) {
        let (code, description) = match self.content.lookup_statute(&self.statute_code) {
            Ok(entry) => (entry.code.clone(), entry.description.clone()),
            Err(e) => {
                warn!(error = %e, "statute lookup failed");
                let code = self.statute_code.clone();
                let description = format!("Statute {code} not found");
                (code, description)
            }
        };

        let announcement = format!("Louisiana Statute {code}");
        self.show_message(&announcement);
        self.say(0, &announcement).await;
        time::sleep(self.timings.announce_hold).await;

        self.show_message(&description);
        self.say(1, &description).await;
        time::sleep(self.timings.description_hold).await;
    }

    async fn say(&self, index: usize, text: &str) {
        let spoken = match self.speech.speak(text).await {
            Ok(()) => true,
            Err(SpeechError::ToolUnavailable(tool)) => {
                debug!(%tool, text, "speech unavailable, line is silent");
                false
            }
            Err(e) => {
                warn!(error = %e, "speech failed, line is silent");
                false
            }
        };

        self.emit(StateEvent::LineSpoken {
            index,
            text: text.to_string(),
            spoken,
        });
    }

    fn show_message(&self, message: &str) {
        let mut inner = self.inner.lock();
        inner.view.message = Some(message.to_string());
        inner.view.last_updated = chrono::Local::now();
        self.display.publish(inner.view.snapshot());
    }

    /// Step from `from` to the next phase
    fn advance(&self, from: Phase) {
        let mut inner = self.inner.lock();
        self.advance_locked(&mut inner, from);
    }

    fn advance_locked(&self, inner: &mut Inner, from: Phase) {
        if inner.view.phase != from {
            error!(expected = %from, actual = %inner.view.phase, "phase out of step");
            return;
        }

        inner.view.advance();
        let to = inner.view.phase;
        debug!(%from, %to, "phase transition");
        self.display.publish(inner.view.snapshot());
        self.emit(StateEvent::PhaseChanged { from, to });
    }

    /// Responding back to Idle
    fn finish(&self, script: Script, admission: Admission) {
        {
            let mut inner = self.inner.lock();
            inner.view.message = None;
            inner.admission = None;
            self.advance_locked(&mut inner, Phase::Responding);
        }

        let duration_ms = admission.admitted_at.elapsed().as_millis() as u64;
        info!(
            %script,
            trigger = %admission.trigger,
            duration_ms,
            "cycle complete"
        );
        self.emit(StateEvent::CycleComplete {
            script,
            duration_ms,
        });
    }

    fn emit(&self, event: StateEvent) {
        debug!(?event, "emitting state event");
        let _ = self.event_tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::testing::{FakeAudio, Harness, RecordingSpeech};

    const RIGHTS_LINES: usize = 4;

    fn rights_cycle_duration() -> Duration {
        let t = CycleTimings::default();
        t.listen_window + t.think_time + t.line_hold * RIGHTS_LINES as u32
    }

    #[test]
    fn test_initial_state() {
        let harness = Harness::new();
        let snapshot = harness.controller.snapshot();
        assert_eq!(snapshot.phase, Phase::Idle);
        assert_eq!(snapshot.active_script, Script::RightsRecitation);
        assert!(!snapshot.mic_active);
    }

    #[test]
    fn test_admission_sets_listening() {
        let mut harness = Harness::new();
        assert!(harness
            .controller
            .try_start_cycle(Script::StatuteLookup, Trigger::Manual));

        let snapshot = harness.controller.snapshot();
        assert_eq!(snapshot.phase, Phase::Listening);
        assert_eq!(snapshot.active_script, Script::StatuteLookup);
        assert!(snapshot.mic_active);

        let published = harness.snapshots();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].phase, Phase::Listening);
    }

    #[test]
    fn test_second_admission_refused_without_change() {
        let mut harness = Harness::new();
        assert!(harness
            .controller
            .try_start_cycle(Script::StatuteLookup, Trigger::WakeWord));
        let before = harness.controller.snapshot();
        harness.snapshots();
        harness.events();

        assert!(!harness
            .controller
            .try_start_cycle(Script::RightsRecitation, Trigger::AutoDemo));

        assert_eq!(harness.controller.snapshot(), before);
        assert!(harness.snapshots().is_empty());
        assert!(harness.events().is_empty());
    }

    #[test]
    fn test_concurrent_admission_has_one_winner() {
        let harness = Harness::new();
        let contenders = 8;
        let barrier = Arc::new(Barrier::new(contenders));

        let handles: Vec<_> = (0..contenders)
            .map(|i| {
                let controller = Arc::clone(&harness.controller);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let (script, trigger) = if i % 2 == 0 {
                        (Script::RightsRecitation, Trigger::WakeWord)
                    } else {
                        (Script::StatuteLookup, Trigger::AutoDemo)
                    };
                    barrier.wait();
                    controller
                        .try_start_cycle(script, trigger)
                        .then_some(script)
                })
            })
            .collect();

        let winners: Vec<Script> = handles
            .into_iter()
            .filter_map(|h| h.join().unwrap())
            .collect();

        assert_eq!(winners.len(), 1);
        // The losers did not overwrite the winner's script
        assert_eq!(harness.controller.active_script(), winners[0]);
        assert_eq!(harness.controller.phase(), Phase::Listening);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rights_cycle_speaks_every_line_once_in_order() {
        let harness = Harness::new();
        let controller = &harness.controller;
        assert!(controller.try_start_cycle(Script::RightsRecitation, Trigger::Manual));
        controller.run_cycle().await;

        let expected: Vec<String> = ContentStore::default().rights_script().to_vec();
        assert_eq!(harness.speech.lines(), expected);

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.phase, Phase::Idle);
        assert!(!snapshot.mic_active);
        assert!(snapshot.message.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_speech_does_not_extend_cycle() {
        let harness = Harness::with(FakeAudio::failing(), RecordingSpeech::failing(), "14:98");
        let controller = &harness.controller;

        let start = Instant::now();
        assert!(controller.try_start_cycle(Script::RightsRecitation, Trigger::AutoDemo));
        controller.run_cycle().await;

        assert_eq!(start.elapsed(), rights_cycle_duration());
        assert_eq!(controller.phase(), Phase::Idle);
        assert!(!controller.snapshot().mic_active);
        assert_eq!(harness.speech.lines().len(), RIGHTS_LINES);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_capture_only_delays_listening() {
        let harness = Harness::with(FakeAudio::hanging(), RecordingSpeech::new(), "14:98");
        let controller = &harness.controller;
        let timings = CycleTimings::default();

        let start = Instant::now();
        assert!(controller.try_start_cycle(Script::RightsRecitation, Trigger::WakeWord));
        controller.run_cycle().await;

        let expected = rights_cycle_duration() - timings.listen_window + timings.capture_limit();
        assert_eq!(start.elapsed(), expected);
        assert_eq!(controller.phase(), Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_statute_cycle() {
        let harness = Harness::new();
        let controller = &harness.controller;
        assert!(controller.try_start_cycle(Script::StatuteLookup, Trigger::AutoDemo));
        controller.run_cycle().await;

        assert_eq!(
            harness.speech.lines(),
            vec![
                "Louisiana Statute 14:98".to_string(),
                "DWI - Operating vehicle while intoxicated".to_string(),
            ]
        );
        assert_eq!(controller.phase(), Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bare_statute_number_is_announced_qualified() {
        let harness = Harness::with(FakeAudio::silent(), RecordingSpeech::new(), "67");
        assert!(harness
            .controller
            .try_start_cycle(Script::StatuteLookup, Trigger::Manual));
        harness.controller.run_cycle().await;

        assert_eq!(
            harness.speech.lines(),
            vec!["Louisiana Statute 14:67".to_string(), "Theft".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_statute_substitutes_message() {
        let harness = Harness::with(FakeAudio::silent(), RecordingSpeech::new(), "99:99");
        let controller = &harness.controller;
        assert!(controller.try_start_cycle(Script::StatuteLookup, Trigger::Manual));
        controller.run_cycle().await;

        assert_eq!(
            harness.speech.lines(),
            vec![
                "Louisiana Statute 99:99".to_string(),
                "Statute 99:99 not found".to_string(),
            ]
        );
        assert_eq!(controller.phase(), Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshots_follow_phase_order() {
        let mut harness = Harness::new();
        assert!(harness
            .controller
            .try_start_cycle(Script::RightsRecitation, Trigger::WakeWord));
        harness.controller.run_cycle().await;

        let snapshots = harness.snapshots();
        let mut phases: Vec<Phase> = snapshots.iter().map(|s| s.phase).collect();
        phases.dedup();
        assert_eq!(
            phases,
            vec![
                Phase::Listening,
                Phase::Processing,
                Phase::Responding,
                Phase::Idle
            ]
        );

        for snapshot in &snapshots {
            assert_eq!(snapshot.mic_active, snapshot.phase == Phase::Listening);
            assert_eq!(snapshot.active_script, Script::RightsRecitation);
        }

        let shown: Vec<&str> = snapshots
            .iter()
            .filter_map(|s| s.message.as_deref())
            .collect();
        assert_eq!(shown.len(), RIGHTS_LINES);
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_for_one_cycle() {
        let mut harness = Harness::with(FakeAudio::silent(), RecordingSpeech::failing(), "14:30");
        assert!(harness
            .controller
            .try_start_cycle(Script::StatuteLookup, Trigger::Manual));
        harness.controller.run_cycle().await;

        let events = harness.events();
        assert_eq!(
            events.first(),
            Some(&StateEvent::CycleStarted {
                script: Script::StatuteLookup,
                trigger: Trigger::Manual,
            })
        );
        assert!(matches!(
            events.last(),
            Some(StateEvent::CycleComplete {
                script: Script::StatuteLookup,
                ..
            })
        ));

        let silent_lines = events
            .iter()
            .filter(|e| matches!(e, StateEvent::LineSpoken { spoken: false, .. }))
            .count();
        assert_eq!(silent_lines, 2);

        let transitions = events
            .iter()
            .filter(|e| matches!(e, StateEvent::PhaseChanged { .. }))
            .count();
        assert_eq!(transitions, 4);
    }

    #[tokio::test]
    async fn test_run_cycle_without_admission_is_noop() {
        let mut harness = Harness::new();
        harness.controller.run_cycle().await;

        assert_eq!(harness.controller.phase(), Phase::Idle);
        assert!(harness.speech.lines().is_empty());
        assert!(harness.snapshots().is_empty());
        assert_eq!(harness.audio.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycle_cannot_be_run_twice() {
        let harness = Harness::new();
        let controller = Arc::clone(&harness.controller);
        assert!(controller.try_start_cycle(Script::RightsRecitation, Trigger::WakeWord));

        let first = tokio::spawn({
            let controller = Arc::clone(&controller);
            async move { controller.run_cycle().await }
        });
        tokio::task::yield_now().await;

        // Claimed by the spawned task already
        controller.run_cycle().await;
        first.await.unwrap();

        assert_eq!(harness.speech.lines().len(), RIGHTS_LINES);
        assert_eq!(harness.audio.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_script_changes_only_while_idle() {
        let harness = Harness::new();
        let controller = &harness.controller;

        assert!(controller.select_script(Script::StatuteLookup));
        assert_eq!(controller.active_script(), Script::StatuteLookup);
        assert!(controller.select_script(Script::RightsRecitation));

        assert!(controller.try_start_cycle(Script::StatuteLookup, Trigger::Manual));
        assert!(!controller.select_script(Script::RightsRecitation));
        assert_eq!(controller.active_script(), Script::StatuteLookup);

        controller.run_cycle().await;
        assert!(controller.select_script(Script::RightsRecitation));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_refresh_only_when_idle() {
        let mut harness = Harness::new();
        assert!(harness.controller.publish_idle_refresh());
        assert_eq!(harness.snapshots().len(), 1);

        assert!(harness
            .controller
            .try_start_cycle(Script::RightsRecitation, Trigger::Manual));
        harness.snapshots();
        assert!(!harness.controller.publish_idle_refresh());
        assert!(harness.snapshots().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_cycle_after_completion() {
        let harness = Harness::new();
        let controller = &harness.controller;

        assert!(controller.try_start_cycle(Script::RightsRecitation, Trigger::WakeWord));
        controller.run_cycle().await;
        assert!(controller.try_start_cycle(Script::StatuteLookup, Trigger::AutoDemo));
        controller.run_cycle().await;

        assert_eq!(harness.speech.lines().len(), RIGHTS_LINES + 2);
        assert_eq!(controller.phase(), Phase::Idle);
    }
}
