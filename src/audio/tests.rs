use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use super::fake::FakeBackend;
use super::*;
use crate::config::AudioSettings;
use crate::error::PlayerError;
use crate::library::Track;

const SONG_LEN: Duration = Duration::from_millis(10_000);

fn track(index: usize) -> Track {
    Track {
        path: PathBuf::from(format!("/music/{index}.mp3")),
        title: format!("Song {index}"),
        artist: "Artist".into(),
        duration: None,
        index,
    }
}

struct Harness {
    player: PlaybackController<FakeBackend>,
    backend: FakeBackend,
    events: Receiver<PlayerEvent>,
    wakeups: Receiver<Wakeup>,
}

impl Harness {
    fn new(backend: FakeBackend) -> Self {
        let (event_tx, events) = mpsc::channel();
        let (wake_tx, wakeups) = mpsc::channel();
        let player =
            PlaybackController::new(backend.clone(), &AudioSettings::default(), event_tx, wake_tx);
        Self {
            player,
            backend,
            events,
            wakeups,
        }
    }

    /// Deliver every queued decoder wakeup, as the event loop does.
    fn pump(&mut self) {
        while let Ok(w) = self.wakeups.try_recv() {
            self.player.handle_wakeup(w);
        }
    }

    fn drain_events(&self) -> Vec<PlayerEvent> {
        self.events.try_iter().collect()
    }

    fn loaded(index: usize) -> Self {
        let mut h = Self::new(FakeBackend::new(SONG_LEN));
        h.player.load(&track(index)).unwrap();
        h.pump();
        h.drain_events();
        h
    }

    fn ticks(&self) -> usize {
        self.drain_events()
            .iter()
            .filter(|e| matches!(e, PlayerEvent::Tick { .. }))
            .count()
    }
}

fn later(period_count: u32) -> Instant {
    Instant::now() + Duration::from_millis(1000) * period_count
}

#[test]
fn load_goes_through_loading_to_ready_with_one_event() {
    let mut h = Harness::new(FakeBackend::deferred(SONG_LEN));
    h.player.load(&track(3)).unwrap();
    assert_eq!(h.player.state(), PlayerState::Loading);
    assert!(h.drain_events().is_empty());

    h.backend.finish_prepare();
    h.pump();

    assert_eq!(h.player.state(), PlayerState::Ready);
    assert_eq!(
        h.drain_events(),
        vec![PlayerEvent::Ready {
            track: 3,
            duration: SONG_LEN
        }]
    );
    assert_eq!(h.player.duration().unwrap(), SONG_LEN);
    assert!(h.backend.state.borrow().looping);
}

#[test]
fn superseded_prepare_is_discarded() {
    let mut h = Harness::new(FakeBackend::deferred(SONG_LEN));
    h.player.load(&track(1)).unwrap();
    h.player.load(&track(2)).unwrap();

    // The first session's prepare completes late, after being replaced.
    h.backend.finish_prepare();
    h.pump();
    assert_eq!(h.player.state(), PlayerState::Loading);
    assert!(h.drain_events().is_empty());

    h.backend.finish_prepare();
    h.pump();
    assert_eq!(
        h.drain_events(),
        vec![PlayerEvent::Ready {
            track: 2,
            duration: SONG_LEN
        }]
    );
}

#[test]
fn duplicate_wakeup_for_same_session_emits_nothing() {
    let mut h = Harness::new(FakeBackend::deferred(SONG_LEN));
    h.player.load(&track(0)).unwrap();
    h.backend.finish_prepare();
    h.pump();
    assert_eq!(h.drain_events().len(), 1);

    h.player.handle_wakeup(Wakeup::Prepared {
        generation: 1,
        duration: Some(SONG_LEN),
    });
    assert!(h.drain_events().is_empty());
    assert_eq!(h.player.state(), PlayerState::Ready);
}

#[test]
fn unknown_decoder_duration_falls_back_to_scanned_length() {
    let mut backend = FakeBackend::new(SONG_LEN);
    backend.duration = None;
    let mut h = Harness::new(backend);

    let mut t = track(0);
    t.duration = Some(Duration::from_secs(42));
    h.player.load(&t).unwrap();
    h.pump();
    assert_eq!(h.player.duration().unwrap(), Duration::from_secs(42));
}

#[test]
fn unplayable_source_leaves_controller_idle() {
    let mut h = Harness::loaded(0);
    h.backend
        .state
        .borrow_mut()
        .unplayable
        .insert(PathBuf::from("/music/9.mp3"));

    let err = h.player.load(&track(9)).unwrap_err();
    assert!(matches!(err, PlayerError::UnplayableSource { .. }));
    assert_eq!(h.player.state(), PlayerState::Idle);
    assert!(h.player.current_track().is_none());
    assert_eq!(h.backend.open_count(), 0);
}

#[test]
fn failed_prepare_releases_and_reports() {
    let mut h = Harness::new(FakeBackend::deferred(SONG_LEN));
    h.player.load(&track(4)).unwrap();
    h.backend.fail_prepare("corrupt header");
    h.pump();

    assert_eq!(h.player.state(), PlayerState::Idle);
    assert_eq!(h.backend.open_count(), 0);
    assert_eq!(
        h.drain_events(),
        vec![PlayerEvent::LoadFailed {
            track: 4,
            reason: "corrupt header".into()
        }]
    );
}

#[test]
fn play_requires_a_prepared_session() {
    let mut h = Harness::new(FakeBackend::deferred(SONG_LEN));
    assert!(matches!(
        h.player.play(),
        Err(PlayerError::NotReady(PlayerState::Idle))
    ));

    h.player.load(&track(0)).unwrap();
    assert!(matches!(
        h.player.play(),
        Err(PlayerError::NotReady(PlayerState::Loading))
    ));
    assert!(!h.backend.state.borrow().playing);
}

#[test]
fn play_arms_a_single_tick_stream() {
    let mut h = Harness::loaded(0);
    h.player.play().unwrap();
    assert!(h.player.is_playing());
    assert!(h.backend.state.borrow().playing);
    assert!(h.player.next_deadline().is_some());

    // Playing again does not add a second stream.
    h.player.play().unwrap();

    h.backend.set_position(Duration::from_millis(1_500));
    assert!(h.player.poll(later(2)));
    assert!(!h.player.poll(later(2)), "tick re-armed one period ahead");
    assert_eq!(
        h.drain_events(),
        vec![PlayerEvent::Tick {
            elapsed: Duration::from_millis(1_500),
            remaining: Duration::from_millis(8_500),
        }]
    );

    assert!(h.player.poll(later(4)));
    assert_eq!(h.ticks(), 1);
}

#[test]
fn pause_stops_further_ticks() {
    let mut h = Harness::loaded(0);
    h.player.play().unwrap();
    h.player.pause().unwrap();

    assert_eq!(h.player.state(), PlayerState::Paused);
    assert!(!h.backend.state.borrow().playing);
    assert_eq!(h.player.next_deadline(), None);
    for n in 1..5 {
        assert!(!h.player.poll(later(n)));
    }
    assert_eq!(h.ticks(), 0);

    h.player.play().unwrap();
    assert!(h.player.poll(later(2)));
    assert_eq!(h.ticks(), 1);
}

#[test]
fn pause_is_idempotent_but_not_from_idle() {
    let mut h = Harness::loaded(0);
    h.player.pause().unwrap();
    assert_eq!(h.player.state(), PlayerState::Ready);
    h.player.play().unwrap();
    h.player.pause().unwrap();
    h.player.pause().unwrap();
    assert_eq!(h.player.state(), PlayerState::Paused);

    h.player.stop();
    assert!(matches!(h.player.pause(), Err(PlayerError::NotReady(_))));
}

#[test]
fn stop_releases_and_is_idempotent() {
    let mut h = Harness::loaded(0);
    h.player.play().unwrap();
    h.player.stop();

    assert_eq!(h.player.state(), PlayerState::Idle);
    assert_eq!(h.backend.open_count(), 0);
    assert_eq!(h.player.next_deadline(), None);
    assert!(!h.player.poll(later(3)));

    h.player.stop();
    assert_eq!(h.player.state(), PlayerState::Idle);
    assert_eq!(h.backend.state.borrow().released, 1);
}

#[test]
fn stop_goes_idle_even_when_release_fails() {
    let mut h = Harness::loaded(0);
    h.backend.state.borrow_mut().fail_release = true;
    h.player.stop();
    assert_eq!(h.player.state(), PlayerState::Idle);

    h.backend.state.borrow_mut().fail_release = false;
    h.player.load(&track(1)).unwrap();
    h.pump();
    assert_eq!(h.player.state(), PlayerState::Ready);
}

#[test]
fn tick_from_replaced_session_is_dropped() {
    let mut h = Harness::loaded(0);
    h.player.play().unwrap();

    // Replacing the session takes its pending tick with it.
    h.player.load(&track(1)).unwrap();
    h.pump();
    h.drain_events();
    assert_eq!(h.player.next_deadline(), None);
    assert!(!h.player.poll(later(5)));
    assert_eq!(h.ticks(), 0);
}

#[test]
fn replay_rewinds_without_changing_state() {
    let mut h = Harness::loaded(0);
    h.player.play().unwrap();
    h.backend.set_position(Duration::from_secs(7));

    h.player.replay().unwrap();
    assert_eq!(h.player.elapsed().unwrap(), Duration::ZERO);
    assert!(h.player.is_playing());

    h.player.pause().unwrap();
    h.player.replay().unwrap();
    assert_eq!(h.player.state(), PlayerState::Paused);
    assert_eq!(h.backend.open_count(), 1);
}

#[test]
fn seek_clamps_to_track_bounds() {
    let mut h = Harness::loaded(0);
    assert_eq!(h.player.seek(-50).unwrap(), Duration::ZERO);
    assert_eq!(h.player.seek(999_999).unwrap(), SONG_LEN);
    assert_eq!(h.player.seek(2_500).unwrap(), Duration::from_millis(2_500));
    assert_eq!(
        h.backend.state.borrow().seeks,
        vec![Duration::ZERO, SONG_LEN, Duration::from_millis(2_500)]
    );
}

#[test]
fn transport_queries_need_a_loaded_session() {
    let mut h = Harness::new(FakeBackend::deferred(SONG_LEN));
    assert!(matches!(h.player.elapsed(), Err(PlayerError::NotReady(_))));
    assert!(matches!(h.player.seek(0), Err(PlayerError::NotReady(_))));
    h.player.load(&track(0)).unwrap();
    assert!(matches!(h.player.replay(), Err(PlayerError::NotReady(_))));
    assert!(matches!(h.player.remaining(), Err(PlayerError::NotReady(_))));
}

#[test]
fn looping_position_wraps_into_the_current_pass() {
    let h = Harness::loaded(0);
    h.backend.set_position(Duration::from_millis(23_000));
    assert_eq!(h.player.elapsed().unwrap(), Duration::from_millis(3_000));
    assert_eq!(h.player.remaining().unwrap(), Duration::from_millis(7_000));
}

#[test]
fn volume_is_applied_now_and_to_later_sessions() {
    let mut h = Harness::loaded(0);
    let gain = h.player.set_volume(VolumeSlider::new(50, 100));
    assert_eq!(h.backend.state.borrow().gain, Some(gain));

    h.backend.state.borrow_mut().gain = None;
    h.player.load(&track(1)).unwrap();
    h.pump();
    assert_eq!(h.backend.state.borrow().gain, Some(gain));

    assert_eq!(h.player.set_volume(VolumeSlider::new(100, 100)), 1.0);
    assert_eq!(h.player.set_volume(VolumeSlider::new(0, 100)), 0.0);
}

#[test]
fn at_most_one_voice_is_ever_open() {
    let mut h = Harness::new(FakeBackend::deferred(SONG_LEN));
    for i in 0..6 {
        h.player.load(&track(i)).unwrap();
        if i % 2 == 0 {
            h.backend.finish_prepare();
            h.pump();
            let _ = h.player.play();
            let _ = h.player.pause();
        }
        if i % 3 == 0 {
            h.player.stop();
            let _ = h.player.play();
        }
        assert!(h.backend.open_count() <= 1);
    }

    let s = h.backend.state.borrow();
    assert_eq!(s.max_open, 1);
    assert_eq!(s.opened, 6);
}

#[test]
fn dropping_the_controller_releases_its_voice() {
    let h = Harness::loaded(0);
    let backend = h.backend.clone();
    drop(h);
    assert_eq!(backend.open_count(), 0);
}
