//! End-to-end behavior of candidate generation and the attempt scheduler,
//! driven through the public API with a manual timer.

use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use formprobe::candidates::{Alphabet, CandidateSource, Phase, Wordlist};
use formprobe::driver::RecordingDriver;
use formprobe::scheduler::{
    next_delay_ms, AttemptScheduler, ManualTimer, SchedulerContext, SchedulerState, StopReason,
    TickOutcome,
};
use formprobe::store::{load_session, save_session, MemoryStore};
use formprobe::types::{
    BindingRole, CharsetOptions, ElementRef, FormBindings, GenerationConfig, ProbeSettings,
    RateConfig, UsernameConfig,
};
use formprobe::ErrorCode;

fn source(chars: &str, min: usize, max: usize, wordlist_first: bool) -> CandidateSource {
    let config = GenerationConfig::new(Alphabet::new(chars), min, max).unwrap();
    CandidateSource::new(config, wordlist_first)
}

fn drain(source: &mut CandidateSource) -> Vec<String> {
    std::iter::from_fn(|| source.next_candidate().map(|c| c.value)).collect()
}

fn settings(chars: &str, max: usize) -> ProbeSettings {
    ProbeSettings {
        charset: CharsetOptions {
            custom_characters: chars.to_string(),
            include_uppercase: false,
            include_numbers: false,
            include_symbols: false,
        },
        min_length: 1,
        max_length: max,
        use_wordlist_first: false,
        username: UsernameConfig {
            value: "admin".to_string(),
            ..Default::default()
        },
        bindings: FormBindings {
            username: Some(ElementRef::new("input", "username", "")),
            password: Some(ElementRef::new("input", "password", "")),
            submit: Some(ElementRef::new("button", "", "submit-btn")),
        },
        ..Default::default()
    }
}

fn scheduler(settings: ProbeSettings) -> AttemptScheduler<RecordingDriver, ManualTimer> {
    let context = SchedulerContext::new(settings).unwrap();
    AttemptScheduler::new(context, RecordingDriver::new(), ManualTimer::new(), Some(3))
}

fn run_to_end(s: &mut AttemptScheduler<RecordingDriver, ManualTimer>) {
    while let Some(handle) = s.pending() {
        s.on_tick(handle);
    }
}

#[test]
fn sequential_enumeration_order() {
    let mut src = source("ab", 1, 2, false);
    assert_eq!(drain(&mut src), vec!["a", "b", "aa", "ab", "ba", "bb"]);
    assert!(src.next_candidate().is_none());
}

#[test]
fn short_candidates_skipped_below_min_length() {
    let mut src = source("ab", 2, 2, false);
    assert_eq!(src.next_candidate().unwrap().value, "aa");
}

#[test]
fn wordlist_phase_trims_and_filters() {
    let mut src = source("ab", 1, 2, true);
    let entries = ["foo", " bar ", "", "foo"].iter().map(|s| s.to_string()).collect();
    src.load_wordlist(Wordlist::from_entries(entries));
    src.exclusions_mut().add("foo");

    let first = src.next_candidate().unwrap();
    assert_eq!(first.value, "bar");
    assert_eq!(first.phase, Phase::Wordlist);

    let next = src.next_candidate().unwrap();
    assert_eq!(next.value, "a");
    assert_eq!(next.phase, Phase::Sequential);
}

#[test]
fn exclusions_apply_to_both_phases() {
    let excluded = ["aa", "b", "word"];
    let mut src = source("ab", 1, 3, true);
    src.load_wordlist(Wordlist::parse("word\nother\nb\n"));
    for candidate in excluded {
        src.exclusions_mut().add(candidate);
    }

    let all = drain(&mut src);
    assert_eq!(all[0], "other");
    for candidate in excluded {
        assert!(!all.iter().any(|c| c == candidate), "{} was yielded", candidate);
    }
    // 2 + 4 + 8 sequential strings minus the two excluded, plus "other"
    assert_eq!(all.len(), 13);
}

#[test]
fn fully_excluded_alphabet_terminates() {
    let mut src = source("ab", 1, 2, false);
    for c in ["a", "b", "aa", "ab", "ba", "bb"] {
        src.exclusions_mut().add(c);
    }
    assert!(src.next_candidate().is_none());
    assert_eq!(src.skipped(), 6);
}

#[test]
fn stop_is_idempotent_and_cancels_one_tick() {
    let mut s = scheduler(settings("ab", 2));
    s.start();
    let first = s.pending().unwrap();
    s.on_tick(first);
    let pending = s.pending().unwrap();

    assert_eq!(s.stop(), SchedulerState::Stopped);
    assert_eq!(s.stop(), SchedulerState::Stopped);
    assert_eq!(s.timer().cancelled(), &[pending]);
    assert_eq!(s.pending(), None);
    assert_eq!(s.on_tick(pending), TickOutcome::Stale);
    assert_eq!(s.last_stop(), Some(&StopReason::Requested));
}

#[test]
fn pause_resume_neither_skips_nor_repeats() {
    let mut uninterrupted = scheduler(settings("abc", 2));
    uninterrupted.start();
    run_to_end(&mut uninterrupted);

    let mut paused = scheduler(settings("abc", 2));
    paused.start();
    for round in 0..4 {
        for _ in 0..round + 1 {
            if let Some(handle) = paused.pending() {
                paused.on_tick(handle);
            }
        }
        if paused.state() == SchedulerState::Running {
            paused.pause().unwrap();
            paused.resume().unwrap();
        }
    }
    run_to_end(&mut paused);

    assert_eq!(paused.driver().candidates(), uninterrupted.driver().candidates());
    assert_eq!(paused.driver().candidates().len(), 12);
}

#[test]
fn each_missing_binding_is_a_configuration_error() {
    for role in BindingRole::ALL {
        let mut s = scheduler(settings("ab", 2));
        s.bind(role, None);
        s.start();
        let handle = s.pending().unwrap();
        match s.on_tick(handle) {
            TickOutcome::Stopped(StopReason::Failed { error_code, .. }) => {
                assert_eq!(error_code, ErrorCode::MissingBinding, "role {}", role)
            }
            other => panic!("role {}: unexpected {:?}", role, other),
        }
        assert_eq!(s.state(), SchedulerState::Stopped);
        assert!(s.driver().calls().is_empty());
    }
}

#[test]
fn safe_mode_delay_exact() {
    let mut config = settings("ab", 2);
    config.rate = RateConfig {
        safe_mode: true,
        fixed_delay_ms: 100.0,
        speed_multiplier: 2,
        ..Default::default()
    };
    let mut s = scheduler(config);
    s.start();
    run_to_end(&mut s);

    let delays = s.timer().delays();
    assert_eq!(delays[0], Duration::ZERO);
    // six attempts, each followed by a 50ms re-arm; the last fire completes
    assert_eq!(delays.len(), 7);
    assert!(delays[1..].iter().all(|d| d.as_millis() == 50));
}

#[test]
fn jittered_delay_range() {
    let rate = RateConfig {
        base_rate_ms: 50.0,
        variance_ms: 50.0,
        safe_mode: false,
        speed_multiplier: 1,
        ..Default::default()
    };
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    for _ in 0..5_000 {
        let delay = next_delay_ms(&rate, &mut rng);
        assert!(delay >= 50.0 && delay < 100.0, "delay {}", delay);
    }
}

#[test]
fn saved_session_resumes_enumeration() {
    let mut s = scheduler(settings("ab", 2));
    s.start();
    for _ in 0..3 {
        let handle = s.pending().unwrap();
        s.on_tick(handle);
    }
    s.stop();

    let mut store = MemoryStore::new();
    save_session(s.context(), &mut store).unwrap();

    let context = load_session(&store).unwrap();
    let mut resumed = AttemptScheduler::new(context, RecordingDriver::new(), ManualTimer::new(), None);
    resumed.start();
    run_to_end(&mut resumed);
    assert_eq!(resumed.driver().candidates(), vec!["ab", "ba", "bb"]);
    assert_eq!(resumed.last_stop(), Some(&StopReason::Completed));
}
