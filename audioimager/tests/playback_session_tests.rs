//! Playback session integration tests
//!
//! Loads real WAV fixtures and drives the session the way the output stream
//! does: repeated fills of varying size until the buffer runs out.

mod helpers;

use audioimager::audio::{load_wav, StereoFrame};
use audioimager::playback::{FrameSource, PlaybackSession, SessionState, StrengthControl};
use audioimager::transform::transform;
use audioimager::Strengths;
use helpers::{interleave, ramp_frames, sine_frames, WavFixtures};

/// Drain a session with the given block sizes (cycled), returning every
/// written frame and the number of calls that produced nothing.
fn drain(session: &mut PlaybackSession, blocks: &[usize]) -> (Vec<i16>, usize) {
    let mut produced = Vec::new();
    let mut empty_calls = 0;

    for &frames in blocks.iter().cycle() {
        let mut output = vec![i16::MAX; frames * 2];
        let written = session.fill(&mut output);

        produced.extend_from_slice(&output[..written * 2]);
        assert!(
            output[written * 2..].iter().all(|&s| s == 0),
            "unwritten slots must be silent"
        );

        if written == 0 {
            empty_calls += 1;
            if session.is_exhausted() {
                break;
            }
        }
    }

    (produced, empty_calls)
}

#[test]
fn test_plays_whole_file_through_transform() {
    let fixtures = WavFixtures::new().expect("Failed to create fixtures");
    let samples = sine_frames(1000, 44100, 440.0, 0.8, true);
    let path = fixtures
        .stereo_i16("sine.wav", 44100, &samples)
        .expect("Failed to write fixture");

    let buffer = load_wav(&path).expect("Load should succeed");
    let mut session = PlaybackSession::new(buffer, Strengths::new(3, 1).unwrap());

    let (produced, empty_calls) = drain(&mut session, &[64, 17, 256, 1]);

    assert_eq!(empty_calls, 1, "exhaustion is detected by one empty call");
    assert_eq!(produced.len(), samples.len());
    for (out, input) in produced.chunks_exact(2).zip(samples.chunks_exact(2)) {
        let expected = transform(input[0], input[1], 3, 1).unwrap();
        assert_eq!((out[0], out[1]), expected);
    }
    assert_eq!(session.frames_played(), 1000);
}

#[test]
fn test_exhausted_session_stays_silent() {
    let fixtures = WavFixtures::new().expect("Failed to create fixtures");
    let path = fixtures
        .stereo_i16("short.wav", 22050, &ramp_frames(10, 0))
        .expect("Failed to write fixture");

    let buffer = load_wav(&path).expect("Load should succeed");
    let mut session = PlaybackSession::new(buffer, Strengths::default());
    drain(&mut session, &[4]);

    for _ in 0..5 {
        let mut output = [1i16; 16];
        assert_eq!(session.fill(&mut output), 0);
        assert_eq!(output, [0i16; 16]);
        assert_eq!(session.state(), SessionState::Exhausted);
    }
}

#[test]
fn test_identity_strengths_reproduce_source() {
    let fixtures = WavFixtures::new().expect("Failed to create fixtures");
    let samples = ramp_frames(300, -150);
    let path = fixtures
        .stereo_i16("ramp.wav", 48000, &samples)
        .expect("Failed to write fixture");

    let buffer = load_wav(&path).expect("Load should succeed");
    let mut session = PlaybackSession::new(buffer, Strengths::new(5, 5).unwrap());

    let (produced, _) = drain(&mut session, &[128]);
    assert_eq!(produced, samples);
}

#[test]
fn test_full_cancellation_removes_centered_signal() {
    let fixtures = WavFixtures::new().expect("Failed to create fixtures");
    let center = sine_frames(500, 44100, 220.0, 0.5, false);
    let path = fixtures
        .stereo_i16("center.wav", 44100, &center)
        .expect("Failed to write fixture");

    let buffer = load_wav(&path).expect("Load should succeed");
    let mut session = PlaybackSession::new(buffer, Strengths::new(0, 1).unwrap());

    let (produced, _) = drain(&mut session, &[100]);
    assert_eq!(produced.len(), center.len());
    assert!(produced.iter().all(|&s| s == 0));
}

#[test]
fn test_full_mono_collapses_opposed_channels() {
    let left: Vec<i16> = (0..200).map(|i| (i * 50) as i16).collect();
    let right: Vec<i16> = left.iter().map(|&s| -s).collect();

    let fixtures = WavFixtures::new().expect("Failed to create fixtures");
    let path = fixtures
        .stereo_i16("wide.wav", 44100, &interleave(&left, &right))
        .expect("Failed to write fixture");

    let buffer = load_wav(&path).expect("Load should succeed");
    let mut session = PlaybackSession::new(buffer, Strengths::new(1, 0).unwrap());

    let (produced, _) = drain(&mut session, &[33]);
    assert!(produced.iter().all(|&s| s == 0));
}

#[test]
fn test_retune_mid_playback() {
    let fixtures = WavFixtures::new().expect("Failed to create fixtures");
    let samples: Vec<i16> = [100i16, -60].repeat(8);
    let path = fixtures
        .stereo_i16("steady.wav", 44100, &samples)
        .expect("Failed to write fixture");

    let buffer = load_wav(&path).expect("Load should succeed");
    let control = StrengthControl::new(Strengths::new(1, 1).unwrap());
    let mut session = PlaybackSession::with_control(buffer, control.clone());

    let mut output = [StereoFrame::zero(); 4];
    assert_eq!(session.produce_frames(&mut output), 4);
    assert!(output.iter().all(|&f| f == StereoFrame::from_stereo(100, -60)));

    control.set_mono(0).unwrap();
    assert_eq!(session.produce_frames(&mut output), 4);
    assert!(output.iter().all(|&f| f == StereoFrame::from_stereo(80, -80)));

    // Rejected pair leaves the running transform alone
    assert!(control.set_cancel(0).is_err());
    assert_eq!(session.produce_frames(&mut output), 4);
    assert!(output.iter().all(|&f| f == StereoFrame::from_stereo(80, -80)));

    control.store(Strengths::new(1, 0).unwrap());
    assert_eq!(session.produce_frames(&mut output), 4);
    assert!(output.iter().all(|&f| f == StereoFrame::from_stereo(20, 20)));

    assert_eq!(session.produce_frames(&mut output), 0);
    assert!(session.is_exhausted());
}

#[test]
fn test_retune_from_another_thread() {
    let fixtures = WavFixtures::new().expect("Failed to create fixtures");
    let path = fixtures
        .stereo_i16("long.wav", 44100, &[100i16, -60].repeat(20_000))
        .expect("Failed to write fixture");

    let buffer = load_wav(&path).expect("Load should succeed");
    let control = StrengthControl::new(Strengths::new(1, 1).unwrap());
    let session = PlaybackSession::with_control(buffer, control.clone());

    let allowed = [
        StereoFrame::from_stereo(100, -60),
        StereoFrame::from_stereo(20, 20),
    ];

    let player = std::thread::spawn(move || {
        let mut session = session;
        let mut output = [StereoFrame::zero(); 64];
        loop {
            let written = session.produce_frames(&mut output);
            if written == 0 {
                break;
            }
            // Every frame comes from one consistent strength pair
            assert!(output[..written].iter().all(|f| allowed.contains(f)));
        }
        session.frames_played()
    });

    for i in 0..1000 {
        let strengths = if i % 2 == 0 {
            Strengths::new(1, 0).unwrap()
        } else {
            Strengths::new(1, 1).unwrap()
        };
        control.store(strengths);
    }

    assert_eq!(player.join().expect("player thread panicked"), 20_000);
}
