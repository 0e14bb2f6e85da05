//! Resampling behaviour observed through the whole provider.

use contracts::ProviderBlueprint;
use ingestion::MockTransport;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::common::*;

#[tokio::test(start_paused = true)]
async fn test_two_frames_bridge_to_three_monotonic_steps() {
    let (mut provider, seen) = recording_provider(ProviderBlueprint::default());
    let transport = MockTransport::new("mock")
        .frame_after(ms(0), v2_frame(0.0))
        .frame_after(ms(25), v2_frame(900.0));

    provider.start_with(transport, Vec::new()).await.unwrap();
    tokio::time::sleep(ms(80)).await;
    provider.stop().await;

    let fresh = fresh_pitches(&seen);
    assert_eq!(fresh.len(), 3);
    assert!(approx(fresh[0], 0.0));
    assert!(approx(fresh[1], PITCH_900_MRAD_DEG / 2.0));
    assert!(approx(fresh[2], PITCH_900_MRAD_DEG));
    assert_consecutive(&seen);

    let stats = provider.stats();
    assert_eq!(stats.ingestion.frames_received, 2);
    assert_eq!(stats.ingestion.pairs_bridged, 1);
    assert_eq!(stats.delivery.synthetic, 1);
}

#[tokio::test(start_paused = true)]
async fn test_starved_queue_repeats_last_sample() {
    let (mut provider, seen) = recording_provider(ProviderBlueprint::default());
    let transport = MockTransport::new("mock")
        .frame_after(ms(0), v2_frame(100.0))
        .frame_after(ms(10), v2_frame(200.0));

    provider.start_with(transport, Vec::new()).await.unwrap();
    // Well inside the 200 ms no-data threshold
    tokio::time::sleep(ms(120)).await;
    provider.stop().await;

    let seen = seen.lock().unwrap();
    let repeats: Vec<_> = seen.iter().filter(|u| u.repeated).collect();
    assert!(repeats.len() >= 5, "got {} repeats", repeats.len());
    let last_fresh = seen.iter().filter(|u| !u.repeated).last().unwrap();
    for update in repeats {
        assert_eq!(update.current, last_fresh.current);
        assert_eq!(update.previous, update.current);
        assert!(update.connected);
    }
}

#[tokio::test(start_paused = true)]
async fn test_silence_marks_link_down_and_stops_emission() {
    let (mut provider, seen) = recording_provider(ProviderBlueprint::default());
    let transport = MockTransport::new("mock")
        .frame_after(ms(0), v2_frame(0.0))
        .frame_after(ms(10), v2_frame(10.0));

    provider.start_with(transport, Vec::new()).await.unwrap();
    tokio::time::sleep(ms(100)).await;
    assert!(provider.is_connected());
    assert!(provider.is_running());

    // Last frame at 10 ms; the link drops just after 210 ms
    tokio::time::sleep(ms(150)).await;
    assert!(!provider.is_connected());
    assert!(!provider.is_running());

    let count = seen.lock().unwrap().len();
    tokio::time::sleep(ms(300)).await;
    assert_eq!(seen.lock().unwrap().len(), count);
    provider.stop().await;

    let stats = provider.stats();
    assert_eq!(stats.ingestion.link_down_events, 1);
    assert!(stats.delivery.suppressed > 0);
}

#[tokio::test(start_paused = true)]
async fn test_jittered_arrivals_stay_monotonic() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut transport = MockTransport::new("jitter");
    for i in 0..40 {
        let delay = if i == 0 { 0 } else { rng.random_range(3..45) };
        transport = transport.frame_after(ms(delay), v2_frame(i as f64 * 10.0));
    }
    // A final gap of two periods guarantees the last frame is queued
    transport = transport.frame_after(ms(20), v2_frame(400.0));

    let (mut provider, seen) = recording_provider(ProviderBlueprint::default());
    provider.start_with(transport, Vec::new()).await.unwrap();
    tokio::time::sleep(ms(2_000)).await;
    provider.stop().await;

    let fresh = fresh_pitches(&seen);
    assert!(fresh.len() > 40, "got {} fresh updates", fresh.len());
    assert!(
        fresh.windows(2).all(|w| w[1] >= w[0]),
        "interpolated pitch went backwards: {fresh:?}"
    );
    assert!(approx(*fresh.last().unwrap(), 0.4 * 180.0 / std::f64::consts::PI));
    assert_consecutive(&seen);
}

#[tokio::test(start_paused = true)]
async fn test_undecodable_frames_do_not_break_the_stream() {
    let (mut provider, seen) = recording_provider(ProviderBlueprint::default());
    let transport = MockTransport::new("mock")
        .frame_after(ms(0), v2_frame(0.0))
        .frame_after(ms(10), "not;a;number;frame;0;0;0;0;0;0;0")
        .frame_after(ms(10), "1;2;3")
        .frame_after(ms(10), v2_frame(300.0));

    provider.start_with(transport, Vec::new()).await.unwrap();
    tokio::time::sleep(ms(100)).await;
    provider.stop().await;

    let stats = provider.stats();
    assert_eq!(stats.ingestion.frames_received, 4);
    assert_eq!(stats.ingestion.decode_failures, 1);
    assert_eq!(stats.ingestion.short_frames, 1);
    assert_eq!(stats.ingestion.pairs_bridged, 1);
    assert!(approx(
        *fresh_pitches(&seen).last().unwrap(),
        0.3 * 180.0 / std::f64::consts::PI
    ));
}
