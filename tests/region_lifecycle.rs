// SPDX-License-Identifier: MPL-2.0
use iced_core::{mouse, Point};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;
use toastline::clock::ManualClock;
use toastline::config::{self, defaults::GAP_PX, ToasterOptions};
use toastline::store::{FrameQueue, Store};
use toastline::toast::{Position, ToastId, ToastOptions};
use toastline::toaster::{PointerTarget, SimulatedProbe, SwipeOut, SwipeRelease, Toaster};

const MS: Duration = Duration::from_millis(1);

struct Harness {
    frames: FrameQueue,
    store: Store,
    clock: Arc<ManualClock>,
}

impl Harness {
    fn new() -> Self {
        let frames = FrameQueue::new();
        Self {
            store: Store::with_scheduler(Arc::new(frames.clone())),
            frames,
            clock: Arc::new(ManualClock::new()),
        }
    }

    fn region(&self, options: ToasterOptions) -> Toaster {
        Toaster::builder(self.store.clone(), options)
            .clock(self.clock.clone())
            .probe(Arc::new(SimulatedProbe::new(false)))
            .build()
    }

    /// Advances the clock, then runs the store frame and one region frame.
    fn step(&self, toaster: &mut Toaster, by: Duration) {
        self.clock.advance(by);
        self.frames.run_frame();
        toaster.tick();
    }
}

fn ids(toaster: &Toaster) -> Vec<ToastId> {
    toaster.toasts().iter().map(|toast| toast.id.clone()).collect()
}

#[test]
fn regions_project_only_their_own_toasts() {
    let h = Harness::new();
    let mut unnamed = h.region(ToasterOptions::default());
    let mut empty_id = h.region(ToasterOptions::default().with_id(""));
    let mut left = h.region(ToasterOptions::default().with_id("left"));
    let mut right = h.region(ToasterOptions::default().with_id("right"));

    let plain = h.store.message("plain", ToastOptions::new());
    let to_left = h
        .store
        .message("left", ToastOptions::new().toaster_id("left"));
    let to_right = h
        .store
        .message("right", ToastOptions::new().toaster_id("right"));

    for region in [&mut unnamed, &mut empty_id, &mut left, &mut right] {
        region.tick();
    }

    assert_eq!(ids(&unnamed), vec![plain.clone()]);
    assert_eq!(ids(&empty_id), vec![plain]);
    assert_eq!(ids(&left), vec![to_left]);
    assert_eq!(ids(&right), vec![to_right]);
}

#[test]
fn short_toast_auto_closes_then_unmounts_after_grace_delay() {
    let h = Harness::new();
    let mut toaster = h.region(ToasterOptions::default());
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    let id = h.store.message(
        "short",
        ToastOptions::new()
            .duration(20 * MS)
            .on_auto_close(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
    );
    h.step(&mut toaster, Duration::ZERO);

    h.step(&mut toaster, 19 * MS);
    assert_eq!(fired.load(Ordering::SeqCst), 0);

    h.step(&mut toaster, MS);
    assert_eq!(fired.load(Ordering::SeqCst), 1);

    h.step(&mut toaster, 199 * MS);
    assert_eq!(ids(&toaster), vec![id.clone()]);
    assert!(!h.store.is_dismissed(&id));

    h.step(&mut toaster, MS);
    assert!(toaster.toasts().is_empty());
    assert!(h.store.is_dismissed(&id));
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[test]
fn hovering_region_holds_timers() {
    let h = Harness::new();
    let mut toaster = h.region(ToasterOptions::default());
    h.store.message("one", ToastOptions::new().duration(50 * MS));
    let second = h
        .store
        .message("two", ToastOptions::new().duration(50 * MS));
    h.step(&mut toaster, Duration::ZERO);

    toaster.pointer_enter();
    h.step(&mut toaster, Duration::ZERO);
    h.step(&mut toaster, 500 * MS);
    assert!(!toaster.item(&second).is_some_and(|item| item.is_removed()));

    toaster.pointer_leave();
    h.step(&mut toaster, Duration::ZERO);
    h.step(&mut toaster, 49 * MS);
    assert!(!toaster.item(&second).is_some_and(|item| item.is_removed()));
    h.step(&mut toaster, MS);
    assert!(toaster.item(&second).is_some_and(|item| item.is_removed()));
}

#[test]
fn recreated_id_still_receives_pending_tombstone() {
    let h = Harness::new();
    let mut toaster = h.region(ToasterOptions::default());
    let id = h.store.message("first", ToastOptions::new().id("race"));
    h.step(&mut toaster, Duration::ZERO);

    h.store.dismiss(id.clone());
    h.store.message("second", ToastOptions::new().id("race"));
    assert!(!h.store.is_dismissed(&id));

    // The frame delivers the tombstone queued before the recreation.
    h.step(&mut toaster, Duration::ZERO);
    assert!(!toaster.toasts()[0].delete);
    h.step(&mut toaster, Duration::ZERO);
    assert!(toaster.toasts()[0].delete);

    h.step(&mut toaster, 200 * MS);
    assert!(toaster.toasts().is_empty());
    assert!(!h.store.is_dismissed(&id));
    assert_eq!(h.store.get_active_toasts().len(), 1);
}

#[test]
fn swipe_outcome_follows_distance_and_velocity() {
    let distances = [2.0_f32, 10.0, 30.0, 44.0, 45.0, 80.0];
    let durations = [5_u32, 50, 150, 1000];

    for distance in distances {
        for duration in durations {
            let h = Harness::new();
            let mut toaster = h.region(ToasterOptions::default());
            let dismissed = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&dismissed);
            let id = h.store.message(
                "swipe",
                ToastOptions::new().on_dismiss(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            );
            h.step(&mut toaster, Duration::ZERO);

            assert!(toaster.toast_pointer_down(
                &id,
                mouse::Button::Left,
                PointerTarget::Body,
                Point::ORIGIN
            ));
            toaster.toast_pointer_move(&id, Point::new(distance, 0.0));
            h.clock.advance(duration * MS);
            let release = toaster.toast_pointer_up(&id);

            let committed = distance >= 45.0 || distance / duration as f32 > 0.11;
            let case = format!("{distance}px over {duration}ms");
            if committed {
                assert_eq!(
                    release,
                    Some(SwipeRelease::Committed(SwipeOut::Right)),
                    "{case}"
                );
                assert_eq!(dismissed.load(Ordering::SeqCst), 1, "{case}");
                h.step(&mut toaster, 200 * MS);
                assert!(toaster.toasts().is_empty(), "{case}");
                assert!(h.store.is_dismissed(&id), "{case}");
            } else {
                assert_eq!(release, Some(SwipeRelease::Reset), "{case}");
                let item = toaster.item(&id).expect("still projected");
                assert!(!item.is_removed(), "{case}");
                assert_eq!(item.swipe_amount().x, 0.0, "{case}");
                assert_eq!(dismissed.load(Ordering::SeqCst), 0, "{case}");
            }
        }
    }
}

#[test]
fn swipe_against_allowed_directions_is_dampened() {
    let h = Harness::new();
    let mut toaster = h.region(ToasterOptions::default());
    let id = h.store.message("stay", ToastOptions::new());
    h.step(&mut toaster, Duration::ZERO);

    toaster.toast_pointer_down(&id, mouse::Button::Left, PointerTarget::Body, Point::ORIGIN);
    toaster.toast_pointer_move(&id, Point::new(-100.0, 0.0));
    let amount = toaster.item(&id).expect("projected").swipe_amount().x;
    assert!(amount < 0.0);
    assert!(amount > -100.0);
}

#[test]
fn secondary_button_does_not_start_swipe() {
    let h = Harness::new();
    let mut toaster = h.region(ToasterOptions::default());
    let id = h.store.message("stay", ToastOptions::new());
    h.step(&mut toaster, Duration::ZERO);

    assert!(!toaster.toast_pointer_down(
        &id,
        mouse::Button::Right,
        PointerTarget::Body,
        Point::ORIGIN
    ));
    assert!(!toaster.toast_pointer_move(&id, Point::new(80.0, 0.0)));
}

#[test]
fn options_loaded_from_toml_drive_the_region() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let path = dir.path().join("toaster.toml");
    std::fs::write(
        &path,
        r#"
id = "sidebar"
position = "top-center"
duration_ms = 20
gap = 0.0

[toast_defaults]
close_button = true
"#,
    )
    .expect("Failed to write config file");

    let options = config::load_from_path(&path).expect("Failed to load config");
    assert_eq!(options.position, Position::TopCenter);
    assert_eq!(options.gap(), GAP_PX);

    let h = Harness::new();
    let mut toaster = h.region(options);
    let id = h
        .store
        .message("routed", ToastOptions::new().toaster_id("sidebar"));
    h.store.message("elsewhere", ToastOptions::new());
    h.step(&mut toaster, Duration::ZERO);

    let groups = toaster.view();
    assert_eq!(groups[0].position, Position::TopCenter);
    assert_eq!(groups[0].toasts.len(), 1);
    assert!(groups[0].toasts[0].close_button);

    h.step(&mut toaster, 20 * MS);
    assert!(toaster.item(&id).is_some_and(|item| item.is_removed()));
}

#[test]
fn invalid_toml_falls_back_to_defaults() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let path = dir.path().join("toaster.toml");
    std::fs::write(&path, "position = [not toml").expect("Failed to write config file");

    let options = config::load_from_path(&path).expect("Failed to load config");
    assert_eq!(options, ToasterOptions::default());
}

#[test]
fn saved_options_round_trip_through_disk() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let path = dir.path().join("nested").join("toaster.toml");
    let mut options = ToasterOptions::default().with_id("main");
    options.prevent_duplicates = true;
    options.position = Position::BottomLeft;

    config::save_to_path(&options, &path).expect("Failed to save config");
    let loaded = config::load_from_path(&path).expect("Failed to load config");
    assert_eq!(loaded, options);
}
