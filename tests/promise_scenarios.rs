// SPDX-License-Identifier: MPL-2.0
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use toastline::clock::ManualClock;
use toastline::config::ToasterOptions;
use toastline::store::{FrameQueue, HttpResponse, PromiseConfig, PromiseError, Settlement, Store};
use toastline::toast::{Content, ToastType};
use toastline::toaster::{SimulatedProbe, Toaster};

#[derive(Debug, Clone, PartialEq)]
struct Failure(String);

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn frame_store() -> (FrameQueue, Store) {
    let frames = FrameQueue::new();
    let store = Store::with_scheduler(Arc::new(frames.clone()));
    (frames, store)
}

#[tokio::test]
async fn success_resolver_output_becomes_title() {
    let (_, store) = frame_store();
    let handle = store
        .promise(
            async { Ok::<u32, Failure>(42) },
            Some(
                PromiseConfig::new()
                    .loading("Loading...")
                    .success_with(|value: &u32| format!("Got {value}")),
            ),
        )
        .expect("config given");

    assert_eq!(handle.unwrap().await, Ok(42));
    let history = store.get_history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].toast_type, ToastType::Success);
    assert_eq!(history[0].title, Some(Content::from("Got 42")));
}

#[tokio::test]
async fn rejection_shows_error_and_unwrap_rejects() {
    let (_, store) = frame_store();
    let handle = store
        .promise(
            async { Err::<u32, Failure>(Failure("Promise rejected".into())) },
            Some(
                PromiseConfig::new()
                    .loading("Loading...")
                    .error_with(|s: Settlement<'_, u32, Failure>| format!("Error: {s}")),
            ),
        )
        .expect("config given");

    assert_eq!(
        handle.unwrap().await,
        Err(PromiseError::Rejected(Failure("Promise rejected".into())))
    );
    let history = store.get_history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].toast_type, ToastType::Error);
    assert_eq!(
        history[0].title,
        Some(Content::from("Error: Promise rejected"))
    );
}

#[tokio::test]
async fn failed_response_uses_synthesized_message() {
    let (_, store) = frame_store();
    let handle = store
        .promise(
            async { Ok::<_, Failure>(HttpResponse::new(500, "x")) },
            Some(
                PromiseConfig::new()
                    .loading("L")
                    .error_with(|s: Settlement<'_, HttpResponse, Failure>| {
                        format!("HTTP Error: {s}")
                    })
                    .description_with(|s: Settlement<'_, HttpResponse, Failure>| {
                        format!("HTTP Description: {s}")
                    }),
            ),
        )
        .expect("config given");

    let response = handle.unwrap().await.expect("resolved");
    assert_eq!(response.status, 500);

    let toast = &store.get_history()[0];
    assert_eq!(toast.toast_type, ToastType::Error);
    assert_eq!(
        toast.title,
        Some(Content::from("HTTP Error: HTTP error! status: 500"))
    );
    assert_eq!(
        toast.description,
        Some(Content::from("HTTP Description: HTTP error! status: 500"))
    );
}

#[tokio::test]
async fn missing_config_is_ignored() {
    let (_, store) = frame_store();
    let handle = store.promise(async { Ok::<u32, Failure>(1) }, None);
    assert!(handle.is_none());
    assert!(store.get_history().is_empty());
}

#[tokio::test]
async fn region_shows_loading_then_settled_toast() {
    let (frames, store) = frame_store();
    let clock = Arc::new(ManualClock::new());
    let mut toaster = Toaster::builder(store.clone(), ToasterOptions::default())
        .clock(clock.clone())
        .probe(Arc::new(SimulatedProbe::new(false)))
        .build();

    let (release, wait) = tokio::sync::oneshot::channel::<()>();
    let handle = store
        .promise(
            async move {
                let _ = wait.await;
                Ok::<u32, Failure>(3)
            },
            Some(
                PromiseConfig::new()
                    .loading("Uploading")
                    .success_with(|count: &u32| format!("{count} uploaded")),
            ),
        )
        .expect("config given");

    toaster.tick();
    let id = handle.id().expect("loading toast").clone();
    assert_eq!(toaster.toasts()[0].toast_type, ToastType::Loading);

    // Loading toasts never auto-close.
    clock.advance(Duration::from_secs(30));
    toaster.tick();
    assert!(!toaster.item(&id).expect("projected").is_removed());

    release.send(()).expect("operation waiting");
    handle.unwrap().await.expect("resolved");
    frames.run_frame();
    toaster.tick();

    let toasts = toaster.toasts();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].toast_type, ToastType::Success);
    assert_eq!(toasts[0].title, Some(Content::from("3 uploaded")));
}

#[tokio::test]
async fn panicking_resolver_rejects_unwrap_and_clears_loading_toast() {
    let (frames, store) = frame_store();
    let clock = Arc::new(ManualClock::new());
    let mut toaster = Toaster::builder(store.clone(), ToasterOptions::default())
        .clock(clock.clone())
        .probe(Arc::new(SimulatedProbe::new(false)))
        .build();

    let handle = store
        .promise(
            async { Err::<u32, Failure>(Failure("boom".into())) },
            Some(PromiseConfig::new().loading("Working").error_with(
                |_: Settlement<'_, u32, Failure>| -> String { panic!("error resolver failed") },
            )),
        )
        .expect("config given");
    toaster.tick();
    let id = handle.id().expect("loading toast").clone();

    assert_eq!(
        handle.unwrap().await,
        Err(PromiseError::HandlerPanicked("error resolver failed".into()))
    );
    assert!(store.is_dismissed(&id));

    frames.run_frame();
    toaster.tick();
    toaster.tick();
    assert!(toaster.toasts()[0].delete);

    clock.advance(Duration::from_millis(200));
    toaster.tick();
    assert!(toaster.toasts().is_empty());
}
