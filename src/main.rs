// SPDX-License-Identifier: MPL-2.0
//! `toastline` playground: runs scripted toast scenarios against a headless
//! region and prints what a rendering layer would draw.

use iced_core::{mouse, Point};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use toastline::clock::ManualClock;
use toastline::config::{self, ToasterOptions};
use toastline::store::{FrameQueue, PromiseConfig, Store};
use toastline::toast::{Action, Content, ToastOptions};
use toastline::toaster::{PointerTarget, Toaster};
use toastline::{Error, Result};
use tracing_subscriber::EnvFilter;

const HELP: &str = "\
toastline playground

USAGE:
  toastline [OPTIONS]

OPTIONS:
  --scenario NAME   basic, promise, swipe or all (default: all)
  --config PATH     load region options from a TOML file
  -h, --help        print this help
";

struct Playground {
    frames: FrameQueue,
    store: Store,
    clock: Arc<ManualClock>,
    toaster: Toaster,
}

impl Playground {
    fn new(options: ToasterOptions) -> Self {
        let frames = FrameQueue::new();
        let store = Store::with_scheduler(Arc::new(frames.clone()));
        let clock = Arc::new(ManualClock::new());
        let toaster = Toaster::builder(store.clone(), options)
            .clock(clock.clone())
            .build();
        Self {
            frames,
            store,
            clock,
            toaster,
        }
    }

    /// Advances time, delivers pending tombstones and runs a region frame.
    fn step(&mut self, by: Duration) {
        self.clock.advance(by);
        self.frames.run_frame();
        self.toaster.tick();
    }

    fn print(&self, label: &str) {
        println!("-- {label} (t = {} ms)", self.clock.elapsed().as_millis());
        for group in self.toaster.view() {
            if group.toasts.is_empty() {
                continue;
            }
            println!("   [{}]", group.position);
            for view in &group.toasts {
                let title = view
                    .toast
                    .title
                    .as_ref()
                    .and_then(Content::resolve_text)
                    .unwrap_or_default();
                println!(
                    "     {:>8} {:<9} {:?} offset={} front={} removed={}",
                    view.toast.id.to_string(),
                    view.toast_type.as_str(),
                    title,
                    view.offset,
                    view.front,
                    view.removed
                );
            }
        }
    }
}

fn basic(options: &ToasterOptions) {
    let mut playground = Playground::new(options.clone());
    playground
        .store
        .message("Event has been created", ToastOptions::new());
    playground.store.success(
        "Profile saved",
        ToastOptions::new().description("All changes are synced"),
    );
    playground.store.message(
        "File moved to trash",
        ToastOptions::new().action(Action::new("Undo", |_| tracing::info!("undo clicked"))),
    );
    playground.step(Duration::ZERO);
    playground.print("three toasts");

    playground.step(Duration::from_millis(4000));
    playground.print("lifetime elapsed");

    playground.step(Duration::from_millis(200));
    playground.print("removed");
}

fn promise(options: &ToasterOptions) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let mut playground = Playground::new(options.clone());

    let config = PromiseConfig::<u32, String>::new()
        .loading("Uploading...")
        .success_with(|count: &u32| format!("{count} files uploaded"))
        .error_with(|failure| format!("Upload failed: {failure}"));
    let handle = runtime.block_on(async {
        playground.store.promise(
            async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(3)
            },
            Some(config),
        )
    });

    playground.step(Duration::ZERO);
    playground.print("loading");

    if let Some(handle) = handle {
        let outcome = runtime.block_on(handle.unwrap());
        tracing::info!(?outcome, "promise settled");
    }
    playground.step(Duration::ZERO);
    playground.print("settled");
    Ok(())
}

fn swipe(options: &ToasterOptions) {
    let mut playground = Playground::new(options.clone());
    let id = playground
        .store
        .info("Swipe me away", ToastOptions::new());
    playground.step(Duration::ZERO);

    let toaster = &mut playground.toaster;
    toaster.toast_pointer_down(&id, mouse::Button::Left, PointerTarget::Body, Point::ORIGIN);
    toaster.toast_pointer_move(&id, Point::new(30.0, 0.0));
    toaster.toast_pointer_move(&id, Point::new(60.0, 0.0));
    playground.clock.advance(Duration::from_millis(300));
    let release = playground.toaster.toast_pointer_up(&id);
    tracing::info!(?release, "pointer released");
    playground.print("swiped");

    playground.step(Duration::from_millis(200));
    playground.print("removed");
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let scenario: String = args
        .opt_value_from_str("--scenario")
        .map_err(|err| Error::Config(err.to_string()))?
        .unwrap_or_else(|| "all".to_string());
    let config_path: Option<PathBuf> = args
        .opt_value_from_str("--config")
        .map_err(|err| Error::Config(err.to_string()))?;

    let options = match config_path {
        Some(path) => config::load_from_path(&path)?,
        None => ToasterOptions::default(),
    };

    match scenario.as_str() {
        "basic" => basic(&options),
        "promise" => promise(&options)?,
        "swipe" => swipe(&options),
        "all" => {
            basic(&options);
            promise(&options)?;
            swipe(&options);
        }
        other => {
            return Err(Error::UnknownValue {
                field: "scenario",
                value: other.to_string(),
            })
        }
    }
    Ok(())
}
