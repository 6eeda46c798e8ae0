//! VAT demo session: a scripted annotation pass over a synthetic video
//! backed by the in-memory store.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use vat::message::Message;
    use vat::remote::FrameStore;
    use vat::scene::Scene;
    use vat::{AnnotatorApp, AppConfig, DrawMode, MemoryStore, SessionRuntime};
    use web_time::Duration;

    let config = AppConfig::default();
    env_logger::Builder::new()
        .filter_level(config.log_level.to_level_filter())
        .init();

    let mut store = MemoryStore::new();
    store.add_video("demo.mp4", 120, 2_000_000);

    let mut runtime = SessionRuntime::new(AnnotatorApp::new(&config), store);

    let Some(video) = runtime
        .store_mut()
        .list_videos()
        .ok()
        .and_then(|listing| listing.videos.first().map(|v| v.name.clone()))
    else {
        eprintln!("no videos available");
        return;
    };
    println!("API alive: {}", runtime.store_mut().liveness());
    println!("Annotating {video}");

    runtime.dispatch(Message::VideoSelected(video));

    // Draw a box on frame 0, then decorate it with point prompts.
    runtime.dispatch(Message::PointerDown { x: 100.0, y: 50.0 });
    runtime.dispatch(Message::PointerMove { x: 300.0, y: 200.0 });
    runtime.dispatch(Message::PointerUp);
    runtime.dispatch(Message::ModeSelected(DrawMode::PositivePoint));
    runtime.dispatch(Message::PointerDown { x: 200.0, y: 125.0 });
    runtime.dispatch(Message::ModeSelected(DrawMode::NegativePoint));
    runtime.dispatch(Message::PointerDown { x: 600.0, y: 400.0 });

    // Page forward with the hover prefetch warming the next click.
    runtime.dispatch(Message::HoverNext);
    runtime.dispatch(Message::NextFrame);
    runtime.advance(Duration::from_millis(250));
    runtime.dispatch(Message::NextFrame);

    // Kick off a segmentation run and come back to see the overlay.
    runtime.dispatch(Message::SeekFrame(0));
    runtime.dispatch(Message::SegmentRange { start: 0, end: 30 });
    runtime.dispatch(Message::SeekFrame(0));
    runtime.dispatch(Message::ToggleOverlay);

    match runtime.app().scene(runtime.now()) {
        Ok(Scene::Frame(frame)) => {
            println!(
                "Frame {}: background {:?}, {} draw commands",
                frame.frame_number,
                frame.background,
                frame.commands.len()
            );
        }
        Ok(other) => println!("Scene: {other:?}"),
        Err(e) => eprintln!("Scene error: {e}"),
    }
    println!(
        "Server saw {} annotation writes",
        runtime.store().write_log().len()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {}
