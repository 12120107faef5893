/// Render the demo scene off-screen and print stage timings
///
/// Drives the viewport with a synthetic clock, so the output is the same on
/// every run apart from the timings. Usage:
///   cargo run --example headless -- [frames]
use flat3d_core::{BufferSurface, Camera, ManualScheduler, Viewport};
use flat3d_terminal::scene;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("info"))
        .with_writer(std::io::stderr)
        .init();

    let frames: usize = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => 120,
    };

    let mut config = scene::config();
    config.viewport.fps_limit = None;
    config.viewport.profile = true;

    let mut world = flat3d_core::World::new();
    let demo = scene::build(&mut world)?;

    let camera = Camera::new(config.camera)?;
    let mut viewport = Viewport::new(camera, BufferSurface::new(320, 192), config.viewport)?;
    viewport.on_before_draw(move |ctx| scene_step(ctx, &demo));

    let mut clock = ManualScheduler::fixed(frames, 1000.0 / 60.0);
    viewport.play(&mut world, &mut clock)?;

    let background = viewport.background().to_rgb8();
    let covered = viewport
        .surface()
        .pixels()
        .iter()
        .filter(|&&px| px != background)
        .count();
    println!(
        "rendered {frames} frames, {covered} of {} pixels covered",
        viewport.surface().pixels().len()
    );

    viewport.instrumentation().report();
    Ok(())
}

fn scene_step(ctx: &mut flat3d_core::FrameContext<'_>, demo: &flat3d_terminal::DemoScene) {
    flat3d_terminal::animate(ctx.world, demo, ctx.frame_time);
}
