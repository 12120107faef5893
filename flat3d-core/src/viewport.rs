/// Per-frame orchestration: hooks, projection, shading and painting
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{require_positive, RenderError};
use crate::markers::{Instrumentation, Markers, NoopInstrumentation};
use crate::projection::{Camera, NormalizedPolygon, ScreenGeometry};
use crate::scheduler::Scheduler;
use crate::shading;
use crate::surface::Surface;
use crate::world::World;

const MARKER: &str = "viewport";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportOptions {
    /// Pixels per world unit at depth 1.
    pub scale: f64,
    /// Frame-rate cap; `None` renders on every tick.
    pub fps_limit: Option<f64>,
    pub background: Color,
    /// Collect stage timings with [`Markers`].
    pub profile: bool,
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            fps_limit: None,
            background: Color::WHITE,
            profile: false,
        }
    }
}

/// What a frame hook can touch.
pub struct FrameContext<'a> {
    pub world: &'a mut World,
    pub camera: &'a mut Camera,
    pub surface: &'a mut dyn Surface,
    pub screen: ScreenGeometry,
    /// Milliseconds since the previous frame.
    pub frame_time: f64,
    running: &'a mut bool,
}

impl FrameContext<'_> {
    /// Stop scheduling after the current frame completes.
    pub fn pause(&mut self) {
        *self.running = false;
    }

    pub fn is_running(&self) -> bool {
        *self.running
    }
}

pub type FrameHook = Box<dyn FnMut(&mut FrameContext<'_>)>;

/// Owns the camera and the draw surface and renders a [`World`] into it.
pub struct Viewport<S: Surface> {
    camera: Camera,
    surface: S,
    scale: f64,
    fps_limit: Option<f64>,
    background: Color,
    width: f64,
    height: f64,
    before_draw: Option<FrameHook>,
    after_draw: Option<FrameHook>,
    instrumentation: Box<dyn Instrumentation>,
    running: bool,
    last_timestamp: Option<f64>,
}

impl<S: Surface> Viewport<S> {
    pub fn new(camera: Camera, surface: S, options: ViewportOptions) -> Result<Self, RenderError> {
        let scale = require_positive("viewport.scale", options.scale)?;
        let fps_limit = options
            .fps_limit
            .map(|fps| require_positive("viewport.fps_limit", fps))
            .transpose()?;
        let instrumentation: Box<dyn Instrumentation> = if options.profile {
            Box::new(Markers::new())
        } else {
            Box::new(NoopInstrumentation)
        };

        let mut viewport = Self {
            camera,
            surface,
            scale,
            fps_limit,
            background: options.background,
            width: 0.0,
            height: 0.0,
            before_draw: None,
            after_draw: None,
            instrumentation,
            running: false,
            last_timestamp: None,
        };
        viewport.resize()?;
        tracing::debug!(
            width = viewport.width,
            height = viewport.height,
            scale,
            ?fps_limit,
            profile = options.profile,
            "viewport created"
        );
        Ok(viewport)
    }

    /// Replace the instrumentation chosen from the options.
    pub fn with_instrumentation(mut self, instrumentation: Box<dyn Instrumentation>) -> Self {
        self.instrumentation = instrumentation;
        self
    }

    /// Hook run before projection; the place to advance the simulation.
    pub fn on_before_draw(&mut self, hook: impl FnMut(&mut FrameContext<'_>) + 'static) {
        self.before_draw = Some(Box::new(hook));
    }

    /// Hook run after the frame is painted, e.g. for overlays.
    pub fn on_after_draw(&mut self, hook: impl FnMut(&mut FrameContext<'_>) + 'static) {
        self.after_draw = Some(Box::new(hook));
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn instrumentation(&self) -> &dyn Instrumentation {
        self.instrumentation.as_ref()
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    pub fn screen(&self) -> ScreenGeometry {
        ScreenGeometry::new(self.width, self.height, self.scale)
    }

    /// Delay between frames implied by the FPS cap. Caps too small to
    /// represent saturate at `Duration::MAX`.
    pub fn frame_delay(&self) -> Duration {
        self.fps_limit.map_or(Duration::ZERO, |fps| {
            Duration::try_from_secs_f64(1.0 / fps).unwrap_or(Duration::MAX)
        })
    }

    /// Pick up the current surface size.
    pub fn resize(&mut self) -> Result<(), RenderError> {
        let (width, height) = self.surface.resize()?;
        self.width = width as f64;
        self.height = height as f64;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.surface.clear(self.background);
    }

    /// Fill in the colour of every projected polygon.
    pub fn lighting(&self, world: &World, polygons: &mut [NormalizedPolygon]) {
        let far = self.camera.distance();
        for record in polygons.iter_mut() {
            if let Some((color, alpha)) = shading::shade(world, record, self.background, far) {
                record.color = color;
                record.alpha = alpha;
            }
        }
    }

    /// Paint polygons in the given (far-to-near) order over the background.
    pub fn draw(&mut self, polygons: &[NormalizedPolygon]) {
        self.clear();
        for record in polygons {
            self.surface.fill_triangle(&record.points, record.color, record.alpha);
        }
    }

    /// Render one frame of `world`.
    pub fn render_frame(&mut self, world: &mut World, frame_time: f64) -> Result<(), RenderError> {
        let _span = tracing::trace_span!("frame", frame_time).entered();
        self.instrumentation.start(MARKER);

        self.run_hook(HookSlot::Before, world, frame_time);
        self.instrumentation.log(MARKER, "beforedraw");

        self.resize()?;
        self.instrumentation.log(MARKER, "resize");

        let screen = self.screen();
        let mut polygons = self
            .camera
            .normalize_polygons(world, &screen, self.instrumentation.as_mut());
        self.instrumentation.log(MARKER, "normalize");

        self.lighting(world, &mut polygons);
        self.instrumentation.log(MARKER, "lighting");

        self.draw(&polygons);
        self.surface.present()?;
        self.instrumentation.log(MARKER, "draw");

        self.run_hook(HookSlot::After, world, frame_time);
        self.instrumentation.log(MARKER, "afterdraw");

        self.instrumentation.stop(MARKER);
        tracing::trace!(polygons = polygons.len(), "frame rendered");
        Ok(())
    }

    /// Handle one display tick at `timestamp` ms. Renders only while running.
    pub fn tick(&mut self, world: &mut World, timestamp: f64) -> Result<bool, RenderError> {
        if !self.running {
            return Ok(false);
        }
        let frame_time = self.last_timestamp.map_or(0.0, |last| timestamp - last);
        self.last_timestamp = Some(timestamp);
        self.render_frame(world, frame_time)?;
        Ok(true)
    }

    /// Render frames until paused or until the scheduler runs dry.
    pub fn play(&mut self, world: &mut World, scheduler: &mut impl Scheduler) -> Result<(), RenderError> {
        self.running = true;
        tracing::debug!("viewport play");

        while self.running {
            let Some(timestamp) = scheduler.next_frame() else {
                break;
            };
            self.tick(world, timestamp)?;
            if self.running {
                scheduler.delay(self.frame_delay());
            }
        }

        tracing::debug!(running = self.running, "viewport stopped");
        Ok(())
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn resume(&mut self) {
        self.running = true;
    }

    pub fn toggle(&mut self) {
        self.running = !self.running;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    fn run_hook(&mut self, slot: HookSlot, world: &mut World, frame_time: f64) {
        let screen = self.screen();
        let hook = match slot {
            HookSlot::Before => self.before_draw.as_mut(),
            HookSlot::After => self.after_draw.as_mut(),
        };
        if let Some(hook) = hook {
            let mut ctx = FrameContext {
                world,
                camera: &mut self.camera,
                surface: &mut self.surface,
                screen,
                frame_time,
                running: &mut self.running,
            };
            hook(&mut ctx);
        }
    }
}

#[derive(Clone, Copy)]
enum HookSlot {
    Before,
    After,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{Mesh, MeshOptions};
    use crate::projection::CameraOptions;
    use crate::scheduler::ManualScheduler;
    use crate::surface::BufferSurface;
    use crate::transform::Transformable;
    use nalgebra::{Point3, Vector3};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn viewport(options: ViewportOptions) -> Viewport<BufferSurface> {
        let camera = Camera::new(CameraOptions {
            position: Point3::new(0.0, 0.0, -10.0),
            ..CameraOptions::default()
        })
        .unwrap();
        Viewport::new(camera, BufferSurface::new(80, 60), options).unwrap()
    }

    fn scaled() -> ViewportOptions {
        ViewportOptions {
            scale: 400.0,
            background: Color::BLACK,
            ..ViewportOptions::default()
        }
    }

    #[test]
    fn test_rejects_bad_options() {
        let camera = Camera::new(CameraOptions::default()).unwrap();
        let bad = Viewport::new(
            camera.clone(),
            BufferSurface::new(4, 4),
            ViewportOptions {
                scale: 0.0,
                ..ViewportOptions::default()
            },
        );
        assert!(bad.is_err());

        let bad = Viewport::new(
            camera,
            BufferSurface::new(4, 4),
            ViewportOptions {
                fps_limit: Some(-30.0),
                ..ViewportOptions::default()
            },
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_screen_follows_surface() {
        let mut viewport = viewport(scaled());
        assert_eq!(viewport.screen(), ScreenGeometry::new(80.0, 60.0, 400.0));

        viewport.surface_mut().set_size(100, 50);
        viewport.resize().unwrap();
        assert_eq!(viewport.screen().width, 100.0);
        assert_eq!(viewport.screen().height, 50.0);
    }

    #[test]
    fn test_frame_delay_from_fps_limit() {
        assert_eq!(viewport(scaled()).frame_delay(), Duration::ZERO);
        let capped = viewport(ViewportOptions {
            fps_limit: Some(50.0),
            ..scaled()
        });
        assert_eq!(capped.frame_delay(), Duration::from_millis(20));
    }

    #[test]
    fn test_tiny_fps_limit_saturates_delay() {
        let crawling = viewport(ViewportOptions {
            fps_limit: Some(1e-30),
            ..scaled()
        });
        assert_eq!(crawling.frame_delay(), Duration::MAX);

        // one frame still renders; the scheduler receives the saturated delay
        let mut world = World::new();
        let mut crawling = crawling;
        let mut scheduler = ManualScheduler::fixed(1, 16.0);
        crawling.play(&mut world, &mut scheduler).unwrap();
        assert_eq!(scheduler.delays(), &[Duration::MAX]);
    }

    #[test]
    fn test_render_frame_paints_cube() {
        let mut viewport = viewport(scaled());
        let mut world = World::new();
        world.add(Mesh::cube(MeshOptions::default().colored(Color::new(200.0, 0.0, 0.0)).with_mix(0.0), 2.0));

        viewport.render_frame(&mut world, 16.0).unwrap();
        let centre = viewport.surface().pixel(40, 30).unwrap();
        assert!(centre.r > 150.0, "centre pixel {centre:?}");
        assert_eq!(viewport.surface().pixel(0, 0), Some(Color::BLACK));
    }

    #[test]
    fn test_hooks_run_in_order_with_frame_time() {
        let mut viewport = viewport(scaled());
        let log = Rc::new(RefCell::new(Vec::new()));

        let before = Rc::clone(&log);
        viewport.on_before_draw(move |ctx| before.borrow_mut().push(("before", ctx.frame_time)));
        let after = Rc::clone(&log);
        viewport.on_after_draw(move |ctx| after.borrow_mut().push(("after", ctx.frame_time)));

        let mut world = World::new();
        let mut scheduler = ManualScheduler::new([100.0, 116.0, 150.0]);
        viewport.play(&mut world, &mut scheduler).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                ("before", 0.0),
                ("after", 0.0),
                ("before", 16.0),
                ("after", 16.0),
                ("before", 34.0),
                ("after", 34.0),
            ]
        );
    }

    #[test]
    fn test_before_draw_mutations_are_rendered() {
        let mut viewport = viewport(scaled());
        let mut world = World::new();
        let cube = world.add(Mesh::cube(MeshOptions::at(100.0, 0.0, 0.0).with_mix(0.0), 2.0));

        viewport.on_before_draw(move |ctx| {
            if let Some(mesh) = ctx.world.mesh_mut(cube) {
                mesh.move_to(Point3::origin());
            }
        });
        viewport.render_frame(&mut world, 0.0).unwrap();

        assert_ne!(viewport.surface().pixel(40, 30), Some(Color::BLACK));
    }

    #[test]
    fn test_pause_from_hook_finishes_frame() {
        let mut viewport = viewport(ViewportOptions {
            fps_limit: Some(100.0),
            ..scaled()
        });
        let frames = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&frames);
        viewport.on_before_draw(move |ctx| {
            *counter.borrow_mut() += 1;
            if *counter.borrow() == 2 {
                ctx.pause();
            }
        });
        let after_frames = Rc::new(RefCell::new(0));
        let after_counter = Rc::clone(&after_frames);
        viewport.on_after_draw(move |_| *after_counter.borrow_mut() += 1);

        let mut world = World::new();
        let mut scheduler = ManualScheduler::fixed(10, 10.0);
        viewport.play(&mut world, &mut scheduler).unwrap();

        assert_eq!(*frames.borrow(), 2);
        assert_eq!(*after_frames.borrow(), 2, "paused frame still completes");
        assert!(!viewport.is_running());
        assert_eq!(scheduler.remaining(), 8);
        assert_eq!(scheduler.delays(), &[Duration::from_millis(10)]);
    }

    #[test]
    fn test_tick_while_paused_does_nothing() {
        let mut viewport = viewport(scaled());
        let mut world = World::new();
        assert!(!viewport.tick(&mut world, 5.0).unwrap());

        viewport.resume();
        assert!(viewport.tick(&mut world, 5.0).unwrap());
        viewport.toggle();
        assert!(!viewport.is_running());
    }

    #[test]
    fn test_camera_moves_from_hook() {
        let mut viewport = viewport(scaled());
        viewport.on_before_draw(|ctx| ctx.camera.move_by(Vector3::new(0.0, 0.0, 1.0)));
        let mut world = World::new();
        viewport.render_frame(&mut world, 0.0).unwrap();
        assert_eq!(viewport.camera().position(), Point3::new(0.0, 0.0, -9.0));
    }

    #[test]
    fn test_profile_collects_stage_timings() {
        let mut viewport = viewport(ViewportOptions {
            profile: true,
            ..scaled()
        });
        let mut world = World::new();
        world.add(Mesh::cube(MeshOptions::default(), 1.0));
        viewport.resume();
        for t in [0.0, 16.0, 32.0] {
            viewport.tick(&mut world, t).unwrap();
        }

        let markers = viewport.instrumentation();
        assert_eq!(markers.count("viewport", None), 3);
        assert_eq!(markers.count("viewport", Some("lighting")), 3);
        assert_eq!(markers.count("camera", None), 3);
    }

    #[test]
    fn test_default_instrumentation_is_silent() {
        let mut viewport = viewport(scaled());
        let mut world = World::new();
        viewport.render_frame(&mut world, 0.0).unwrap();
        assert_eq!(viewport.instrumentation().count("viewport", None), 0);
    }
}
