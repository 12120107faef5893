/// Interactive terminal front-end for flat3d
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, terminal,
};
use flat3d_core::{
    Camera, FrameContext, OrbitRig, RealtimeScheduler, RenderError, Rotation, SceneConfig,
    Scheduler, Transformable, Viewport, World,
};
use nalgebra::Point3;
use std::io::{self, stdout};
use std::time::Duration;

pub mod scene;
pub mod surface;

pub use scene::DemoScene;
pub use surface::TerminalSurface;

/// Camera orbit step per key press, in degrees.
const ORBIT_STEP: f64 = 5.0;
const ZOOM_STEP: f64 = 0.5;

/// Caps another scheduler at a number of frames.
pub struct FrameBudget<S> {
    inner: S,
    remaining: Option<usize>,
}

impl<S: Scheduler> FrameBudget<S> {
    pub fn new(inner: S, frames: Option<usize>) -> Self {
        Self {
            inner,
            remaining: frames,
        }
    }
}

impl<S: Scheduler> Scheduler for FrameBudget<S> {
    fn next_frame(&mut self) -> Option<f64> {
        match &mut self.remaining {
            Some(0) => None,
            Some(n) => {
                *n -= 1;
                self.inner.next_frame()
            }
            None => self.inner.next_frame(),
        }
    }

    fn delay(&mut self, delay: Duration) {
        self.inner.delay(delay);
    }
}

/// What a key press asks the demo to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Quit,
    Orbit(Rotation),
    Zoom(f64),
    ToggleSpin,
}

impl Command {
    pub fn from_key(code: KeyCode) -> Option<Self> {
        let command = match code {
            KeyCode::Char('q') | KeyCode::Esc => Command::Quit,
            KeyCode::Left | KeyCode::Char('a') => Command::Orbit(Rotation::new(-ORBIT_STEP, 0.0, 0.0)),
            KeyCode::Right | KeyCode::Char('d') => Command::Orbit(Rotation::new(ORBIT_STEP, 0.0, 0.0)),
            KeyCode::Up | KeyCode::Char('w') => Command::Orbit(Rotation::new(0.0, ORBIT_STEP, 0.0)),
            KeyCode::Down | KeyCode::Char('s') => Command::Orbit(Rotation::new(0.0, -ORBIT_STEP, 0.0)),
            KeyCode::Char('+') | KeyCode::Char('=') => Command::Zoom(ZOOM_STEP),
            KeyCode::Char('-') => Command::Zoom(-ZOOM_STEP),
            KeyCode::Char(' ') => Command::ToggleSpin,
            _ => return None,
        };
        Some(command)
    }

    /// Apply to the frame; returns whether spinning should be toggled.
    pub fn apply(self, ctx: &mut FrameContext<'_>, rig: &mut OrbitRig) -> bool {
        match self {
            Command::Quit => ctx.pause(),
            Command::Orbit(angles) => {
                rig.orbit(angles);
                rig.place(ctx.camera);
            }
            Command::Zoom(step) => {
                rig.zoom(step);
                rig.place(ctx.camera);
            }
            Command::ToggleSpin => return true,
        }
        false
    }
}

/// Advance the demo animation by `frame_time` milliseconds.
pub fn animate(world: &mut World, scene: &DemoScene, frame_time: f64) {
    let spin = Rotation::new(frame_time * 0.03, frame_time * 0.02, 0.0);
    for &id in &scene.spinners {
        if let Some(mesh) = world.mesh_mut(id) {
            let pivot = mesh.position();
            mesh.rotate(&pivot, spin);
        }
    }
    if let Some(mesh) = scene.glider.and_then(|id| world.mesh_mut(id)) {
        mesh.rotate(&Point3::origin(), Rotation::new(frame_time * 0.05, 0.0, 0.0));
    }
}

/// Drains pending key events without blocking.
fn poll_commands() -> io::Result<Vec<Command>> {
    let mut commands = Vec::new();
    while event::poll(Duration::ZERO)? {
        if let Event::Key(KeyEvent { code, kind, .. }) = event::read()? {
            if kind == KeyEventKind::Release {
                continue;
            }
            commands.extend(Command::from_key(code));
        }
    }
    Ok(commands)
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    viewport: Viewport<TerminalSurface>,
    world: World,
}

impl TerminalApp {
    pub fn new(config: &SceneConfig) -> Result<Self, RenderError> {
        let camera = Camera::new(config.camera)?;
        // the first orbit or zoom key snaps a custom camera onto the rig
        let mut rig = scene::orbit_rig();
        let mut surface = TerminalSurface::stdout()?;
        surface.set_title("flat3d | arrows/WASD orbit, +/- zoom, space spin, q quit");
        let mut viewport = Viewport::new(camera, surface, config.viewport)?;

        let mut world = World::new();
        let scene = scene::build(&mut world)?;

        let mut spinning = true;
        viewport.on_before_draw(move |ctx| {
            match poll_commands() {
                Ok(commands) => {
                    for command in commands {
                        if command.apply(ctx, &mut rig) {
                            spinning = !spinning;
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(%err, "input polling failed");
                    ctx.pause();
                }
            }
            if spinning {
                animate(ctx.world, &scene, ctx.frame_time);
            }
        });

        Ok(Self { viewport, world })
    }

    pub fn viewport(&self) -> &Viewport<TerminalSurface> {
        &self.viewport
    }

    /// Run until the user quits or `frames` frames have been shown.
    pub fn run(&mut self, frames: Option<usize>) -> Result<(), RenderError> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let mut scheduler = FrameBudget::new(RealtimeScheduler::default(), frames);
        let result = self.viewport.play(&mut self.world, &mut scheduler);

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }
}
