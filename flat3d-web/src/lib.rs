/// flat3d Web - draws the renderer onto an HTML `<canvas>`
///
/// The page drives frames from `requestAnimationFrame`:
///
/// ```js
/// const renderer = new WebRenderer("scene");
/// const loop = (ts) => { renderer.frame(ts); requestAnimationFrame(loop); };
/// requestAnimationFrame(loop);
/// ```
use flat3d_core::{
    Camera, CameraOptions, Color, Light, LightOptions, Mesh, MeshOptions, ObjectId, OrbitRig,
    RenderError, Rotation, Surface, Transformable, Viewport, ViewportOptions, World,
};
use nalgebra::{Point2, Point3};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// CSS colour string for a fill or stroke style.
pub fn css_color(color: Color, alpha: f64) -> String {
    let [r, g, b] = color.to_rgb8();
    format!("rgba({r}, {g}, {b}, {})", alpha.clamp(0.0, 1.0))
}

/// Surface over a 2D canvas context. The backing store follows the element's
/// on-screen size times the device pixel ratio.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let context = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { canvas, context })
    }

    /// Look up a canvas by element id.
    pub fn by_id(id: &str) -> Result<Self, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas = document
            .get_element_by_id(id)
            .ok_or_else(|| JsValue::from_str(&format!("no element #{id}")))?
            .dyn_into::<HtmlCanvasElement>()?;
        Self::new(canvas)
    }
}

impl Surface for CanvasSurface {
    fn resize(&mut self) -> Result<(u32, u32), RenderError> {
        let ratio = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
        let rect = self.canvas.get_bounding_client_rect();
        let width = (rect.width() * ratio).round() as u32;
        let height = (rect.height() * ratio).round() as u32;
        if width != self.canvas.width() || height != self.canvas.height() {
            self.canvas.set_width(width);
            self.canvas.set_height(height);
        }
        Ok((width, height))
    }

    fn clear(&mut self, color: Color) {
        self.context.set_fill_style_str(&css_color(color, 1.0));
        self.context.fill_rect(
            0.0,
            0.0,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        );
    }

    fn fill_triangle(&mut self, points: &[Point2<f64>; 3], color: Color, alpha: f64) {
        let style = css_color(color, alpha);
        let [a, b, c] = points;

        self.context.begin_path();
        self.context.move_to(a.x, a.y);
        self.context.line_to(b.x, b.y);
        self.context.line_to(c.x, c.y);
        self.context.close_path();

        self.context.set_fill_style_str(&style);
        self.context.fill();
        // stroke closes the hairline gaps between neighbouring triangles
        self.context.set_stroke_style_str(&style);
        self.context.set_line_width(1.0);
        self.context.stroke();
    }
}

/// Browser entry point: a small lit scene rendered on one canvas.
#[wasm_bindgen]
pub struct WebRenderer {
    viewport: Viewport<CanvasSurface>,
    world: World,
    rig: OrbitRig,
}

fn js_error(err: RenderError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Turn the view around the rig's pivot, which stays in the middle of the
/// canvas.
fn orbit_camera(rig: &mut OrbitRig, camera: &mut Camera, dx: f64, dy: f64) {
    rig.orbit(Rotation::new(dx, dy, 0.0));
    rig.place(camera);
}

fn spin(world: &mut World, ids: &[ObjectId], frame_time: f64) {
    let delta = Rotation::new(frame_time * 0.04, frame_time * 0.025, 0.0);
    for &id in ids {
        if let Some(mesh) = world.mesh_mut(id) {
            let pivot = mesh.position();
            mesh.rotate(&pivot, delta);
        }
    }
}

#[wasm_bindgen]
impl WebRenderer {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> Result<WebRenderer, JsValue> {
        let surface = CanvasSurface::by_id(canvas_id)?;
        let rig = OrbitRig::new(Point3::origin(), 8.0);
        let camera = Camera::new(CameraOptions {
            position: rig.eye(),
            rotation: rig.orientation(),
            ..CameraOptions::default()
        })
        .map_err(js_error)?;
        let options = ViewportOptions {
            scale: 120.0,
            background: Color::new(245.0, 245.0, 250.0),
            ..ViewportOptions::default()
        };
        let mut viewport = Viewport::new(camera, surface, options).map_err(js_error)?;

        let mut world = World::new();
        let cube = MeshOptions::at(-1.8, 0.0, 0.0).colored(Color::new(70.0, 110.0, 220.0));
        let globe = MeshOptions::at(1.8, 0.0, 0.0).colored(Color::new(200.0, 80.0, 80.0));
        let spinning = vec![
            world.add(Mesh::cube(cube, 2.0)),
            world.add(Mesh::sphere(globe, 2.0, 16)),
        ];
        let lamp = Light::new(LightOptions {
            position: Point3::new(0.0, 3.0, -4.0),
            intensity: 0.8,
            distance: 20.0,
            size: 0.3,
            quality: 6,
            ..LightOptions::default()
        })
        .map_err(js_error)?;
        world.add(lamp);

        viewport.on_before_draw(move |ctx| spin(ctx.world, &spinning, ctx.frame_time));
        viewport.resume();
        tracing::debug!(canvas = canvas_id, objects = world.len(), "web renderer attached");

        Ok(WebRenderer {
            viewport,
            world,
            rig,
        })
    }

    /// Render one animation frame. Returns `false` while paused.
    pub fn frame(&mut self, timestamp: f64) -> Result<bool, JsValue> {
        self.viewport.tick(&mut self.world, timestamp).map_err(js_error)
    }

    /// Orbit the camera around the origin (degrees).
    pub fn orbit(&mut self, dx: f64, dy: f64) {
        orbit_camera(&mut self.rig, self.viewport.camera_mut(), dx, dy);
    }

    pub fn toggle(&mut self) {
        self.viewport.toggle();
    }

    pub fn is_running(&self) -> bool {
        self.viewport.is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_color() {
        assert_eq!(css_color(Color::new(255.0, 128.0, 0.0), 1.0), "rgba(255, 128, 0, 1)");
        assert_eq!(css_color(Color::new(300.0, -5.0, 10.4), 0.5), "rgba(255, 0, 10, 0.5)");
        assert_eq!(css_color(Color::BLACK, 2.0), "rgba(0, 0, 0, 1)");
    }

    #[test]
    fn test_orbit_keeps_origin_centred() {
        let mut rig = OrbitRig::new(Point3::origin(), 8.0);
        let mut camera = Camera::new(CameraOptions {
            position: rig.eye(),
            ..CameraOptions::default()
        })
        .unwrap();
        let screen = flat3d_core::ScreenGeometry::new(640.0, 480.0, 120.0);

        for (dx, dy) in [(15.0, 0.0), (15.0, 10.0), (60.0, -25.0), (-120.0, 5.0)] {
            orbit_camera(&mut rig, &mut camera, dx, dy);
            let centre = camera.normalize_coords(&screen, &Point3::origin()).unwrap();
            assert!((centre.x - 320.0).abs() < 1e-6, "{centre:?}");
            assert!((centre.y - 240.0).abs() < 1e-6, "{centre:?}");
        }
        assert!((camera.position().coords.norm() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_spin_keeps_meshes_in_place() {
        let mut world = World::new();
        let id = world.add(Mesh::cube(MeshOptions::at(1.0, 2.0, 3.0), 1.0));
        spin(&mut world, &[id], 16.0);
        let mesh = world.mesh(id).unwrap();
        assert_eq!(mesh.orientation(), Rotation::new(0.64, 0.4, 0.0));
        assert!((mesh.position() - Point3::new(1.0, 2.0, 3.0)).norm() < 1e-12);
    }
}
