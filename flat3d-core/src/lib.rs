/// flat3d core: a flat-shaded software 3D renderer
///
/// Meshes and point lights live in a [`World`]. Each frame a [`Viewport`]
/// asks its [`Camera`] to clip, cull and project every polygon, shades the
/// survivors, and paints them far-to-near onto a [`Surface`] (painter's
/// algorithm, no depth buffer).

pub mod color;
pub mod config;
pub mod error;
pub mod geometry;
pub mod light;
pub mod markers;
pub mod mesh;
pub mod orbit;
pub mod polygon;
pub mod projection;
pub mod scheduler;
pub mod shading;
pub mod shapes;
pub mod surface;
pub mod transform;
pub mod viewport;
pub mod world;

// Re-export commonly used types
pub use color::Color;
pub use config::SceneConfig;
pub use error::RenderError;
pub use light::{Light, LightOptions};
pub use markers::{Instrumentation, Markers, NoopInstrumentation};
pub use mesh::{Mesh, MeshOptions};
pub use orbit::OrbitRig;
pub use polygon::{Normals, Polygon};
pub use projection::{Camera, CameraOptions, NormalizedPolygon, Projection, ScreenGeometry};
pub use scheduler::{ManualScheduler, RealtimeScheduler, Scheduler};
pub use surface::{BufferSurface, Surface};
pub use transform::{Rotation, Transformable};
pub use viewport::{FrameContext, FrameHook, Viewport, ViewportOptions};
pub use world::{ObjectId, SceneObject, World};
