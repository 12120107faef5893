/// The demo scene shown by the terminal binary
use flat3d_core::{
    CameraOptions, Color, Light, LightOptions, Mesh, MeshOptions, ObjectId, OrbitRig,
    RenderError, Rotation, SceneConfig, ViewportOptions, World,
};
use nalgebra::Point3;

/// Where the interactive camera starts: slightly above the scene, looking
/// at the origin.
pub fn orbit_rig() -> OrbitRig {
    let mut rig = OrbitRig::new(Point3::origin(), 14.0);
    rig.orbit(Rotation::new(0.0, 5.0, 0.0));
    rig
}

/// Camera and viewport framing [`build`] in a typical terminal window.
pub fn config() -> SceneConfig {
    let rig = orbit_rig();
    SceneConfig {
        camera: CameraOptions {
            position: rig.eye(),
            rotation: rig.orientation(),
            distance: 60.0,
            ..CameraOptions::default()
        },
        viewport: ViewportOptions {
            scale: 400.0,
            fps_limit: Some(30.0),
            background: Color::new(16.0, 16.0, 24.0),
            profile: false,
        },
    }
}

/// Objects the demo animates every frame.
#[derive(Debug, Clone, Default)]
pub struct DemoScene {
    /// Meshes that spin about their own centre.
    pub spinners: Vec<ObjectId>,
    /// Glider that circles the origin.
    pub glider: Option<ObjectId>,
    pub lamp: Option<ObjectId>,
}

/// A ring of cubes around a sphere, a paper glider and one visible lamp.
pub fn build(world: &mut World) -> Result<DemoScene, RenderError> {
    let mut scene = DemoScene::default();

    let palette = [
        Color::new(200.0, 60.0, 60.0),
        Color::new(60.0, 180.0, 90.0),
        Color::new(70.0, 110.0, 220.0),
        Color::new(220.0, 190.0, 70.0),
    ];
    for (i, color) in palette.into_iter().enumerate() {
        let angle = i as f64 * std::f64::consts::FRAC_PI_2;
        let options = MeshOptions::at(angle.cos() * 4.0, 0.0, angle.sin() * 4.0)
            .rotated(15.0 * i as f64, 30.0, 0.0)
            .colored(color)
            .with_mix(0.8);
        scene.spinners.push(world.add(Mesh::cube(options, 1.5)));
    }

    let globe = MeshOptions::default().colored(Color::new(140.0, 140.0, 160.0));
    scene.spinners.push(world.add(Mesh::sphere(globe, 2.0, 12)));

    let glider = MeshOptions::at(0.0, 2.5, -3.0)
        .colored(Color::WHITE)
        .with_alpha(0.85);
    scene.glider = Some(world.add(Mesh::glider(glider, 1.2, 0.4)));

    let lamp = Light::new(LightOptions {
        position: Point3::new(-3.0, 4.0, -5.0),
        color: Color::new(255.0, 240.0, 200.0),
        intensity: 0.9,
        distance: 30.0,
        size: 0.4,
        quality: 6,
    })?;
    scene.lamp = Some(world.add(lamp));

    tracing::debug!(objects = world.len(), "demo scene built");
    Ok(scene)
}
