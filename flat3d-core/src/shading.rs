/// Flat per-polygon lighting
///
/// Luminosity of one light on a polygon is
/// `(1 - angle/90) * (1 - dist/light.distance) * intensity * mix`, where
/// `angle` is between the face normal and the direction to the light. The
/// running colour is blended towards the light colour by that amount, then
/// the result fades towards the background with distance from the camera.
use crate::color::Color;
use crate::geometry::{angle, distance, is_codirectional};
use crate::light::Light;
use crate::polygon::Normals;
use crate::projection::NormalizedPolygon;
use crate::world::{SceneObject, World};

/// Contribution of a single light, or `None` when it does not reach the
/// polygon's front side.
pub fn luminosity(normals: &Normals, mix: f64, light: &Light) -> Option<f64> {
    if !light.is_enabled() {
        return None;
    }

    let position = light.position();
    let dist = distance(&normals.a, &position);
    if dist > light.distance {
        return None;
    }
    if !is_codirectional(&normals.a, &normals.b, &normals.a, &position) {
        return None;
    }

    let angle = angle(&normals.a, &normals.b, &position);
    Some((1.0 - angle / 90.0) * (1.0 - dist / light.distance) * light.intensity * mix)
}

/// Blend `base` towards every light that reaches the polygon.
pub fn illuminate<'a>(
    normals: &Normals,
    base: Color,
    mix: f64,
    lights: impl IntoIterator<Item = &'a Light>,
) -> Color {
    if mix <= 0.0 {
        return base;
    }
    lights.into_iter().fold(base, |color, light| match luminosity(normals, mix, light) {
        Some(amount) if amount > 0.0 => color.mix(light.color(), amount),
        _ => color,
    })
}

/// Atmospheric depth cue: full background colour at the far radius.
pub fn distance_fade(color: Color, background: Color, distance: f64, far: f64) -> Color {
    color.mix(background, distance / far)
}

/// Final colour and alpha of a projected polygon.
///
/// Lights draw in their own colour at full opacity, unlit and unfaded.
pub fn shade(world: &World, record: &NormalizedPolygon, background: Color, far: f64) -> Option<(Color, f64)> {
    match world.get(record.object)? {
        SceneObject::Light(light) => Some((light.color(), 1.0)),
        SceneObject::Mesh(mesh) => {
            let polygon = mesh.polygons().get(record.polygon)?;
            let base = polygon.color.unwrap_or(mesh.color);
            let alpha = polygon.alpha.unwrap_or(mesh.alpha);
            let mix = polygon.mix.unwrap_or(mesh.mix);

            let lit = illuminate(&record.normals, base, mix, world.lights());
            Some((distance_fade(lit, background, record.distance, far), alpha))
        }
    }
}
