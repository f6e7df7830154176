//! Surface overlay: draws every qualified surface as a white outline with a
//! grid clipped to its polygon, so the user can see where a tap will land.
//!
//! Only qualified surfaces from the controller's latest snapshot are drawn,
//! so the overlay matches exactly what taps can hit.

use bevy::prelude::*;

use placement::geometry::point_in_polygon;
use placement::{PlacementSession, Surface};

const GRID_SPACING: f32 = 0.1;
/// Lifted off the surface plane to avoid z-fighting with scene geometry.
const LIFT: f32 = 0.002;
const OUTLINE_COLOR: Color = Color::srgba(1.0, 1.0, 1.0, 0.9);
const GRID_COLOR: Color = Color::srgba(1.0, 1.0, 1.0, 0.35);

/// Toggled with `G`.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceOverlay {
    pub visible: bool,
}

impl Default for SurfaceOverlay {
    fn default() -> Self {
        Self { visible: true }
    }
}

pub fn toggle_surface_overlay(keys: Res<ButtonInput<KeyCode>>, mut overlay: ResMut<SurfaceOverlay>) {
    if keys.just_pressed(KeyCode::KeyG) {
        overlay.visible = !overlay.visible;
    }
}

/// Grid segments in the polygon's local plane, clipped to its interior.
///
/// Each grid line is sampled at a fraction of the spacing and split into
/// runs whose samples all lie inside the polygon.
pub fn grid_segments(polygon: &[Vec2], spacing: f32) -> Vec<(Vec2, Vec2)> {
    if polygon.len() < 3 || spacing <= 0.0 {
        return Vec::new();
    }
    let (min, max) = polygon
        .iter()
        .fold((Vec2::splat(f32::MAX), Vec2::splat(f32::MIN)), |(lo, hi), p| {
            (lo.min(*p), hi.max(*p))
        });
    let step = spacing / 4.0;
    let mut segments = Vec::new();

    let mut runs_along = |start: Vec2, dir: Vec2, length: f32| {
        let samples = (length / step).ceil() as usize;
        let mut run: Option<(Vec2, Vec2)> = None;
        for i in 0..=samples {
            let p = start + dir * (i as f32 * step).min(length);
            if point_in_polygon(p, polygon) {
                run = Some(run.map_or((p, p), |(a, _)| (a, p)));
            } else if let Some(done) = run.take() {
                segments.push(done);
            }
        }
        if let Some(done) = run {
            segments.push(done);
        }
    };

    let mut x = (min.x / spacing).ceil() * spacing;
    while x <= max.x {
        runs_along(Vec2::new(x, min.y), Vec2::Y, max.y - min.y);
        x += spacing;
    }
    let mut z = (min.y / spacing).ceil() * spacing;
    while z <= max.y {
        runs_along(Vec2::new(min.x, z), Vec2::X, max.x - min.x);
        z += spacing;
    }
    segments.retain(|(a, b)| a != b);
    segments
}

fn draw_surface(gizmos: &mut Gizmos, surface: &Surface) {
    let to_world = |p: Vec2| surface.center.transform_point(Vec3::new(p.x, LIFT, p.y));
    let mut outline: Vec<Vec3> = surface.polygon.iter().map(|p| to_world(*p)).collect();
    if let Some(first) = outline.first().copied() {
        outline.push(first);
    }
    gizmos.linestrip(outline, OUTLINE_COLOR);
    for (a, b) in grid_segments(&surface.polygon, GRID_SPACING) {
        gizmos.line(to_world(a), to_world(b), GRID_COLOR);
    }
}

pub fn draw_qualified_surfaces(
    overlay: Res<SurfaceOverlay>,
    session: Res<PlacementSession>,
    mut gizmos: Gizmos,
) {
    if !overlay.visible {
        return;
    }
    let Some(snapshot) = session.controller.as_ref().and_then(|c| c.snapshot()) else {
        return;
    };
    for surface in snapshot.qualified_surfaces() {
        draw_surface(&mut gizmos, surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(half: f32) -> Vec<Vec2> {
        vec![
            Vec2::new(-half, -half),
            Vec2::new(half, -half),
            Vec2::new(half, half),
            Vec2::new(-half, half),
        ]
    }

    #[test]
    fn grid_stays_inside_the_polygon() {
        let triangle = vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)];
        let segments = grid_segments(&triangle, 0.1);
        assert!(!segments.is_empty());
        for (a, b) in &segments {
            assert!(point_in_polygon(*a, &triangle), "{a:?} outside");
            assert!(point_in_polygon(*b, &triangle), "{b:?} outside");
        }
    }

    #[test]
    fn square_grid_has_lines_both_ways() {
        let segments = grid_segments(&square(0.25), 0.1);
        let vertical = segments.iter().filter(|(a, b)| a.x == b.x).count();
        let horizontal = segments.iter().filter(|(a, b)| a.y == b.y).count();
        // Lines at -0.2, -0.1, 0.0, 0.1, 0.2 in each direction.
        assert_eq!(vertical, 5);
        assert_eq!(horizontal, 5);
    }

    #[test]
    fn degenerate_polygons_draw_no_grid() {
        assert!(grid_segments(&[Vec2::ZERO, Vec2::X], 0.1).is_empty());
        assert!(grid_segments(&square(1.0), 0.0).is_empty());
    }
}
