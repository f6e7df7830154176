//! Executes anchor commands as Bevy entities.
//!
//! Each anchor is a root entity at the anchor pose with one child per
//! composite part (body, base, detail marker). Results go back to the
//! placement core as `AnchorReport`s in the same frame.

use std::collections::HashMap;

use bevy::prelude::*;

use placement::controller::{AnchorHandle, PlacementCommand, PlacementId};
use placement::events::{AnchorReport, PlacementCommandEvent};
use placement::style::{AnchorStyle, CompositePart, PartKind, PartShape};
use placement::{CreateError, Pose};

/// Anchors the renderer will keep alive at once before refusing creations.
pub const DEFAULT_ANCHOR_BUDGET: usize = 8;

/// Root of a rendered anchor.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedAnchor {
    pub handle: AnchorHandle,
    pub placement: PlacementId,
}

/// One visible part of an anchor.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorPart(pub PartKind);

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Live anchors by handle.
#[derive(Resource, Debug)]
pub struct AnchorRegistry {
    live: HashMap<AnchorHandle, Entity>,
    next_handle: u64,
    budget: usize,
}

impl Default for AnchorRegistry {
    fn default() -> Self {
        Self::with_budget(DEFAULT_ANCHOR_BUDGET)
    }
}

impl AnchorRegistry {
    pub fn with_budget(budget: usize) -> Self {
        Self {
            live: HashMap::new(),
            next_handle: 0,
            budget,
        }
    }

    /// Check a creation against the pose and the live-anchor budget.
    pub fn admit(&self, pose: &Pose) -> Result<(), CreateError> {
        if !pose.is_finite() {
            return Err(CreateError::InvalidPose);
        }
        if self.live.len() >= self.budget {
            return Err(CreateError::ResourceExhausted);
        }
        Ok(())
    }

    pub fn allocate(&mut self) -> AnchorHandle {
        self.next_handle += 1;
        AnchorHandle(self.next_handle)
    }

    pub fn insert(&mut self, handle: AnchorHandle, entity: Entity) {
        self.live.insert(handle, entity);
    }

    pub fn remove(&mut self, handle: AnchorHandle) -> Option<Entity> {
        self.live.remove(&handle)
    }

    pub fn get(&self, handle: AnchorHandle) -> Option<Entity> {
        self.live.get(&handle).copied()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Meshes and materials
// ---------------------------------------------------------------------------

fn part_mesh(shape: PartShape) -> Mesh {
    match shape {
        PartShape::Cylinder { radius, height } => Mesh::from(Cylinder::new(radius, height)),
        PartShape::Sphere { radius } => Mesh::from(Sphere::new(radius)),
    }
}

fn part_material(part: &CompositePart) -> StandardMaterial {
    StandardMaterial {
        base_color: part.color,
        metallic: part.finish.metallic,
        perceptual_roughness: part.finish.roughness,
        reflectance: part.finish.reflectance,
        ..default()
    }
}

fn spawn_anchor(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    anchor: PlacedAnchor,
    pose: &Pose,
    style: &AnchorStyle,
) -> Entity {
    commands
        .spawn((anchor, pose.to_transform(), Visibility::default()))
        .with_children(|parent| {
            for part in style.parts() {
                parent.spawn((
                    AnchorPart(part.kind),
                    Mesh3d(meshes.add(part_mesh(part.shape))),
                    MeshMaterial3d(materials.add(part_material(&part))),
                    Transform::from_translation(part.offset),
                ));
            }
        })
        .id()
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Execute create/destroy commands in issue order and report the outcome.
pub fn execute_anchor_commands(
    mut commands: Commands,
    mut events: EventReader<PlacementCommandEvent>,
    mut registry: ResMut<AnchorRegistry>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut reports: EventWriter<AnchorReport>,
) {
    for PlacementCommandEvent(command) in events.read() {
        match command {
            PlacementCommand::CreateAnchor {
                placement,
                pose,
                style,
            } => {
                if let Err(error) = registry.admit(pose) {
                    warn!("Anchor for {placement} refused: {error}");
                    reports.send(AnchorReport::Failed {
                        id: *placement,
                        error,
                    });
                    continue;
                }
                let handle = registry.allocate();
                let anchor = PlacedAnchor {
                    handle,
                    placement: *placement,
                };
                let entity = spawn_anchor(
                    &mut commands,
                    &mut meshes,
                    &mut materials,
                    anchor,
                    pose,
                    style,
                );
                registry.insert(handle, entity);
                debug!("Spawned {handle} for {placement} at {:?}", pose.translation);
                reports.send(AnchorReport::Created {
                    id: *placement,
                    handle,
                });
            }
            PlacementCommand::DestroyAnchor { handle } => {
                match registry.remove(*handle) {
                    Some(entity) => {
                        commands.entity(entity).despawn_recursive();
                        debug!("Despawned {handle}");
                    }
                    None => debug!("Destroy for absent {handle} ignored"),
                }
                reports.send(AnchorReport::Destroyed { handle: *handle });
            }
            PlacementCommand::Feedback(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admit_rejects_non_finite_poses() {
        let registry = AnchorRegistry::default();
        let pose = Pose::from_translation(Vec3::new(f32::NAN, 0.0, 0.0));
        assert_eq!(registry.admit(&pose), Err(CreateError::InvalidPose));
        let rotated = Pose::new(Vec3::ZERO, Quat::from_xyzw(f32::INFINITY, 0.0, 0.0, 1.0));
        assert_eq!(registry.admit(&rotated), Err(CreateError::InvalidPose));
    }

    #[test]
    fn admit_enforces_the_budget() {
        let mut registry = AnchorRegistry::with_budget(2);
        let pose = Pose::IDENTITY;
        for i in 0..2 {
            assert_eq!(registry.admit(&pose), Ok(()));
            let handle = registry.allocate();
            registry.insert(handle, Entity::from_raw(i));
        }
        assert_eq!(registry.admit(&pose), Err(CreateError::ResourceExhausted));

        registry.remove(AnchorHandle(1));
        assert_eq!(registry.admit(&pose), Ok(()));
    }

    #[test]
    fn handles_are_never_reused() {
        let mut registry = AnchorRegistry::default();
        let first = registry.allocate();
        registry.insert(first, Entity::from_raw(1));
        registry.remove(first);
        let second = registry.allocate();
        assert_ne!(first, second);
        assert!(registry.get(first).is_none());
    }

    #[test]
    fn materials_follow_the_part_finish() {
        let style = AnchorStyle::for_tool(placement::ToolId(2));
        let [body, base, _marker] = style.parts();
        let body_material = part_material(&body);
        assert_eq!(body_material.base_color, style.body_color);
        assert_eq!(body_material.metallic, 0.8);
        assert_eq!(body_material.perceptual_roughness, 0.3);
        assert_eq!(part_material(&base).reflectance, 0.4);
    }

    // -----------------------------------------------------------------------
    // Headless execution
    // -----------------------------------------------------------------------

    fn headless_app(budget: usize) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<Assets<Mesh>>()
            .init_resource::<Assets<StandardMaterial>>()
            .insert_resource(AnchorRegistry::with_budget(budget))
            .add_event::<PlacementCommandEvent>()
            .add_event::<AnchorReport>()
            .add_systems(Update, execute_anchor_commands);
        app
    }

    fn create(app: &mut App, serial: u64, pose: Pose) {
        let placement = PlacementId {
            tool: placement::ToolId(1),
            serial,
        };
        app.world_mut()
            .send_event(PlacementCommandEvent(PlacementCommand::CreateAnchor {
                placement,
                pose,
                style: AnchorStyle::for_tool(placement.tool),
            }));
    }

    fn reports(app: &App) -> Vec<AnchorReport> {
        app.world()
            .resource::<Events<AnchorReport>>()
            .iter_current_update_events()
            .cloned()
            .collect()
    }

    fn count<C: Component>(app: &mut App) -> usize {
        app.world_mut().query::<&C>().iter(app.world()).count()
    }

    #[test]
    fn create_spawns_a_three_part_composite_and_reports_it() {
        let mut app = headless_app(DEFAULT_ANCHOR_BUDGET);
        create(&mut app, 1, Pose::from_translation(Vec3::new(0.2, 0.0, -0.4)));
        app.update();

        let reports = reports(&app);
        assert!(matches!(
            reports.as_slice(),
            [AnchorReport::Created { handle: AnchorHandle(1), .. }]
        ));
        assert_eq!(count::<PlacedAnchor>(&mut app), 1);
        assert_eq!(count::<AnchorPart>(&mut app), 3);
        let transform = app
            .world_mut()
            .query_filtered::<&Transform, With<PlacedAnchor>>()
            .single(app.world());
        assert_eq!(transform.translation, Vec3::new(0.2, 0.0, -0.4));
    }

    #[test]
    fn destroy_despawns_and_absent_destroy_still_reports() {
        let mut app = headless_app(DEFAULT_ANCHOR_BUDGET);
        create(&mut app, 1, Pose::IDENTITY);
        app.update();

        app.world_mut()
            .send_event(PlacementCommandEvent(PlacementCommand::DestroyAnchor {
                handle: AnchorHandle(1),
            }));
        app.world_mut()
            .send_event(PlacementCommandEvent(PlacementCommand::DestroyAnchor {
                handle: AnchorHandle(1),
            }));
        app.update();

        assert_eq!(count::<PlacedAnchor>(&mut app), 0);
        assert_eq!(count::<AnchorPart>(&mut app), 0);
        assert_eq!(
            reports(&app),
            vec![
                AnchorReport::Destroyed { handle: AnchorHandle(1) },
                AnchorReport::Destroyed { handle: AnchorHandle(1) },
            ]
        );
        assert!(app.world().resource::<AnchorRegistry>().is_empty());
    }

    #[test]
    fn creations_past_the_budget_fail() {
        let mut app = headless_app(1);
        create(&mut app, 1, Pose::IDENTITY);
        create(&mut app, 2, Pose::IDENTITY);
        app.update();

        let reports = reports(&app);
        assert_eq!(reports.len(), 2);
        assert!(matches!(
            &reports[1],
            AnchorReport::Failed { error: CreateError::ResourceExhausted, .. }
        ));
        assert_eq!(count::<PlacedAnchor>(&mut app), 1);
    }
}
