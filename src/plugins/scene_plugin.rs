use bevy::prelude::*;
use std::collections::{HashMap, HashSet};

use super::game_plugin::{AppPhase, GameSet};
use crate::game::scene::{NodeKey, Shape, Visual, rgb};
use crate::game::session::Simulation;

/// Mirrors `Session::visuals()` into mesh entities every frame.
pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SceneNodes>();
        app.add_systems(OnEnter(AppPhase::Playing), setup_scene);
        app.add_systems(
            Update,
            sync_scene
                .in_set(GameSet::PresentSet)
                .run_if(resource_exists::<Simulation>.and(resource_exists::<ShapeMeshes>)),
        );
    }
}

struct SceneNode {
    entity: Entity,
    material: Handle<StandardMaterial>,
}

#[derive(Resource, Default)]
struct SceneNodes(HashMap<NodeKey, SceneNode>);

#[derive(Resource)]
struct ShapeMeshes(HashMap<Shape, Handle<Mesh>>);

#[derive(Component)]
struct SceneNodeMarker;

fn setup_scene(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 2.0, 10.0).looking_at(Vec3::new(0.0, 0.0, -5.0), Vec3::Y),
    ));
    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            ..default()
        },
        Transform::from_xyz(5.0, 10.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Placeholder primitives, unit-sized along the axis that visuals scale.
    let shapes = [
        (Shape::Ship, meshes.add(Cuboid::new(1.0, 0.3, 1.5))),
        (Shape::Engine, meshes.add(Cuboid::new(0.3, 0.2, 0.3))),
        (Shape::Asteroid, meshes.add(Sphere::new(1.0))),
        (Shape::AlienShip, meshes.add(Cuboid::new(1.0, 0.6, 2.0))),
        (Shape::Bullet, meshes.add(Sphere::new(0.1))),
        (Shape::Trail, meshes.add(Cuboid::new(0.05, 0.05, 1.0))),
        (Shape::Particle, meshes.add(Sphere::new(0.05))),
        (Shape::Explosion, meshes.add(Sphere::new(1.0))),
        (Shape::DangerZone, meshes.add(Cuboid::new(1.0, 0.02, 1.0))),
        (Shape::Reticle, meshes.add(Torus::new(0.3, 0.4))),
        (Shape::Beam, meshes.add(Cuboid::new(0.02, 0.02, 1.0))),
    ];
    commands.insert_resource(ShapeMeshes(shapes.into_iter().collect()));
}

fn transform_of(v: &Visual) -> Transform {
    Transform {
        translation: v.translation,
        rotation: v.rotation,
        scale: v.scale,
    }
}

fn apply_material(material: &mut StandardMaterial, v: &Visual) {
    let [r, g, b] = rgb(v.color);
    material.base_color = Color::srgba(r, g, b, v.opacity);
    material.emissive = LinearRgba::rgb(r * v.emissive, g * v.emissive, b * v.emissive);
}

fn material_for(v: &Visual) -> StandardMaterial {
    let mut material = StandardMaterial {
        alpha_mode: AlphaMode::Blend,
        unlit: matches!(v.shape, Shape::Particle | Shape::Beam | Shape::Trail | Shape::DangerZone),
        ..default()
    };
    apply_material(&mut material, v);
    material
}

fn sync_scene(
    mut commands: Commands,
    sim: Res<Simulation>,
    shapes: Res<ShapeMeshes>,
    mut nodes: ResMut<SceneNodes>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut transforms: Query<&mut Transform, With<SceneNodeMarker>>,
) {
    let visuals = sim.session().visuals();
    let mut seen = HashSet::with_capacity(visuals.len());

    for v in &visuals {
        seen.insert(v.key);
        if let Some(node) = nodes.0.get(&v.key) {
            if let Ok(mut tf) = transforms.get_mut(node.entity) {
                *tf = transform_of(v);
            }
            if let Some(mut material) = materials.get_mut(&node.material) {
                apply_material(&mut material, v);
            }
            continue;
        }

        let Some(mesh) = shapes.0.get(&v.shape) else { continue; };
        let material = materials.add(material_for(v));
        let entity = commands
            .spawn((
                SceneNodeMarker,
                Mesh3d(mesh.clone()),
                MeshMaterial3d(material.clone()),
                transform_of(v),
            ))
            .id();
        nodes.0.insert(v.key, SceneNode { entity, material });
    }

    nodes.0.retain(|key, node| {
        let keep = seen.contains(key);
        if !keep {
            commands.entity(node.entity).despawn();
        }
        keep
    });
}
