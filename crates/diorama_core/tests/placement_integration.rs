//! Integration tests for the placement pipeline
//!
//! These tests drive the registries together the way a section does:
//! 1. Walls compile and place one object per instance, atomically
//! 2. Duplicated props share geometry
//! 3. Drifted bodies reset to their spawn transforms
//! 4. Trigger areas fire on entry only, and can reach registry state

use std::sync::Arc;

use diorama_core::{
    compile_seeded, ActorId, AreaRegistry, AreaSpec, AssetCache, BrickShape, CollisionAsset, ObjectRegistry,
    PlacementError, PropTemplate, ShadowSpec, ShapeDescriptor, SoundKind, Transform, TriangleShape, VisualAsset,
    WallHandle, WallRegistry, WallSpec,
};
use diorama_math::{Euler, Vec2, Vec3};
use diorama_physics::{PhysicsConfig, PhysicsMaterial, PhysicsWorld, StaticCollider};

fn assets() -> Arc<AssetCache> {
    Arc::new(
        AssetCache::new()
            .with("brick", VisualAsset { mesh: "brick".to_string(), size: Vec3::new(1.0, 0.5, 0.5) })
            .with("brick", CollisionAsset::cuboid(Vec3::new(0.5, 0.25, 0.25)))
            .with("pin", VisualAsset { mesh: "pin".to_string(), size: Vec3::new(0.3, 0.3, 1.0) })
            .with("pin", CollisionAsset::cuboid(Vec3::new(0.15, 0.15, 0.5)))
            .with("ball", VisualAsset { mesh: "ball".to_string(), size: Vec3::new(1.0, 1.0, 1.0) })
            .with("ball", CollisionAsset::ball(0.5)),
    )
}

fn objects() -> ObjectRegistry {
    let mut physics = PhysicsWorld::with_config(PhysicsConfig::new(-20.0));
    physics.add_static_collider(StaticCollider::floor(0.0, PhysicsMaterial::CONCRETE));
    ObjectRegistry::new(assets(), physics)
}

fn brick_template() -> Arc<PropTemplate> {
    Arc::new(
        PropTemplate::new("brick", "brick")
            .with_offset(Vec3::new(0.0, 0.0, 0.1))
            .with_mass(0.5)
            .with_shadow(ShadowSpec::new(1.2, 1.8, -0.15, 0.35))
            .with_sound(SoundKind::Brick)
            .duplicated(),
    )
}

fn pin_triangle(position: Vec3) -> WallSpec {
    WallSpec::new(
        Arc::new(
            PropTemplate::new("pin", "pin")
                .with_offset(Vec3::new(0.0, 0.0, 0.6))
                .with_mass(0.1)
                .with_sound(SoundKind::BowlingPin)
                .duplicated(),
        ),
        ShapeDescriptor::Triangle(TriangleShape {
            position,
            width_count: 4,
            offset_width: Vec3::new(0.0, 1.0, 0.0),
            offset_height: Vec3::new(0.65, 0.0, 0.0),
            random_offset: Vec3::ZERO,
            random_rotation: Vec3::ZERO,
        }),
    )
}

// ==================== Shape Compiler ====================

#[test]
fn test_brick_wall_places_width_times_height() {
    let mut objects = objects();
    let mut walls = WallRegistry::with_seed(3);
    let spec = WallSpec::new(
        brick_template(),
        ShapeDescriptor::Brick(BrickShape {
            position: Vec3::new(-10.0, 18.0, 0.0),
            width_count: 5,
            height_count: 6,
            offset_width: Vec3::new(0.0, -1.05, 0.0),
            offset_height: Vec3::new(0.0, 0.0, 0.45),
            random_offset: Vec3::ZERO,
            random_rotation: Vec3::new(0.0, 0.0, 0.2),
            equilibrate_last_line: true,
        }),
    );

    let wall = walls.add(&mut objects, &spec).unwrap();

    assert_eq!(wall.len(), 30);
    assert_eq!(objects.physics().body_count(), 30);
    // items[0] is the anchor plus the template offset
    let first = objects.transform(wall.items[0]).unwrap();
    assert_eq!(first.position, Vec3::new(-10.0, 18.0, 0.1));
}

#[test]
fn test_triangle_places_triangular_number() {
    let mut objects = objects();
    let wall = WallRegistry::with_seed(0)
        .add(&mut objects, &pin_triangle(Vec3::new(35.0, 52.0, 0.0)))
        .unwrap();
    assert_eq!(wall.len(), 10);
}

#[test]
fn test_zero_range_is_deterministic_across_seeds() {
    let template = brick_template();
    let shape = ShapeDescriptor::Brick(BrickShape {
        position: Vec3::ZERO,
        width_count: 4,
        height_count: 3,
        offset_width: Vec3::new(1.0, 0.0, 0.0),
        offset_height: Vec3::new(0.0, 0.0, 0.5),
        random_offset: Vec3::ZERO,
        random_rotation: Vec3::ZERO,
        equilibrate_last_line: false,
    });

    let a = compile_seeded(&template, &shape, 1).unwrap();
    let b = compile_seeded(&template, &shape, 999).unwrap();
    for (x, y) in a.iter().zip(&b) {
        assert_eq!(x.position, y.position);
        assert_eq!(x.rotation, y.rotation);
    }
}

// ==================== Object Registry ====================

#[test]
fn test_fifty_duplicated_placements_share_geometry() {
    let mut objects = objects();
    let template = brick_template();

    let keys: Vec<_> = (0..50)
        .map(|i| {
            objects
                .add(&template, Transform::from_position(Vec3::new(i as f32 * 2.0, 0.0, 0.35)))
                .unwrap()
        })
        .collect();

    let first = Arc::clone(&objects.get(keys[0]).unwrap().geometry);
    assert!(keys.iter().all(|&k| Arc::ptr_eq(&objects.get(k).unwrap().geometry, &first)));
    assert_eq!(objects.shared_geometry_count(), 1);
}

#[test]
fn test_reset_restores_drifted_bodies() {
    let mut objects = objects();
    let mut walls = WallRegistry::with_seed(0);
    let pins = walls.add(&mut objects, &pin_triangle(Vec3::new(35.0, 52.0, 0.0))).unwrap();
    let ball_template = Arc::new(
        PropTemplate::new("ball", "ball")
            .with_offset(Vec3::new(50.0, 52.0, 0.5))
            .with_rotation(Euler::new(std::f32::consts::FRAC_PI_2, 0.0, 0.0))
            .with_mass(5.0),
    );
    let ball = objects.spawn(&ball_template).unwrap();

    let spawns: Vec<Transform> = pins.items.iter().map(|&k| objects.transform(k).unwrap()).collect();

    // Knock everything somewhere else
    for (i, &key) in pins.items.iter().enumerate() {
        objects.teleport(key, Vec3::new(i as f32, -30.0, 2.0), Euler::yaw(1.0));
    }
    objects.teleport(ball, Vec3::new(0.0, 0.0, 3.0), Euler::IDENTITY);
    for _ in 0..10 {
        objects.update(1.0 / 60.0);
    }

    assert_eq!(pins.reset(&mut objects), 10);
    assert!(objects.reset(ball));

    for (&key, spawn) in pins.items.iter().zip(&spawns) {
        assert_eq!(objects.transform(key).unwrap(), *spawn);
    }
    let ball_transform = objects.transform(ball).unwrap();
    assert_eq!(ball_transform.position, Vec3::new(50.0, 52.0, 0.5));
    assert_eq!(ball_transform.rotation, Euler::new(std::f32::consts::FRAC_PI_2, 0.0, 0.0));
}

// ==================== Wall Atomicity ====================

#[test]
fn test_failing_ten_instance_wall_leaves_nothing() {
    let mut objects = objects().with_max_objects(7);
    let mut walls = WallRegistry::with_seed(0);

    let result = walls.add(&mut objects, &pin_triangle(Vec3::ZERO));

    assert!(matches!(result, Err(PlacementError::CapacityExceeded { .. })));
    assert_eq!(objects.len(), 0);
    assert_eq!(objects.physics().body_count(), 0);
    assert_eq!(objects.shared_geometry_count(), 0);
}

// ==================== Trigger Areas ====================

struct Football {
    pins: WallHandle,
    objects: ObjectRegistry,
    resets: u32,
}

#[test]
fn test_area_entry_resets_structure() {
    let mut objects = objects();
    let pins = WallRegistry::with_seed(0)
        .add(&mut objects, &pin_triangle(Vec3::new(35.0, 52.0, 0.0)))
        .unwrap();
    let mut football = Football { pins, objects, resets: 0 };

    let mut areas: AreaRegistry<Football> = AreaRegistry::new();
    let reset_area = areas.add(AreaSpec::new(Vec2::new(50.0, 35.0), Vec2::new(2.0, 2.0)));
    areas.on_interact(reset_area, |_, football: &mut Football| {
        football.pins.reset(&mut football.objects);
        football.resets += 1;
    });

    let first_pin = football.pins.items[0];
    let spawn = football.objects.transform(first_pin).unwrap();
    football.objects.teleport(first_pin, Vec3::new(0.0, 0.0, 5.0), Euler::IDENTITY);

    let car = ActorId(0);
    let outside = Vec2::new(45.0, 35.0);
    let inside = Vec2::new(50.0, 36.0);
    let mut fired = 0;
    for position in [outside, inside, inside, outside, inside] {
        fired += areas.update(&[(car, position)], &mut football);
        football.objects.update(1.0 / 60.0);
    }

    assert_eq!(fired, 2);
    assert_eq!(football.resets, 2);
    // The last reset happened this tick; one physics step has run since
    let pin = football.objects.transform(first_pin).unwrap();
    assert!((pin.position.x - spawn.position.x).abs() < 0.001);
    assert!((pin.position.y - spawn.position.y).abs() < 0.001);
}
