//! Physics world and simulation

use crate::body::{BodyKey, RigidBody, StaticCollider};
use crate::collision::{aabb_vs_aabb, aabb_vs_plane, sphere_vs_aabb, sphere_vs_plane, sphere_vs_sphere, Contact};
use crate::shapes::Collider;
use diorama_math::Vec3;
use slotmap::SlotMap;

/// Configuration for the physics simulation
#[derive(Clone, Debug)]
pub struct PhysicsConfig {
    /// Gravity acceleration along Z (negative = down)
    pub gravity: f32,
    /// Speed below which a body counts as still
    pub sleep_speed: f32,
    /// Seconds a body must stay still before it goes dormant
    pub sleep_time: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: -30.0,
            sleep_speed: 0.1,
            sleep_time: 1.0,
        }
    }
}

impl PhysicsConfig {
    /// Create a new physics config with the given gravity
    pub fn new(gravity: f32) -> Self {
        Self {
            gravity,
            ..Self::default()
        }
    }
}

/// A contact recorded during a step
///
/// Impact speed is the closing speed along the contact normal before the
/// response was applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContactEvent {
    /// The body that was hit
    pub body: BodyKey,
    /// The other body, or `None` for static colliders
    pub other: Option<BodyKey>,
    /// Closing speed along the contact normal
    pub impact_speed: f32,
}

/// The physics world containing all rigid bodies
pub struct PhysicsWorld {
    bodies: SlotMap<BodyKey, RigidBody>,
    static_colliders: Vec<StaticCollider>,
    contacts: Vec<ContactEvent>,
    /// Physics configuration
    pub config: PhysicsConfig,
}

impl PhysicsWorld {
    /// Create a new physics world with default configuration
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    /// Create a new physics world with custom configuration
    pub fn with_config(config: PhysicsConfig) -> Self {
        Self {
            bodies: SlotMap::with_key(),
            static_colliders: Vec::new(),
            contacts: Vec::new(),
            config,
        }
    }

    /// Add a static collider to the world
    pub fn add_static_collider(&mut self, collider: StaticCollider) {
        self.static_colliders.push(collider);
    }

    /// Add a body to the world and return its key
    pub fn add_body(&mut self, body: RigidBody) -> BodyKey {
        self.bodies.insert(body)
    }

    /// Remove a body from the world and return it
    pub fn remove_body(&mut self, key: BodyKey) -> Option<RigidBody> {
        self.bodies.remove(key)
    }

    /// Get an immutable reference to a body by key
    pub fn get_body(&self, key: BodyKey) -> Option<&RigidBody> {
        self.bodies.get(key)
    }

    /// Get a mutable reference to a body by key
    pub fn get_body_mut(&mut self, key: BodyKey) -> Option<&mut RigidBody> {
        self.bodies.get_mut(key)
    }

    /// Restore a body to its spawn transform; returns false for stale keys
    pub fn reset_body(&mut self, key: BodyKey) -> bool {
        match self.bodies.get_mut(key) {
            Some(body) => {
                body.reset();
                true
            }
            None => false,
        }
    }

    /// Get the number of bodies in the world
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Take the contacts recorded since the last call
    pub fn drain_contacts(&mut self) -> Vec<ContactEvent> {
        std::mem::take(&mut self.contacts)
    }

    /// Step the simulation forward by dt seconds
    ///
    /// 1. Gravity and velocity integration for awake dynamic bodies
    /// 2. Static collider contacts
    /// 3. Body-body contacts (waking sleepers that get hit)
    /// 4. Sleep bookkeeping
    pub fn step(&mut self, dt: f32) {
        for (_key, body) in &mut self.bodies {
            if !body.is_active() {
                continue;
            }
            body.velocity.z += self.config.gravity * dt;
            let displacement = body.velocity * dt;
            body.apply_correction(displacement);
        }

        self.resolve_static_collisions();
        self.resolve_body_collisions();

        let (speed, time) = (self.config.sleep_speed, self.config.sleep_time);
        for (key, body) in &mut self.bodies {
            if body.update_sleep(dt, speed, time) {
                log::trace!("body {:?} went to sleep", key);
            }
        }
    }

    fn check_static_collision(body_collider: &Collider, static_collider: &Collider) -> Option<Contact> {
        match (body_collider, static_collider) {
            (Collider::Sphere(sphere), Collider::Plane(plane)) => sphere_vs_plane(sphere, plane),
            (Collider::Aabb(aabb), Collider::Plane(plane)) => aabb_vs_plane(aabb, plane),
            (Collider::Sphere(sphere), Collider::Aabb(aabb)) => sphere_vs_aabb(sphere, aabb),
            (Collider::Aabb(body_aabb), Collider::Aabb(static_aabb)) => aabb_vs_aabb(body_aabb, static_aabb),
            (Collider::Sphere(body_sphere), Collider::Sphere(static_sphere)) => {
                // Normal from the static sphere toward the body
                sphere_vs_sphere(static_sphere, body_sphere)
            }
            (Collider::Aabb(aabb), Collider::Sphere(sphere)) => {
                sphere_vs_aabb(sphere, aabb).map(|mut c| {
                    c.normal = -c.normal;
                    c
                })
            }
            (Collider::Plane(_), _) => None,
        }
    }

    fn resolve_static_collisions(&mut self) {
        for (key, body) in &mut self.bodies {
            if !body.is_active() {
                continue;
            }

            for static_col in &self.static_colliders {
                let Some(contact) = Self::check_static_collision(&body.collider, &static_col.collider) else {
                    continue;
                };
                if !contact.is_colliding() {
                    continue;
                }

                body.apply_correction(contact.normal * contact.penetration);
                let combined = body.material.combine(&static_col.material);

                let velocity_along_normal = body.velocity.dot(contact.normal);
                if velocity_along_normal < 0.0 {
                    self.contacts.push(ContactEvent {
                        body: key,
                        other: None,
                        impact_speed: -velocity_along_normal,
                    });

                    let normal_velocity = contact.normal * velocity_along_normal;
                    body.velocity -= normal_velocity * (1.0 + combined.restitution);

                    let tangent_velocity = body.velocity - contact.normal * body.velocity.dot(contact.normal);
                    if tangent_velocity.length() > 0.0001 {
                        let friction_factor = 1.0 - combined.friction;
                        body.velocity = contact.normal * body.velocity.dot(contact.normal)
                            + tangent_velocity * friction_factor;
                    }
                }
            }
        }
    }

    fn resolve_body_collisions(&mut self) {
        let keys: Vec<BodyKey> = self.bodies.keys().collect();

        for i in 0..keys.len() {
            for j in (i + 1)..keys.len() {
                let (key_a, key_b) = (keys[i], keys[j]);
                let (collider_a, collider_b, active_a, active_b) = {
                    let a = &self.bodies[key_a];
                    let b = &self.bodies[key_b];
                    (a.collider, b.collider, a.is_active(), b.is_active())
                };

                // Nothing moves, nothing to resolve
                if !active_a && !active_b {
                    continue;
                }

                // Normal convention: from A toward B
                let contact = match (&collider_a, &collider_b) {
                    (Collider::Sphere(a), Collider::Sphere(b)) => sphere_vs_sphere(a, b),
                    (Collider::Sphere(sphere), Collider::Aabb(aabb)) => sphere_vs_aabb(sphere, aabb).map(|mut c| {
                        c.normal = -c.normal;
                        c
                    }),
                    (Collider::Aabb(aabb), Collider::Sphere(sphere)) => sphere_vs_aabb(sphere, aabb),
                    (Collider::Aabb(a), Collider::Aabb(b)) => aabb_vs_aabb(a, b).map(|mut c| {
                        c.normal = -c.normal;
                        c
                    }),
                    (Collider::Plane(_), _) | (_, Collider::Plane(_)) => None,
                };

                if let Some(contact) = contact {
                    if contact.is_colliding() {
                        self.resolve_body_pair(key_a, key_b, &contact);
                    }
                }
            }
        }
    }

    fn resolve_body_pair(&mut self, key_a: BodyKey, key_b: BodyKey, contact: &Contact) {
        // A moving body hitting a sleeper wakes it
        for key in [key_a, key_b] {
            let body = &mut self.bodies[key];
            if body.is_sleeping() {
                body.wake();
            }
        }

        let movable_a = !self.bodies[key_a].is_static();
        let movable_b = !self.bodies[key_b].is_static();

        let (correction_a, correction_b) = match (movable_a, movable_b) {
            (false, _) => (Vec3::ZERO, contact.normal * contact.penetration),
            (_, false) => (-contact.normal * contact.penetration, Vec3::ZERO),
            _ => {
                let mass_a = self.bodies[key_a].mass;
                let mass_b = self.bodies[key_b].mass;
                let total = mass_a + mass_b;
                (
                    -contact.normal * contact.penetration * (mass_b / total),
                    contact.normal * contact.penetration * (mass_a / total),
                )
            }
        };

        if movable_a {
            self.bodies[key_a].apply_correction(correction_a);
        }
        if movable_b {
            self.bodies[key_b].apply_correction(correction_b);
        }

        let relative = self.bodies[key_a].velocity - self.bodies[key_b].velocity;
        let closing_speed = relative.dot(contact.normal);
        if closing_speed <= 0.0 {
            return;
        }

        self.contacts.push(ContactEvent {
            body: key_a,
            other: Some(key_b),
            impact_speed: closing_speed,
        });
        self.contacts.push(ContactEvent {
            body: key_b,
            other: Some(key_a),
            impact_speed: closing_speed,
        });

        let combined = self.bodies[key_a].material.combine(&self.bodies[key_b].material);
        let inv_mass = |movable: bool, mass: f32| if movable && mass > 0.0 { 1.0 / mass } else { 0.0 };
        let inv_a = inv_mass(movable_a, self.bodies[key_a].mass);
        let inv_b = inv_mass(movable_b, self.bodies[key_b].mass);
        if inv_a + inv_b <= 0.0 {
            return;
        }

        // Normal impulse, then friction damps the relative sliding
        let impulse = (1.0 + combined.restitution) * closing_speed / (inv_a + inv_b);
        self.bodies[key_a].velocity -= contact.normal * (impulse * inv_a);
        self.bodies[key_b].velocity += contact.normal * (impulse * inv_b);

        let relative = self.bodies[key_a].velocity - self.bodies[key_b].velocity;
        let tangent = relative - contact.normal * relative.dot(contact.normal);
        if tangent.length() > 0.0001 {
            let share = combined.friction / (inv_a + inv_b);
            self.bodies[key_a].velocity -= tangent * (share * inv_a);
            self.bodies[key_b].velocity += tangent * (share * inv_b);
        }
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}
