//! Trigger areas
//!
//! Axis-aligned rectangles on the floor plane that notify listeners when an
//! actor walks (or is teleported) into them. Notification is
//! edge-triggered per actor: entering fires every listener once, staying
//! inside fires nothing, and leaving resets the area silently so the next
//! entry fires again.
//!
//! Listeners receive a caller-provided context `C` by mutable reference,
//! which lets a callback change section state (reset a structure, open a
//! video) without the area holding any reference to that state.

use std::collections::HashSet;

use diorama_math::Vec2;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Generational key to a trigger area
    pub struct AreaKey;
}

/// Identifier of something that can enter areas (the player car, a ball)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u32);

/// A rectangle on the floor plane
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AreaSpec {
    /// Center of the rectangle
    pub position: Vec2,
    /// Half width and half depth
    pub half_extents: Vec2,
}

impl AreaSpec {
    /// Create an area; negative extents are taken by magnitude
    pub fn new(position: Vec2, half_extents: Vec2) -> Self {
        Self {
            position,
            half_extents: half_extents.abs(),
        }
    }

    /// Closed containment test: points on the border are inside
    pub fn contains(&self, point: Vec2) -> bool {
        let d = (point - self.position).abs();
        d.x <= self.half_extents.x && d.y <= self.half_extents.y
    }
}

/// Passed to listeners when an actor enters an area
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interaction {
    pub area: AreaKey,
    pub actor: ActorId,
    /// Actor position on the tick it entered
    pub position: Vec2,
}

type Listener<C> = Box<dyn FnMut(&Interaction, &mut C)>;

struct TriggerArea<C> {
    spec: AreaSpec,
    listeners: Vec<Listener<C>>,
    inside: HashSet<ActorId>,
}

/// Registry of trigger areas with listeners taking a context of type `C`
pub struct AreaRegistry<C> {
    areas: SlotMap<AreaKey, TriggerArea<C>>,
}

impl<C> Default for AreaRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> AreaRegistry<C> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            areas: SlotMap::with_key(),
        }
    }

    /// Add an area with no listeners
    pub fn add(&mut self, spec: AreaSpec) -> AreaKey {
        let spec = AreaSpec::new(spec.position, spec.half_extents);
        log::debug!(
            "Added area at ({:.2}, {:.2}) half extents ({:.2}, {:.2})",
            spec.position.x,
            spec.position.y,
            spec.half_extents.x,
            spec.half_extents.y
        );
        self.areas.insert(TriggerArea {
            spec,
            listeners: Vec::new(),
            inside: HashSet::new(),
        })
    }

    /// Register a listener; listeners fire in registration order
    ///
    /// Returns false if the area no longer exists.
    pub fn on_interact<F>(&mut self, key: AreaKey, listener: F) -> bool
    where
        F: FnMut(&Interaction, &mut C) + 'static,
    {
        match self.areas.get_mut(key) {
            Some(area) => {
                area.listeners.push(Box::new(listener));
                true
            }
            None => false,
        }
    }

    /// Remove an area and its listeners
    pub fn remove(&mut self, key: AreaKey) -> bool {
        self.areas.remove(key).is_some()
    }

    /// Test every actor against every area and fire entry listeners
    ///
    /// Actors missing from `actors` are treated as outside. Returns the
    /// number of entries (area, actor) that fired this tick.
    pub fn update(&mut self, actors: &[(ActorId, Vec2)], ctx: &mut C) -> usize {
        let mut fired = 0;
        for (key, area) in &mut self.areas {
            let mut now_inside = HashSet::with_capacity(area.inside.len());
            for &(actor, position) in actors {
                if !area.spec.contains(position) {
                    continue;
                }
                // Repeated entries for one actor count once
                if !now_inside.insert(actor) || area.inside.contains(&actor) {
                    continue;
                }

                let interaction = Interaction {
                    area: key,
                    actor,
                    position,
                };
                log::debug!("Actor {:?} entered area {:?}", actor, key);
                for listener in &mut area.listeners {
                    listener(&interaction, &mut *ctx);
                }
                fired += 1;
            }
            area.inside = now_inside;
        }
        fired
    }

    /// Geometry of an area
    pub fn spec(&self, key: AreaKey) -> Option<AreaSpec> {
        self.areas.get(key).map(|a| a.spec)
    }

    /// Whether `actor` was inside `key` on the last update
    pub fn is_inside(&self, key: AreaKey, actor: ActorId) -> bool {
        self.areas.get(key).is_some_and(|a| a.inside.contains(&actor))
    }

    /// Number of listeners on an area
    pub fn listener_count(&self, key: AreaKey) -> usize {
        self.areas.get(key).map_or(0, |a| a.listeners.len())
    }

    /// Number of areas
    pub fn len(&self) -> usize {
        self.areas.len()
    }

    /// True if there are no areas
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}
