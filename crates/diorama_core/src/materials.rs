//! Texture-backed material slots
//!
//! A slot shows a placeholder until its image arrives. Image loading is
//! fire-and-forget: creating a slot queues a [`TextureRequest`], an
//! external loader drains the queue and later reports back through
//! [`MaterialSlots::complete`]. On success the texture is swapped in and
//! its alpha fades from 0 to 1. Failures and completions for slots that
//! have since been removed never panic; they are logged and dropped.

use slotmap::{new_key_type, SlotMap};

/// Seconds the loaded texture takes to fade in
const DEFAULT_FADE_DURATION: f32 = 1.0;

new_key_type! {
    /// Generational key to a material slot
    pub struct MaterialKey;
}

/// A texture load the loader should perform
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureRequest {
    pub key: MaterialKey,
    pub source: String,
}

/// Decoded image handed back by the loader
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadedTexture {
    pub width: u32,
    pub height: u32,
}

/// One placeholder-or-texture material
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialSlot {
    /// Image source the slot is waiting for
    pub source: String,
    /// The texture once loaded
    pub texture: Option<LoadedTexture>,
    /// Opacity of the texture over the placeholder
    pub alpha: f32,
    fade_elapsed: f32,
    failed: bool,
}

impl MaterialSlot {
    /// True while the placeholder is shown
    pub fn is_placeholder(&self) -> bool {
        self.texture.is_none()
    }

    /// True if the load failed (the placeholder stays)
    pub fn has_failed(&self) -> bool {
        self.failed
    }
}

/// power4 in-out easing
fn ease_in_out_quart(t: f32) -> f32 {
    if t < 0.5 {
        8.0 * t.powi(4)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(4) / 2.0
    }
}

/// Owner of every material slot and the pending load queue
pub struct MaterialSlots {
    slots: SlotMap<MaterialKey, MaterialSlot>,
    pending: Vec<TextureRequest>,
    fade_duration: f32,
}

impl Default for MaterialSlots {
    fn default() -> Self {
        Self::new()
    }
}

impl MaterialSlots {
    /// Create an empty set of slots
    pub fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
            pending: Vec::new(),
            fade_duration: DEFAULT_FADE_DURATION,
        }
    }

    /// Set how long loaded textures take to fade in
    pub fn with_fade_duration(mut self, seconds: f32) -> Self {
        self.fade_duration = seconds.max(0.0);
        self
    }

    /// Create a placeholder slot and queue a load for `source`
    pub fn request(&mut self, source: impl Into<String>) -> MaterialKey {
        let source = source.into();
        let key = self.slots.insert(MaterialSlot {
            source: source.clone(),
            texture: None,
            alpha: 0.0,
            fade_elapsed: 0.0,
            failed: false,
        });
        self.pending.push(TextureRequest { key, source });
        key
    }

    /// Take the loads queued since the last call
    pub fn take_requests(&mut self) -> Vec<TextureRequest> {
        std::mem::take(&mut self.pending)
    }

    /// Report the outcome of a load
    ///
    /// Returns true if the result was applied to a live slot.
    pub fn complete(&mut self, key: MaterialKey, result: Result<LoadedTexture, String>) -> bool {
        let Some(slot) = self.slots.get_mut(key) else {
            log::debug!("Ignoring texture completion for removed slot {:?}", key);
            return false;
        };
        match result {
            Ok(texture) => {
                log::debug!("Loaded '{}' ({}x{})", slot.source, texture.width, texture.height);
                slot.texture = Some(texture);
                slot.alpha = 0.0;
                slot.fade_elapsed = 0.0;
                slot.failed = false;
            }
            Err(err) => {
                log::warn!("Failed to load texture '{}': {}", slot.source, err);
                slot.failed = true;
            }
        }
        true
    }

    /// Advance fade-ins
    pub fn update(&mut self, dt: f32) {
        for (_key, slot) in &mut self.slots {
            if slot.texture.is_none() || slot.alpha >= 1.0 {
                continue;
            }
            slot.fade_elapsed += dt;
            let t = if self.fade_duration > 0.0 {
                (slot.fade_elapsed / self.fade_duration).min(1.0)
            } else {
                1.0
            };
            slot.alpha = ease_in_out_quart(t);
        }
    }

    /// Get a slot by key
    pub fn get(&self, key: MaterialKey) -> Option<&MaterialSlot> {
        self.slots.get(key)
    }

    /// Remove a slot; a load still in flight for it will be ignored
    pub fn remove(&mut self, key: MaterialKey) -> bool {
        self.pending.retain(|r| r.key != key);
        self.slots.remove(key).is_some()
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True if there are no slots
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
