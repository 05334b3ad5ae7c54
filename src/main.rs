//! Diorama - headless world runner
//!
//! Builds the intro section, the configured project sections and any extra
//! layouts, then drives a scripted car along a path through the world,
//! logging area interactions, impact sounds and texture loads.

use std::sync::Arc;

use anyhow::Context;
use diorama::{
    AppConfig, IntroOptions, IntroSection, MediaOverlay, ProjectSection, RecordingOverlay, World,
};
use diorama_core::{ActorId, AssetCache, LoadedTexture, SectionLayout, TextureRequest, Vec2, Vec3};

const CAR: ActorId = ActorId(0);

/// Stand-in for an image decoder: everything loads except missing files
fn fake_load(request: &TextureRequest) -> Result<LoadedTexture, String> {
    if request.source.contains("missing") {
        Err(format!("{} not found", request.source))
    } else {
        Ok(LoadedTexture { width: 512, height: 512 })
    }
}

/// Position along a polyline at `t` in [0, 1]
fn along_path(path: &[Vec2], t: f32) -> Vec2 {
    if path.len() < 2 {
        return path.first().copied().unwrap_or(Vec2::ZERO);
    }
    let scaled = t.clamp(0.0, 1.0) * (path.len() - 1) as f32;
    let index = (scaled as usize).min(path.len() - 2);
    let local = scaled - index as f32;
    let (a, b) = (path[index], path[index + 1]);
    a + (b - a) * local
}

fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.debug.log_level.as_str()))
        .init();
    log::info!("Starting Diorama");

    let mut assets = AssetCache::new();
    assets
        .load_manifest(&config.world.assets)
        .with_context(|| format!("Failed to load asset manifest {}", config.world.assets.display()))?;

    let overlay = RecordingOverlay::new();
    let mut world = World::from_config(&config, Arc::new(assets), Box::new(overlay.clone()));

    let [x, y] = config.world.intro_origin;
    let intro = world
        .load_section("intro", |builder| {
            IntroSection::build(builder, IntroOptions { x, y, touch: config.world.touch })
        })
        .context("Failed to build intro section")?;

    let mut link_targets = Vec::new();
    for project in &config.projects {
        let section = world
            .load_section(&project.name, |builder| ProjectSection::build(builder, project))
            .with_context(|| format!("Failed to build project '{}'", project.name))?;
        if let Some(spec) = section.link_area.and_then(|area| world.areas().spec(area)) {
            link_targets.push(spec.position);
        }
    }

    for path in &config.world.layouts {
        let layout = SectionLayout::load(path).with_context(|| format!("Failed to read layout {}", path.display()))?;
        world
            .load_layout(&layout, Vec3::ZERO)
            .with_context(|| format!("Failed to build layout '{}'", layout.name))?;
    }

    // Start, past the horn, across the reset area, then to each project link
    let reset = world.areas().spec(intro.reset_area).map(|s| s.position).unwrap_or(Vec2::ZERO);
    let mut path = vec![Vec2::new(x, y - 5.0), Vec2::new(x + 17.0, y - 6.0), reset, Vec2::new(reset.x, reset.y - 6.0)];
    path.extend(link_targets);

    let ticks = config.demo.ticks.max(1);
    let kick_tick = ticks / 4;
    let mut interactions = 0;
    let mut sounds = 0;

    for tick in 0..ticks {
        for request in world.take_texture_requests() {
            let result = fake_load(&request);
            world.complete_texture(request.key, result);
        }

        if tick == kick_tick {
            // Roll the ball into the pins
            let objects = &mut world.stage_mut().objects;
            if let Some(body) = objects.get(intro.football.ball).map(|o| o.body) {
                if let Some(ball) = objects.physics_mut().get_body_mut(body) {
                    ball.velocity = Vec3::new(-12.0, 0.0, 0.0);
                    ball.wake();
                }
            }
        }

        let car = along_path(&path, tick as f32 / ticks as f32);
        let entered = world.update(config.demo.dt, &[(CAR, car)]);
        if entered > 0 {
            log::info!("Tick {}: car at ({:.1}, {:.1}) entered {} area(s)", tick, car.x, car.y, entered);
            interactions += entered;
        }

        for sound in world.drain_sounds() {
            log::debug!("Tick {}: {:?} at volume {:.2}", tick, sound.kind, sound.volume);
            sounds += 1;
        }
        for name in world.stage_mut().drain_triggers() {
            log::info!("Tick {}: layout area '{}'", tick, name);
        }
        world.stage_mut().objects.clear_all_dirty();
    }

    log::info!(
        "Ran {} ticks: {} interactions, {} impact sounds, {} media sessions, playground visible: {}",
        ticks,
        interactions,
        sounds,
        overlay.events().len(),
        intro.playground.is_visible(&world.stage().materials)
    );
    if overlay.is_open() {
        log::info!("Media still open: {:?}", overlay.current());
    }

    Ok(())
}
