//! The intro section: the starting area with the title, control hints,
//! brick dikes, the playground photo and the bowling football.

use std::f32::consts::{FRAC_PI_2, PI};
use std::sync::Arc;

use diorama_core::{
    AreaKey, AreaSpec, BrickShape, Euler, MaterialKey, ObjectKey, ObjectRegistry, PropTemplate, ShadowSpec,
    ShapeDescriptor, SoundKind, TextureAsset, TriangleShape, Vec2, Vec3, WallHandle, WallSpec,
};

use crate::photo_plane::{PhotoPlane, PLANE_LIFT};
use crate::world::{SectionBuilder, Stage, WorldError};

/// Where the hints for horn and reset sit, relative to the section origin
const OTHER_INSTRUCTIONS: Vec2 = Vec2::new(16.0, -2.0);

/// Football field anchor, relative to the section origin
const FOOTBALL_ANCHOR: Vec2 = Vec2::new(55.0, 52.0);

const TITLE_LETTERS: [(&str, f32); 7] = [
    ("intro_chongqing", 1.5),
    ("intro_hua", 1.5),
    ("intro_gong", 1.5),
    ("intro_zhi", 1.5),
    ("intro_ye", 1.5),
    ("intro_xueyuan", 1.5),
    ("intro_60", 3.0),
];

/// Placement options for the intro section
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct IntroOptions {
    pub x: f32,
    pub y: f32,
    /// Touch layout: no keyboard props, fewer dikes
    pub touch: bool,
}

/// Bowling pins and the ball that knocks them over
#[derive(Clone, Debug, PartialEq)]
pub struct FootballArrangement {
    pub pins: WallHandle,
    pub ball: ObjectKey,
}

impl FootballArrangement {
    /// Put every pin and the ball back where they spawned
    ///
    /// Returns the number of objects reset.
    pub fn reset(&self, objects: &mut ObjectRegistry) -> usize {
        let pins = self.pins.reset(objects);
        let ball = usize::from(objects.reset(self.ball));
        log::debug!("Football reset ({} pins)", pins);
        pins + ball
    }
}

/// What the intro section keeps after building
#[derive(Clone, Debug)]
pub struct IntroSection {
    pub base: ObjectKey,
    /// Arrow key props (empty on touch)
    pub keys: Vec<ObjectKey>,
    pub horn: Option<ObjectKey>,
    pub titles: Vec<ObjectKey>,
    pub dikes: Vec<WallHandle>,
    pub football: FootballArrangement,
    pub reset_area: AreaKey,
    pub playground: PhotoPlane,
    pub school_logo: PhotoPlane,
    /// Hint labels fading in over the floor
    pub labels: Vec<MaterialKey>,
}

impl IntroSection {
    /// Build the intro section at `options.x, options.y`
    pub fn build(builder: &mut SectionBuilder<'_>, options: IntroOptions) -> Result<Self, WorldError> {
        let origin = Vec3::new(options.x, options.y, 0.0);

        let base = builder.spawn(&Arc::new(
            PropTemplate::new("intro_static", "intro_static")
                .with_offset(origin)
                .with_floor_shadow("intro_static_floor_shadow"),
        ))?;

        let mut labels = Vec::new();
        let arrows_label = if options.touch {
            "intro_instructions_controls"
        } else {
            "intro_instructions_arrows"
        };
        labels.push(Self::label(builder, arrows_label)?);

        let keys = if options.touch { Vec::new() } else { Self::arrow_keys(builder, origin)? };

        let horn = if options.touch {
            None
        } else {
            labels.push(Self::label(builder, "intro_instructions_other")?);
            Some(builder.spawn(&Arc::new(
                PropTemplate::new("horn", "horn")
                    .with_offset(origin + Vec3::new(OTHER_INSTRUCTIONS.x + 1.25, OTHER_INSTRUCTIONS.y - 2.75, 0.2))
                    .with_rotation(Euler::yaw(0.5))
                    .duplicated()
                    .with_shadow(ShadowSpec::new(1.65, 0.75, -0.1, 0.4))
                    .with_mass(1.5)
                    .with_sound(SoundKind::Horn)
                    .with_sleep(false),
            ))?)
        };

        let mut titles = Vec::with_capacity(TITLE_LETTERS.len());
        for (id, mass) in TITLE_LETTERS {
            titles.push(builder.spawn(&Arc::new(
                PropTemplate::new(id, id)
                    .with_offset(origin)
                    .with_shadow(ShadowSpec::new(2.5, 1.5, -0.6, 0.3))
                    .with_mass(mass)
                    .with_sound(SoundKind::Brick),
            ))?);
        }

        let dikes = Self::dikes(builder, origin, options.touch)?;

        let playground = builder.photo_plane(
            "intro/playground.png",
            70.0,
            35.0,
            origin + Vec3::new(50.0, 50.0, PLANE_LIFT),
        );
        let school_logo = builder.photo_plane(
            "intro/school_logo.png",
            8.0,
            8.0,
            origin + Vec3::new(0.0, 10.0, PLANE_LIFT),
        );

        let (football, reset_area) = Self::football(builder, options)?;
        labels.push(Self::label(builder, "area_reset")?);

        Ok(Self {
            base,
            keys,
            horn,
            titles,
            dikes,
            football,
            reset_area,
            playground,
            school_logo,
            labels,
        })
    }

    fn label(builder: &mut SectionBuilder<'_>, texture: &str) -> Result<MaterialKey, WorldError> {
        let source = builder.assets().resolve::<TextureAsset>(texture)?.source.clone();
        Ok(builder.request_material(source))
    }

    fn arrow_keys(builder: &mut SectionBuilder<'_>, origin: Vec3) -> Result<Vec<ObjectKey>, WorldError> {
        let key = PropTemplate::new("arrow_key", "arrow_key")
            .duplicated()
            .with_shadow(ShadowSpec::new(1.0, 1.0, -0.2, 0.5))
            .with_mass(1.5)
            .with_sound(SoundKind::Brick);

        // up, down, left, right
        let layout = [
            (Vec3::new(0.0, 0.0, 0.0), 0.0),
            (Vec3::new(0.0, -0.8, 0.0), PI),
            (Vec3::new(-0.8, -0.8, 0.0), FRAC_PI_2),
            (Vec3::new(0.8, -0.8, 0.0), -FRAC_PI_2),
        ];

        let mut keys = Vec::with_capacity(layout.len());
        for (offset, yaw) in layout {
            let template = key.clone().with_offset(origin + offset).with_rotation(Euler::yaw(yaw));
            keys.push(builder.spawn(&Arc::new(template))?);
        }
        Ok(keys)
    }

    fn dikes(builder: &mut SectionBuilder<'_>, origin: Vec3, touch: bool) -> Result<Vec<WallHandle>, WorldError> {
        let brick = PropTemplate::new("brick", "brick")
            .with_offset(Vec3::new(0.0, 0.0, 0.1))
            .duplicated()
            .with_shadow(ShadowSpec::new(1.2, 1.8, -0.15, 0.35))
            .with_mass(0.5)
            .with_sound(SoundKind::Brick);
        let along_x = Arc::new(brick.clone().with_rotation(Euler::yaw(FRAC_PI_2)));
        let along_y = Arc::new(brick);

        let x_step = Vec3::new(1.05, 0.0, 0.0);
        let y_step = Vec3::new(0.0, 1.05, 0.0);
        let mut walls = vec![
            (&along_y, 5, 2, Vec3::new(-12.0, -13.0, 0.0), y_step, true),
            (&along_x, 3, 2, Vec3::new(8.0, 6.0, 0.0), x_step, true),
            (&along_y, 3, 2, Vec3::new(9.9, 4.7, 0.0), -y_step, false),
            (&along_x, 3, 2, Vec3::new(-14.0, 2.0, 0.0), x_step, true),
            (&along_y, 3, 2, Vec3::new(-14.8, 0.7, 0.0), -y_step, false),
            (&along_y, 3, 2, Vec3::new(-14.8, -3.5, 0.0), -y_step, true),
        ];
        if !touch {
            walls.push((&along_x, 2, 2, Vec3::new(18.5, 3.0, 0.0), x_step, true));
            walls.push((&along_y, 2, 2, Vec3::new(19.9, 2.2, 0.0), -y_step, false));
        }

        let mut handles = Vec::with_capacity(walls.len());
        for (object, width_count, height_count, position, offset_width, equilibrate_last_line) in walls {
            let shape = ShapeDescriptor::Brick(BrickShape {
                position: origin + position,
                width_count,
                height_count,
                offset_width,
                offset_height: Vec3::new(0.0, 0.0, 0.45),
                random_offset: Vec3::ZERO,
                random_rotation: Vec3::new(0.0, 0.0, 0.2),
                equilibrate_last_line,
            });
            handles.push(builder.add_wall(&WallSpec::new(Arc::clone(object), shape))?);
        }
        Ok(handles)
    }

    fn football(
        builder: &mut SectionBuilder<'_>,
        options: IntroOptions,
    ) -> Result<(FootballArrangement, AreaKey), WorldError> {
        let fx = options.x + FOOTBALL_ANCHOR.x;
        let fy = options.y + FOOTBALL_ANCHOR.y;

        let pin = Arc::new(
            PropTemplate::new("bowling_pin", "bowling_pin")
                .with_offset(Vec3::new(0.0, 0.0, 0.1))
                .duplicated()
                .with_shadow(ShadowSpec::new(1.4, 1.4, -0.15, 0.35))
                .with_mass(0.1)
                .with_sound(SoundKind::BowlingPin),
        );
        let pins = builder.add_wall(&WallSpec::new(
            pin,
            ShapeDescriptor::Triangle(TriangleShape {
                position: Vec3::new(fx - 20.0, fy, 0.0),
                width_count: 4,
                offset_width: Vec3::new(0.0, 1.0, 0.0),
                offset_height: Vec3::new(0.65, 0.0, 0.0),
                random_offset: Vec3::ZERO,
                random_rotation: Vec3::ZERO,
            }),
        ))?;

        let ball = builder.spawn(&Arc::new(
            PropTemplate::new("football", "football")
                .with_offset(Vec3::new(fx - 5.0, fy, 0.0))
                .with_rotation(Euler::new(FRAC_PI_2, 0.0, 0.0))
                .duplicated()
                .with_shadow(ShadowSpec::new(2.5, 2.5, -0.3, 0.35))
                .with_mass(5.0)
                .with_sound(SoundKind::BowlingBall),
        ))?;

        let football = FootballArrangement { pins, ball };
        let reset_area = builder.add_area(AreaSpec::new(Vec2::new(fx - 5.0, fy - 17.0), Vec2::new(2.0, 2.0)));
        let arrangement = football.clone();
        builder.on_interact(reset_area, move |_, stage: &mut Stage| {
            arrangement.reset(&mut stage.objects);
        });

        Ok((football, reset_area))
    }
}
