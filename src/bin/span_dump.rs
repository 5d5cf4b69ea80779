//! Render one frame of a built-in demo map and print what was generated.
//!
//! ```bash
//! cargo run --bin span_dump -- --width 640 --height 400 -vv
//! ```

use std::path::PathBuf;

use clap::Parser;
use glam::IVec2;
use hecs::World;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

use tilespan::{
    config::RenderConfig,
    defs::{PlaneFlags, WallFlags},
    engine::{Marker, SpanEngine, TileVisit, tables::fine_from_degrees},
    renderer::Software,
    sim::{AnimState, Facing, Rotation, SpecialType, SpriteState, WorldPos, spawn_sprite},
    world::{
        Camera, DiagonalSplit, Door, DoorAxis, DoorTextures, Orientation, PlaneAttr, Slope,
        Texture, TextureBank, TileMap, WallAttr, linear_light_tables,
    },
};

/// CLI options handled via `clap` derive.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Renderer settings (RON); defaults are used when omitted.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(long)]
    width: Option<usize>,

    #[arg(long)]
    height: Option<usize>,

    /// Horizontal field of view in degrees.
    #[arg(long)]
    fov: Option<f32>,

    /// Camera heading in degrees (0 = east, 90 = south).
    #[arg(long, default_value_t = 0.0)]
    heading: f32,

    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

struct Demo {
    map: TileMap,
    bank: TextureBank,
    world: World,
}

fn demo() -> anyhow::Result<Demo> {
    let mut bank = TextureBank::default_with_checker();
    bank.set_light_tables(linear_light_tables());
    let wall = bank.insert(Texture::striped("WALL", &[96, 100, 104, 108]))?;
    let glass = bank.insert(Texture::solid("GLASS", 200))?;
    let floor = bank.insert(Texture::solid("FLOOR", 40))?;
    let ceil = bank.insert(Texture::solid("CEIL", 60))?;
    let sky = bank.insert(Texture::striped("SKY", &[150, 152]))?;
    let leaf = bank.insert(Texture::striped("DOOR", &[120, 124]))?;
    let frame = bank.insert(Texture::solid("FRAME", 130))?;
    let jamb = bank.insert(Texture::solid("JAMB", 132))?;
    let scroll = bank.insert(Texture::striped("SCROLL", &[10, 20, 30]))?;

    let mut map = TileMap::new(16, 12, floor, ceil);
    map.border(WallAttr {
        texture: wall,
        flags: WallFlags::empty(),
    });
    map.door_textures = DoorTextures { frame, jamb };

    map.set_wall(
        IVec2::new(6, 3),
        WallAttr {
            texture: glass,
            flags: WallFlags::TRANSLUCENT,
        },
    )?;
    map.set_wall(
        IVec2::new(12, 2),
        WallAttr {
            texture: scroll,
            flags: WallFlags::ROTATING,
        },
    )?;
    map.set_wall(
        IVec2::new(14, 9),
        WallAttr {
            texture: sky,
            flags: WallFlags::SKY,
        },
    )?;

    // a ramp, a split tile and a raised step east of the start
    map.set_floor(
        IVec2::new(8, 6),
        PlaneAttr {
            slope: Slope::Rise {
                toward: Orientation::East,
                rise: 16,
            },
            ..PlaneAttr::flat(floor, 0)
        },
    )?;
    map.set_floor(
        IVec2::new(9, 6),
        PlaneAttr {
            split: DiagonalSplit::NwSe { height: 8 },
            ..PlaneAttr::flat(floor, 16)
        },
    )?;
    map.set_floor(IVec2::new(10, 6), PlaneAttr::flat(floor, 16))?;

    for col in 3..7 {
        for row in 8..11 {
            map.set_ceiling(
                IVec2::new(col, row),
                PlaneAttr {
                    flags: PlaneFlags::SKY,
                    ..PlaneAttr::flat(sky, 96)
                },
            )?;
        }
    }
    map.set_light(IVec2::new(7, 7), 96, 0)?;

    let mut door = Door::new(IVec2::new(11, 4), DoorAxis::EastWest, leaf);
    door.slide(tilespan::engine::Fixed::HALF);
    map.add_door(door)?;

    let mut world = World::new();
    spawn_sprite(
        &mut world,
        WorldPos::new(7.5, 7.5, 0.0),
        Facing(0),
        SpriteState {
            base_picture: 1,
            rotation: Rotation::Eight,
            ..SpriteState::default()
        },
        AnimState::new(4, 4, true),
    );
    spawn_sprite(
        &mut world,
        WorldPos::new(9.5, 5.5, 0.5),
        Facing(0),
        SpriteState {
            base_picture: 40,
            special: SpecialType::Luminous,
            ..SpriteState::default()
        },
        AnimState::new(2, 8, true),
    );
    spawn_sprite(
        &mut world,
        WorldPos::new(5.5, 6.0, 0.25),
        Facing(0),
        SpriteState {
            base_picture: 60,
            ..SpriteState::default()
        },
        AnimState::one_shot(3, 2),
    );

    Ok(Demo { map, bank, world })
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    TermLogger::init(
        level,
        ConfigBuilder::default().build(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let mut config = match &args.config {
        Some(path) => RenderConfig::load(path)?,
        None => RenderConfig::default(),
    };
    if let Some(w) = args.width {
        config.width = w;
    }
    if let Some(h) = args.height {
        config.height = h;
    }
    if let Some(fov) = args.fov {
        config.fov_degrees = fov;
    }
    config.validate()?;
    log::info!("render config: {}x{} fov {}", config.width, config.height, config.fov_degrees);

    let Demo {
        map,
        bank,
        mut world,
    } = demo()?;
    let camera = Camera::at(3.5, 6.5, 0.5, fine_from_degrees(args.heading));

    let mut engine = SpanEngine::new(config.clone());
    let mut software = Software::new(&bank, config.width, config.height);
    let visits = TileVisit::all_within(&map, &camera, config.far_bound(), config.width);
    let stats = engine.render_frame(&camera, &map, &mut world, visits, &mut software)?;

    println!("tiles visited   {:>6}", stats.tiles);
    println!("spans           {:>6}", stats.spans);
    println!("pending posts   {:>6}", stats.posts);
    println!("vertices        {:>6}", stats.vertices);
    println!("objects removed {:>6}", stats.removed);
    println!("opaque columns  {:>6}", software.columns_drawn());
    println!();
    for (kind, count) in engine.spans().histogram() {
        println!("{:<16}{count:>6}", format!("{kind:?}"));
    }

    let overlay = engine.overlay();
    let marked = overlay
        .north_edges()
        .iter()
        .chain(overlay.west_edges())
        .filter(|&&m| m != Marker::Empty)
        .count();
    println!();
    println!("minimap edges marked: {marked}");
    if let Some(&first) = engine.spans().sorted_indices().first() {
        if let Some(rec) = engine.spans().get(first) {
            println!("nearest span: {:?} at depth {}", rec.kind(), rec.depth);
        }
    }
    Ok(())
}
