// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use seammask::canvas::{Canvas, Layer};
use seammask::estimate::Geometry;
use seammask::progress::LogProgress;
use seammask::seammap::{composite, Colour, VisibilityMap};
use seammask::session::{DialogContext, DialogEvent};
use seammask::settings::{OperMode, ResizeSettings};
use seammask::Direction;

extern crate clap;
extern crate image;

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use failure::{format_err, Error};
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str, Error> {
    matches
        .value_of(name)
        .ok_or_else(|| format_err!("missing argument <{}>", name))
}

fn parse_offset(value: &str) -> Result<(i32, i32), Error> {
    let mut parts = value.splitn(2, ',');
    match (parts.next(), parts.next()) {
        (Some(x), Some(y)) => Ok((x.trim().parse()?, y.trim().parse()?)),
        _ => Err(format_err!("expected an offset like 3,-2, got '{}'", value)),
    }
}

fn parse_colour(value: Option<&str>, default: Colour) -> Result<Colour, Error> {
    match value {
        Some(value) => value.parse().map_err(|e: String| format_err!("{}", e)),
        None => Ok(default),
    }
}

fn load_settings(settings_path: Option<&Path>) -> Result<ResizeSettings, Error> {
    Ok(match settings_path {
        Some(path) => ResizeSettings::load(path)?,
        None => ResizeSettings::default(),
    })
}

fn guess(matches: &ArgMatches, settings_path: Option<&Path>) -> Result<(), Error> {
    let mut settings = load_settings(settings_path)?;
    if let Some(direction) = matches.value_of("direction") {
        settings.guess_direction = direction.parse::<Direction>().map_err(|e| format_err!("{}", e))?;
    }
    if let Some(mode) = matches.value_of("mode") {
        settings.oper_mode = mode.parse::<OperMode>().map_err(|e| format_err!("{}", e))?;
    }

    let base = Layer::from_image("base", image::open(required(matches, "image")?)?)?;
    let mut mask = Layer::from_image("discard", image::open(required(matches, "mask")?)?)?;
    if let Some(offset) = matches.value_of("mask-offset") {
        let (x, y) = parse_offset(offset)?;
        mask.set_offsets(x, y);
    }

    let mut canvas = Canvas::new();
    let geometry = Geometry::of(&base);
    canvas.add_layer(base);
    settings.disc_layer = Some(canvas.add_layer(mask));
    // Guessing from the command line always starts from the original size.
    settings.new_width = 0;
    settings.new_height = 0;

    let mut progress = LogProgress::default();
    let context = DialogContext::new(settings, geometry).dispatch(DialogEvent::GuessClicked, &canvas, &mut progress)?;
    if let Some(message) = &context.message {
        tracing::warn!("{}", message);
    }
    if context.disc_warning {
        tracing::warn!("the discard mask has no effect when enlarging");
    }
    let (width, height) = context.new_size();
    println!("{}x{}", width, height);

    if let Some(path) = settings_path {
        let mut context = context.dispatch(DialogEvent::Accepted, &canvas, &mut progress)?;
        context.settings.disc_layer = None;
        context.settings.save(path)?;
    }
    Ok(())
}

fn seammap(matches: &ArgMatches, settings_path: Option<&Path>) -> Result<(), Error> {
    let settings = load_settings(settings_path)?;
    let depth = match matches.value_of("depth") {
        Some(depth) => Some(depth.parse::<u32>()?),
        None => None,
    };
    let start = parse_colour(matches.value_of("start"), settings.colour_start)?;
    let end = parse_colour(matches.value_of("end"), settings.colour_end)?;

    let steps = image::open(required(matches, "vmap")?)?.to_luma();
    let vmap = VisibilityMap::from_luma(&steps, depth)?;
    let overlay = composite(&vmap, &start, &end, &mut LogProgress::default())?;
    tracing::info!(width = vmap.width(), height = vmap.height(), depth = vmap.depth(), "rendered seam map");

    Layer::from_buffer("seam map", overlay)
        .to_dynamic()?
        .save(required(matches, "output")?)?;
    Ok(())
}

fn run() -> Result<(), Error> {
    let matches = App::new("seammask")
        .version("0.1.0")
        .about("Discard-mask sizing and seam maps for liquid rescaling")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Log progress and decisions to stderr"),
        )
        .arg(
            Arg::with_name("settings")
                .short("c")
                .long("settings")
                .takes_value(true)
                .help("YAML file to read defaults from and remember the guess in"),
        )
        .subcommand(
            SubCommand::with_name("guess")
                .about("Guess the size needed to carve away everything painted on a discard mask")
                .arg(Arg::with_name("image").help("The image to resize").required(true).index(1))
                .arg(Arg::with_name("mask").help("The discard mask").required(true).index(2))
                .arg(
                    Arg::with_name("mask-offset")
                        .long("mask-offset")
                        .takes_value(true)
                        .allow_hyphen_values(true)
                        .help("Position of the mask over the image, as X,Y"),
                )
                .arg(
                    Arg::with_name("direction")
                        .short("d")
                        .long("direction")
                        .takes_value(true)
                        .possible_values(&["horizontal", "vertical", "h", "v"])
                        .help("Axis to shrink"),
                )
                .arg(
                    Arg::with_name("mode")
                        .short("m")
                        .long("mode")
                        .takes_value(true)
                        .possible_values(&["normal", "scaleback", "lqrback"])
                        .help("Operating mode; lqrback keeps more than half of each axis"),
                ),
        )
        .subcommand(
            SubCommand::with_name("seammap")
                .about("Draw a visibility map (greyscale, pixel value = removal step) as an RGBA overlay")
                .arg(Arg::with_name("vmap").help("The visibility map").required(true).index(1))
                .arg(Arg::with_name("output").help("Where to write the overlay").required(true).index(2))
                .arg(
                    Arg::with_name("depth")
                        .long("depth")
                        .takes_value(true)
                        .help("Number of removal steps (defaults to the largest step present)"),
                )
                .arg(
                    Arg::with_name("start")
                        .long("start")
                        .takes_value(true)
                        .help("Colour of the first seams removed, as #rrggbb (default: from --settings, else red)"),
                )
                .arg(
                    Arg::with_name("end")
                        .long("end")
                        .takes_value(true)
                        .help("Colour of the last seams removed, as #rrggbb (default: from --settings, else blue)"),
                ),
        )
        .get_matches();

    let filter = if matches.is_present("verbose") {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().without_time().with_writer(std::io::stderr))
        .init();

    let settings_path = matches.value_of("settings").map(Path::new);
    match matches.subcommand() {
        ("guess", Some(sub)) => guess(sub, settings_path),
        ("seammap", Some(sub)) => seammap(sub, settings_path),
        _ => Err(format_err!("no subcommand given")),
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("seammask: {}", err);
        std::process::exit(1);
    }
}
