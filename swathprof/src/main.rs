mod options;

use anyhow::{Context as _, Error as AnyError};
use clap::Parser;
use log::error;
use options::{Cli, Show};
use std::{io::Write, process::ExitCode};
use swath::{
    grid::{Raster, RasterMode},
    read_lines, Context, ErrorKind, Extensions, Profile3d, SwathError, SwathProfile,
};
use textplots::{Chart, Plot, Shape};

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::init();

    let extensions = cli
        .disable
        .iter()
        .fold(Extensions::all(), |exts, ext| exts.without((*ext).into()));
    let ctx = Context::new(&cli.out_dir)
        .overwrite(!cli.no_overwrite)
        .format(cli.format.into())
        .extensions(extensions);

    match run(&cli, &ctx) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&ctx, &err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, ctx: &Context) -> Result<(), AnyError> {
    let lines = read_lines(&cli.line)
        .with_context(|| format!("reading profile line {:?}", cli.line))?;
    let mode = if cli.mem_map {
        RasterMode::MemMap
    } else {
        RasterMode::InMem
    };
    let raster =
        Raster::open(&cli.raster, mode).with_context(|| format!("opening {:?}", cli.raster))?;

    let out = SwathProfile::builder()
        .lines(lines)
        .select(cli.select)
        .width_m(cli.width)
        .statistic(cli.stat)
        .interpolate(cli.interpolate)
        .build(ctx, &raster)?;

    eprintln!("wrote {:?}", out.raster_path);
    if let Some(path) = &out.profile_path {
        eprintln!("wrote {path:?}");
    }

    if let (Some(show), Some(profile)) = (cli.show, &out.profile) {
        match show {
            Show::Csv => print_csv(profile)?,
            Show::Json => print_json(profile)?,
            Show::Plot => plot_ascii(profile),
        }
    }
    Ok(())
}

/// Logs `err` and repeats it on stderr.
///
/// Unclassified failures also get every progress message recorded so
/// far, followed by the full error chain.
fn report(ctx: &Context, err: &AnyError) {
    let kind = err
        .downcast_ref::<SwathError>()
        .map_or(ErrorKind::Unclassified, SwathError::kind);
    match kind {
        ErrorKind::License => {
            let msg = format!("licensing error: {err}");
            error!("{msg}");
            eprintln!("{msg}");
        }
        ErrorKind::InvalidInput => {
            let msg = format!("invalid input: {err}");
            error!("{msg}");
            eprintln!("{msg}");
        }
        ErrorKind::Unclassified => {
            let msgs = format!("messages:\n{}", ctx.messages().join("\n"));
            error!("{msgs}");
            eprintln!("{msgs}");
            let trace = format!("error: {err:?}");
            error!("{trace}");
            eprintln!("{trace}");
        }
    }
}

/// # Example with gnuplot
///
/// ```sh
/// swathprof --line line.geojson --width 500 --raster dem.asc --stat max --out-dir out --interpolate --show csv | tr ',' ' ' > /tmp/swath && gnuplot -p -e "plot '/tmp/swath' using 1:4 with lines"
/// ```
fn print_csv(profile: &Profile3d) -> Result<(), AnyError> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "Distance,X,Y,Z")?;
    for vertex in &profile.vertices {
        writeln!(
            stdout,
            "{},{},{},{}",
            vertex.distance, vertex.x, vertex.y, vertex.z
        )?;
    }
    Ok(())
}

fn print_json(profile: &Profile3d) -> Result<(), AnyError> {
    let json = serde_json::to_string(&profile.vertices)?;
    println!("{json}");
    Ok(())
}

#[allow(clippy::cast_possible_truncation)]
fn plot_ascii(profile: &Profile3d) {
    let plot_data: Vec<(f32, f32)> = profile
        .vertices
        .iter()
        .map(|vertex| (vertex.distance as f32, vertex.z))
        .collect();
    Chart::new(300, 150, 0.0, profile.length as f32)
        .lineplot(&Shape::Lines(&plot_data))
        .display();
}
