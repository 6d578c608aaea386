use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use glam::DVec3;
use tracing_subscriber::EnvFilter;
use waypoints_common::{CameraPose, Perspective, Waypoint};
use waypoints_render::{
    FixedWidthFont, GraphicsDevice, MarkerConfig, MarkerLayout, MarkerRenderer, RecordingDevice,
};

#[derive(Parser)]
#[command(name = "waypoints-cli", about = "CLI tool for waypoint marker rendering")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions
    Info,
    /// Print the computed marker layout for a waypoint and camera
    Layout(SceneArgs),
    /// Render into a recording device and print the command stream
    Trace(SceneArgs),
}

#[derive(Args)]
struct SceneArgs {
    /// Waypoint name
    #[arg(long, default_value = "Home")]
    name: String,
    /// Waypoint block position as x,y,z
    #[arg(long, value_parser = parse_block, default_value = "0,64,0", allow_hyphen_values = true)]
    pos: [i32; 3],
    /// Packed waypoint color, e.g. 0xFF8040
    #[arg(long, value_parser = parse_color, default_value = "0xFFFFFF")]
    color: u32,
    /// Camera position as x,y,z
    #[arg(long, value_parser = parse_position, default_value = "0,64,-20", allow_hyphen_values = true)]
    camera: DVec3,
    /// Camera yaw in degrees
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    yaw: f32,
    /// Camera pitch in degrees
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pitch: f32,
    /// Host view mode: 0 first person, 1 third person back, 2 third person front
    #[arg(long, default_value = "0")]
    perspective: u8,
    /// JSON marker config; missing fields use defaults
    #[arg(long)]
    config: Option<PathBuf>,
}

impl SceneArgs {
    fn waypoint(&self) -> Waypoint {
        let [x, y, z] = self.pos;
        Waypoint::new(self.name.clone(), x, y, z, self.color)
    }

    fn camera(&self) -> CameraPose {
        CameraPose::new(self.camera, self.yaw, self.pitch)
            .with_perspective(Perspective::from_setting(self.perspective))
    }

    fn renderer(&self) -> anyhow::Result<MarkerRenderer> {
        let config = match &self.config {
            Some(path) => MarkerConfig::load(path)
                .with_context(|| format!("loading marker config {}", path.display()))?,
            None => MarkerConfig::default(),
        };
        Ok(MarkerRenderer::new(config))
    }
}

fn parse_triple<T: std::str::FromStr>(s: &str) -> Result<[T; 3], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y, z] = parts[..] else {
        return Err(format!("expected x,y,z but got '{s}'"));
    };
    let parse = |p: &str| p.parse::<T>().map_err(|_| format!("invalid number '{p}'"));
    Ok([parse(x)?, parse(y)?, parse(z)?])
}

fn parse_block(s: &str) -> Result<[i32; 3], String> {
    parse_triple(s)
}

fn parse_position(s: &str) -> Result<DVec3, String> {
    parse_triple::<f64>(s).map(DVec3::from_array)
}

fn parse_color(s: &str) -> Result<u32, String> {
    let hex = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix('#'))
        .unwrap_or(s);
    let value = u32::from_str_radix(hex, 16).map_err(|e| format!("invalid color '{s}': {e}"))?;
    if value > 0xFF_FFFF {
        return Err(format!("color '{s}' does not fit in 0xRRGGBB"));
    }
    Ok(value)
}

fn print_layout(layout: &MarkerLayout, config: &MarkerConfig) {
    let v = |d: DVec3| format!("({:.3}, {:.3}, {:.3})", d.x, d.y, d.z);
    println!("texture:         {}", config.texture);
    println!("label:           {}", layout.label);
    println!("anchor:          {}", v(layout.anchor));
    println!("distance:        {:.3}", layout.distance);
    println!("direction:       {}", v(layout.direction));
    println!("offset:          {}", v(layout.offset));
    println!("translation:     {}", v(layout.translation.as_dvec3()));
    for r in &layout.rotations {
        println!(
            "rotation:        {:.1}deg about ({}, {}, {})",
            r.degrees, r.axis.x, r.axis.y, r.axis.z
        );
    }
    println!(
        "color:           ({:.3}, {:.3}, {:.3})",
        layout.color.x, layout.color.y, layout.color.z
    );
    println!("distance factor: {:.4}", layout.distance_factor);
    println!("final alpha:     {:.4}", layout.final_alpha);
    for (i, pass) in layout.passes.iter().enumerate() {
        println!(
            "pass {}:          depth_test={} blend_alpha={:.4}",
            i + 1,
            pass.depth_test,
            pass.blend_alpha
        );
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("waypoints-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", waypoints_common::crate_info());
            println!("render: {}", waypoints_render::crate_info());
        }
        Commands::Layout(scene) => {
            let renderer = scene.renderer()?;
            let layout = renderer.layout(&scene.waypoint(), &scene.camera());
            print_layout(&layout, renderer.config());
        }
        Commands::Trace(scene) => {
            let renderer = scene.renderer()?;
            let mut device = RecordingDevice::new();
            let before = device.state();
            let before_texture = device.bound_texture();
            tracing::debug!(texture = %renderer.config().texture, "tracing marker render");

            renderer
                .render(
                    &mut device,
                    &FixedWidthFont::default(),
                    &scene.waypoint(),
                    &scene.camera(),
                )
                .context("rendering waypoint")?;

            for (i, cmd) in device.commands().iter().enumerate() {
                println!("{i:>3}  {cmd}");
            }
            let restored = device.state() == before
                && device.bound_texture() == before_texture
                && device.stack_depth() == 1;
            tracing::debug!(commands = device.commands().len(), "trace complete");
            println!(
                "State restored: {}",
                if restored { "OK" } else { "MISMATCH" }
            );
        }
    }

    Ok(())
}
