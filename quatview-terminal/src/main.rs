/// Quatview - quaternion camera scene viewer in the terminal
///
/// Flies a camera through the built-in demo scene or an STL mesh.
/// Controls:
///   - W/S, A/D: Move forward/back, left/right
///   - Space / C: Move up / down
///   - Arrow Keys: Pitch and yaw
///   - / and .: Roll left / right
///   - [ and ]: Narrow / widen the field of view
///   - R: Reload the mesh file
///   - Q/ESC: Quit
use anyhow::Context;
use clap::Parser;
use quatview_core::{Camera, Color, Scene, Viewer, ViewerConfig};
use quatview_terminal::TerminalApp;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "quatview", version, about = "Quaternion camera scene viewer")]
struct Args {
    /// STL file to load (binary or ASCII)
    mesh: Option<PathBuf>,

    /// Show the demo scene, also when a mesh is given
    #[arg(long)]
    demo: bool,

    /// Field of view in degrees
    #[arg(long, default_value_t = Camera::DEFAULT_FOV_ANGLE)]
    fov: f64,

    /// Vertical scale; terminal cells are about twice as tall as wide
    #[arg(long, default_value_t = 0.5)]
    aspect: f64,

    /// World units moved per tick
    #[arg(long, default_value_t = 0.15)]
    move_speed: f64,

    /// Radians turned per tick
    #[arg(long, default_value_t = std::f64::consts::PI / 100.0)]
    rotate_speed: f64,

    /// Milliseconds per frame
    #[arg(long, default_value_t = 50)]
    tick_ms: u64,

    /// Write logs to this file (the terminal is taken by the renderer)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
    let default_filter = if log_file.is_some() { "info" } else { "off" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));
    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let mut scene = if args.demo || args.mesh.is_none() {
        Scene::demo()
    } else {
        Scene::new(Camera::new())
    };
    scene.camera.set_fov(args.fov)?;
    scene.camera.set_aspect_ratio(args.aspect)?;

    let mut config = ViewerConfig {
        movement_speed: args.move_speed,
        rotation_speed: args.rotate_speed,
        tick_interval: Duration::from_millis(args.tick_ms),
        ..ViewerConfig::default()
    };
    // One terminal cell per point, and a crosshair visible on dark backgrounds.
    config.style.point_size = 1.0;
    config.style.crosshair_size = 1.0;
    config.style.crosshair_color = Color::WHITE;

    let mut app = TerminalApp::new(Viewer::new(scene, config), args.mesh)?;
    app.run()?;

    println!("Thank you for using Quatview!");
    Ok(())
}
