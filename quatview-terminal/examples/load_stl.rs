/// Example: Load an STL file and print one frame of it
///
/// Usage: cargo run --example load_stl -- path/to/file.stl
///
/// Without a file the demo scene is printed instead.

use quatview_core::{
    Camera, Color, KeyState, Scene, Vector3, Viewer, ViewerConfig, Viewport,
};
use quatview_terminal::{load_mesh, TerminalCanvas};
use std::env;
use std::io::{self, Write};
use std::path::Path;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut scene = match args.get(1) {
        Some(path) => {
            println!("Loading STL file: {}", path);
            let coordinates = load_mesh(Path::new(path))?;
            let mut scene = Scene::new(Camera::new());
            let count = scene.ingest_mesh_random(&coordinates)?;
            println!("Loaded {} triangles", count);
            scene
        }
        None => {
            eprintln!("Usage: {} <stl-file>", args[0]);
            eprintln!("\nNo STL file provided, using the demo scene...");
            Scene::demo()
        }
    };
    scene.camera.set_position(Vector3::new(-4.0, 6.0, -6.0));
    scene.camera.rotate_local(Vector3::new(0.5, 0.6, 0.0))?;
    scene.camera.set_aspect_ratio(0.5)?;

    let mut config = ViewerConfig::default();
    config.style.point_size = 1.0;
    config.style.crosshair_size = 1.0;
    config.style.crosshair_color = Color::WHITE;

    let viewport = Viewport::new(80.0, 40.0);
    let mut canvas = TerminalCanvas::new(80, 40);
    let mut viewer = Viewer::new(scene, config);
    viewer.tick(&KeyState::new(), &mut canvas, viewport)?;

    let mut stdout = io::stdout();
    canvas.draw(&mut stdout)?;
    writeln!(stdout)?;
    Ok(())
}
