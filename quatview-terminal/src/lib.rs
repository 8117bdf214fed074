/// Terminal host for the quaternion camera viewer
use anyhow::Context;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyboardEnhancementFlags,
        ModifierKeyCode, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use log::{debug, error, info, warn};
use quatview_core::{stl, KeyState, Viewer, Viewport};
use std::collections::HashMap;
use std::fs;
use std::io::{stdout, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

pub mod renderer;

pub use renderer::TerminalCanvas;

/// How long a key counts as held after a repeat event, on terminals that
/// never report key releases.
const HOLD_TIMEOUT: Duration = Duration::from_millis(150);

/// Hold window after the first press, long enough to cover the delay before
/// the OS starts autorepeating.
const INITIAL_HOLD_TIMEOUT: Duration = Duration::from_millis(600);

/// Step for the fov keys, in degrees
const FOV_STEP: f64 = 5.0;

/// Result of decoding a mesh file off the render thread
pub struct MeshLoad {
    pub generation: u64,
    pub path: PathBuf,
    pub coordinates: anyhow::Result<Vec<f64>>,
}

/// Decodes mesh files on worker threads.
///
/// Every request gets a generation number. Only the result of the newest
/// request is handed out, so a slow decode can never replace a later one.
pub struct MeshLoader {
    sender: Sender<MeshLoad>,
    receiver: Receiver<MeshLoad>,
    latest: u64,
}

impl MeshLoader {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            latest: 0,
        }
    }

    /// Start decoding `path` and return the generation of the request.
    pub fn spawn(&mut self, path: PathBuf) -> u64 {
        self.latest += 1;
        let generation = self.latest;
        let sender = self.sender.clone();
        thread::spawn(move || {
            let coordinates = load_mesh(&path);
            // The loader may already be gone; nothing to report to then.
            let _ = sender.send(MeshLoad {
                generation,
                path,
                coordinates,
            });
        });
        generation
    }

    /// The finished result of the newest request, if it has arrived.
    pub fn take_latest(&self) -> Option<MeshLoad> {
        let mut newest = None;
        while let Ok(load) = self.receiver.try_recv() {
            if load.generation == self.latest {
                newest = Some(load);
            } else {
                debug!(
                    "dropping stale load {} of {}",
                    load.generation,
                    load.path.display()
                );
            }
        }
        newest
    }
}

impl Default for MeshLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode an STL file into the flat coordinate list the scene ingests.
pub fn load_mesh(path: &Path) -> anyhow::Result<Vec<f64>> {
    let data = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let coordinates = stl::parse_stl(&data)
        .with_context(|| format!("failed to decode {}", path.display()))?;
    Ok(coordinates)
}

/// Translate a crossterm key code into the identifiers the key bindings use.
pub fn key_name(code: KeyCode) -> Option<String> {
    match code {
        KeyCode::Char(c) => Some(c.to_lowercase().collect()),
        KeyCode::Up => Some("ArrowUp".to_string()),
        KeyCode::Down => Some("ArrowDown".to_string()),
        KeyCode::Left => Some("ArrowLeft".to_string()),
        KeyCode::Right => Some("ArrowRight".to_string()),
        KeyCode::Modifier(ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift) => {
            Some("Shift".to_string())
        }
        _ => None,
    }
}

/// Builds the held-key map from terminal key events.
///
/// With release reporting the map follows press and release events exactly.
/// Otherwise a fresh press holds the key for [`INITIAL_HOLD_TIMEOUT`], and
/// each autorepeat event after that extends it by [`HOLD_TIMEOUT`].
pub struct KeyTracker {
    state: KeyState,
    deadlines: HashMap<String, Instant>,
    reports_release: bool,
}

impl KeyTracker {
    pub fn new(reports_release: bool) -> Self {
        Self {
            state: KeyState::new(),
            deadlines: HashMap::new(),
            reports_release,
        }
    }

    pub fn state(&self) -> &KeyState {
        &self.state
    }

    pub fn handle(&mut self, name: &str, kind: KeyEventKind, now: Instant) {
        match kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                // Without release reporting, autorepeat arrives as more presses.
                let repeating = kind == KeyEventKind::Repeat || self.state.is_held(name);
                let hold = if repeating {
                    HOLD_TIMEOUT
                } else {
                    INITIAL_HOLD_TIMEOUT
                };
                self.state.press(name);
                self.deadlines.insert(name.to_string(), now + hold);
            }
            KeyEventKind::Release => {
                self.state.release(name);
                self.deadlines.remove(name);
            }
        }
    }

    /// Release keys that have gone quiet. No-op when releases are reported.
    pub fn expire(&mut self, now: Instant) {
        if self.reports_release {
            return;
        }
        let state = &mut self.state;
        self.deadlines.retain(|name, deadline| {
            let alive = now < *deadline;
            if !alive {
                state.release(name);
            }
            alive
        });
    }
}

/// Main application struct for terminal rendering
pub struct TerminalApp {
    viewer: Viewer,
    canvas: TerminalCanvas,
    keys: KeyTracker,
    mesh_path: Option<PathBuf>,
    loader: MeshLoader,
    status: String,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(viewer: Viewer, mesh_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let (width, height) = terminal::size().context("failed to query terminal size")?;

        let mut app = Self {
            viewer,
            canvas: TerminalCanvas::new(width as usize, height as usize),
            keys: KeyTracker::new(false),
            mesh_path: None,
            loader: MeshLoader::new(),
            status: String::new(),
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        };
        if let Some(path) = mesh_path {
            app.load(path);
        }
        Ok(app)
    }

    /// Start decoding `path` on a worker thread. The scene is updated between
    /// ticks once the decode finishes.
    pub fn load(&mut self, path: PathBuf) {
        info!("loading mesh {}", path.display());
        self.status = format!("loading {}", path.display());
        self.mesh_path = Some(path.clone());
        self.loader.spawn(path);
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if enhanced {
            execute!(
                stdout(),
                PushKeyboardEnhancementFlags(
                    KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                        | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
                )
            )?;
        }
        self.keys = KeyTracker::new(enhanced);
        info!("keyboard release events: {}", if enhanced { "on" } else { "off" });

        let result = self.main_loop();

        // Cleanup
        if enhanced {
            execute!(stdout(), PopKeyboardEnhancementFlags)?;
        }
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> anyhow::Result<()> {
        let target_frame_time = self.viewer.tick_interval();

        while self.viewer.is_running() {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::from_millis(0))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }
            self.keys.expire(Instant::now());

            // Finished mesh loads are applied here, never mid-tick
            self.apply_loads();

            let (width, height) = terminal::size()?;
            let viewport = Viewport::new(width as f64, height as f64);
            if let Err(err) = self.viewer.tick(self.keys.state(), &mut self.canvas, viewport) {
                error!("frame failed: {err}");
                self.viewer.stop();
                return Err(err.into());
            }

            self.draw()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Press {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.viewer.stop();
                    return;
                }
                KeyCode::Char('r') => {
                    if let Some(path) = self.mesh_path.clone() {
                        self.load(path);
                    }
                    return;
                }
                KeyCode::Char('[') => return self.adjust_fov(-FOV_STEP),
                KeyCode::Char(']') => return self.adjust_fov(FOV_STEP),
                _ => {}
            }
        }
        if let Some(name) = key_name(key.code) {
            self.keys.handle(&name, key.kind, Instant::now());
        }
    }

    fn adjust_fov(&mut self, delta: f64) {
        let camera = &mut self.viewer.scene_mut().camera;
        let angle = camera.fov_angle() + delta;
        if let Err(err) = camera.set_fov(angle) {
            warn!("{err}");
        }
    }

    fn apply_loads(&mut self) {
        let Some(load) = self.loader.take_latest() else {
            return;
        };
        let path = load.path;
        let result = load.coordinates.and_then(|coordinates| {
            Ok(self.viewer.scene_mut().ingest_mesh_random(&coordinates)?)
        });
        self.status = match result {
            Ok(count) => {
                info!("loaded {count} polygons from {}", path.display());
                format!("{}: {count} polygons", path.display())
            }
            Err(err) => {
                // The previous polygons stay on screen.
                error!("{err:#}");
                format!("load failed: {err}")
            }
        };
    }

    fn draw(&mut self) -> anyhow::Result<()> {
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.canvas.draw(&mut stdout)?;

        // Draw UI overlay
        let camera = &self.viewer.scene().camera;
        let position = camera.position();
        let overlay = format!(
            "Quatview | FPS: {:.1} | pos ({:.2}, {:.2}, {:.2}) | fov {:.0} | {} | \
             WASD/Space/C=Move Arrows=Pitch/Yaw ./=Roll [ ]=FOV R=Reload Q=Quit",
            self.fps,
            position.x,
            position.y,
            position.z,
            camera.fov_angle(),
            self.status
        );
        let overlay: String = overlay.chars().take(self.canvas.width()).collect();
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(overlay),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
