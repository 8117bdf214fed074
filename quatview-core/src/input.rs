/// Keyboard state to camera motion
use std::collections::HashMap;

use crate::camera::Camera;
use crate::error::Result;
use crate::vector::Vector3;

/// The fixed set of things a held key can ask the camera to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    MoveForward,
    MoveBack,
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    PitchUp,
    PitchDown,
    YawLeft,
    YawRight,
    RollLeft,
    RollRight,
}

impl Command {
    pub const ALL: [Command; 12] = [
        Command::MoveForward,
        Command::MoveBack,
        Command::MoveLeft,
        Command::MoveRight,
        Command::MoveUp,
        Command::MoveDown,
        Command::PitchUp,
        Command::PitchDown,
        Command::YawLeft,
        Command::YawRight,
        Command::RollLeft,
        Command::RollRight,
    ];

    /// Unit local-space translation for this command.
    fn translation(self) -> Vector3 {
        match self {
            Command::MoveForward => Vector3::Z,
            Command::MoveBack => -Vector3::Z,
            Command::MoveRight => Vector3::X,
            Command::MoveLeft => -Vector3::X,
            Command::MoveUp => Vector3::Y,
            Command::MoveDown => -Vector3::Y,
            _ => Vector3::ZERO,
        }
    }

    /// Unit local-space rotation (radians about x, y, z) for this command.
    fn rotation(self) -> Vector3 {
        match self {
            Command::PitchUp => -Vector3::X,
            Command::PitchDown => Vector3::X,
            Command::YawRight => Vector3::Y,
            Command::YawLeft => -Vector3::Y,
            Command::RollLeft => Vector3::Z,
            Command::RollRight => -Vector3::Z,
            _ => Vector3::ZERO,
        }
    }
}

/// Which keys are currently held, keyed by host key identifier.
#[derive(Debug, Clone, Default)]
pub struct KeyState {
    held: HashMap<String, bool>,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, held: bool) {
        self.held.insert(key.to_string(), held);
    }

    pub fn press(&mut self, key: &str) {
        self.set(key, true);
    }

    pub fn release(&mut self, key: &str) {
        self.set(key, false);
    }

    pub fn is_held(&self, key: &str) -> bool {
        self.held.get(key).copied().unwrap_or(false)
    }

    pub fn release_all(&mut self) {
        self.held.values_mut().for_each(|held| *held = false);
    }
}

/// Key identifier to command table
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: HashMap<String, Command>,
}

impl KeyBindings {
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    pub fn bind(&mut self, key: &str, command: Command) -> &mut Self {
        self.bindings.insert(key.to_string(), command);
        self
    }

    pub fn command(&self, key: &str) -> Option<Command> {
        self.bindings.get(key).copied()
    }

    /// Commands whose keys are held in `keys`. A command bound to several
    /// held keys is reported once.
    pub fn active(&self, keys: &KeyState) -> Vec<Command> {
        Command::ALL
            .into_iter()
            .filter(|command| {
                self.bindings
                    .iter()
                    .any(|(key, bound)| bound == command && keys.is_held(key))
            })
            .collect()
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut bindings = Self::empty();
        bindings
            .bind("w", Command::MoveForward)
            .bind("s", Command::MoveBack)
            .bind("a", Command::MoveLeft)
            .bind("d", Command::MoveRight)
            .bind(" ", Command::MoveUp)
            .bind("Shift", Command::MoveDown)
            .bind("c", Command::MoveDown)
            .bind("ArrowUp", Command::PitchUp)
            .bind("ArrowDown", Command::PitchDown)
            .bind("ArrowLeft", Command::YawLeft)
            .bind("ArrowRight", Command::YawRight)
            .bind("/", Command::RollLeft)
            .bind(".", Command::RollRight);
        bindings
    }
}

/// Per-tick camera-local deltas
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Motion {
    pub translation: Vector3,
    pub rotation: Vector3,
}

impl Motion {
    pub fn is_idle(&self) -> bool {
        self.translation.is_zero() && self.rotation.is_zero()
    }

    /// Rotate first, then move along the freshly rotated axes.
    pub fn apply(&self, camera: &mut Camera) -> Result<()> {
        camera.rotate_local(self.rotation)?;
        camera.translate_local(self.translation);
        Ok(())
    }
}

/// Turns held keys into a [`Motion`] using fixed per-tick speeds.
#[derive(Debug, Clone)]
pub struct MotionMapper {
    pub bindings: KeyBindings,
    pub movement_speed: f64,
    pub rotation_speed: f64,
}

impl MotionMapper {
    pub fn new(bindings: KeyBindings, movement_speed: f64, rotation_speed: f64) -> Self {
        Self {
            bindings,
            movement_speed,
            rotation_speed,
        }
    }

    /// Opposing commands held together cancel out.
    pub fn motion(&self, keys: &KeyState) -> Motion {
        self.bindings
            .active(keys)
            .into_iter()
            .fold(Motion::default(), |motion, command| Motion {
                translation: motion.translation + command.translation() * self.movement_speed,
                rotation: motion.rotation + command.rotation() * self.rotation_speed,
            })
    }
}
