//! Input Sampler - keyboard events into a persistent key-state record.

use avasim_env::{KeyAction, KeyEvent, Keyboard};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{error::TryRecvError, Receiver};
use tracing::{debug, warn};

/// The recognized control keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlKey {
    Up,
    Down,
    YawLeft,
    YawRight,
    Forward,
    Back,
    StrafeLeft,
    StrafeRight,
    /// Auxiliary backend ping; never moves the drone
    Diagnostic,
}

impl ControlKey {
    /// Every recognized key.
    pub const ALL: [ControlKey; 9] = [
        ControlKey::Up,
        ControlKey::Down,
        ControlKey::YawLeft,
        ControlKey::YawRight,
        ControlKey::Forward,
        ControlKey::Back,
        ControlKey::StrafeLeft,
        ControlKey::StrafeRight,
        ControlKey::Diagnostic,
    ];

    /// Maps a DOM-style key name onto a control key.
    ///
    /// Arrow keys drive altitude and yaw, `w/a/s/d` translate, `t` pings the
    /// backend. Letter keys ignore case so a held Shift does not strand a key.
    pub fn from_key_name(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" => Some(ControlKey::Up),
            "ArrowDown" => Some(ControlKey::Down),
            "ArrowLeft" => Some(ControlKey::YawLeft),
            "ArrowRight" => Some(ControlKey::YawRight),
            "w" | "W" => Some(ControlKey::Forward),
            "s" | "S" => Some(ControlKey::Back),
            "a" | "A" => Some(ControlKey::StrafeLeft),
            "d" | "D" => Some(ControlKey::StrafeRight),
            "t" | "T" => Some(ControlKey::Diagnostic),
            _ => None,
        }
    }

    /// Returns true for keys that move the drone.
    pub fn is_motion(&self) -> bool {
        !matches!(self, ControlKey::Diagnostic)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ControlKey::Up => "up",
            ControlKey::Down => "down",
            ControlKey::YawLeft => "yaw_left",
            ControlKey::YawRight => "yaw_right",
            ControlKey::Forward => "forward",
            ControlKey::Back => "back",
            ControlKey::StrafeLeft => "strafe_left",
            ControlKey::StrafeRight => "strafe_right",
            ControlKey::Diagnostic => "diagnostic",
        }
    }
}

impl std::fmt::Display for ControlKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Live boolean record of currently held control keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyState {
    pub up: bool,
    pub down: bool,
    pub yaw_left: bool,
    pub yaw_right: bool,
    pub forward: bool,
    pub back: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
    pub diagnostic: bool,
}

impl KeyState {
    pub fn is_held(&self, key: ControlKey) -> bool {
        match key {
            ControlKey::Up => self.up,
            ControlKey::Down => self.down,
            ControlKey::YawLeft => self.yaw_left,
            ControlKey::YawRight => self.yaw_right,
            ControlKey::Forward => self.forward,
            ControlKey::Back => self.back,
            ControlKey::StrafeLeft => self.strafe_left,
            ControlKey::StrafeRight => self.strafe_right,
            ControlKey::Diagnostic => self.diagnostic,
        }
    }

    pub fn set(&mut self, key: ControlKey, held: bool) {
        let slot = match key {
            ControlKey::Up => &mut self.up,
            ControlKey::Down => &mut self.down,
            ControlKey::YawLeft => &mut self.yaw_left,
            ControlKey::YawRight => &mut self.yaw_right,
            ControlKey::Forward => &mut self.forward,
            ControlKey::Back => &mut self.back,
            ControlKey::StrafeLeft => &mut self.strafe_left,
            ControlKey::StrafeRight => &mut self.strafe_right,
            ControlKey::Diagnostic => &mut self.diagnostic,
        };
        *slot = held;
    }

    /// Releases every key.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Returns true if any key that moves the drone is held.
    pub fn any_motion(&self) -> bool {
        ControlKey::ALL
            .iter()
            .filter(|key| key.is_motion())
            .any(|key| self.is_held(*key))
    }

    /// Applies a raw event. Returns the control key it mapped to, or None if
    /// the key is not recognized (the event is then ignored).
    pub fn apply(&mut self, event: &KeyEvent) -> Option<ControlKey> {
        let key = ControlKey::from_key_name(&event.key)?;
        self.set(key, event.action == KeyAction::Press);
        Some(key)
    }
}

/// What one drain of the sampler observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleReport {
    /// Recognized events applied to the key state
    pub applied: usize,

    /// Unrecognized events dropped
    pub ignored: usize,

    /// Diagnostic key presses (one backend ping each)
    pub diagnostic_presses: usize,

    /// Presses of keys that move the drone
    pub motion_presses: usize,
}

/// Keyboard subscription that folds events into a `KeyState`.
///
/// The subscription lives exactly as long as the sampler: dropping it, on
/// any path, unsubscribes from the keyboard.
pub struct InputSampler {
    rx: Receiver<KeyEvent>,

    /// Set once the keyboard side has gone away
    closed: bool,
}

impl InputSampler {
    /// Subscribes to the keyboard.
    pub fn subscribe(keyboard: &Keyboard) -> Self {
        debug!("Input sampler subscribed");
        Self {
            rx: keyboard.subscribe(),
            closed: false,
        }
    }

    /// Applies every event buffered since the last drain.
    ///
    /// Called once at the start of a frame so the integrator sees a
    /// consistent snapshot for the whole tick.
    pub fn drain_into(&mut self, keys: &mut KeyState) -> SampleReport {
        let mut report = SampleReport::default();

        if self.closed {
            return report;
        }

        loop {
            match self.rx.try_recv() {
                Ok(event) => match keys.apply(&event) {
                    Some(key) => {
                        report.applied += 1;
                        if event.action == KeyAction::Press {
                            if key == ControlKey::Diagnostic {
                                report.diagnostic_presses += 1;
                            } else {
                                report.motion_presses += 1;
                            }
                        }
                    }
                    None => report.ignored += 1,
                },
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Lagged(missed)) => {
                    warn!("Input sampler lagged, {} key events dropped", missed);
                }
                Err(TryRecvError::Closed) => {
                    debug!("Keyboard closed");
                    self.closed = true;
                    break;
                }
            }
        }

        report
    }

    /// Returns true once the keyboard has been dropped.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for InputSampler {
    fn drop(&mut self) {
        debug!("Input sampler unsubscribed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_name_mapping() {
        assert_eq!(ControlKey::from_key_name("ArrowUp"), Some(ControlKey::Up));
        assert_eq!(ControlKey::from_key_name("ArrowRight"), Some(ControlKey::YawRight));
        assert_eq!(ControlKey::from_key_name("W"), Some(ControlKey::Forward));
        assert_eq!(ControlKey::from_key_name("d"), Some(ControlKey::StrafeRight));
        assert_eq!(ControlKey::from_key_name("t"), Some(ControlKey::Diagnostic));
        assert_eq!(ControlKey::from_key_name("q"), None);
        assert_eq!(ControlKey::from_key_name("Escape"), None);
    }

    #[test]
    fn test_press_and_release() {
        let mut keys = KeyState::default();

        keys.apply(&KeyEvent::press("w"));
        assert!(keys.forward);
        assert!(keys.any_motion());

        keys.apply(&KeyEvent::release("w"));
        assert!(!keys.forward);
        assert!(!keys.any_motion());
    }

    #[test]
    fn test_unrecognized_key_is_ignored() {
        let mut keys = KeyState::default();
        assert_eq!(keys.apply(&KeyEvent::press("x")), None);
        assert_eq!(keys, KeyState::default());
    }

    #[test]
    fn test_diagnostic_is_not_motion() {
        let mut keys = KeyState::default();
        keys.apply(&KeyEvent::press("t"));
        assert!(keys.diagnostic);
        assert!(!keys.any_motion());
    }

    #[test]
    fn test_sampler_drains_buffered_events() {
        let keyboard = Keyboard::default();
        let mut sampler = InputSampler::subscribe(&keyboard);
        let mut keys = KeyState::default();

        keyboard.press("ArrowUp");
        keyboard.press("a");
        keyboard.press("z");
        keyboard.press("t");
        keyboard.release("ArrowUp");

        let report = sampler.drain_into(&mut keys);
        assert_eq!(report.applied, 4);
        assert_eq!(report.ignored, 1);
        assert_eq!(report.diagnostic_presses, 1);
        assert_eq!(report.motion_presses, 2);

        assert!(!keys.up);
        assert!(keys.strafe_left);
        assert!(keys.diagnostic);
    }

    #[test]
    fn test_sampler_drop_unsubscribes() {
        let keyboard = Keyboard::default();
        {
            let _sampler = InputSampler::subscribe(&keyboard);
            assert_eq!(keyboard.subscriber_count(), 1);
        }
        assert_eq!(keyboard.subscriber_count(), 0);
    }

    #[test]
    fn test_sampler_survives_lag() {
        let keyboard = Keyboard::new(2);
        let mut sampler = InputSampler::subscribe(&keyboard);
        let mut keys = KeyState::default();

        keyboard.press("w");
        keyboard.press("a");
        keyboard.press("s");
        keyboard.press("d");

        // Oldest events were overwritten; the newest two still land
        let report = sampler.drain_into(&mut keys);
        assert_eq!(report.applied, 2);
        assert!(keys.back);
        assert!(keys.strafe_right);
    }

    #[test]
    fn test_sampler_notices_closed_keyboard() {
        let keyboard = Keyboard::default();
        let mut sampler = InputSampler::subscribe(&keyboard);
        let mut keys = KeyState::default();

        keyboard.press("w");
        drop(keyboard);

        let report = sampler.drain_into(&mut keys);
        assert_eq!(report.applied, 1);
        assert!(sampler.is_closed());
    }
}
