//! # Input Translator Module
//!
//! Applies decoded [`Command`]s to the host through an [`InputSink`].
//!
//! The translator owns all per-session state:
//!
//! - **Left stick**: the absolute screen point the pointer is steered to
//! - **Right stick**: a signed offset (screen orientation) compared against the
//!   dead zone
//! - **Latch**: the set of keys currently held down
//!
//! Key transitions are de-duplicated against the latch, so repeating a press
//! never reaches the sink twice. Nothing here is fatal: unknown input and failed
//! injection calls become diagnostics in the returned [`FrameOutcome`].
//!
//! ## Usage
//!
//! ```no_run
//! use pad_bridge::config::Config;
//! use pad_bridge::controller::translator::InputTranslator;
//! use pad_bridge::controller::geometry::ScreenGeometry;
//! use pad_bridge::sink::UinputSink;
//!
//! let config = Config::default();
//! let geometry = ScreenGeometry::from_config(&config.screen);
//! let mut sink = UinputSink::new(&config.input.device_name, &geometry)?;
//! let mut translator = InputTranslator::from_config(&config);
//!
//! translator.begin_session(&mut sink);
//! let outcome = translator.apply_frame("BTN:A=1;JOY-L:V=0.5", &mut sink);
//! assert!(outcome.reply.is_none());
//! translator.end_session(&mut sink);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::BTreeSet;

use tracing::{debug, warn};

use super::geometry::{Point, ScreenGeometry};
use super::hysteresis::StickHysteresisEngine;
use super::keymap::{stick_keys, AbstractKey, KeyMapTable};
use super::pointer::PointerCorrectionModel;
use crate::config::Config;
use crate::error::PadBridgeError;
use crate::protocol::command::GREETING_REPLY;
use crate::protocol::{parse_frame, Category, Command, Side, Stick, UnknownReason};
use crate::sink::InputSink;

/// Default multiplier from right-stick deflection to engine units
pub const DEFAULT_RIGHT_STICK_SCALE: f32 = 100.0;

/// Result of applying one frame
#[derive(Debug, Default)]
pub struct FrameOutcome {
    /// Text to send back to the peer, if any
    pub reply: Option<&'static str>,
    /// Non-fatal problems raised while applying the frame
    pub diagnostics: Vec<PadBridgeError>,
}

impl FrameOutcome {
    fn merge(&mut self, other: FrameOutcome) {
        if other.reply.is_some() {
            self.reply = other.reply;
        }
        self.diagnostics.extend(other.diagnostics);
    }
}

/// Mutable state of one controller session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Current left-stick target in screen coordinates
    pub left_stick: Point,
    /// Current right-stick offset, positive y pointing down
    pub right_stick: Point,
    /// Keys currently held down
    pub latched: BTreeSet<AbstractKey>,
    /// Last point the pointer was sent to
    pub pointer: Point,
}

impl SessionState {
    fn initial(geometry: &ScreenGeometry, right_stick_seed: Point) -> Self {
        Self {
            left_stick: geometry.center(),
            right_stick: right_stick_seed,
            latched: BTreeSet::new(),
            pointer: geometry.midpoint(),
        }
    }
}

/// Orchestrates parsing, key mapping, hysteresis and pointer correction
#[derive(Debug, Clone)]
pub struct InputTranslator {
    geometry: ScreenGeometry,
    pointer_model: PointerCorrectionModel,
    hysteresis: StickHysteresisEngine,
    right_stick_scale: f32,
    right_stick_seed: Point,
    session: SessionState,
}

impl InputTranslator {
    /// Create a translator
    ///
    /// # Arguments
    ///
    /// * `geometry` - Host display geometry
    /// * `pointer_model` - Left-stick mapping and display-scaling correction
    /// * `hysteresis` - Right-stick dead-zone engine
    /// * `right_stick_scale` - Multiplier from stick deflection to engine units
    /// * `right_stick_seed` - Right-stick offset before the first reading
    #[must_use]
    pub fn new(
        geometry: ScreenGeometry,
        pointer_model: PointerCorrectionModel,
        hysteresis: StickHysteresisEngine,
        right_stick_scale: f32,
        right_stick_seed: Point,
    ) -> Self {
        Self {
            session: SessionState::initial(&geometry, right_stick_seed),
            geometry,
            pointer_model,
            hysteresis,
            right_stick_scale,
            right_stick_seed,
        }
    }

    /// Create a translator from the loaded configuration
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            ScreenGeometry::from_config(&config.screen),
            PointerCorrectionModel::new(
                config.pointer.scale_factor,
                config.pointer.stick_radius as f32,
            ),
            StickHysteresisEngine::new(config.right_stick.threshold),
            config.right_stick.scale as f32,
            Point::new(config.right_stick.seed_x, config.right_stick.seed_y),
        )
    }

    #[must_use]
    pub fn geometry(&self) -> &ScreenGeometry {
        &self.geometry
    }

    #[must_use]
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Check whether a key is currently held
    #[must_use]
    pub fn is_latched(&self, key: AbstractKey) -> bool {
        self.session.latched.contains(&key)
    }

    /// Start a session: reset state and centre the pointer
    pub fn begin_session(&mut self, sink: &mut dyn InputSink) -> Vec<PadBridgeError> {
        let pointer = self.session.pointer;
        self.session = SessionState::initial(&self.geometry, self.right_stick_seed);
        self.session.pointer = pointer;

        let mut diagnostics = Vec::new();
        self.move_pointer(self.geometry.midpoint(), sink, &mut diagnostics);
        diagnostics
    }

    /// End a session: release every held key and reset state
    ///
    /// The pointer is left where it is.
    pub fn end_session(&mut self, sink: &mut dyn InputSink) -> Vec<PadBridgeError> {
        let mut diagnostics = Vec::new();
        let held: Vec<AbstractKey> = self.session.latched.iter().copied().collect();
        for key in held {
            self.set_key(key, false, sink, &mut diagnostics);
        }

        let pointer = self.session.pointer;
        self.session = SessionState::initial(&self.geometry, self.right_stick_seed);
        self.session.pointer = pointer;
        diagnostics
    }

    /// Parse and apply a raw frame
    ///
    /// Every command of the frame is applied before returning. A bad fragment
    /// only costs that fragment.
    pub fn apply_frame(&mut self, frame: &str, sink: &mut dyn InputSink) -> FrameOutcome {
        let mut outcome = FrameOutcome::default();
        for command in parse_frame(frame) {
            outcome.merge(self.apply_command(&command, sink));
        }
        outcome
    }

    /// Apply one decoded command
    pub fn apply_command(&mut self, command: &Command, sink: &mut dyn InputSink) -> FrameOutcome {
        let mut outcome = FrameOutcome::default();

        match command {
            Command::Greeting => {
                debug!("Greeting received");
                outcome.reply = Some(GREETING_REPLY);
            }
            Command::Button {
                category,
                button_id,
                pressed,
            } => match KeyMapTable::resolve(*category, button_id) {
                Some(key) => self.set_key(key, *pressed, sink, &mut outcome.diagnostics),
                None => report(
                    &mut outcome.diagnostics,
                    PadBridgeError::UnknownButton {
                        category: category.tag().to_string(),
                        button: button_id.clone(),
                    },
                ),
            },
            Command::Brake { side, magnitude } => {
                self.apply_brake(*side, *magnitude, sink, &mut outcome.diagnostics)
            }
            Command::Stick {
                stick: Stick::Left,
                vertical,
                horizontal,
            } => self.apply_left_stick(*vertical, *horizontal, sink, &mut outcome.diagnostics),
            Command::Stick {
                stick: Stick::Right,
                vertical,
                horizontal,
            } => self.apply_right_stick(*vertical, *horizontal, sink, &mut outcome.diagnostics),
            Command::Unknown { raw, reason } => {
                report(&mut outcome.diagnostics, unknown_to_error(raw, reason))
            }
        }

        outcome
    }

    fn apply_brake(
        &mut self,
        side: Side,
        magnitude: f32,
        sink: &mut dyn InputSink,
        diagnostics: &mut Vec<PadBridgeError>,
    ) {
        match KeyMapTable::resolve(Category::Brake, side.id()) {
            Some(key) => self.set_key(key, magnitude != 0.0, sink, diagnostics),
            None => report(
                diagnostics,
                PadBridgeError::UnknownButton {
                    category: Category::Brake.tag().to_string(),
                    button: side.id().to_string(),
                },
            ),
        }
    }

    fn apply_left_stick(
        &mut self,
        vertical: Option<f32>,
        horizontal: Option<f32>,
        sink: &mut dyn InputSink,
        diagnostics: &mut Vec<PadBridgeError>,
    ) {
        let target = self.pointer_model.left_stick_target(
            self.session.left_stick,
            &self.geometry,
            vertical,
            horizontal,
        );
        self.session.left_stick = target;
        self.move_pointer(target, sink, diagnostics);
    }

    fn apply_right_stick(
        &mut self,
        vertical: Option<f32>,
        horizontal: Option<f32>,
        sink: &mut dyn InputSink,
        diagnostics: &mut Vec<PadBridgeError>,
    ) {
        // Stored in screen orientation: pushing up is negative y
        if let Some(v) = vertical {
            self.session.right_stick.y = (-v * self.right_stick_scale) as i32;
        }
        if let Some(h) = horizontal {
            self.session.right_stick.x = (h * self.right_stick_scale) as i32;
        }

        let plan = self.hysteresis.plan(self.session.right_stick);
        debug!("Right stick {} -> {:?}", self.session.right_stick, plan);

        let states = plan.key_states();
        // Releases first so opposite keys are never held together
        for (key, pressed) in states.iter().filter(|(_, pressed)| !pressed) {
            self.set_key(*key, *pressed, sink, diagnostics);
        }
        for (key, pressed) in states.iter().filter(|(_, pressed)| *pressed) {
            // Opposite key still down after a failed release
            if opposite_key(*key).is_some_and(|other| self.is_latched(other)) {
                continue;
            }
            self.set_key(*key, *pressed, sink, diagnostics);
        }
    }

    /// Move the pointer so it lands on `target`
    fn move_pointer(
        &mut self,
        target: Point,
        sink: &mut dyn InputSink,
        diagnostics: &mut Vec<PadBridgeError>,
    ) {
        let origin = sink.pointer_position().unwrap_or(self.session.pointer);
        let request = self.pointer_model.apply(target, origin);
        debug!("Pointer target {} from {} -> request {}", target, origin, request);

        self.session.pointer = target;
        if let Err(e) = sink.move_to(request) {
            report(diagnostics, e);
        }
    }

    /// Drive a key to `pressed`, skipping redundant transitions
    fn set_key(
        &mut self,
        key: AbstractKey,
        pressed: bool,
        sink: &mut dyn InputSink,
        diagnostics: &mut Vec<PadBridgeError>,
    ) {
        if self.session.latched.contains(&key) == pressed {
            return;
        }

        let result = if pressed {
            sink.key_down(key)
        } else {
            sink.key_up(key)
        };

        // A failed call leaves the latch alone so the next command retries it
        match result {
            Ok(()) if pressed => {
                self.session.latched.insert(key);
            }
            Ok(()) => {
                self.session.latched.remove(&key);
            }
            Err(e) => report(diagnostics, e),
        }
    }
}

/// The directional key on the other side of the same axis
fn opposite_key(key: AbstractKey) -> Option<AbstractKey> {
    match key {
        stick_keys::UP => Some(stick_keys::DOWN),
        stick_keys::DOWN => Some(stick_keys::UP),
        stick_keys::LEFT => Some(stick_keys::RIGHT),
        stick_keys::RIGHT => Some(stick_keys::LEFT),
        _ => None,
    }
}

fn unknown_to_error(raw: &str, reason: &UnknownReason) -> PadBridgeError {
    match reason {
        UnknownReason::Malformed(detail) => PadBridgeError::Parse {
            fragment: raw.to_string(),
            detail: detail.clone(),
        },
        UnknownReason::UnknownCategory => PadBridgeError::UnknownCategory(raw.to_string()),
        UnknownReason::UnknownButton { category, id } => PadBridgeError::UnknownButton {
            category: category.tag().to_string(),
            button: id.clone(),
        },
    }
}

fn report(diagnostics: &mut Vec<PadBridgeError>, error: PadBridgeError) {
    warn!("{}", error);
    diagnostics.push(error);
}
