#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Camera controller with orbit-preserving fly-to animation and discrete pan/zoom.
//!
//! Time is supplied by the caller as a monotonic [`Duration`] so the
//! controller can be advanced with synthetic timestamps.

use std::time::Duration;

use glam::Vec3;
use serde::Deserialize;

/// Tunable camera behaviour.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Camera position restored by [`Camera::recenter`].
    pub initial_position: Vec3,
    /// Look-at target restored by [`Camera::recenter`].
    pub initial_target: Vec3,
    /// Length of a fly-to animation in milliseconds.
    pub fly_duration_ms: u64,
    /// Distance moved by a single pan step.
    pub pan_step: f32,
    /// Distance multiplier applied when zooming out.
    pub zoom_out_factor: f32,
    /// Distance multiplier applied when zooming in.
    pub zoom_in_factor: f32,
    /// Closest allowed camera-to-target distance.
    pub min_distance: f32,
    /// Farthest allowed camera-to-target distance.
    pub max_distance: f32,
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            initial_position: Vec3::new(-25.192_36, 8.430_197, 7.482_821_5),
            initial_target: Vec3::new(1.0, 2.0, 6.7),
            fly_duration_ms: 700,
            pan_step: 1.2,
            zoom_out_factor: 1.15,
            zoom_in_factor: 0.85,
            min_distance: 6.0,
            max_distance: 60.0,
            fov_y_degrees: 50.0,
        }
    }
}

impl CameraConfig {
    /// Length of a fly-to animation.
    #[must_use]
    pub fn fly_duration(&self) -> Duration {
        Duration::from_millis(self.fly_duration_ms)
    }

    /// Vertical field of view in radians.
    #[must_use]
    pub fn fov_y(&self) -> f32 {
        self.fov_y_degrees.to_radians()
    }
}

/// Camera position together with the point it orbits and looks at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    /// Eye position.
    pub position: Vec3,
    /// Look-at target.
    pub target: Vec3,
}

impl CameraPose {
    /// Creates a pose from an eye position and target.
    #[must_use]
    pub const fn new(position: Vec3, target: Vec3) -> Self {
        Self { position, target }
    }

    /// Offset from the target to the eye.
    #[must_use]
    pub fn offset(&self) -> Vec3 {
        self.position - self.target
    }

    fn lerp(self, end: Self, t: f32) -> Self {
        Self {
            position: self.position.lerp(end.position, t),
            target: self.target.lerp(end.target, t),
        }
    }
}

/// In-progress fly-to animation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlightState {
    /// Timestamp the animation started at.
    pub start: Duration,
    /// Total length of the animation.
    pub duration: Duration,
    /// Pose at the start of the animation.
    pub from: CameraPose,
    /// Pose reached when the animation completes.
    pub to: CameraPose,
}

impl FlightState {
    /// Normalized progress at `now`, clamped to `0.0..=1.0`.
    #[must_use]
    pub fn progress(&self, now: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.start);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }
}

/// Symmetric quadratic ease-in-out over `0.0..=1.0`.
#[must_use]
pub fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        let remaining = 1.0 - t;
        1.0 - 2.0 * remaining * remaining
    }
}

/// Horizontal pan directions relative to the camera's view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PanDirection {
    /// Along the level forward axis.
    Forward,
    /// Against the level forward axis.
    Backward,
    /// Against the right axis.
    Left,
    /// Along the right axis.
    Right,
}

/// Zoom directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ZoomDirection {
    /// Moves the camera toward its target.
    In,
    /// Moves the camera away from its target.
    Out,
}

/// Stateful camera controller advanced once per frame.
#[derive(Clone, Debug)]
pub struct Camera {
    config: CameraConfig,
    pose: CameraPose,
    flight: Option<FlightState>,
}

impl Camera {
    /// Creates a camera at the configured initial pose.
    #[must_use]
    pub fn new(config: CameraConfig) -> Self {
        Self {
            pose: CameraPose::new(config.initial_position, config.initial_target),
            config,
            flight: None,
        }
    }

    /// Current pose.
    #[must_use]
    pub const fn pose(&self) -> CameraPose {
        self.pose
    }

    /// Configuration the camera was created with.
    #[must_use]
    pub const fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Animation in progress, if any.
    #[must_use]
    pub const fn flight(&self) -> Option<&FlightState> {
        self.flight.as_ref()
    }

    /// Starts flying toward `destination`, keeping the current viewing offset.
    ///
    /// Any animation already in progress is replaced from the current pose.
    pub fn fly_to(&mut self, destination: Vec3, now: Duration) {
        let to = CameraPose::new(destination + self.pose.offset(), destination);
        if self.flight.is_some() {
            tracing::debug!("replacing in-flight camera animation");
        }
        self.flight = Some(FlightState {
            start: now,
            duration: self.config.fly_duration(),
            from: self.pose,
            to,
        });
    }

    /// Advances the active animation to `now` and returns the resulting pose.
    ///
    /// The animation is discarded once it completes, leaving the camera exactly
    /// at its end pose.
    pub fn update(&mut self, now: Duration) -> CameraPose {
        let Some(flight) = self.flight else {
            return self.pose;
        };

        let t = flight.progress(now);
        if t >= 1.0 {
            self.pose = flight.to;
            self.flight = None;
        } else {
            self.pose = flight.from.lerp(flight.to, ease_in_out(t));
        }
        self.pose
    }

    /// Moves camera and target together by one pan step, staying level.
    pub fn pan(&mut self, direction: PanDirection) {
        let forward = Vec3::new(-self.pose.offset().x, 0.0, -self.pose.offset().z).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let delta = match direction {
            PanDirection::Forward => forward,
            PanDirection::Backward => -forward,
            PanDirection::Left => -right,
            PanDirection::Right => right,
        } * self.config.pan_step;

        self.flight = None;
        self.pose.position += delta;
        self.pose.target += delta;
    }

    /// Scales the camera-to-target distance, clamped to the configured range.
    pub fn zoom(&mut self, direction: ZoomDirection) {
        let offset = self.pose.offset();
        let distance = offset.length();
        if distance <= f32::EPSILON {
            return;
        }

        let factor = match direction {
            ZoomDirection::In => self.config.zoom_in_factor,
            ZoomDirection::Out => self.config.zoom_out_factor,
        };
        let clamped = (distance * factor).clamp(self.config.min_distance, self.config.max_distance);

        self.flight = None;
        self.pose.position = self.pose.target + offset * (clamped / distance);
    }

    /// Snaps back to the initial pose, abandoning any animation.
    pub fn recenter(&mut self) {
        self.flight = None;
        self.pose = CameraPose::new(self.config.initial_position, self.config.initial_target);
    }
}
