//! First-person camera with yaw/pitch mouse look.

use std::f32::consts::FRAC_PI_2;

use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};

/// Mouse sensitivity for camera rotation (radians per pixel).
pub const DEFAULT_SENSITIVITY: f32 = 0.002;

/// Horizontal front vectors shorter than this fall back to `-Z`.
const MIN_HORIZONTAL_LENGTH: f32 = 0.001;

/// First-person camera.
///
/// Orientation is kept as yaw (around `+Y`) and pitch (around the local `+X`)
/// and converted to a quaternion on demand. With both at zero the camera
/// looks down `-Z`.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    yaw: f32,
    pitch: f32,
    pub sensitivity: f32,
    /// Last absolute cursor position seen by [`Camera::look_at_cursor`].
    last_cursor: Option<Vec2>,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            sensitivity: DEFAULT_SENSITIVITY,
            last_cursor: None,
        }
    }
}

impl Camera {
    /// Create a camera at `position` looking down `-Z`.
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Set the camera position.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Yaw in radians.
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Pitch in radians, within `±π/2`.
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Set the orientation directly; pitch is clamped.
    pub fn set_orientation(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch.clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    /// Rotate by a mouse delta in pixels.
    ///
    /// Moving right turns right, moving down looks down.
    pub fn look(&mut self, dx: f32, dy: f32) {
        self.set_orientation(
            self.yaw - dx * self.sensitivity,
            self.pitch - dy * self.sensitivity,
        );
    }

    /// Rotate from an absolute cursor position.
    ///
    /// The first sample only records the position, so the view does not
    /// jump when the cursor is first captured.
    pub fn look_at_cursor(&mut self, x: f32, y: f32) {
        let cursor = Vec2::new(x, y);
        if let Some(last) = self.last_cursor {
            let delta = cursor - last;
            self.look(delta.x, delta.y);
        }
        self.last_cursor = Some(cursor);
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Unit view direction.
    pub fn front(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_Z
    }

    /// Unit up vector of the view.
    pub fn up(&self) -> Vec3 {
        self.rotation() * Vec3::Y
    }

    /// View direction projected onto the ground plane.
    ///
    /// Falls back to `-Z` when looking straight up or down.
    pub fn horizontal_front(&self) -> Vec3 {
        let front = self.front();
        let flat = Vec3::new(front.x, 0.0, front.z);
        if flat.length() < MIN_HORIZONTAL_LENGTH {
            Vec3::NEG_Z
        } else {
            flat.normalize()
        }
    }

    /// Strafe direction on the ground plane.
    pub fn horizontal_right(&self) -> Vec3 {
        self.horizontal_front().cross(Vec3::Y)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.front(), self.up())
    }
}
