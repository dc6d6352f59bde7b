//! First-person player: input, axis-separated collision and voxel selection.

use cubeworld_core::constants::COLLISION_EPSILON;
use cubeworld_core::coords::WorldPos;
use cubeworld_core::error::{Error, Result};
use cubeworld_core::math::{Aabb, Ray};
use cubeworld_world::Terrain;
use glam::{IVec3, Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::camera::Camera;
use crate::raycast::{cast_voxel_ray, RaycastHit};

/// Number of cell layers at the bottom of the player box that collision
/// ignores; the player stands on top of the voxel its feet are in.
pub const GROUND_OFFSET: i32 = 1;

/// Discrete movement input for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveDirection {
    Front,
    Back,
    Left,
    Right,
    Jump,
}

/// Tuning for player movement. All rates are per simulation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Full extents of the bounding box.
    pub size: Vec3,
    pub gravity: f32,
    /// Vertical speed set by a jump.
    pub jump_velocity: f32,
    /// Acceleration added per movement input.
    pub move_acceleration: f32,
    /// Cap on vertical speed, kept below one voxel per step.
    pub max_fall_speed: f32,
    /// Constant subtracted from lateral acceleration each step.
    pub acceleration_friction: f32,
    pub acceleration_deadzone: f32,
    pub acceleration_cap: f32,
    /// Fraction of lateral velocity lost each step.
    pub velocity_friction: f32,
    pub velocity_deadzone: f32,
    pub velocity_cap: f32,
    /// Maximum voxel selection distance.
    pub reach: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            size: Vec3::new(1.0, 2.0, 1.0),
            gravity: 0.01,
            jump_velocity: 0.25,
            move_acceleration: 0.02,
            max_fall_speed: 0.9,
            acceleration_friction: 0.005,
            acceleration_deadzone: 0.001,
            acceleration_cap: 0.05,
            velocity_friction: 0.2,
            velocity_deadzone: 0.001,
            velocity_cap: 0.15,
            reach: 8.0,
        }
    }
}

impl PlayerConfig {
    /// Check every field for a usable value.
    pub fn validate(&self) -> Result<()> {
        if !(self.size.is_finite() && self.size.cmpgt(Vec3::ZERO).all()) {
            return Err(Error::InvalidConfig(format!(
                "player size must be positive, got {}",
                self.size
            )));
        }
        if !(self.max_fall_speed > 0.0 && self.max_fall_speed < 1.0) {
            return Err(Error::InvalidConfig(format!(
                "max fall speed must be in (0, 1) voxels per step, got {}",
                self.max_fall_speed
            )));
        }
        if !(0.0..=1.0).contains(&self.velocity_friction) {
            return Err(Error::InvalidConfig(format!(
                "velocity friction must be in [0, 1], got {}",
                self.velocity_friction
            )));
        }
        let non_negative = [
            ("gravity", self.gravity),
            ("jump velocity", self.jump_velocity),
            ("move acceleration", self.move_acceleration),
            ("acceleration friction", self.acceleration_friction),
            ("acceleration deadzone", self.acceleration_deadzone),
            ("acceleration cap", self.acceleration_cap),
            ("velocity deadzone", self.velocity_deadzone),
            ("velocity cap", self.velocity_cap),
            ("reach", self.reach),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Player controller.
///
/// `position` is the minimum corner of the bounding box (the feet).
#[derive(Debug, Clone)]
pub struct Player {
    config: PlayerConfig,
    position: Vec3,
    velocity: Vec3,
    acceleration: Vec3,
    on_ground: bool,
    selected: Option<RaycastHit>,
    camera: Camera,
}

impl Player {
    /// Place a player with its feet at `(column.x, column.y)`, standing on
    /// the highest surface under its bounding box.
    ///
    /// Falls back to the top of the chunk when no covered column has a known
    /// surface.
    pub fn spawn(terrain: &Terrain, column: Vec2, config: PlayerConfig) -> Result<Self> {
        config.validate()?;
        let footprint = Aabb::from_min_size(Vec3::new(column.x, 0.0, column.y), config.size);
        let (min, max) = footprint.cell_range(COLLISION_EPSILON);
        let y = (min.x..=max.x)
            .flat_map(|x| (min.z..=max.z).map(move |z| (x, z)))
            .filter_map(|(x, z)| terrain.surface_y(x as f32, z as f32))
            .reduce(f32::max)
            .unwrap_or(terrain.dims().height as f32);

        let mut player = Self {
            acceleration: Vec3::new(0.0, -config.gravity, 0.0),
            config,
            position: Vec3::new(column.x, y, column.y),
            velocity: Vec3::ZERO,
            on_ground: false,
            selected: None,
            camera: Camera::default(),
        };
        player.sync_camera();
        Ok(player)
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Feet position.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn acceleration(&self) -> Vec3 {
        self.acceleration
    }

    pub fn on_ground(&self) -> bool {
        self.on_ground
    }

    /// Eye position, on top of the bounding box.
    pub fn eye(&self) -> Vec3 {
        self.position + Vec3::new(0.0, self.config.size.y, 0.0)
    }

    /// Voxel targeted by the view ray after the last step.
    pub fn selected(&self) -> Option<RaycastHit> {
        self.selected
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.camera.view_matrix()
    }

    /// Move the player without simulating, clearing its motion.
    pub fn teleport(&mut self, position: Vec3) {
        self.position = position;
        self.velocity = Vec3::ZERO;
        self.acceleration = Vec3::new(0.0, -self.config.gravity, 0.0);
        self.on_ground = false;
        self.sync_camera();
    }

    /// Rotate the view by a mouse delta in pixels.
    pub fn look(&mut self, dx: f32, dy: f32) {
        self.camera.look(dx, dy);
    }

    /// Rotate the view from an absolute cursor position.
    pub fn look_at_cursor(&mut self, x: f32, y: f32) {
        self.camera.look_at_cursor(x, y);
    }

    /// Apply one movement input.
    ///
    /// Lateral inputs accelerate along the camera's ground-plane axes. A jump
    /// only takes effect while standing on something.
    pub fn apply_input(&mut self, direction: MoveDirection) {
        let front = self.camera.horizontal_front();
        let right = self.camera.horizontal_right();
        let a = self.config.move_acceleration;

        match direction {
            MoveDirection::Front => self.acceleration += front * a,
            MoveDirection::Back => self.acceleration -= front * a,
            MoveDirection::Right => self.acceleration += right * a,
            MoveDirection::Left => self.acceleration -= right * a,
            MoveDirection::Jump => {
                if self.on_ground {
                    self.velocity.y = self.config.jump_velocity;
                    self.on_ground = false;
                }
            }
        }
    }

    /// Advance the simulation by one step.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn step(&mut self, terrain: &Terrain) {
        self.velocity += self.acceleration;
        let max_fall = self.config.max_fall_speed;
        self.velocity.y = self.velocity.y.clamp(-max_fall, max_fall);

        self.on_ground = false;
        for axis in 0..3 {
            self.resolve_axis(terrain, axis);
        }

        self.apply_friction();
        self.sync_camera();
        self.selected = self.cast_selection(terrain);

        trace!(
            position = ?self.position,
            velocity = ?self.velocity,
            on_ground = self.on_ground,
            selected = ?self.selected.map(|hit| hit.voxel),
            face = ?self.selected.and_then(|hit| hit.face()),
            "player step"
        );
    }

    /// Move along one axis and push back out of any voxel entered.
    fn resolve_axis(&mut self, terrain: &Terrain, axis: usize) {
        let v = self.velocity[axis];
        if v == 0.0 {
            return;
        }

        let size = self.config.size;
        let previous = self.position[axis];
        self.position[axis] += v;
        if !terrain.collides(self.position, size, GROUND_OFFSET) {
            return;
        }

        self.position[axis] = if v > 0.0 {
            (self.position[axis] + size[axis]).floor() - size[axis]
        } else {
            self.position[axis].ceil()
        };
        if terrain.collides(self.position, size, GROUND_OFFSET) {
            self.position[axis] = previous;
        }

        self.velocity[axis] = 0.0;
        if axis == 1 && v < 0.0 {
            self.on_ground = true;
        }
    }

    fn apply_friction(&mut self) {
        let c = &self.config;
        for axis in [0, 2] {
            self.acceleration[axis] = damp_acceleration(
                self.acceleration[axis],
                c.acceleration_deadzone,
                c.acceleration_cap,
                c.acceleration_friction,
            );
            self.velocity[axis] = damp_velocity(
                self.velocity[axis],
                c.velocity_deadzone,
                c.velocity_cap,
                c.velocity_friction,
            );
        }
    }

    fn sync_camera(&mut self) {
        let eye = self.eye();
        self.camera.set_position(eye);
    }

    fn cast_selection(&self, terrain: &Terrain) -> Option<RaycastHit> {
        let ray = Ray::new(self.eye(), self.camera.front())?;
        cast_voxel_ray(&ray, self.config.reach, |pos| terrain.voxel_exists(pos))
    }

    /// Whether `voxel` lies in one of the cells the player's body occupies.
    pub fn occupies(&self, voxel: WorldPos) -> bool {
        let (min, max) =
            Aabb::from_min_size(self.position, self.config.size).cell_range(COLLISION_EPSILON);
        let min = min + IVec3::new(0, GROUND_OFFSET, 0);
        let p = voxel.to_ivec3();
        p.cmpge(min).all() && p.cmple(max).all()
    }

    /// Remove the selected voxel.
    ///
    /// Returns the removed position, or `None` when nothing is selected.
    pub fn break_selected(&mut self, terrain: &mut Terrain) -> Result<Option<WorldPos>> {
        let Some(hit) = self.selected else {
            return Ok(None);
        };
        terrain.set_voxel(hit.voxel, false)?;
        self.selected = None;
        Ok(Some(hit.voxel))
    }

    /// Add a voxel against the selected face.
    ///
    /// Returns the new voxel's position, or `None` when nothing is selected,
    /// the ray started inside a voxel, or the cell overlaps the player.
    pub fn place_at_selected(&mut self, terrain: &mut Terrain) -> Result<Option<WorldPos>> {
        let Some(target) = self.selected.and_then(|hit| hit.adjacent()) else {
            return Ok(None);
        };
        if self.occupies(target) {
            return Ok(None);
        }
        if !terrain.set_voxel(target, true)? {
            return Ok(None);
        }
        self.selected = None;
        Ok(Some(target))
    }
}

/// Lateral acceleration decay: snap small values to zero, clamp large ones,
/// otherwise shrink toward zero by a constant.
fn damp_acceleration(a: f32, deadzone: f32, cap: f32, friction: f32) -> f32 {
    let magnitude = a.abs();
    if magnitude < deadzone {
        0.0
    } else if magnitude > cap {
        cap.copysign(a)
    } else {
        (magnitude - friction).max(0.0).copysign(a)
    }
}

/// Lateral velocity decay: snap small values to zero, clamp large ones,
/// otherwise scale by `1 - friction`.
fn damp_velocity(v: f32, deadzone: f32, cap: f32, friction: f32) -> f32 {
    let magnitude = v.abs();
    if magnitude < deadzone {
        0.0
    } else if magnitude > cap {
        cap.copysign(v)
    } else {
        v * (1.0 - friction)
    }
}
