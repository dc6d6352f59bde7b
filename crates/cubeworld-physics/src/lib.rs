//! Player physics for the Cubeworld engine: mouse-look camera, DDA voxel
//! raycasting and axis-separated collision against the terrain.

pub mod camera;
pub mod player;
pub mod raycast;

pub use camera::Camera;
pub use player::{MoveDirection, Player, PlayerConfig, GROUND_OFFSET};
pub use raycast::{cast_voxel_ray, RaycastHit};
