//! Scripted player input for headless runs.

use cubeworld_physics::{MoveDirection, Player};
use cubeworld_world::Terrain;
use tracing::{debug, warn};

/// Mouse delta per frame while turning, in pixels.
const TURN_SPEED: f32 = 12.0;

/// One phase of the input loop.
#[derive(Debug, Clone, Copy)]
struct Phase {
    frames: u64,
    moves: &'static [MoveDirection],
    look: (f32, f32),
}

const PHASES: &[Phase] = &[
    Phase {
        frames: 90,
        moves: &[MoveDirection::Front],
        look: (0.0, 0.0),
    },
    Phase {
        frames: 30,
        moves: &[MoveDirection::Front, MoveDirection::Jump],
        look: (TURN_SPEED, 0.0),
    },
    Phase {
        frames: 60,
        moves: &[MoveDirection::Left],
        look: (0.0, 4.0),
    },
    Phase {
        frames: 60,
        moves: &[MoveDirection::Back, MoveDirection::Right],
        look: (-TURN_SPEED, -4.0),
    },
];

/// Repeating walk/turn/jump pattern with periodic voxel edits.
#[derive(Debug)]
pub struct Script {
    cycle_length: u64,
}

impl Default for Script {
    fn default() -> Self {
        Self::new()
    }
}

impl Script {
    pub fn new() -> Self {
        Self {
            cycle_length: PHASES.iter().map(|p| p.frames).sum(),
        }
    }

    /// Index into `PHASES` of the phase active at `frame`.
    fn phase_index(&self, frame: u64) -> Option<usize> {
        if self.cycle_length == 0 {
            return None;
        }
        let mut t = frame % self.cycle_length;
        for (index, phase) in PHASES.iter().enumerate() {
            if t < phase.frames {
                return Some(index);
            }
            t -= phase.frames;
        }
        None
    }

    /// Feed this frame's input to the player and apply scheduled edits.
    ///
    /// Returns the number of voxels changed.
    pub fn drive(&mut self, frame: u64, player: &mut Player, terrain: &mut Terrain) -> usize {
        if let Some(phase) = self.phase_index(frame).map(|i| &PHASES[i]) {
            player.look(phase.look.0, phase.look.1);
            for &direction in phase.moves {
                player.apply_input(direction);
            }
        }

        let edit = if frame % 45 == 44 {
            player.break_selected(terrain)
        } else if frame % 70 == 69 {
            player.place_at_selected(terrain)
        } else {
            return 0;
        };

        match edit {
            Ok(Some(pos)) => {
                debug!(frame, ?pos, "voxel edited");
                1
            }
            Ok(None) => 0,
            // the selection can point into a chunk unloaded since the last step
            Err(err) => {
                warn!(frame, %err, "edit skipped");
                0
            }
        }
    }
}
