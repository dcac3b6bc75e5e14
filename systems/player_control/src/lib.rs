#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system translating polled movement keys into player commands.

use lava_run_core::{Command, Facing, RunPhase};

/// Movement keys polled by the host for the current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControlInput {
    /// Whether the move-left key is held.
    pub left: bool,
    /// Whether the move-right key is held.
    pub right: bool,
    /// Whether the jump key is held.
    pub up: bool,
}

/// Player control system; left wins over right when both keys are held.
#[derive(Debug, Default)]
pub struct PlayerControl;

impl PlayerControl {
    /// Emits the movement intent for this frame and a jump when grounded.
    pub fn handle(
        &mut self,
        phase: RunPhase,
        input: ControlInput,
        grounded: bool,
        out: &mut Vec<Command>,
    ) {
        if phase != RunPhase::Playing {
            return;
        }

        let intent = if input.left {
            Some(Facing::Left)
        } else if input.right {
            Some(Facing::Right)
        } else {
            None
        };
        out.push(Command::MovePlayer { intent });

        if input.up && grounded {
            out.push(Command::JumpPlayer);
        }
    }
}
