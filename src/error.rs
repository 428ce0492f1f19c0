//! Rule violations raised by the room engine and the command parser.
//!
//! Every variant is recoverable: the turn controller writes the message into
//! the turn log and carries on. Only `NoEmptySpace` during setup is fatal.

use thiserror::Error;

/// Why a step into a neighbouring cell was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    Wall,
    Enemy,
    Occupied,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("You cannot escape into the void.")]
    OutOfBounds,
    #[error("{}", blocked_message(.0))]
    Blocked(BlockReason),
    #[error("You cannot attack yourself.")]
    SelfTarget,
    #[error("There is nothing there.")]
    NoEntity,
    #[error("invalid command")]
    InvalidCommand,
    #[error("unknown action: {0}")]
    UnrecognizedAction(String),
    #[error("You can't {verb} that way.")]
    BadDirection { verb: &'static str },
    #[error("no empty space left in the room")]
    NoEmptySpace,
}

fn blocked_message(reason: &BlockReason) -> &'static str {
    match reason {
        BlockReason::Wall => "You run into a wall.",
        BlockReason::Enemy => "You cannot move into another enemy.",
        BlockReason::Occupied => "Something is already standing there.",
    }
}
