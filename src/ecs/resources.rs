use bracket_geometry::prelude::Point;

/// Where the enemies are chasing to this turn.
#[derive(Clone, Copy, Debug)]
pub struct ChaseTarget {
    pub point: Point,
}

/// Global turn counter, wrapping at 256. Enemies act on even turns only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TurnClock(pub u8);

impl TurnClock {
    pub fn advance(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }

    pub fn enemies_act(&self) -> bool {
        self.0 % 2 == 0
    }
}
