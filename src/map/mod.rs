use bracket_geometry::prelude::{DistanceAlg, Point};
use bracket_random::prelude::RandomNumberGenerator;
use specs::prelude::Entity;

use crate::error::{BlockReason, RuleError};

pub const DEFAULT_ROOM_WIDTH: i32 = 24;
pub const DEFAULT_ROOM_HEIGHT: i32 = 8;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Empty,
    Player,
    Enemy,
    Wall,
    Exit,
}

impl Kind {
    /// Player and enemy are the only pairing where stepping in means attacking.
    pub fn is_hostile_to(self, other: Kind) -> bool {
        matches!(
            (self, other),
            (Kind::Player, Kind::Enemy) | (Kind::Enemy, Kind::Player)
        )
    }
}

/// What fills a cell. There is no "unset" state: a vacated cell gets a
/// brand new `Empty`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Occupant {
    Empty,
    Wall,
    Actor { entity: Entity, kind: Kind },
}

impl Occupant {
    #[cfg(test)]
    pub fn kind(&self) -> Kind {
        match self {
            Occupant::Empty => Kind::Empty,
            Occupant::Wall => Kind::Wall,
            Occupant::Actor { kind, .. } => *kind,
        }
    }

    pub fn entity(&self) -> Option<Entity> {
        match self {
            Occupant::Actor { entity, .. } => Some(*entity),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    pub point: Point,
    pub occupant: Occupant,
}

/// Messages produced while a turn resolves; drained by every redraw.
#[derive(Clone, Debug, Default)]
pub struct TurnLog {
    entries: Vec<String>,
}

impl TurnLog {
    pub fn push<S: Into<String>>(&mut self, entry: S) {
        self.entries.push(entry.into());
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.entries)
    }
}

#[derive(Clone, Debug)]
pub struct Room {
    pub width: i32,
    pub height: i32,
    pub level: u32,
    cells: Vec<Cell>,
    pub log: TurnLog,
}

impl Room {
    pub fn new(width: i32, height: i32, level: u32) -> Self {
        let mut cells = Vec::with_capacity((width.max(0) * height.max(0)) as usize);
        for y in 0..height {
            for x in 0..width {
                let border = x == 0 || x == width - 1 || y == 0 || y == height - 1;
                cells.push(Cell {
                    point: Point::new(x, y),
                    occupant: if border {
                        Occupant::Wall
                    } else {
                        Occupant::Empty
                    },
                });
            }
        }

        Self {
            width,
            height,
            level,
            cells,
            log: TurnLog::default(),
        }
    }

    fn idx(&self, point: Point) -> Option<usize> {
        if self.in_bounds(point) {
            Some((point.y * self.width + point.x) as usize)
        } else {
            None
        }
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height
    }

    pub fn cell(&self, point: Point) -> Option<&Cell> {
        self.idx(point).map(|idx| &self.cells[idx])
    }

    pub fn occupant_at(&self, point: Point) -> Option<Occupant> {
        self.cell(point).map(|cell| cell.occupant)
    }

    pub fn is_empty_at(&self, point: Point) -> bool {
        matches!(self.occupant_at(point), Some(Occupant::Empty))
    }

    /// Checks that a spawn may go to `point` without touching anything.
    pub fn check_vacant(&self, point: Point) -> Result<(), RuleError> {
        match self.occupant_at(point) {
            None => Err(RuleError::OutOfBounds),
            Some(Occupant::Empty) => Ok(()),
            Some(Occupant::Wall) => Err(RuleError::Blocked(BlockReason::Wall)),
            Some(Occupant::Actor { .. }) => Err(RuleError::Blocked(BlockReason::Occupied)),
        }
    }

    /// Puts a freshly spawned actor into an empty interior cell.
    pub fn place(&mut self, point: Point, entity: Entity, kind: Kind) -> Result<(), RuleError> {
        self.check_vacant(point)?;
        self.set_occupant(point, Occupant::Actor { entity, kind });
        Ok(())
    }

    /// Moves whatever stands at `from` into `to`; the caller has already
    /// decided the step is legal.
    pub(crate) fn relocate(&mut self, from: Point, to: Point) {
        if let Some(occupant) = self.occupant_at(from) {
            self.set_occupant(from, Occupant::Empty);
            self.set_occupant(to, occupant);
        }
    }

    fn set_occupant(&mut self, point: Point, occupant: Occupant) {
        if let Some(idx) = self.idx(point) {
            // Borders stay walls forever.
            if self.cells[idx].occupant != Occupant::Wall {
                self.cells[idx].occupant = occupant;
            }
        }
    }

    /// Empty cells in scan order: x outer, y inner.
    pub fn empty_points(&self) -> Vec<Point> {
        let mut points = Vec::new();
        for x in 0..self.width {
            for y in 0..self.height {
                let point = Point::new(x, y);
                if self.is_empty_at(point) {
                    points.push(point);
                }
            }
        }
        points
    }

    pub fn find_empty_space(&self, rng: &mut RandomNumberGenerator) -> Option<Point> {
        let candidates = self.empty_points();
        if candidates.is_empty() {
            return None;
        }
        let idx = rng.range(0, candidates.len());
        candidates.get(idx).copied()
    }

    /// Empty cells in the square of `radius` around `center`, restricted to
    /// `[0, width-1) x [0, height-1)`. The scan window is clamped to that
    /// area first, so any radius costs at most one pass over the room.
    pub fn find_empty_spaces_close_together(&self, center: Point, radius: i32) -> Vec<Point> {
        let mut points = Vec::new();
        let x_lo = center.x.saturating_sub(radius).max(0);
        let x_hi = center.x.saturating_add(radius).min(self.width - 2);
        let y_lo = center.y.saturating_sub(radius).max(0);
        let y_hi = center.y.saturating_add(radius).min(self.height - 2);
        for x in x_lo..=x_hi {
            for y in y_lo..=y_hi {
                let point = Point::new(x, y);
                if self.is_empty_at(point) {
                    points.push(point);
                }
            }
        }
        points
    }

    /// The cell farthest from `origin`. Ties keep the first cell met while
    /// scanning x outer, y inner. `None` if nothing lies farther than the
    /// origin itself.
    pub fn find_farthest_distance(&self, origin: Point, skip_walls: bool) -> Option<Point> {
        let mut best = None;
        let mut best_distance = 0.0_f32;
        for x in 0..self.width {
            for y in 0..self.height {
                let point = Point::new(x, y);
                if skip_walls && matches!(self.occupant_at(point), Some(Occupant::Wall)) {
                    continue;
                }
                let distance = DistanceAlg::PythagorasSquared.distance2d(origin, point);
                if distance > best_distance {
                    best_distance = distance;
                    best = Some(point);
                }
            }
        }
        best
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use specs::prelude::{Builder, World, WorldExt};

    fn actor(world: &mut World) -> Entity {
        world.create_entity().build()
    }

    #[test]
    fn border_cells_are_walls() {
        let room = Room::new(6, 4, 1);
        for cell in room.cells() {
            let p = cell.point;
            let border = p.x == 0 || p.y == 0 || p.x == 5 || p.y == 3;
            assert_eq!(cell.occupant == Occupant::Wall, border, "cell {p:?}");
        }
        assert_eq!(room.empty_points().len(), 4 * 2);
    }

    #[test]
    fn empty_space_is_none_when_room_is_full() {
        let mut world = World::new();
        let mut room = Room::new(3, 3, 1);
        let mut rng = RandomNumberGenerator::seeded(1);
        assert_eq!(room.find_empty_space(&mut rng), Some(Point::new(1, 1)));

        let entity = actor(&mut world);
        room.place(Point::new(1, 1), entity, Kind::Enemy).unwrap();
        assert_eq!(room.find_empty_space(&mut rng), None);
    }

    #[test]
    fn placing_refuses_walls_and_occupied_cells() {
        let mut world = World::new();
        let mut room = Room::new(5, 5, 1);
        let first = actor(&mut world);
        let second = actor(&mut world);

        assert_eq!(
            room.place(Point::new(0, 2), first, Kind::Player),
            Err(RuleError::Blocked(BlockReason::Wall))
        );
        assert_eq!(
            room.place(Point::new(9, 9), first, Kind::Player),
            Err(RuleError::OutOfBounds)
        );
        room.place(Point::new(2, 2), first, Kind::Player).unwrap();
        assert_eq!(
            room.place(Point::new(2, 2), second, Kind::Enemy),
            Err(RuleError::Blocked(BlockReason::Occupied))
        );
    }

    #[test]
    fn relocate_leaves_empty_behind() {
        let mut world = World::new();
        let mut room = Room::new(5, 5, 1);
        let entity = actor(&mut world);
        room.place(Point::new(1, 1), entity, Kind::Player).unwrap();

        room.relocate(Point::new(1, 1), Point::new(2, 2));

        assert_eq!(room.occupant_at(Point::new(1, 1)), Some(Occupant::Empty));
        assert_eq!(
            room.occupant_at(Point::new(2, 2)),
            Some(Occupant::Actor {
                entity,
                kind: Kind::Player
            })
        );
    }

    #[test]
    fn farthest_distance_prefers_first_maximum() {
        // 24x8 interior wrapped in a border.
        let room = Room::new(26, 10, 1);
        let origin = Point::new(1, 1);
        assert_eq!(
            room.find_farthest_distance(origin, true),
            Some(Point::new(24, 8))
        );
        assert_eq!(
            room.find_farthest_distance(origin, false),
            Some(Point::new(25, 9))
        );

        // Centre of a 5x5 room: all four interior corners tie, (1, 1) is met first.
        let small = Room::new(5, 5, 1);
        assert_eq!(
            small.find_farthest_distance(Point::new(2, 2), true),
            Some(Point::new(1, 1))
        );
    }

    #[test]
    fn farthest_distance_is_none_for_single_cell() {
        let room = Room::new(3, 3, 1);
        assert_eq!(room.find_farthest_distance(Point::new(1, 1), true), None);
    }

    #[test]
    fn close_together_collects_the_empty_square() {
        let room = Room::new(6, 6, 1);
        let around_corner = room.find_empty_spaces_close_together(Point::new(4, 4), 1);
        assert_eq!(
            around_corner,
            vec![
                Point::new(3, 3),
                Point::new(3, 4),
                Point::new(4, 3),
                Point::new(4, 4)
            ]
        );
        let inside = room.find_empty_spaces_close_together(Point::new(2, 2), 1);
        assert_eq!(inside.len(), 9);
        assert_eq!(inside.first(), Some(&Point::new(1, 1)));
    }

    #[test]
    fn close_together_ignores_cells_off_the_grid() {
        let room = Room::new(6, 6, 1);
        let found = room.find_empty_spaces_close_together(Point::new(0, 0), 2);
        assert_eq!(
            found,
            vec![
                Point::new(1, 1),
                Point::new(1, 2),
                Point::new(2, 1),
                Point::new(2, 2)
            ]
        );
    }

    #[test]
    fn close_together_handles_any_radius() {
        let room = Room::new(24, 8, 1);
        let everything = room.find_empty_spaces_close_together(Point::new(5, 5), i32::MAX);
        assert_eq!(everything.len(), 22 * 6);
        assert_eq!(everything, room.empty_points());

        let off_grid = room.find_empty_spaces_close_together(Point::new(100, -50), i32::MAX);
        assert_eq!(off_grid, everything);
        assert!(room
            .find_empty_spaces_close_together(Point::new(i32::MIN, i32::MIN), i32::MAX)
            .is_empty());

        assert!(room
            .find_empty_spaces_close_together(Point::new(5, 5), -1)
            .is_empty());
    }

    #[test]
    fn turn_log_drains() {
        let mut log = TurnLog::default();
        log.push("one");
        log.push(String::from("two"));
        assert_eq!(log.entries().len(), 2);
        assert_eq!(log.drain(), vec!["one".to_string(), "two".to_string()]);
        assert!(log.entries().is_empty());
    }
}
