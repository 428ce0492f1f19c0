use bracket_geometry::prelude::Point;

/// One step from `from` towards `to`: each axis is reduced to its sign, so
/// enemies close diagonally first.
pub fn chase_step(from: Point, to: Point) -> Point {
    Point::new((to.x - from.x).signum(), (to.y - from.y).signum())
}
