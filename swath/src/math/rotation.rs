use geo::geometry::Coord;

/// Rotates `coord` clockwise by `degrees` about `pivot`.
pub fn rotate_cw(coord: Coord<f64>, degrees: f64, pivot: Coord<f64>) -> Coord<f64> {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (x, y) = (coord.x - pivot.x, coord.y - pivot.y);
    Coord {
        x: pivot.x + x * cos + y * sin,
        y: pivot.y - x * sin + y * cos,
    }
}

#[cfg(test)]
mod tests {
    use super::rotate_cw;
    use approx::assert_relative_eq;
    use geo::coord;

    #[test]
    fn test_quarter_turn_is_clockwise() {
        let pivot = coord!(x: 10.0, y: 10.0);
        let rotated = rotate_cw(coord!(x: 10.0, y: 15.0), 90.0, pivot);
        assert_relative_eq!(rotated.x, 15.0, epsilon = 1e-12);
        assert_relative_eq!(rotated.y, 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_roundtrip() {
        let pivot = coord!(x: -3.0, y: 7.5);
        let start = coord!(x: 12.25, y: -4.0);
        let back = rotate_cw(rotate_cw(start, -37.0, pivot), 37.0, pivot);
        assert_relative_eq!(back.x, start.x, epsilon = 1e-9);
        assert_relative_eq!(back.y, start.y, epsilon = 1e-9);
    }
}
