use crate::maze::{Dir, Maze, Pos, Quadrant};

/// Assembles four equally sized quadrant mazes into one full maze and
/// punches the seams between them open. Cells are moved, not copied.
pub fn stitch_quadrants(quadrants: [Maze; 4]) -> Maze {
    let qw = quadrants[0].width;
    let qh = quadrants[0].height;
    let dead_size = quadrants[0].dead_size;
    let mut full = Maze {
        width: qw * 2,
        height: qh * 2,
        dead_size,
        grid: vec![Vec::new(); qw * 2],
    };
    for column in full.grid.iter_mut() {
        column.resize_with(qh * 2, Default::default);
    }

    for (quadrant, sub) in Quadrant::ALL.into_iter().zip(quadrants) {
        place_cells(&mut full, quadrant, sub);
    }
    open_seams(&mut full);
    full
}

pub fn splice_quadrant(full: &mut Maze, quadrant: Quadrant, sub: Maze) {
    place_cells(full, quadrant, sub);
    open_seams(full);
}

fn place_cells(full: &mut Maze, quadrant: Quadrant, sub: Maze) {
    debug_assert_eq!(sub.width * 2, full.width, "quadrant width mismatch");
    debug_assert_eq!(sub.height * 2, full.height, "quadrant height mismatch");
    let (qx, qy) = quadrant.offset();
    let ox = sub.width * qx;
    let oy = sub.height * qy;
    for (x, column) in sub.grid.into_iter().enumerate() {
        for (y, cell) in column.into_iter().enumerate() {
            if let Some(slot) = full.cell_mut(Pos::new(ox + x, oy + y)) {
                *slot = cell;
            }
        }
    }
}

/// Clears the wall pair across every position of both midlines. Pairs that
/// touch a dead cell are left walled. Calling this again changes nothing.
pub fn open_seams(full: &mut Maze) {
    let qw = full.width / 2;
    let qh = full.height / 2;
    if qw == 0 || qh == 0 {
        return;
    }
    for x in 0..full.width {
        full.open_between(Pos::new(x, qh - 1), Dir::South);
    }
    for y in 0..full.height {
        full.open_between(Pos::new(qw - 1, y), Dir::East);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carver::carve_from;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn carved_quadrants(seed: u64, size: usize, dead_size: usize) -> [Maze; 4] {
        let mut rng = StdRng::seed_from_u64(seed);
        Quadrant::ALL.map(|q| {
            let mut m = Maze::as_quadrant(size, size, dead_size, q);
            let (qx, qy) = q.offset();
            carve_from(&mut m, Pos::new(qx * (size - 1), qy * (size - 1)), &mut rng);
            m
        })
    }

    #[test]
    fn stitched_maze_is_connected_and_symmetric() {
        for seed in 0..10 {
            let full = stitch_quadrants(carved_quadrants(seed, 9, 6));
            assert_eq!(full.width, 18);
            assert_eq!(full.find_asymmetric_wall(), None);
            for start in [Pos::new(0, 0), Pos::new(17, 0), Pos::new(17, 17), Pos::new(0, 17)] {
                assert!(full.is_connected_from(start));
            }
        }
    }

    #[test]
    fn stitched_dead_cells_stay_sealed() {
        let full = stitch_quadrants(carved_quadrants(4, 9, 6));
        let dead: Vec<Pos> = full.positions().filter(|&p| full.is_dead(p)).collect();
        assert_eq!(dead.len(), 36);
        for p in dead {
            assert_eq!(full.cell(p).unwrap().walls, [true; 4]);
        }
    }

    #[test]
    fn seams_are_open_along_midlines() {
        let full = stitch_quadrants(carved_quadrants(11, 4, 0));
        for x in 0..8 {
            assert!(!full.has_wall(Pos::new(x, 3), Dir::South));
            assert!(!full.has_wall(Pos::new(x, 4), Dir::North));
        }
        for y in 0..8 {
            assert!(!full.has_wall(Pos::new(3, y), Dir::East));
            assert!(!full.has_wall(Pos::new(4, y), Dir::West));
        }
    }

    #[test]
    fn restitching_is_idempotent() {
        let quadrants = carved_quadrants(5, 6, 2);
        let a = stitch_quadrants(quadrants.clone());
        let b = stitch_quadrants(quadrants);
        assert_eq!(a, b);

        let mut c = a.clone();
        open_seams(&mut c);
        assert_eq!(a, c);
    }

    #[test]
    fn splice_keeps_other_quadrants() {
        let mut full = stitch_quadrants(carved_quadrants(1, 9, 6));
        let before = full.clone();
        let fresh = carved_quadrants(99, 9, 6);
        let [_, _, _, bottom_left] = fresh;
        splice_quadrant(&mut full, Quadrant::BottomLeft, bottom_left);

        for pos in full.positions() {
            if full.position_quadrant(pos) == Quadrant::TopRight {
                assert_eq!(full.cell(pos), before.cell(pos));
            }
        }
        assert_eq!(full.find_asymmetric_wall(), None);
        assert!(full.is_connected_from(Pos::new(0, 0)));
    }

    #[test]
    fn splice_matches_restitching_all_four() {
        let [tl, tr, br, old_bl] = carved_quadrants(2, 9, 6);
        let [_, _, _, fresh_bl] = carved_quadrants(77, 9, 6);

        let mut spliced = stitch_quadrants([tl.clone(), tr.clone(), br.clone(), old_bl]);
        splice_quadrant(&mut spliced, Quadrant::BottomLeft, fresh_bl.clone());
        let restitched = stitch_quadrants([tl, tr, br, fresh_bl]);

        assert_eq!(spliced, restitched);
    }
}
