use dread_maze_core::{cell_center, Body, ACTOR_RADIUS};
use dread_maze_system_maze_generation::MazeGenerator;
use dread_maze_system_motion::{move_body, move_body_with_push_out, overlaps_wall};
use proptest::prelude::*;

proptest! {
    #[test]
    fn bodies_never_end_inside_walls(
        seed in any::<u64>(),
        moves in prop::collection::vec((-1.5_f32..1.5, -1.5_f32..1.5), 1..80),
    ) {
        let maze = MazeGenerator::default().generate(seed, 21, 15);
        let mut body = Body::new(cell_center(maze.start), ACTOR_RADIUS);

        for (dx, dy) in moves {
            let _ = move_body(&maze.grid, &mut body, dx, dy);
            prop_assert!(
                !overlaps_wall(&maze.grid, body.position, body.radius),
                "body overlapped a wall at {:?}",
                body.position
            );
        }
    }

    #[test]
    fn push_out_variant_keeps_clear_bodies_clear(
        seed in any::<u64>(),
        moves in prop::collection::vec((-0.6_f32..0.6, -0.6_f32..0.6), 1..40),
    ) {
        let maze = MazeGenerator::default().generate(seed, 15, 15);
        let mut body = Body::new(cell_center(maze.start), 0.32);

        for (dx, dy) in moves {
            let outcome = move_body_with_push_out(&maze.grid, &mut body, dx, dy);
            prop_assert!(!outcome.pushed_out);
            prop_assert!(!overlaps_wall(&maze.grid, body.position, body.radius));
        }
    }
}
