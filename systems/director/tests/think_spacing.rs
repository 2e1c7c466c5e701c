use dread_maze_core::{DeterministicRng, Enemy, EnemyId, EnemyMode};
use dread_maze_system_director::{Director, Perception, STAGGER_DURATION};
use glam::Vec2;
use proptest::prelude::*;

const DT: f32 = 1.0 / 60.0;

proptest! {
    #[test]
    fn mode_changes_respect_the_think_interval(
        seed in any::<u64>(),
        path in prop::collection::vec((-12.0_f32..12.0, -12.0_f32..12.0, any::<bool>()), 1..40),
    ) {
        let director = Director::default();
        let mut rng = DeterministicRng::new(seed);
        let mut enemy = Enemy::new(EnemyId::new(1), Vec2::ZERO, 50.0, 2.4, 10.0);
        director.arm(&mut enemy, &mut rng);

        let mut elapsed = 0.0_f32;
        let mut last_change: Option<(f32, f32)> = None;

        for (x, y, sprinting) in path {
            // Each waypoint is held for a quarter second.
            for _ in 0..15 {
                elapsed += DT;
                let perception = Perception {
                    player: Vec2::new(x, y),
                    sprinting,
                    hearing_multiplier: 1.0,
                    speed_multiplier: 1.0,
                    elapsed,
                };
                let steering = director.steer(&mut enemy, &perception, DT, &mut rng);
                enemy.body.position += steering.displacement;

                if steering.mode_change.is_some() {
                    if let Some((at, interval)) = last_change {
                        prop_assert!(elapsed - at + 1e-3 >= interval);
                    }
                    last_change = Some((elapsed, enemy.think_interval));
                }
            }
        }
    }

    #[test]
    fn staggers_bypass_spacing_and_recovery_rearms_the_think(
        seed in any::<u64>(),
        path in prop::collection::vec(
            (-8.0_f32..8.0, -8.0_f32..8.0, any::<bool>(), prop::bool::weighted(0.3)),
            1..40,
        ),
    ) {
        let director = Director::default();
        let mut rng = DeterministicRng::new(seed);
        let mut enemy = Enemy::new(EnemyId::new(1), Vec2::ZERO, 50.0, 2.4, 10.0);
        director.arm(&mut enemy, &mut rng);

        let mut elapsed = 0.0_f32;
        // Time and interval of the last think-driven change or recovery.
        let mut anchor: Option<(f32, f32)> = None;
        let mut last_hit: Option<f32> = None;

        for (x, y, sprinting, hit) in path {
            for sub_tick in 0..15 {
                elapsed += DT;
                let perception = Perception {
                    player: Vec2::new(x, y),
                    sprinting,
                    hearing_multiplier: 1.0,
                    speed_multiplier: 1.0,
                    elapsed,
                };
                let steering = director.steer(&mut enemy, &perception, DT, &mut rng);
                enemy.body.position += steering.displacement;

                if let Some(change) = steering.mode_change {
                    if change.from == EnemyMode::Staggered {
                        let struck = last_hit.expect("recovery follows a stagger");
                        prop_assert!(elapsed - struck + 1e-3 >= STAGGER_DURATION);
                        prop_assert_ne!(change.to, EnemyMode::Staggered);
                    } else if let Some((at, interval)) = anchor {
                        prop_assert!(elapsed - at + 1e-3 >= interval);
                    }
                    anchor = Some((elapsed, enemy.think_interval));
                }

                if hit && sub_tick == 0 {
                    let change = director.stagger(&mut enemy);
                    prop_assert_eq!(enemy.mode, EnemyMode::Staggered);
                    if let Some(change) = change {
                        prop_assert_eq!(change.to, EnemyMode::Staggered);
                    }
                    prop_assert_ne!(enemy.intent, EnemyMode::Staggered);
                    last_hit = Some(elapsed);
                }
            }
        }
    }
}
