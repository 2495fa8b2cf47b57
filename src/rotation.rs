use bevy::math::curve::{Curve, EaseFunction};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ring::RingGeometry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
}

/// Ease-in curves available for the grouped tween.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    QuadIn,
    #[default]
    CubicIn,
    QuartIn,
    SineIn,
}

impl Easing {
    fn function(self) -> EaseFunction {
        match self {
            Easing::Linear => EaseFunction::Linear,
            Easing::QuadIn => EaseFunction::QuadraticIn,
            Easing::CubicIn => EaseFunction::CubicIn,
            Easing::QuartIn => EaseFunction::QuarticIn,
            Easing::SineIn => EaseFunction::SineIn,
        }
    }

    /// Eased progress for a linear progress `t`, clamped to `[0, 1]`.
    pub fn sample(self, t: f32) -> f32 {
        self.function().sample_clamped(t)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Track<T> {
    pub item: T,
    pub from: Vec3,
    pub to: Vec3,
}

/// All tracks share start, duration and easing.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTween<T> {
    pub direction: Direction,
    tracks: Vec<Track<T>>,
    elapsed: Duration,
    duration: Duration,
    easing: Easing,
}

impl<T: Copy> GroupTween<T> {
    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Linear progress in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    fn sample(&self) -> Vec<(T, Vec3)> {
        if self.is_complete() {
            return self.tracks.iter().map(|t| (t.item, t.to)).collect();
        }
        let eased = self.easing.sample(self.progress());
        self.tracks
            .iter()
            .map(|t| (t.item, t.from.lerp(t.to, eased)))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RotationState<T> {
    Idle,
    Animating(GroupTween<T>),
}

/// Positions produced by one `advance` call.
#[derive(Debug, Clone, PartialEq)]
pub struct TweenFrame<T> {
    pub direction: Direction,
    pub positions: Vec<(T, Vec3)>,
    pub finished: bool,
}

#[derive(Debug, Clone)]
pub struct RotationController<T> {
    ordering: Vec<T>,
    geometry: RingGeometry,
    step: usize,
    duration: Duration,
    easing: Easing,
    state: RotationState<T>,
}

impl<T: Copy> RotationController<T> {
    /// The item at `ordering[i]` is expected to sit on `geometry.home_position(i)`.
    pub fn new(ordering: Vec<T>, radius: f32, step: usize, duration: Duration, easing: Easing) -> Self {
        let geometry = RingGeometry::new(radius, ordering.len());
        Self {
            ordering,
            geometry,
            step,
            duration,
            easing,
            state: RotationState::Idle,
        }
    }

    pub fn ordering(&self) -> &[T] {
        &self.ordering
    }

    pub fn geometry(&self) -> RingGeometry {
        self.geometry
    }

    pub fn state(&self) -> &RotationState<T> {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, RotationState::Animating(_))
    }

    /// Slot the item at ordering `index` moves to.
    ///
    /// The two rules differ by a constant offset; combined with the ordering
    /// permutation applied on completion both leave every item on the home
    /// slot of its new index.
    pub fn target_slot(&self, direction: Direction, index: usize) -> i64 {
        let n = self.ordering.len().max(1) as i64;
        let i = index as i64;
        let s = self.step as i64;
        match direction {
            Direction::Right => (i - s).rem_euclid(n) + 1,
            Direction::Left => (i + 1 + s).rem_euclid(n),
        }
    }

    /// Starts a grouped rotation. Returns `false` without touching any state
    /// if a rotation is already in flight.
    pub fn rotate(&mut self, direction: Direction, mut current_position: impl FnMut(T) -> Vec3) -> bool {
        if self.is_busy() {
            return false;
        }

        let tracks = self
            .ordering
            .iter()
            .enumerate()
            .map(|(i, &item)| Track {
                item,
                from: current_position(item),
                to: self.geometry.position_for(self.target_slot(direction, i)),
            })
            .collect();

        self.state = RotationState::Animating(GroupTween {
            direction,
            tracks,
            elapsed: Duration::ZERO,
            duration: self.duration,
            easing: self.easing,
        });
        true
    }

    /// Moves the in-flight tween forward by `delta`.
    pub fn advance(&mut self, delta: Duration) -> Option<TweenFrame<T>> {
        let RotationState::Animating(tween) = &mut self.state else {
            return None;
        };

        tween.elapsed = tween.elapsed.saturating_add(delta);
        let direction = tween.direction;
        let positions = tween.sample();
        let finished = tween.is_complete();

        if finished {
            self.state = RotationState::Idle;
            self.reorder(direction);
        }

        Some(TweenFrame {
            direction,
            positions,
            finished,
        })
    }

    fn reorder(&mut self, direction: Direction) {
        if self.ordering.is_empty() {
            return;
        }
        let shift = self.step % self.ordering.len();
        match direction {
            Direction::Right => self.ordering.rotate_left(shift),
            Direction::Left => self.ordering.rotate_right(shift),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const N: usize = 12;
    const EPS: f32 = 1e-3;

    /// Headless stand-in for the scene: item id -> position.
    struct Scene {
        positions: HashMap<usize, Vec3>,
        controller: RotationController<usize>,
    }

    impl Scene {
        fn new(n: usize, step: usize) -> Self {
            let controller =
                RotationController::new((0..n).collect(), 100.0, step, Duration::from_secs(2), Easing::CubicIn);
            let ring = controller.geometry();
            let positions = (0..n).map(|i| (i, ring.home_position(i))).collect();
            Self { positions, controller }
        }

        fn rotate(&mut self, direction: Direction) -> bool {
            let positions = &self.positions;
            self.controller.rotate(direction, |item| positions[&item])
        }

        fn tick(&mut self, delta: Duration) -> Option<TweenFrame<usize>> {
            let frame = self.controller.advance(delta)?;
            for &(item, pos) in &frame.positions {
                self.positions.insert(item, pos);
            }
            Some(frame)
        }

        fn run_to_completion(&mut self) {
            while let Some(frame) = self.tick(Duration::from_millis(250)) {
                if frame.finished {
                    break;
                }
            }
        }

        fn assert_items_home(&self) {
            let ring = self.controller.geometry();
            for (i, item) in self.controller.ordering().iter().enumerate() {
                let diff = self.positions[item] - ring.home_position(i);
                assert!(diff.length() < EPS, "item {item} at index {i} is off home by {diff}");
            }
        }
    }

    fn assert_permutation(ordering: &[usize], n: usize) {
        let mut sorted = ordering.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..n).collect::<Vec<_>>());
    }

    #[test]
    fn target_slots_follow_the_pinned_formulas() {
        let scene = Scene::new(N, 1);
        let c = &scene.controller;
        let right: Vec<i64> = (0..N).map(|i| c.target_slot(Direction::Right, i)).collect();
        let left: Vec<i64> = (0..N).map(|i| c.target_slot(Direction::Left, i)).collect();
        assert_eq!(right, vec![12, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
        assert_eq!(left, vec![2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 0, 1]);
    }

    #[test]
    fn target_slots_with_larger_step() {
        let scene = Scene::new(5, 7);
        let c = &scene.controller;
        // step 7 on a ring of 5 behaves like step 2
        assert_eq!(c.target_slot(Direction::Right, 0), 4);
        assert_eq!(c.target_slot(Direction::Left, 0), 3);
    }

    #[test]
    fn rotate_right_moves_head_to_tail() {
        let mut scene = Scene::new(N, 1);
        let ring = scene.controller.geometry();
        assert!(!scene.controller.is_busy());

        assert!(scene.rotate(Direction::Right));
        assert!(scene.controller.is_busy());
        let frame = scene.tick(Duration::from_secs(1)).unwrap();
        assert!(!frame.finished);
        assert!(scene.controller.is_busy());
        // ordering only changes on completion
        assert_eq!(scene.controller.ordering(), (0..N).collect::<Vec<_>>());

        scene.run_to_completion();
        assert!(!scene.controller.is_busy());

        for i in 0..N {
            let expected = ring.position_for(((i + N - 1) % N + 1) as i64);
            assert!((scene.positions[&i] - expected).length() < EPS);
        }
        let mut expected: Vec<usize> = (1..N).collect();
        expected.push(0);
        assert_eq!(scene.controller.ordering(), expected);
        scene.assert_items_home();
    }

    #[test]
    fn rotate_left_moves_tail_to_head() {
        let mut scene = Scene::new(N, 1);
        let ring = scene.controller.geometry();

        assert!(scene.rotate(Direction::Left));
        scene.run_to_completion();

        for i in 0..N {
            let expected = ring.position_for(((i + 2) % N) as i64);
            assert!((scene.positions[&i] - expected).length() < EPS);
        }
        let mut expected = vec![N - 1];
        expected.extend(0..N - 1);
        assert_eq!(scene.controller.ordering(), expected);
        scene.assert_items_home();
    }

    #[test]
    fn right_then_left_round_trips() {
        for step in 1..=3 {
            let mut scene = Scene::new(N, step);
            let start = scene.positions.clone();

            scene.rotate(Direction::Right);
            scene.run_to_completion();
            scene.rotate(Direction::Left);
            scene.run_to_completion();

            assert_eq!(scene.controller.ordering(), (0..N).collect::<Vec<_>>());
            for i in 0..N {
                assert!((scene.positions[&i] - start[&i]).length() < EPS, "step {step} item {i}");
            }
        }
    }

    #[test]
    fn ordering_stays_a_permutation() {
        let mut scene = Scene::new(7, 2);
        let moves = [
            Direction::Left,
            Direction::Left,
            Direction::Right,
            Direction::Left,
            Direction::Right,
            Direction::Right,
            Direction::Right,
        ];
        for direction in moves {
            scene.rotate(direction);
            scene.run_to_completion();
            assert_permutation(scene.controller.ordering(), 7);
            scene.assert_items_home();
        }
    }

    #[test]
    fn requests_while_animating_are_ignored() {
        let mut scene = Scene::new(N, 1);
        assert!(scene.rotate(Direction::Right));
        scene.tick(Duration::from_millis(500));

        let before = scene.controller.state().clone();
        assert!(!scene.rotate(Direction::Left));
        assert!(!scene.rotate(Direction::Right));
        assert_eq!(scene.controller.state(), &before);
        assert!(scene.controller.is_busy());
        assert_eq!(scene.controller.ordering(), (0..N).collect::<Vec<_>>());

        scene.run_to_completion();
        let mut expected: Vec<usize> = (1..N).collect();
        expected.push(0);
        assert_eq!(scene.controller.ordering(), expected);
    }

    #[test]
    fn completion_fires_once() {
        let mut scene = Scene::new(4, 1);
        scene.rotate(Direction::Left);
        let frame = scene.tick(Duration::from_secs(5)).unwrap();
        assert!(frame.finished);
        assert_eq!(frame.direction, Direction::Left);
        assert!(scene.tick(Duration::from_secs(1)).is_none());
        assert_eq!(scene.controller.ordering(), &[3, 0, 1, 2]);
    }

    #[test]
    fn all_tracks_share_eased_progress() {
        let mut scene = Scene::new(N, 1);
        let start = scene.positions.clone();
        scene.rotate(Direction::Right);
        let frame = scene.tick(Duration::from_secs(1)).unwrap();

        let eased = Easing::CubicIn.sample(0.5);
        assert!((eased - 0.125).abs() < 1e-4);
        let ring = scene.controller.geometry();
        for (i, &(item, pos)) in frame.positions.iter().enumerate() {
            assert_eq!(item, i);
            let target = ring.position_for(scene.controller.target_slot(Direction::Right, i));
            let expected = start[&item].lerp(target, eased);
            assert!((pos - expected).length() < EPS);
        }
        match scene.controller.state() {
            RotationState::Animating(tween) => assert!((tween.progress() - 0.5).abs() < 1e-6),
            RotationState::Idle => panic!("expected an animating controller"),
        }
    }

    #[test]
    fn zero_duration_completes_on_first_advance() {
        let mut controller = RotationController::new(vec!['a', 'b', 'c'], 10.0, 1, Duration::ZERO, Easing::Linear);
        let ring = controller.geometry();
        assert!(controller.rotate(Direction::Right, |_| Vec3::ZERO));
        let frame = controller.advance(Duration::ZERO).unwrap();
        assert!(frame.finished);
        assert_eq!(frame.positions[0], ('a', ring.position_for(3)));
        assert_eq!(controller.ordering(), &['b', 'c', 'a']);
    }

    #[test]
    fn idle_controller_does_not_advance() {
        let mut scene = Scene::new(3, 1);
        assert!(scene.tick(Duration::from_secs(1)).is_none());
        assert_eq!(scene.controller.ordering(), &[0, 1, 2]);
    }

    #[test]
    fn easing_is_clamped() {
        assert_eq!(Easing::QuadIn.sample(-1.0), 0.0);
        assert_eq!(Easing::QuartIn.sample(2.0), 1.0);
        assert!((Easing::Linear.sample(0.3) - 0.3).abs() < 1e-6);
    }
}
