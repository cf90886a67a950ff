//! Procedural obstacle patterns
//!
//! Every shape is a pure function of `(center, size, θ)` where
//! `θ = (step / rotation_steps) · 2π`. Generators produce floating-point
//! points which are rounded onto grid cells. Duplicate cells are allowed;
//! consumers only test membership.

use std::collections::{HashMap, VecDeque};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

use glam::{DVec2, IVec2};
use serde::{Deserialize, Serialize};

use super::grid::{Cell, authored};
use crate::js_round;

/// Obstacle shape
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(from = "String", into = "String")]
#[strum(serialize_all = "camelCase")]
pub enum PatternKind {
    Windmill,
    Cross,
    BouncingBalls,
    PhasingWall,
    OrbitingDots,
    Zipper,
    AlternatingWall,
    Plus,
    Squares,
    Zigzag,
    Spiral,
    Starburst,
    Wave,
    Triangle,
    Pentagon,
    FigureEight,
    SineWave,
    DoubleHelix,
    Spirograph,
    Lissajous,
    PulsingStar,
    #[strum(to_string = "snakeRing", serialize = "snake")]
    SnakeRing,
    /// Fixed cells taken verbatim from `PatternSpec::points`
    StaticWall,
    /// Unrecognized `type`; generates nothing
    #[strum(default)]
    Unknown(String),
}

impl PatternKind {
    /// Authored name of the shape
    pub fn as_str(&self) -> &str {
        match self {
            PatternKind::Unknown(name) => name,
            known => known.as_ref(),
        }
    }
}

impl From<String> for PatternKind {
    fn from(name: String) -> Self {
        name.parse().unwrap_or(PatternKind::Unknown(name))
    }
}

impl From<PatternKind> for String {
    fn from(kind: PatternKind) -> Self {
        kind.as_str().to_string()
    }
}

fn default_rotation_steps() -> u32 {
    32
}

/// Authored obstacle: a shape plus its animation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternSpec {
    #[serde(rename = "type")]
    pub kind: PatternKind,
    #[serde(default, deserialize_with = "authored::cell")]
    pub center: Cell,
    /// Extra centers (squares)
    #[serde(
        default,
        deserialize_with = "authored::cells",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub centers: Vec<Cell>,
    #[serde(default)]
    pub size: f64,
    /// Frames per full cycle (treated as at least 1)
    #[serde(default = "default_rotation_steps")]
    pub rotation_steps: u32,
    /// Milliseconds between step advances
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_speed: Option<u64>,
    /// Verbatim cells (staticWall)
    #[serde(
        default,
        deserialize_with = "authored::cells",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub points: Vec<Cell>,
}

impl PatternSpec {
    pub fn new(kind: PatternKind, center: Cell, size: f64, rotation_steps: u32) -> Self {
        Self {
            kind,
            center,
            centers: Vec::new(),
            size,
            rotation_steps,
            animation_speed: None,
            points: Vec::new(),
        }
    }

    /// Cycle length, never zero
    #[inline]
    pub fn cycle(&self) -> u32 {
        self.rotation_steps.max(1)
    }
}

/// Rotation angle for a step; the step is reduced modulo the cycle first
#[inline]
pub fn theta(step: u32, rotation_steps: u32) -> f64 {
    let steps = rotation_steps.max(1);
    (f64::from(step % steps) / f64::from(steps)) * TAU
}

/// Shape function: spec and θ in, continuous points out
pub type Generator = fn(&PatternSpec, f64) -> Vec<DVec2>;

/// Handler table: one generator per animated shape
pub fn generator(kind: &PatternKind) -> Option<Generator> {
    let handler: Generator = match kind {
        PatternKind::Windmill => windmill,
        PatternKind::Cross => cross,
        PatternKind::BouncingBalls => bouncing_balls,
        PatternKind::PhasingWall => phasing_wall,
        PatternKind::OrbitingDots => orbiting_dots,
        PatternKind::Zipper => zipper,
        PatternKind::AlternatingWall => alternating_wall,
        PatternKind::Plus => plus,
        PatternKind::Squares => squares,
        PatternKind::Zigzag => zigzag,
        PatternKind::Spiral => spiral,
        PatternKind::Starburst => starburst,
        PatternKind::Wave => wave,
        PatternKind::Triangle => triangle,
        PatternKind::Pentagon => pentagon,
        PatternKind::FigureEight => figure_eight,
        PatternKind::SineWave => sine_wave,
        PatternKind::DoubleHelix => double_helix,
        PatternKind::Spirograph => spirograph,
        PatternKind::Lissajous => lissajous,
        PatternKind::PulsingStar => pulsing_star,
        PatternKind::SnakeRing => snake_ring,
        PatternKind::StaticWall | PatternKind::Unknown(_) => return None,
    };
    Some(handler)
}

/// Occupied cells for a pattern at an animation step
pub fn generate(spec: &PatternSpec, step: u32) -> Vec<Cell> {
    if spec.kind == PatternKind::StaticWall {
        return spec.points.clone();
    }
    let Some(shape) = generator(&spec.kind) else {
        return Vec::new();
    };
    shape(spec, theta(step, spec.rotation_steps))
        .into_iter()
        .map(to_cell)
        .collect()
}

#[inline]
fn to_cell(p: DVec2) -> Cell {
    IVec2::new(js_round(p.x), js_round(p.y))
}

#[inline]
fn center_of(spec: &PatternSpec) -> DVec2 {
    spec.center.as_dvec2()
}

/// `start, start + step, ...` while `<= end`, accumulated the same way a
/// float loop counter would be
fn sweep(start: f64, end: f64, step: f64) -> impl Iterator<Item = f64> {
    std::iter::successors(Some(start), move |v| Some(v + step)).take_while(move |v| *v <= end)
}

/// Rotate `p` about `c` by the angle whose cosine/sine are given
#[inline]
fn rotate_about(c: DVec2, p: DVec2, cos: f64, sin: f64) -> DVec2 {
    let d = p - c;
    DVec2::new(c.x + d.x * cos - d.y * sin, c.y + d.x * sin + d.y * cos)
}

#[inline]
fn polar(c: DVec2, r: f64, angle: f64) -> DVec2 {
    c + DVec2::new(angle.cos(), angle.sin()) * r
}

/// Points along the straight segment `a -> b`, one per grid unit of the
/// longer axis
fn segment(a: DVec2, b: DVec2, out: &mut Vec<DVec2>) {
    let d = b - a;
    let steps = d.x.abs().max(d.y.abs());
    if steps < f64::EPSILON {
        out.push(a);
        return;
    }
    for j in sweep(0.0, steps, 1.0) {
        out.push(a + d * (j / steps));
    }
}

/// Divisor for shapes that scale their phase by `1 / size`
#[inline]
fn safe_size(size: f64) -> f64 {
    if size.abs() < f64::EPSILON { 1.0 } else { size }
}

// ── Required shapes ─────────────────────────────────────────────────────────

/// Four radial arms at 90° spacing, each `size` long, rotating rigidly
fn windmill(spec: &PatternSpec, theta: f64) -> Vec<DVec2> {
    let c = center_of(spec);
    let mut points = Vec::new();
    for arm in 0..4 {
        let arm_angle = f64::from(arm) * FRAC_PI_2 + theta;
        for i in sweep(0.0, spec.size, 1.0) {
            points.push(polar(c, i, arm_angle));
        }
    }
    points
}

/// Two diagonal rays through the center forming an X
fn cross(spec: &PatternSpec, theta: f64) -> Vec<DVec2> {
    let c = center_of(spec);
    let (sin, cos) = theta.sin_cos();
    let mut points = Vec::new();
    for i in sweep(-spec.size, spec.size, 0.5) {
        points.push(rotate_about(c, c + DVec2::new(i, i), cos, sin));
        points.push(rotate_about(c, c + DVec2::new(i, -i), cos, sin));
    }
    points
}

/// Undulating band: primary wave, smaller secondary wave, slight drift
fn bouncing_balls(spec: &PatternSpec, theta: f64) -> Vec<DVec2> {
    let c = center_of(spec);
    let drift = (theta * 0.25).sin() * 0.3;
    sweep(-spec.size, spec.size, 0.8)
        .map(|i| {
            let primary = (theta + i * 0.5).sin() * 2.5;
            let secondary = (theta * 0.5 + i * 0.3).sin() * 0.5;
            DVec2::new(c.x + i + drift, c.y + primary + secondary)
        })
        .collect()
}

/// Horizontal line whose cells swing up and down in alternating phase
fn phasing_wall(spec: &PatternSpec, theta: f64) -> Vec<DVec2> {
    let c = center_of(spec);
    sweep(-spec.size, spec.size, 1.0)
        .map(|i| DVec2::new(c.x + i, c.y + (theta + i * PI).sin() * 3.0))
        .collect()
}

/// Four dots at radii 2..=5, a quarter turn apart
fn orbiting_dots(spec: &PatternSpec, theta: f64) -> Vec<DVec2> {
    let c = center_of(spec);
    (0..4)
        .map(|i| {
            let i = f64::from(i);
            polar(c, 2.0 + i, theta + i * FRAC_PI_2)
        })
        .collect()
}

/// Two strands in opposite phase that appear to interlace
fn zipper(spec: &PatternSpec, theta: f64) -> Vec<DVec2> {
    let c = center_of(spec);
    let mut points = Vec::new();
    for i in sweep(-spec.size, spec.size, 2.0) {
        points.push(DVec2::new(c.x + i, c.y + (theta + i).sin() * 2.0));
        points.push(DVec2::new(c.x + i, c.y + (theta + i + PI).sin() * 2.0));
    }
    points
}

/// Blocks alternating between phase 0 and π, bobbing and drifting
fn alternating_wall(spec: &PatternSpec, theta: f64) -> Vec<DVec2> {
    let c = center_of(spec);
    sweep(-spec.size, spec.size, 1.0)
        .map(|i| {
            let phase = if i % 2.0 == 0.0 { 0.0 } else { PI };
            let vertical = (theta + phase).sin() * 4.0;
            let horizontal = (theta + phase).cos();
            DVec2::new(c.x + i + horizontal, c.y + vertical)
        })
        .collect()
}

// ── Optional shapes ─────────────────────────────────────────────────────────

fn plus(spec: &PatternSpec, theta: f64) -> Vec<DVec2> {
    let c = center_of(spec);
    let (sin, cos) = theta.sin_cos();
    let mut points = Vec::new();
    for i in sweep(-spec.size, spec.size, 1.0) {
        points.push(rotate_about(c, c + DVec2::new(i, 0.0), cos, sin));
        points.push(rotate_about(c, c + DVec2::new(0.0, i), cos, sin));
    }
    points
}

/// A rotating 3x3 block around each center
fn squares(spec: &PatternSpec, theta: f64) -> Vec<DVec2> {
    let (sin, cos) = theta.sin_cos();
    let single = [spec.center];
    let centers: &[Cell] = if spec.centers.is_empty() {
        &single
    } else {
        &spec.centers
    };
    let mut points = Vec::with_capacity(centers.len() * 9);
    for c in centers.iter().map(|c| c.as_dvec2()) {
        for dx in -1..=1 {
            for dy in -1..=1 {
                let p = c + DVec2::new(f64::from(dx), f64::from(dy));
                points.push(rotate_about(c, p, cos, sin));
            }
        }
    }
    points
}

fn zigzag(spec: &PatternSpec, theta: f64) -> Vec<DVec2> {
    let c = center_of(spec);
    let (sin, cos) = theta.sin_cos();
    let mut points = Vec::new();
    for i in sweep(-spec.size, spec.size, 1.0) {
        let offset = if (i / 2.0).floor() % 2.0 == 0.0 { 1.0 } else { -1.0 };
        points.push(rotate_about(c, c + DVec2::new(i, offset), cos, sin));
        if i < spec.size {
            points.push(rotate_about(c, c + DVec2::new(i + 0.5, offset * 0.5), cos, sin));
        }
    }
    points
}

fn spiral(spec: &PatternSpec, theta: f64) -> Vec<DVec2> {
    let c = center_of(spec);
    sweep(0.0, spec.size * 8.0, 1.0)
        .map(|i| polar(c, i * 0.25, i * 0.25 + theta))
        .collect()
}

fn starburst(spec: &PatternSpec, theta: f64) -> Vec<DVec2> {
    let c = center_of(spec);
    let mut points = Vec::new();
    for arm in 0..5 {
        let arm_angle = f64::from(arm) * TAU / 5.0 + theta;
        for i in sweep(0.0, spec.size, 0.5) {
            points.push(polar(c, i, arm_angle));
        }
    }
    points
}

fn wave_height(i: f64, size: f64, theta: f64) -> f64 {
    ((i * PI / safe_size(size)) + theta).sin() * 2.0
}

fn wave(spec: &PatternSpec, theta: f64) -> Vec<DVec2> {
    let c = center_of(spec);
    let (sin, cos) = theta.sin_cos();
    sweep(-spec.size, spec.size, 0.5)
        .map(|i| {
            let h = wave_height(i, spec.size, theta);
            rotate_about(c, c + DVec2::new(i, h), cos, sin)
        })
        .collect()
}

/// Open V: two sides of a triangle inscribed in radius `size`
fn triangle(spec: &PatternSpec, theta: f64) -> Vec<DVec2> {
    let c = center_of(spec);
    let mut points = Vec::new();
    for i in 0..2 {
        let t = f64::from(i) * PI;
        let a = polar(c, spec.size, t + theta);
        let b = polar(c, spec.size, t + theta + PI / 1.5);
        segment(a, b, &mut points);
    }
    points
}

fn pentagon(spec: &PatternSpec, theta: f64) -> Vec<DVec2> {
    let c = center_of(spec);
    let mut points = Vec::new();
    for i in 0..=5 {
        let t = f64::from(i) / 5.0 * TAU;
        let a = polar(c, spec.size, t + theta);
        let b = polar(c, spec.size, t + theta + TAU / 5.0);
        segment(a, b, &mut points);
    }
    points
}

fn figure_eight(spec: &PatternSpec, theta: f64) -> Vec<DVec2> {
    let c = center_of(spec);
    sweep(0.0, TAU, 0.1)
        .map(|t| {
            DVec2::new(
                c.x + spec.size * (t + theta).sin(),
                c.y + spec.size * (2.0 * t + theta).sin(),
            )
        })
        .collect()
}

/// Wave with periodic gaps
fn sine_wave(spec: &PatternSpec, theta: f64) -> Vec<DVec2> {
    let c = center_of(spec);
    let (sin, cos) = theta.sin_cos();
    sweep(-spec.size, spec.size, 0.5)
        .filter(|i| i.abs() % 3.0 < 2.0)
        .map(|i| {
            let h = wave_height(i, spec.size, theta);
            rotate_about(c, c + DVec2::new(i, h), cos, sin)
        })
        .collect()
}

fn double_helix(spec: &PatternSpec, theta: f64) -> Vec<DVec2> {
    let c = center_of(spec);
    let (sin, cos) = theta.sin_cos();
    let mut points = Vec::new();
    for i in sweep(-spec.size, spec.size, 0.5) {
        let h1 = wave_height(i, spec.size, theta);
        let h2 = wave_height(i, spec.size, theta + PI);
        points.push(rotate_about(c, c + DVec2::new(i, h1), cos, sin));
        points.push(rotate_about(c, c + DVec2::new(i, h2), cos, sin));
    }
    points
}

fn spirograph(spec: &PatternSpec, theta: f64) -> Vec<DVec2> {
    let c = center_of(spec);
    let big_r = spec.size;
    let small_r = spec.size * 0.4;
    let arm = spec.size * 0.4;
    let ratio = (big_r - small_r) / safe_size(small_r);
    sweep(0.0, TAU, 0.1)
        .filter(|t| (t * 5.0).floor() % 2.0 == 0.0)
        .map(|t| {
            let inner = ratio * t + theta;
            DVec2::new(
                c.x + (big_r - small_r) * t.cos() + arm * inner.cos(),
                c.y + (big_r - small_r) * t.sin() + arm * inner.sin(),
            )
        })
        .collect()
}

fn lissajous(spec: &PatternSpec, theta: f64) -> Vec<DVec2> {
    let c = center_of(spec);
    sweep(0.0, TAU, 0.1)
        .filter(|t| (t * 4.0).floor() % 3.0 != 0.0)
        .map(|t| {
            DVec2::new(
                c.x + spec.size * (3.0 * t + theta).sin(),
                c.y + spec.size * (2.0 * t).sin(),
            )
        })
        .collect()
}

fn pulsing_star(spec: &PatternSpec, theta: f64) -> Vec<DVec2> {
    let c = center_of(spec);
    let r = 2.0 + theta.sin() * 2.0;
    (0..5)
        .map(|i| polar(c, r, f64::from(i) * TAU / 5.0 + theta))
        .collect()
}

/// Wobbly ring with four rotating gaps
fn snake_ring(spec: &PatternSpec, theta: f64) -> Vec<DVec2> {
    const GAP: f64 = 0.3;
    let c = center_of(spec);
    sweep(0.0, TAU, 0.1)
        .filter(|t| (t + theta) % FRAC_PI_2 >= GAP)
        .map(|t| {
            let r = spec.size * (1.0 + 0.3 * (3.0 * t).sin());
            polar(c, r, t + theta)
        })
        .collect()
}

// ── Cache ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    kind: PatternKind,
    center: Cell,
    centers: Vec<Cell>,
    size_bits: u64,
    step: u32,
    rotation_steps: u32,
}

impl CacheKey {
    fn new(spec: &PatternSpec, step: u32) -> Self {
        Self {
            kind: spec.kind.clone(),
            center: spec.center,
            centers: spec.centers.clone(),
            size_bits: spec.size.to_bits(),
            step: step % spec.cycle(),
            rotation_steps: spec.rotation_steps,
        }
    }
}

/// Memoized `generate`, evicting the oldest entry past `capacity`
#[derive(Debug, Clone)]
pub struct PatternCache {
    capacity: usize,
    entries: HashMap<CacheKey, Vec<Cell>>,
    order: VecDeque<CacheKey>,
}

impl PatternCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Cells for one pattern, served from the cache when possible
    pub fn cells(&mut self, spec: &PatternSpec, step: u32) -> Vec<Cell> {
        if spec.kind == PatternKind::StaticWall {
            return spec.points.clone();
        }
        let key = CacheKey::new(spec, step);
        if let Some(cells) = self.entries.get(&key) {
            return cells.clone();
        }

        let cells = generate(spec, step);
        self.order.push_back(key.clone());
        self.entries.insert(key, cells.clone());
        while self.entries.len() > self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
        cells
    }

    /// Cells for every pattern of a level at one shared step
    pub fn cells_for_all(&mut self, specs: &[PatternSpec], step: u32) -> Vec<Cell> {
        specs
            .iter()
            .flat_map(|spec| self.cells(spec, step))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn spec(kind: PatternKind, size: f64, steps: u32) -> PatternSpec {
        PatternSpec::new(kind, IVec2::new(10, 10), size, steps)
    }

    const REQUIRED: [PatternKind; 7] = [
        PatternKind::Windmill,
        PatternKind::Cross,
        PatternKind::BouncingBalls,
        PatternKind::PhasingWall,
        PatternKind::OrbitingDots,
        PatternKind::Zipper,
        PatternKind::AlternatingWall,
    ];

    fn any_kind() -> impl Strategy<Value = PatternKind> {
        prop_oneof![
            Just(PatternKind::Windmill),
            Just(PatternKind::Cross),
            Just(PatternKind::BouncingBalls),
            Just(PatternKind::PhasingWall),
            Just(PatternKind::OrbitingDots),
            Just(PatternKind::Zipper),
            Just(PatternKind::AlternatingWall),
            Just(PatternKind::Plus),
            Just(PatternKind::Squares),
            Just(PatternKind::Zigzag),
            Just(PatternKind::Spiral),
            Just(PatternKind::Starburst),
            Just(PatternKind::Wave),
            Just(PatternKind::Triangle),
            Just(PatternKind::Pentagon),
            Just(PatternKind::FigureEight),
            Just(PatternKind::SineWave),
            Just(PatternKind::DoubleHelix),
            Just(PatternKind::Spirograph),
            Just(PatternKind::Lissajous),
            Just(PatternKind::PulsingStar),
            Just(PatternKind::SnakeRing),
        ]
    }

    #[test]
    fn test_orbiting_dots_at_step_zero() {
        let cells = generate(&spec(PatternKind::OrbitingDots, 4.0, 32), 0);
        assert_eq!(
            cells,
            vec![
                IVec2::new(12, 10),
                IVec2::new(10, 13),
                IVec2::new(6, 10),
                IVec2::new(10, 5),
            ]
        );
    }

    #[test]
    fn test_windmill_arms_at_step_zero() {
        let cells = generate(&spec(PatternKind::Windmill, 5.0, 32), 0);
        // 4 arms x 6 points (center included)
        assert_eq!(cells.len(), 24);
        assert!(cells.contains(&IVec2::new(10, 10)));
        assert!(cells.contains(&IVec2::new(15, 10)));
        assert!(cells.contains(&IVec2::new(10, 15)));
        assert!(cells.contains(&IVec2::new(5, 10)));
        assert!(cells.contains(&IVec2::new(10, 5)));
    }

    #[test]
    fn test_windmill_quarter_turn_matches_start() {
        // A quarter turn maps the four arms onto each other
        let s = spec(PatternKind::Windmill, 5.0, 32);
        let mut a = generate(&s, 0);
        let mut b = generate(&s, 8);
        a.sort_by_key(|c| (c.x, c.y));
        b.sort_by_key(|c| (c.x, c.y));
        assert_eq!(a, b);
    }

    #[test]
    fn test_phasing_wall_flat_at_step_zero() {
        let cells = generate(&spec(PatternKind::PhasingWall, 8.0, 16), 0);
        assert_eq!(cells.len(), 17);
        assert!(cells.iter().all(|c| c.y == 10));
        assert_eq!(cells.first(), Some(&IVec2::new(2, 10)));
        assert_eq!(cells.last(), Some(&IVec2::new(18, 10)));
    }

    #[test]
    fn test_phasing_wall_alternates_at_quarter_cycle() {
        // θ = π/2: sin(π/2 + iπ) = ±1, so neighbours sit 6 rows apart
        let cells = generate(&spec(PatternKind::PhasingWall, 2.0, 16), 4);
        let ys: Vec<i32> = cells.iter().map(|c| c.y).collect();
        assert_eq!(ys, vec![13, 7, 13, 7, 13]);
    }

    #[test]
    fn test_zipper_strands_are_mirrored() {
        let cells = generate(&spec(PatternKind::Zipper, 9.0, 32), 5);
        assert_eq!(cells.len(), 20);
        for pair in cells.chunks(2) {
            assert_eq!(pair[0].x, pair[1].x);
            // Offsets are ±2·sin(...), rounding keeps them about the center row
            assert!((pair[0].y - 10 + pair[1].y - 10).abs() <= 1);
        }
    }

    #[test]
    fn test_alternating_wall_phases() {
        // θ = π/2: even blocks up by 4, odd blocks down by 4
        let cells = generate(&spec(PatternKind::AlternatingWall, 2.0, 32), 8);
        let ys: Vec<i32> = cells.iter().map(|c| c.y).collect();
        assert_eq!(ys, vec![14, 6, 14, 6, 14]);
    }

    #[test]
    fn test_bouncing_balls_band_width() {
        let cells = generate(&spec(PatternKind::BouncingBalls, 7.0, 64), 0);
        // -7.0, -6.2, ... up to 6.6
        assert_eq!(cells.len(), 18);
        assert!(cells.iter().all(|c| (c.y - 10).abs() <= 3));
    }

    #[test]
    fn test_cross_at_step_zero_is_diagonals() {
        let cells = generate(&spec(PatternKind::Cross, 2.0, 32), 0);
        assert!(cells.contains(&IVec2::new(8, 8)));
        assert!(cells.contains(&IVec2::new(12, 12)));
        assert!(cells.contains(&IVec2::new(8, 12)));
        assert!(cells.contains(&IVec2::new(12, 8)));
        assert!(!cells.contains(&IVec2::new(12, 10)));
    }

    #[test]
    fn test_static_wall_is_verbatim() {
        let mut s = spec(PatternKind::StaticWall, 0.0, 1);
        s.points = vec![IVec2::new(1, 2), IVec2::new(3, 4)];
        assert_eq!(generate(&s, 7), s.points);
    }

    #[test]
    fn test_unknown_shape_is_empty() {
        let s: PatternSpec =
            serde_json::from_str(r#"{ "type": "hexaflexagon", "center": [3, 3], "size": 2 }"#)
                .unwrap();
        assert_eq!(s.kind, PatternKind::Unknown("hexaflexagon".into()));
        assert!(generate(&s, 0).is_empty());
    }

    #[test]
    fn test_kind_names_are_camel_case() {
        assert_eq!(PatternKind::from("figureEight".to_string()), PatternKind::FigureEight);
        assert_eq!(PatternKind::from("snake".to_string()), PatternKind::SnakeRing);
        assert_eq!(PatternKind::from("Windmill".to_string()), PatternKind::Unknown("Windmill".into()));
        assert_eq!(PatternKind::BouncingBalls.as_str(), "bouncingBalls");
        assert_eq!(PatternKind::SnakeRing.to_string(), "snakeRing");
        assert_eq!(PatternKind::Unknown("blob".into()).as_str(), "blob");
        assert_eq!(String::from(PatternKind::StaticWall), "staticWall");
    }

    #[test]
    fn test_zero_rotation_steps_is_treated_as_one() {
        let s = spec(PatternKind::Windmill, 3.0, 0);
        assert_eq!(generate(&s, 0), generate(&s, 5));
    }

    #[test]
    fn test_spec_parses_authored_form() {
        let s: PatternSpec = serde_json::from_str(
            r#"{ "type": "windmill", "center": [10, 10], "size": 5,
                 "rotationSteps": 32, "animationSpeed": 800 }"#,
        )
        .unwrap();
        assert_eq!(s.kind, PatternKind::Windmill);
        assert_eq!(s.center, IVec2::new(10, 10));
        assert_eq!(s.animation_speed, Some(800));
        let back = serde_json::to_value(&s).unwrap();
        assert_eq!(back["type"], "windmill");
    }

    #[test]
    fn test_every_required_shape_has_a_generator() {
        for kind in REQUIRED {
            assert!(generator(&kind).is_some(), "{kind} has no generator");
            assert!(!generate(&spec(kind, 5.0, 32), 3).is_empty());
        }
    }

    #[test]
    fn test_cache_matches_direct_generation() {
        let mut cache = PatternCache::new(1000);
        let s = spec(PatternKind::BouncingBalls, 7.0, 64);
        for step in 0..64 {
            assert_eq!(cache.cells(&s, step), generate(&s, step));
            assert_eq!(cache.cells(&s, step), generate(&s, step));
        }
        assert_eq!(cache.len(), 64);
    }

    #[test]
    fn test_cache_evicts_oldest() {
        let mut cache = PatternCache::new(4);
        let s = spec(PatternKind::Cross, 3.0, 32);
        for step in 0..10 {
            cache.cells(&s, step);
        }
        assert_eq!(cache.len(), 4);
        // Evicted entries are regenerated, not lost
        assert_eq!(cache.cells(&s, 0), generate(&s, 0));
    }

    proptest! {
        #[test]
        fn prop_generate_is_deterministic(
            kind in any_kind(),
            size in 1u32..10,
            steps in 1u32..80,
            step in 0u32..200,
        ) {
            let s = spec(kind, f64::from(size), steps);
            prop_assert_eq!(generate(&s, step), generate(&s, step));
        }

        #[test]
        fn prop_generate_is_periodic(
            kind in any_kind(),
            size in 1u32..10,
            steps in 1u32..80,
            step in 0u32..80,
            k in 0u32..5,
        ) {
            let s = spec(kind, f64::from(size), steps);
            prop_assert_eq!(generate(&s, step), generate(&s, step + k * steps));
        }
    }
}
