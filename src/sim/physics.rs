//! Collision detection and response for axis-aligned bodies
//!
//! Everything in the arena is a box: actors, projectiles, pickups and
//! platforms. Platforms come in two flavors: solid blocks that push back
//! from every side, and one-way ledges that only catch a falling body.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Axis-aligned rectangle (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Strict AABB overlap: touching edges do not count
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

/// Shared kinematic state embedded by every simulated object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub grounded: bool,
    /// Set while rising through one-way platforms, cleared once falling
    pub passing_through: bool,
    /// Vertical position before the last integration step
    pub prev_y: f32,
}

impl Body {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            vel: Vec2::ZERO,
            size: Vec2::new(w, h),
            grounded: false,
            passing_through: false,
            prev_y: y,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size.x, self.size.y)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// Apply gravity, capped at terminal velocity
    pub fn apply_gravity(&mut self, gravity: f32, max_fall: f32, dt: f32) {
        if !self.grounded || self.vel.y < 0.0 {
            self.vel.y += gravity * dt;
        }
        self.vel.y = self.vel.y.min(max_fall);
    }

    /// Advance position by velocity, remembering where we came from
    pub fn integrate(&mut self, dt: f32) {
        self.prev_y = self.pos.y;
        self.pos += self.vel * dt;
        if self.vel.y < 0.0 {
            self.passing_through = true;
        } else if self.vel.y > 0.0 {
            self.passing_through = false;
        }
    }
}

/// Platform behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformKind {
    /// Blocks from all four sides (walls, floor)
    Solid,
    /// One-way ledge, only lands bodies falling onto its top
    #[default]
    Passthrough,
}

/// Static level geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub rect: Rect,
    pub kind: PlatformKind,
}

impl Platform {
    pub fn new(x: f32, y: f32, w: f32, h: f32, kind: PlatformKind) -> Self {
        Self {
            rect: Rect::new(x, y, w, h),
            kind,
        }
    }

    pub fn solid(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(x, y, w, h, PlatformKind::Solid)
    }

    pub fn passthrough(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(x, y, w, h, PlatformKind::Passthrough)
    }
}

/// Which face of a platform was hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

/// Result of resolving one body against one platform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub side: Side,
    /// Corrected coordinate: `y` for top/bottom, `x` for left/right
    pub corrected: f32,
}

/// Resolve a body against a single platform.
///
/// `prev_y` is the body's vertical position before this tick's movement.
/// One-way platforms only report a top contact when the body is falling,
/// not rising through, and its bottom edge crossed the platform's top edge
/// during this tick. Solid platforms resolve along the axis of least
/// penetration; ties prefer top, then bottom, then left, then right. A body
/// sitting exactly on a solid top while not rising counts as a top contact.
pub fn resolve_platform_collision(body: &Body, platform: &Platform, prev_y: f32) -> Option<Contact> {
    let p = &platform.rect;
    let r = body.rect();

    let overlap_x = r.right() > p.x && r.x < p.right();
    if !overlap_x {
        return None;
    }

    match platform.kind {
        PlatformKind::Passthrough => {
            if body.vel.y < 0.0 || body.passing_through {
                return None;
            }
            let prev_bottom = prev_y + r.h;
            if prev_bottom <= p.y && r.bottom() >= p.y {
                Some(Contact {
                    side: Side::Top,
                    corrected: p.y - r.h,
                })
            } else {
                None
            }
        }
        PlatformKind::Solid => {
            // Resting flush on top: no overlap, but still standing on it
            if body.vel.y >= 0.0 && (r.bottom() - p.y).abs() < 1e-3 {
                return Some(Contact {
                    side: Side::Top,
                    corrected: p.y - r.h,
                });
            }
            resolve_solid(&r, p)
        }
    }
}

fn resolve_solid(r: &Rect, p: &Rect) -> Option<Contact> {
    if !r.overlaps(p) {
        return None;
    }

    let pen_top = r.bottom() - p.y;
    let pen_bottom = p.bottom() - r.y;
    let pen_left = r.right() - p.x;
    let pen_right = p.right() - r.x;

    let min = pen_top.min(pen_bottom).min(pen_left).min(pen_right);

    let contact = if min == pen_top {
        Contact {
            side: Side::Top,
            corrected: p.y - r.h,
        }
    } else if min == pen_bottom {
        Contact {
            side: Side::Bottom,
            corrected: p.bottom(),
        }
    } else if min == pen_left {
        Contact {
            side: Side::Left,
            corrected: p.x - r.w,
        }
    } else {
        Contact {
            side: Side::Right,
            corrected: p.right(),
        }
    };
    Some(contact)
}

/// Summary of a body's contacts with the level geometry this tick
#[derive(Debug, Clone, Copy, Default)]
pub struct PlatformContacts {
    pub grounded: bool,
    pub hit_ceiling: bool,
    /// Side of the last wall hit, if any
    pub wall: Option<Side>,
}

/// Resolve a body against every platform, applying corrections in place
pub fn collide_with_platforms(body: &mut Body, platforms: &[Platform]) -> PlatformContacts {
    let prev_y = body.prev_y;
    let mut contacts = PlatformContacts::default();

    for platform in platforms {
        let Some(contact) = resolve_platform_collision(body, platform, prev_y) else {
            continue;
        };
        match contact.side {
            Side::Top => {
                body.pos.y = contact.corrected;
                body.vel.y = 0.0;
                body.passing_through = false;
                contacts.grounded = true;
            }
            Side::Bottom => {
                body.pos.y = contact.corrected;
                body.vel.y = 0.0;
                contacts.hit_ceiling = true;
            }
            Side::Left | Side::Right => {
                body.pos.x = contact.corrected;
                body.vel.x = 0.0;
                contacts.wall = Some(contact.side);
            }
        }
    }

    contacts
}

/// Horizontal screen-edge policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeMode {
    /// Leaving one side re-enters from the other
    Wrap,
    /// Stop at the edge
    Clamp,
}

/// Keep a body inside the playfield. Returns true if it is standing on the floor.
pub fn check_screen_bounds(body: &mut Body, mode: EdgeMode) -> bool {
    match mode {
        EdgeMode::Wrap => {
            if body.pos.x + body.size.x < 0.0 {
                body.pos.x = CANVAS_WIDTH;
            } else if body.pos.x > CANVAS_WIDTH {
                body.pos.x = -body.size.x;
            }
        }
        EdgeMode::Clamp => {
            body.pos.x = body.pos.x.clamp(0.0, CANVAS_WIDTH - body.size.x);
        }
    }

    if body.pos.y < 0.0 {
        body.pos.y = 0.0;
        if body.vel.y < 0.0 {
            body.vel.y = 0.0;
        }
    }

    if body.bottom() >= FLOOR_Y {
        body.pos.y = FLOOR_Y - body.size.y;
        body.vel.y = 0.0;
        body.passing_through = false;
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn falling_body(x: f32, y: f32, vy: f32) -> Body {
        let mut body = Body::new(x, y, 14.0, 16.0);
        body.vel.y = vy;
        body
    }

    #[test]
    fn test_overlap_is_strict() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let touching = Rect::new(10.0, 0.0, 10.0, 10.0);
        let inside = Rect::new(9.0, 9.0, 10.0, 10.0);
        assert!(!a.overlaps(&touching));
        assert!(a.overlaps(&inside));
    }

    #[test]
    fn test_passthrough_lands_falling_body() {
        let platform = Platform::passthrough(0.0, 100.0, 64.0, 8.0);
        // Bottom was at 98, now at 102
        let body = falling_body(10.0, 86.0, 4.0);
        let contact = resolve_platform_collision(&body, &platform, 82.0).unwrap();
        assert_eq!(contact.side, Side::Top);
        assert_eq!(contact.corrected, 100.0 - 16.0);
    }

    #[test]
    fn test_passthrough_ignores_rising_body() {
        let platform = Platform::passthrough(0.0, 100.0, 64.0, 8.0);
        let mut body = falling_body(10.0, 90.0, -3.0);
        body.passing_through = true;
        assert!(resolve_platform_collision(&body, &platform, 93.0).is_none());
    }

    #[test]
    fn test_passthrough_ignores_body_flagged_passing() {
        let platform = Platform::passthrough(0.0, 100.0, 64.0, 8.0);
        let mut body = falling_body(10.0, 86.0, 1.0);
        body.passing_through = true;
        assert!(resolve_platform_collision(&body, &platform, 82.0).is_none());
    }

    #[test]
    fn test_passthrough_ignores_body_already_below_top() {
        let platform = Platform::passthrough(0.0, 100.0, 64.0, 8.0);
        // Bottom was already past the top edge last tick
        let body = falling_body(10.0, 90.0, 1.0);
        assert!(resolve_platform_collision(&body, &platform, 89.0).is_none());
    }

    #[test]
    fn test_jump_lands_on_ledge_above() {
        // Jump up through a ledge, then come back down onto it
        let platforms = vec![Platform::passthrough(0.0, 100.0, 64.0, 8.0)];
        let mut body = Body::new(10.0, 104.0, 14.0, 16.0);
        body.vel.y = -6.0;
        let mut landed = false;
        for _ in 0..60 {
            body.apply_gravity(GRAVITY, MAX_FALL_SPEED, 1.0);
            body.integrate(1.0);
            if collide_with_platforms(&mut body, &platforms).grounded {
                landed = true;
                break;
            }
        }
        assert!(landed);
        assert_eq!(body.pos.y, 100.0 - 16.0);
        assert!(!body.passing_through);
    }

    #[test]
    fn test_solid_resolves_least_penetration() {
        let wall = Platform::solid(100.0, 0.0, 16.0, 200.0);
        // Body pokes 2px into the wall's left face
        let body = falling_body(88.0, 50.0, 0.0);
        let contact = resolve_platform_collision(&body, &wall, 50.0).unwrap();
        assert_eq!(contact.side, Side::Left);
        assert_eq!(contact.corrected, 100.0 - 14.0);

        let body = falling_body(114.0, 50.0, 0.0);
        let contact = resolve_platform_collision(&body, &wall, 50.0).unwrap();
        assert_eq!(contact.side, Side::Right);
        assert_eq!(contact.corrected, 116.0);
    }

    #[test]
    fn test_solid_bottom_contact() {
        let block = Platform::solid(0.0, 50.0, 100.0, 10.0);
        let body = falling_body(40.0, 58.0, -2.0);
        let contact = resolve_platform_collision(&body, &block, 60.0).unwrap();
        assert_eq!(contact.side, Side::Bottom);
        assert_eq!(contact.corrected, 60.0);
    }

    #[test]
    fn test_solid_tie_prefers_top() {
        // Square body overlapping a square block equally on top and left
        let block = Platform::solid(10.0, 10.0, 10.0, 10.0);
        let mut body = Body::new(5.0, 5.0, 10.0, 10.0);
        body.vel = Vec2::ZERO;
        let contact = resolve_platform_collision(&body, &block, 5.0).unwrap();
        assert_eq!(contact.side, Side::Top);
    }

    #[test]
    fn test_body_resting_on_solid_stays_grounded() {
        let platforms = vec![Platform::solid(0.0, 208.0, 256.0, 16.0)];
        let mut body = Body::new(40.0, 208.0 - 16.0, 14.0, 16.0);
        for _ in 0..6 {
            body.apply_gravity(GRAVITY, MAX_FALL_SPEED, 1.0);
            body.integrate(1.0);
            body.grounded = collide_with_platforms(&mut body, &platforms).grounded;
            assert!(body.grounded);
            assert_eq!(body.pos.y, 192.0);
        }
    }

    #[test]
    fn test_rising_body_leaves_solid_top() {
        let floor = Platform::solid(0.0, 208.0, 256.0, 16.0);
        let mut body = Body::new(40.0, 192.0, 14.0, 16.0);
        body.vel.y = -5.0;
        assert!(resolve_platform_collision(&body, &floor, 192.0).is_none());
    }

    #[test]
    fn test_collide_with_platforms_grounds_body() {
        let platforms = vec![Platform::passthrough(0.0, 100.0, 64.0, 8.0)];
        let mut body = Body::new(10.0, 82.0, 14.0, 16.0);
        body.vel.y = 4.0;
        body.integrate(1.0);
        let contacts = collide_with_platforms(&mut body, &platforms);
        assert!(contacts.grounded);
        assert_eq!(body.pos.y, 84.0);
        assert_eq!(body.vel.y, 0.0);
    }

    #[test]
    fn test_screen_wrap_and_floor() {
        let mut body = Body::new(-20.0, 0.0, 14.0, 16.0);
        check_screen_bounds(&mut body, EdgeMode::Wrap);
        assert_eq!(body.pos.x, CANVAS_WIDTH);

        let mut body = Body::new(CANVAS_WIDTH + 1.0, 0.0, 14.0, 16.0);
        check_screen_bounds(&mut body, EdgeMode::Wrap);
        assert_eq!(body.pos.x, -14.0);

        let mut body = Body::new(300.0, 250.0, 14.0, 16.0);
        let grounded = check_screen_bounds(&mut body, EdgeMode::Clamp);
        assert!(grounded);
        assert_eq!(body.pos.x, CANVAS_WIDTH - 14.0);
        assert_eq!(body.pos.y, FLOOR_Y - 16.0);
    }

    #[test]
    fn test_ceiling_zeroes_upward_velocity() {
        let mut body = Body::new(10.0, -3.0, 14.0, 16.0);
        body.vel.y = -5.0;
        check_screen_bounds(&mut body, EdgeMode::Wrap);
        assert_eq!(body.pos.y, 0.0);
        assert_eq!(body.vel.y, 0.0);
    }

    proptest! {
        #[test]
        fn prop_rising_body_never_stopped_by_passthrough(
            x in 0.0f32..50.0,
            y in 60.0f32..120.0,
            vy in -6.0f32..-0.01,
        ) {
            let platform = Platform::passthrough(0.0, 100.0, 64.0, 8.0);
            let mut body = Body::new(x, y - vy, 14.0, 16.0);
            body.vel.y = vy;
            body.integrate(1.0);
            let before = body.pos;
            let contacts = collide_with_platforms(&mut body, std::slice::from_ref(&platform));
            prop_assert!(!contacts.grounded);
            prop_assert_eq!(body.pos, before);
        }

        #[test]
        fn prop_falling_body_lands_exactly_on_top(
            x in 0.0f32..50.0,
            start_bottom in 90.0f32..100.0,
            vy in 0.0f32..6.0,
        ) {
            let platform = Platform::passthrough(0.0, 100.0, 64.0, 8.0);
            let mut body = Body::new(x, start_bottom - 16.0, 14.0, 16.0);
            body.vel.y = vy;
            body.integrate(1.0);
            let crossed = body.bottom() >= 100.0;
            let contacts = collide_with_platforms(&mut body, std::slice::from_ref(&platform));
            prop_assert_eq!(contacts.grounded, crossed);
            if crossed {
                prop_assert_eq!(body.pos.y, 100.0 - 16.0);
            }
        }

        #[test]
        fn prop_overlap_is_symmetric(
            ax in -50.0f32..50.0, ay in -50.0f32..50.0,
            bx in -50.0f32..50.0, by in -50.0f32..50.0,
            w in 1.0f32..30.0, h in 1.0f32..30.0,
        ) {
            let a = Rect::new(ax, ay, w, h);
            let b = Rect::new(bx, by, h, w);
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }
    }
}
