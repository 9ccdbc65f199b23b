//! Collision resolution against solids, gated platforms, and world bounds
//!
//! All helpers are pure: they take a body box plus velocity and return the
//! corrected values. Sequential resolution against each solid is fine at
//! these speeds; a body crossing a zone thinner than one frame's displacement
//! can tunnel, which is an accepted approximation of the Euler step.

use glam::Vec2;

use super::rect::Rect;

/// Outcome of resolving one body against the solid world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolidResolution {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Came to rest on top of a solid this frame
    pub landed: bool,
    /// Hit a solid from below this frame
    pub bonked: bool,
}

/// Push a moving body out of every overlapping solid. Moving bodies resolve
/// along the velocity direction (land / bonk / side push); a resting overlap
/// falls back to the axis of least penetration.
pub fn resolve_solids<I>(body: Rect, vel: Vec2, solids: I) -> SolidResolution
where
    I: IntoIterator<Item = Rect>,
{
    let mut body = body;
    let mut vel = vel;
    let mut landed = false;
    let mut bonked = false;

    for solid in solids {
        if !body.overlaps(&solid) {
            continue;
        }
        if vel.y > 0.0 && body.top() < solid.top() {
            body.pos.y = solid.top() - body.size.y;
            vel.y = 0.0;
            landed = true;
        } else if vel.y < 0.0 && body.top() > solid.top() {
            body.pos.y = solid.bottom();
            vel.y = 0.0;
            bonked = true;
        } else if vel.x > 0.0 {
            body.pos.x = solid.left() - body.size.x;
            vel.x = 0.0;
        } else if vel.x < 0.0 {
            body.pos.x = solid.right();
            vel.x = 0.0;
        } else {
            let push_left = body.right() - solid.left();
            let push_right = solid.right() - body.left();
            let push_up = body.bottom() - solid.top();
            let push_down = solid.bottom() - body.top();
            if push_left.min(push_right) < push_up.min(push_down) {
                body.pos.x = if push_left < push_right {
                    solid.left() - body.size.x
                } else {
                    solid.right()
                };
            } else if push_up < push_down {
                body.pos.y = solid.top() - body.size.y;
                landed = true;
            } else {
                body.pos.y = solid.bottom();
            }
        }
    }

    SolidResolution {
        pos: body.pos,
        vel,
        landed,
        bonked,
    }
}

/// Horizontal push-out for a gated platform the body may not pass: the body
/// keeps whichever side of the platform its center is nearer to. Vertical
/// motion is deliberately untouched so the platform can still be crossed
/// over the top or under the bottom.
pub fn gated_push_x(body: Rect, platform: Rect) -> f32 {
    if body.center().x < platform.center().x {
        platform.left() - body.size.x
    } else {
        platform.right()
    }
}

/// Clamp a body's x into `[0, world_width - width]`.
pub fn clamp_to_world_x(x: f32, width: f32, world_width: f32) -> f32 {
    x.clamp(0.0, (world_width - width).max(0.0))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalClamp {
    pub y: f32,
    pub vel_y: f32,
    pub grounded: bool,
}

/// World floor and ceiling. `height` must be the body's current hitbox
/// height: a shrunk player's resting y is computed against the shrunk box.
pub fn clamp_to_world_y(y: f32, height: f32, vel_y: f32, world_height: f32) -> VerticalClamp {
    let mut out = VerticalClamp {
        y,
        vel_y,
        grounded: false,
    };
    if out.y + height >= world_height {
        out.y = world_height - height;
        out.vel_y = 0.0;
        out.grounded = true;
    }
    if out.y < 0.0 {
        out.y = 0.0;
        out.vel_y = 0.0;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: Rect = Rect {
        pos: Vec2::new(100.0, 100.0),
        size: Vec2::new(20.0, 30.0),
    };

    #[test]
    fn test_no_solids_is_identity() {
        let res = resolve_solids(BODY, Vec2::new(3.0, 2.0), []);
        assert_eq!(res.pos, BODY.pos);
        assert_eq!(res.vel, Vec2::new(3.0, 2.0));
        assert!(!res.landed);
        assert!(!res.bonked);
    }

    #[test]
    fn test_landing_on_solid() {
        // Falling body whose feet dipped 5px into a platform below
        let body = Rect::new(100.0, 175.0, 20.0, 30.0);
        let platform = Rect::new(80.0, 200.0, 100.0, 20.0);
        let res = resolve_solids(body, Vec2::new(0.0, 6.0), [platform]);
        assert_eq!(res.pos.y, 170.0);
        assert_eq!(res.vel.y, 0.0);
        assert!(res.landed);
        assert!(!res.bonked);
    }

    #[test]
    fn test_bonk_from_below() {
        let body = Rect::new(100.0, 95.0, 20.0, 30.0);
        let ceiling = Rect::new(80.0, 80.0, 100.0, 20.0);
        let res = resolve_solids(body, Vec2::new(0.0, -6.0), [ceiling]);
        assert_eq!(res.pos.y, 100.0);
        assert_eq!(res.vel.y, 0.0);
        assert!(res.bonked);
    }

    #[test]
    fn test_side_push() {
        // Walking right into a wall
        let body = Rect::new(95.0, 100.0, 20.0, 30.0);
        let wall = Rect::new(110.0, 60.0, 32.0, 120.0);
        let res = resolve_solids(body, Vec2::new(3.0, 0.0), [wall]);
        assert_eq!(res.pos.x, 90.0);
        assert_eq!(res.vel.x, 0.0);

        // And left into the same wall from the other side
        let body = Rect::new(140.0, 100.0, 20.0, 30.0);
        let res = resolve_solids(body, Vec2::new(-3.0, 0.0), [wall]);
        assert_eq!(res.pos.x, 142.0);
        assert_eq!(res.vel.x, 0.0);
    }

    #[test]
    fn test_resting_overlap_least_penetration() {
        // Motionless body barely sunk into a platform top: pushed up, grounded
        let body = Rect::new(100.0, 172.0, 20.0, 30.0);
        let platform = Rect::new(60.0, 200.0, 200.0, 20.0);
        let res = resolve_solids(body, Vec2::ZERO, [platform]);
        assert_eq!(res.pos.y, 170.0);
        assert!(res.landed);
    }

    #[test]
    fn test_gated_push_sides() {
        let platform = Rect::new(400.0, 300.0, 32.0, 100.0);
        // Body left of the platform center keeps to the left side
        let body = Rect::new(390.0, 320.0, 20.0, 30.0);
        assert_eq!(gated_push_x(body, platform), 380.0);
        // Body right of the platform center is pushed to the right edge
        let body = Rect::new(425.0, 320.0, 20.0, 30.0);
        assert_eq!(gated_push_x(body, platform), 432.0);
    }

    #[test]
    fn test_world_x_clamp() {
        assert_eq!(clamp_to_world_x(-5.0, 20.0, 800.0), 0.0);
        assert_eq!(clamp_to_world_x(795.0, 20.0, 800.0), 780.0);
        assert_eq!(clamp_to_world_x(400.0, 20.0, 800.0), 400.0);
    }

    #[test]
    fn test_world_y_clamp_uses_given_height() {
        // Full height body resting on the floor
        let full = clamp_to_world_y(460.0, 30.0, 2.0, 480.0);
        assert_eq!(full.y, 450.0);
        assert_eq!(full.vel_y, 0.0);
        assert!(full.grounded);

        // The same y with a half-height box is still airborne
        let half = clamp_to_world_y(460.0, 15.0, 2.0, 480.0);
        assert_eq!(half.y, 460.0);
        assert!(!half.grounded);

        // Ceiling snap
        let top = clamp_to_world_y(-4.0, 30.0, -6.0, 480.0);
        assert_eq!(top.y, 0.0);
        assert_eq!(top.vel_y, 0.0);
    }
}
