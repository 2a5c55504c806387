use crate::{
    colour::Colour,
    renderer::{RenderMode, Scene, software::frame::FrameBuffers},
    world::{Camera, Object, Texture},
};

use super::projection::Viewer;

/// Objects nearer than this along the view axis are not drawn.
const NEAR_PLANE: f64 = 1e-3;

/// Screen placement of one billboard.
#[derive(Clone, Copy, Debug)]
struct VisSprite<'a> {
    x0: i32, // left column, may be off-screen
    y0: i32, // top row, may be off-screen
    w: i32,
    h: i32,
    depth: f64,
    tex: &'a Texture,
}

/// Project and rasterise every object the scene offers, farthest first.
/// Returns how many made it past visibility rejection.
pub(crate) fn draw_objects<S: Scene>(
    scene: &S,
    fb: &mut FrameBuffers,
    camera: &Camera,
    view: &Viewer,
    mode: RenderMode,
) -> usize {
    let mut objects = scene.objects_near(camera);

    // far-to-near painter's order, so nearer translucent texels land on top
    let dist2 = |o: &Object| (o.camera().pos() - camera.pos()).truncate().length_squared();
    objects.sort_by(|a, b| dist2(b).total_cmp(&dist2(a)));

    let mut drawn = 0;
    for obj in objects {
        if let Some(spr) = project(obj, camera, view) {
            rasterise(fb, view, &spr, mode);
            drawn += 1;
        }
    }
    drawn
}

fn project<'a>(obj: &'a Object, camera: &Camera, view: &Viewer) -> Option<VisSprite<'a>> {
    let target = camera.target_info(obj.camera());
    if !target.is_in_front() {
        return None;
    }
    // level with the eye, or behind it after rounding
    let depth = target.depth();
    if depth <= NEAR_PLANE {
        return None;
    }

    let centre_x = (target.bearing.tan() * view.screen_dist + (view.w / 2) as f64).trunc();
    let w = view.display_height(obj.width(), depth);
    let left_x = centre_x - (w / 2) as f64;
    if w <= 0 || left_x + w as f64 <= 0.0 || left_x >= view.w as f64 {
        return None;
    }
    // within (-w, view.w), so the cast is exact
    let left = left_x as i32;

    let base = view.display_base(depth);
    let h = view.display_height(obj.height(), depth);
    if h <= 0 || base < 0 || base - h >= view.h as i32 {
        return None;
    }

    let tex = obj.texture_for_angle(target.visible_angle)?;
    if tex.w == 0 || tex.h == 0 {
        return None;
    }

    Some(VisSprite {
        x0: left,
        y0: base - h,
        w,
        h,
        depth,
        tex,
    })
}

fn rasterise(fb: &mut FrameBuffers, view: &Viewer, spr: &VisSprite<'_>, mode: RenderMode) {
    let tex = spr.tex;
    let u_step = tex.w as f64 / spr.w as f64;
    let v_step = tex.h as f64 / spr.h as f64;
    let brightness = view.brightness(spr.depth);

    // visible part of the sprite rectangle, in sprite-local coordinates
    let ty0 = (-spr.y0).max(0);
    let ty1 = spr.h.min(fb.h as i32 - spr.y0);
    let tx0 = (-spr.x0).max(0);
    let tx1 = spr.w.min(fb.w as i32 - spr.x0);

    for ty in ty0..ty1 {
        let sy = (spr.y0 + ty) as usize;
        let v = (ty as f64 * v_step) as usize;
        for tx in tx0..tx1 {
            let sx = (spr.x0 + tx) as usize;
            let i = fb.idx(sx, sy);
            if spr.depth > fb.depth[i] {
                continue; // behind a wall
            }
            let texel = tex.pixel((tx as f64 * u_step) as usize, v);
            if texel.a == 0 {
                continue;
            }
            match mode {
                RenderMode::Normal => {
                    let dst = Colour::from_argb(fb.pixels[i]);
                    fb.pixels[i] = texel.scaled(brightness).blend_over(dst).to_argb();
                }
                RenderMode::DepthBuffer => fb.depth[i] = spr.depth,
            }
        }
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
