// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rasterizing replayed sequences with `vello_cpu`.

use understory_drawlog::{
    Color, CommandSequence, ImageSnapshot, Paint, Rect, RegionOp, ReplayState, ReplayTarget,
    SaveFlags, Surface, record,
};
use understory_drawlog_vello_cpu::{VelloCpuError, VelloCpuSurface};
use vello_cpu::{Pixmap, RenderContext, RenderMode, RenderSettings};

const SIZE: u16 = 32;
const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const CLEAR: [u8; 4] = [0, 0, 0, 0];

struct Rendered {
    pixels: Vec<[u8; 4]>,
}

impl Rendered {
    fn at(&self, x: usize, y: usize) -> [u8; 4] {
        self.pixels[y * usize::from(SIZE) + x]
    }
}

fn render(sequence: &CommandSequence, target: ReplayTarget) -> Rendered {
    let settings = RenderSettings {
        render_mode: RenderMode::OptimizeSpeed,
        ..RenderSettings::default()
    };
    let mut ctx = RenderContext::new_with(SIZE, SIZE, settings);
    let mut surface = VelloCpuSurface::new(&mut ctx);
    sequence.replay(target, &mut surface).unwrap();
    surface.finish();

    let mut pixmap = Pixmap::new(SIZE, SIZE);
    surface.ctx.flush();
    surface.ctx.render_to_pixmap(&mut pixmap);
    let pixels = pixmap
        .take_unpremultiplied()
        .into_iter()
        .map(|p| [p.r, p.g, p.b, p.a])
        .collect();
    Rendered { pixels }
}

fn red() -> Paint {
    Paint::fill(Color::from_rgb8(255, 0, 0))
}

fn save_translate_rect_restore() -> CommandSequence {
    record(|r| {
        r.save(SaveFlags::MATRIX_CLIP)?;
        r.translate(10.0, 10.0)?;
        r.draw_rect(Rect::new(0.0, 0.0, 5.0, 5.0), &red())?;
        r.restore()
    })
    .unwrap()
}

#[test]
fn translated_rect_is_drawn_at_the_offset() {
    let image = render(&save_translate_rect_restore(), ReplayTarget::All);
    assert_eq!(image.at(12, 12), RED);
    assert_eq!(image.at(2, 2), CLEAR);
    assert_eq!(image.at(20, 20), CLEAR);
}

#[test]
fn prefix_before_the_draw_leaves_the_canvas_empty() {
    let image = render(&save_translate_rect_restore(), ReplayTarget::Through(1));
    assert!(image.pixels.iter().all(|p| *p == CLEAR));
}

#[test]
fn hidden_translate_draws_at_the_origin() {
    let mut sequence = save_translate_rect_restore();
    sequence.set_visible(1, false);
    let image = render(&sequence, ReplayTarget::All);
    assert_eq!(image.at(2, 2), RED);
    assert_eq!(image.at(12, 12), CLEAR);
}

#[test]
fn paint_fills_only_the_clip() {
    let sequence = record(|r| {
        r.clip_rect(Rect::new(0.0, 0.0, 8.0, 8.0), RegionOp::Intersect, false)?;
        r.draw_paint(&red())
    })
    .unwrap();
    let image = render(&sequence, ReplayTarget::All);
    assert_eq!(image.at(4, 4), RED);
    assert_eq!(image.at(20, 20), CLEAR);
}

#[test]
fn bitmaps_and_sprites_are_placed() {
    let blue = ImageSnapshot::solid(4, 4, BLUE).unwrap();
    let sequence = record(|r| {
        r.translate(100.0, 100.0)?;
        r.draw_sprite(&blue, 2, 2, None)?;
        r.set_matrix(understory_drawlog::Affine::IDENTITY)?;
        r.draw_bitmap(&blue, 20.0, 20.0, None)
    })
    .unwrap();
    let image = render(&sequence, ReplayTarget::All);
    assert_eq!(image.at(3, 3), BLUE);
    assert_eq!(image.at(21, 21), BLUE);
    assert_eq!(image.at(12, 12), CLEAR);
}

#[test]
fn unsupported_clip_ends_the_pass() {
    let sequence = record(|r| {
        r.clip_rect(Rect::new(0.0, 0.0, 8.0, 8.0), RegionOp::Xor, true)?;
        r.draw_paint(&red())
    })
    .unwrap();
    let mut ctx = RenderContext::new(SIZE, SIZE);
    let mut surface = VelloCpuSurface::new(&mut ctx);
    let mut replayer = sequence.replayer(ReplayTarget::All);
    assert_eq!(
        replayer.run(&mut surface),
        Err(VelloCpuError::UnsupportedClipOp { op: RegionOp::Xor })
    );
    assert_eq!(replayer.state(), ReplayState::Done);
    assert_eq!(replayer.outcome().executed, 0);
}

#[test]
fn oversized_images_end_the_pass() {
    let wide = ImageSnapshot::solid(70_000, 1, BLUE).unwrap();
    let sequence = record(|r| {
        r.draw_rect(Rect::new(0.0, 0.0, 4.0, 4.0), &red())?;
        r.draw_bitmap_rect(&wide, None, Rect::new(0.0, 0.0, 8.0, 8.0), None)
    })
    .unwrap();
    let mut ctx = RenderContext::new(SIZE, SIZE);
    let mut surface = VelloCpuSurface::new(&mut ctx);
    let mut replayer = sequence.replayer(ReplayTarget::All);
    assert_eq!(
        replayer.run(&mut surface),
        Err(VelloCpuError::ImageTooLarge {
            width: 70_000,
            height: 1
        })
    );
    assert_eq!(replayer.state(), ReplayState::Done);
    assert_eq!(replayer.outcome().executed, 1);
}
