// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Replaying recorded sequences onto the reference surface.

use understory_drawlog::{
    Affine, CommandKind, CommandSequence, DrawCommand, Paint, Picture, Rect, RegionOp,
    ReplayState, ReplayTarget, SaveFlags, Surface, record,
};
use understory_drawlog_ref::{Event, RefError, RefSurface};

const RECT: Rect = Rect::new(0.0, 0.0, 5.0, 5.0);

fn save_translate_rect_restore() -> CommandSequence {
    record(|r| {
        r.save(SaveFlags::MATRIX_CLIP)?;
        r.translate(10.0, 10.0)?;
        r.draw_rect(RECT, &Paint::default())?;
        r.restore()
    })
    .unwrap()
}

fn draw_bounds(surface: &RefSurface) -> Vec<Rect> {
    surface
        .events()
        .iter()
        .filter_map(|e| match e {
            Event::Draw { state, op } if op.kind() == CommandKind::DrawRect => {
                Some(state.device_bounds(RECT))
            }
            _ => None,
        })
        .collect()
}

#[test]
fn rect_lands_at_the_translated_offset() {
    let sequence = save_translate_rect_restore();
    let mut surface = RefSurface::new();
    let outcome = sequence.replay(ReplayTarget::All, &mut surface).unwrap();
    assert!(outcome.depth.is_balanced());
    assert_eq!(draw_bounds(&surface), [Rect::new(10.0, 10.0, 15.0, 15.0)]);
    assert_eq!(surface.state().transform, Affine::IDENTITY);
    assert_eq!(surface.state().save_depth, 0);
}

#[test]
fn prefix_replay_shows_state_at_step() {
    let sequence = save_translate_rect_restore();
    let mut surface = RefSurface::new();
    let outcome = sequence
        .replay(ReplayTarget::Through(1), &mut surface)
        .unwrap();
    assert_eq!(outcome.depth.depth, 1);
    assert_eq!(surface.state().save_depth, 1);
    assert_eq!(
        surface.state().transform,
        Affine::translate((10.0, 10.0))
    );
}

#[test]
fn hidden_translate_does_not_affect_the_surface() {
    let mut sequence = save_translate_rect_restore();
    sequence.set_visible(1, false);
    let mut surface = RefSurface::new();
    sequence.replay(ReplayTarget::All, &mut surface).unwrap();
    assert_eq!(draw_bounds(&surface), [RECT]);
    assert!(
        surface
            .events()
            .iter()
            .all(|e| e.op().kind() != CommandKind::Translate)
    );
}

#[test]
fn independent_replays_match() {
    let sequence = record(|r| {
        r.clip_rect(Rect::new(0.0, 0.0, 50.0, 50.0), RegionOp::Intersect, true)?;
        r.rotate(30.0)?;
        r.save_layer(None, Some(&Paint::default()), SaveFlags::MATRIX_CLIP)?;
        r.scale(2.0, 0.5)?;
        r.draw_oval(RECT, &Paint::default())?;
        r.restore()
    })
    .unwrap();
    let mut a = RefSurface::new();
    let mut b = RefSurface::new();
    sequence.replay(ReplayTarget::All, &mut a).unwrap();
    sequence.replay(ReplayTarget::All, &mut b).unwrap();
    assert_eq!(a.events(), b.events());
    assert_eq!(a.state(), b.state());
}

#[test]
fn lone_restore_on_lenient_surface_completes() {
    let sequence = record(|r| r.restore()).unwrap();
    let mut surface = RefSurface::new();
    let outcome = sequence.replay(ReplayTarget::All, &mut surface).unwrap();
    assert_eq!(outcome.depth.depth, -1);
    assert!(outcome.depth.is_unbalanced());
}

#[test]
fn surface_errors_end_the_pass_unchanged() {
    let sequence = record(|r| {
        r.draw_rect(RECT, &Paint::default())?;
        r.restore()?;
        r.draw_rect(RECT, &Paint::default())
    })
    .unwrap();
    let mut surface = RefSurface::strict();
    let mut replayer = sequence.replayer(ReplayTarget::All);
    assert_eq!(replayer.run(&mut surface), Err(RefError::UnbalancedRestore));
    assert_eq!(replayer.state(), ReplayState::Done);
    assert_eq!(replayer.outcome().executed, 1);
    assert_eq!(surface.events().len(), 1);
}

#[test]
fn malformed_transform_is_rejected_by_the_surface() {
    let sequence = record(|r| {
        r.concat(Affine::new([f64::INFINITY, 0.0, 0.0, 1.0, 0.0, 0.0]))?;
        r.draw_rect(RECT, &Paint::default())
    })
    .unwrap();
    let mut surface = RefSurface::new();
    let err = sequence
        .replay(ReplayTarget::All, &mut surface)
        .unwrap_err();
    assert_eq!(
        err,
        RefError::NonFiniteTransform {
            kind: CommandKind::Concat
        }
    );
    assert!(surface.events().is_empty());
}

#[test]
fn restore_inside_a_picture_keeps_the_outer_translate() {
    let picture = Picture::new(RECT, vec![DrawCommand::Restore]).unwrap();
    let sequence = record(|r| {
        r.save(SaveFlags::MATRIX_CLIP)?;
        r.translate(10.0, 10.0)?;
        r.draw_picture(&picture)?;
        r.draw_rect(RECT, &Paint::default())?;
        r.restore()
    })
    .unwrap();
    let mut surface = RefSurface::strict();
    let outcome = sequence.replay(ReplayTarget::All, &mut surface).unwrap();
    assert!(outcome.depth.is_balanced());
    assert_eq!(draw_bounds(&surface), [Rect::new(10.0, 10.0, 15.0, 15.0)]);
    assert_eq!(surface.state().save_depth, 0);
}

#[test]
fn save_left_open_by_a_picture_is_closed() {
    let picture = Picture::new(
        RECT,
        vec![
            DrawCommand::Save {
                flags: SaveFlags::MATRIX_CLIP,
            },
            DrawCommand::Translate { dx: 3.0, dy: 3.0 },
        ],
    )
    .unwrap();
    let sequence = record(|r| {
        r.draw_picture(&picture)?;
        r.draw_rect(RECT, &Paint::default())
    })
    .unwrap();
    let mut surface = RefSurface::new();
    sequence.replay(ReplayTarget::All, &mut surface).unwrap();
    assert_eq!(surface.state().save_depth, 0);
    assert_eq!(surface.state().transform, Affine::IDENTITY);
    assert_eq!(draw_bounds(&surface), [RECT]);
}
