//! Central canvas UI: tile grid, places, hover label and stats panel.

use super::PreviewApp;
use crate::geo::{tile_for, world_size, MapProjection, TileCoord, TILE_SIZE};
use crate::viewer::{EventKind, MapEvent, ViewportSize};
use eframe::egui::{self, Align2, Color32, FontId, Painter, Pos2, Rect, Sense, Stroke, Vec2};

/// Scroll distance per zoom step.
const SCROLL_STEP: f32 = 50.0;

pub fn render_canvas(ctx: &egui::Context, app: &mut PreviewApp) {
    egui::CentralPanel::default()
        .frame(egui::Frame::NONE)
        .show(ctx, |ui| {
            let available_size = ui.available_size();
            let (response, painter) = ui.allocate_painter(available_size, Sense::click_and_drag());
            let rect = response.rect;

            track_size(app, rect);

            let sampling = app.viewer.handles(EventKind::PostRender);
            if sampling {
                app.dispatch(MapEvent::PreRender);
            }

            painter.rect_filled(rect, 0.0, Color32::from_rgb(20, 20, 35));

            let projection = app.viewer.context().map.projection.clone();
            app.viewer.context_mut().layer.update_view(&projection);

            let context = app.viewer.context();
            let tiles = context.layer.visible_tiles();
            let data_type = context
                .layer
                .source
                .as_ref()
                .map(|s| s.data_type())
                .unwrap_or("-");
            for tile in &tiles {
                draw_tile(&painter, rect, &projection, tile, data_type);
            }
            for (name, pos) in context.layer.visible_places() {
                let pos = to_pos(rect, pos);
                painter.circle_filled(pos, 4.0, Color32::from_rgb(180, 180, 200));
                painter.text(
                    pos + Vec2::new(6.0, 0.0),
                    Align2::LEFT_CENTER,
                    name,
                    FontId::proportional(11.0),
                    Color32::from_rgb(140, 140, 160),
                );
            }

            draw_overlays(&painter, rect, app);
            draw_pointer_status(&painter, rect, app, &projection);

            if sampling {
                app.dispatch(MapEvent::PostRender);
            }

            handle_canvas_interaction(&response, rect, app);
        });
}

fn to_pos(rect: Rect, p: glam::Vec2) -> Pos2 {
    rect.min + Vec2::new(p.x, p.y)
}

/// Reports a `Resize` when the canvas changed size.
fn track_size(app: &mut PreviewApp, rect: Rect) {
    let size = ViewportSize::new(rect.width().max(0.0) as u32, rect.height().max(0.0) as u32);
    let page = &mut app.viewer.context_mut().page;
    if page.viewport != size {
        page.viewport = size;
        app.dispatch(MapEvent::Resize);
    }
}

/// Outlines one tile, placing wrapped columns on the copy of the world
/// that is in view.
fn draw_tile(
    painter: &Painter,
    rect: Rect,
    projection: &MapProjection,
    tile: &TileCoord,
    data_type: &str,
) {
    let world = world_size(f64::from(projection.zoom));
    let (min, _) = projection.world_bounds();

    let mut x = f64::from(tile.x) * TILE_SIZE;
    while x + TILE_SIZE <= min.x {
        x += world;
    }
    while x > min.x + world {
        x -= world;
    }
    let y = f64::from(tile.y) * TILE_SIZE;

    let origin = to_pos(rect, glam::DVec2::new(x - min.x, y - min.y).as_vec2());
    let size = TILE_SIZE as f32;
    let tile_rect = Rect::from_min_size(origin, Vec2::splat(size));

    painter.rect_stroke(
        tile_rect,
        0.0,
        Stroke::new(1.0, Color32::from_rgba_unmultiplied(80, 100, 80, 150)),
        egui::StrokeKind::Inside,
    );
    painter.text(
        tile_rect.left_top() + Vec2::new(6.0, 6.0),
        Align2::LEFT_TOP,
        format!("{} {}", tile, data_type),
        FontId::monospace(10.0),
        Color32::from_rgba_unmultiplied(120, 140, 120, 200),
    );
}

fn draw_overlays(painter: &Painter, rect: Rect, app: &PreviewApp) {
    let page = &app.viewer.context().page;

    if let Some((text, pos)) = &page.label {
        let anchor = to_pos(rect, *pos);
        let galley =
            painter.layout_no_wrap(text.clone(), FontId::proportional(13.0), Color32::WHITE);
        let frame = Rect::from_min_size(anchor, galley.size()).expand(4.0);
        painter.rect_filled(frame, 3.0, Color32::from_black_alpha(200));
        painter.galley(anchor, galley, Color32::WHITE);
    }

    if let Some(offset) = page.stats_panel {
        let mut pos = rect.min + Vec2::new(10.0, offset);
        for line in &page.stats_lines {
            painter.text(
                pos,
                Align2::LEFT_TOP,
                line,
                FontId::monospace(12.0),
                Color32::from_rgb(200, 200, 220),
            );
            pos.y += 16.0;
        }
    }
}

/// Coordinates under the pointer and the request URL of the tile there.
fn draw_pointer_status(
    painter: &Painter,
    rect: Rect,
    app: &PreviewApp,
    projection: &MapProjection,
) {
    let Some(pointer) = app.last_pointer else {
        return;
    };
    let coord = projection.screen_to_geo(pointer);
    let mut text = format!("{:.5}, {:.5}", coord.y, coord.x);
    if let Some(source) = &app.viewer.context().layer.source {
        let tile = tile_for(coord, projection.zoom);
        text.push_str("  ");
        text.push_str(&source.tile_url(tile.z, tile.x, tile.y));
    }
    painter.text(
        rect.left_bottom() + Vec2::new(10.0, -10.0),
        Align2::LEFT_BOTTOM,
        text,
        FontId::monospace(11.0),
        Color32::from_rgb(160, 160, 180),
    );
}

fn handle_canvas_interaction(response: &egui::Response, rect: Rect, app: &mut PreviewApp) {
    if response.drag_started() {
        app.dispatch(MapEvent::DragStart);
    }

    // Handle dragging for panning
    if response.dragged() {
        let delta = response.drag_delta();
        app.viewer
            .context_mut()
            .map
            .pan_by_pixels(glam::Vec2::new(delta.x, delta.y));
    }

    if response.drag_stopped() {
        app.dispatch(MapEvent::DragEnd);
        app.dispatch(MapEvent::MoveEnd);
    }

    // Handle scroll for zooming, one level per step
    if response.hovered() {
        app.scroll_accum += response.ctx.input(|i| i.raw_scroll_delta.y);
        let steps = (app.scroll_accum / SCROLL_STEP).trunc();
        if steps != 0.0 {
            app.scroll_accum -= steps * SCROLL_STEP;
            if app.viewer.context_mut().map.zoom_by(steps as i32) {
                app.dispatch(MapEvent::MoveEnd);
            }
        }
    }

    let pointer = response
        .hover_pos()
        .map(|p| glam::Vec2::new(p.x - rect.min.x, p.y - rect.min.y));
    if let Some(position) = pointer.filter(|p| Some(*p) != app.last_pointer) {
        app.dispatch(MapEvent::PointerMove { position });
    }
    app.last_pointer = pointer;
}
