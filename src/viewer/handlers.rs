//! Event handlers. Each one reacts to a single event and works only
//! through the context it is given.

use super::{AppContext, MapEvent, MapWidget, PageHost, RenderLayer};
use crate::state::url_hash;
use glam::Vec2;
use web_time::Instant;

pub(super) fn mark_ready<M, L, P>(ctx: &mut AppContext<M, L, P>, _event: &MapEvent) {
    if !ctx.layer_ready {
        log::info!("Rendering layer ready ({})", ctx.view.source_id);
    }
    ctx.layer_ready = true;
}

/// Reads the map's center/zoom back and writes the fragment if it changed.
pub(super) fn sync_hash<M: MapWidget, L, P: PageHost>(
    ctx: &mut AppContext<M, L, P>,
    _event: &MapEvent,
) {
    ctx.view.center = ctx.map.center();
    ctx.view.zoom = ctx.map.zoom();

    let hash = url_hash::format_hash(&ctx.view);
    if hash != ctx.last_hash {
        log::debug!("URL fragment: #{}", hash);
        ctx.page.write_hash(&hash);
        ctx.last_hash = hash;
    }
}

/// Applies a fragment that was edited outside the viewer.
pub(super) fn follow_hash<M: MapWidget, L: RenderLayer, P>(
    ctx: &mut AppContext<M, L, P>,
    event: &MapEvent,
) {
    let MapEvent::HashChange { hash } = event else {
        return;
    };
    let hash = hash.trim().trim_start_matches('#');
    if hash == ctx.last_hash {
        return;
    }
    // The next sync must rewrite the fragment even if the view is unchanged
    ctx.last_hash = hash.to_string();

    let mut view =
        url_hash::parse_hash(hash).resolve(&ctx.registry, &ctx.config.default_location);
    view.zoom = ctx.config.clamp_zoom(view.zoom);

    if view.source_id != ctx.view.source_id {
        switch_source(ctx, &view.source_id);
    }
    if view.options.render_mode() != ctx.view.options.render_mode() {
        ctx.layer.set_render_mode(view.options.render_mode());
    }

    ctx.map.set_view(view.center, view.zoom);
    ctx.view.center = view.center;
    ctx.view.zoom = view.zoom;
    ctx.view.options = view.options;
}

pub(super) fn switch_source<M, L: RenderLayer, P>(ctx: &mut AppContext<M, L, P>, source_id: &str) {
    let resolved = ctx.registry.resolve_id(source_id).to_string();
    if resolved != source_id {
        log::warn!("Unknown tile source '{}', using '{}'", source_id, resolved);
    }
    if resolved == ctx.view.source_id {
        return;
    }

    if let Some(source) = ctx.registry.get(&resolved) {
        ctx.layer.set_source(source);
    }
    log::info!("Switched tile source to {}", resolved);
    ctx.view.source_id = resolved;
}

/// Sizes the map container to the viewport and lets the map re-layout.
pub(super) fn resize_map<M: MapWidget, L, P: PageHost>(
    ctx: &mut AppContext<M, L, P>,
    _event: &MapEvent,
) {
    let size = ctx.page.viewport_size();
    ctx.page.set_container_size(size);
    ctx.map.invalidate_size(false);
}

pub(super) fn track_drag<M, L, P>(ctx: &mut AppContext<M, L, P>, event: &MapEvent) {
    match event {
        MapEvent::DragStart => ctx.dragging = true,
        MapEvent::DragEnd => ctx.dragging = false,
        _ => {}
    }
}

/// Starts a feature lookup under the pointer, unless the map is being panned.
pub(super) fn pick_feature<M, L: RenderLayer, P>(ctx: &mut AppContext<M, L, P>, event: &MapEvent) {
    let MapEvent::PointerMove { position } = event else {
        return;
    };
    if ctx.dragging || !ctx.layer_ready {
        return;
    }

    let ticket = ctx.issue_ticket();
    ctx.layer.query_feature_at(*position, ticket);
}

/// Shows the picked feature's name next to the cursor, or clears the label.
///
/// Replies older than one already shown are dropped.
pub(super) fn show_picked_feature<M, L, P: PageHost>(
    ctx: &mut AppContext<M, L, P>,
    event: &MapEvent,
) {
    let MapEvent::FeaturePicked {
        ticket,
        position,
        feature,
    } = event
    else {
        return;
    };

    if let Some(latest) = ctx.latest_pick {
        if *ticket < latest {
            log::trace!("Dropping stale feature pick {:?}", ticket);
            return;
        }
    }
    ctx.latest_pick = Some(*ticket);

    match feature.as_ref().and_then(|f| f.name()) {
        Some(name) => {
            let offset = Vec2::from(ctx.config.label_offset);
            ctx.page.show_label(name, *position + offset);
        }
        None => ctx.page.remove_label(),
    }
}

pub(super) fn sample_pre_render<M, L, P>(ctx: &mut AppContext<M, L, P>, _event: &MapEvent) {
    ctx.stats.begin_frame(Instant::now());
}

pub(super) fn sample_post_render<M, L: RenderLayer, P: PageHost>(
    ctx: &mut AppContext<M, L, P>,
    _event: &MapEvent,
) {
    ctx.stats.end_frame(Instant::now(), ctx.layer.metrics());
    let lines = ctx.stats.format_lines();
    ctx.page.update_stats_panel(&lines);
}

#[cfg(test)]
mod tests {
    use super::super::testing::{viewer_with_config, viewer_with_hash};
    use super::super::{EventKind, MapEvent, PickTicket, PickedFeature, ViewportSize};
    use crate::data::DEFAULT_SOURCE_ID;
    use crate::state::{RenderMetrics, ViewerConfig};
    use geo_types::Coord;
    use glam::Vec2;

    fn hash_tokens(hash: &str) -> Vec<String> {
        hash.split(',').map(str::to_string).collect()
    }

    #[test]
    fn test_three_token_hash_sets_view_with_default_source() {
        let viewer = viewer_with_hash("#51.5074,-0.1278,12");
        let ctx = viewer.context();
        assert_eq!(ctx.map.center, Coord { x: -0.1278, y: 51.5074 });
        assert_eq!(ctx.map.zoom, 12);
        assert_eq!(ctx.view.source_id, DEFAULT_SOURCE_ID);
        assert_eq!(
            ctx.layer.source.as_ref().map(|s| s.id.as_str()),
            Some(DEFAULT_SOURCE_ID)
        );
        assert!(ctx.layer.attached);
    }

    #[test]
    fn test_named_location_hash() {
        let viewer = viewer_with_hash("#mapzen,sydney");
        let ctx = viewer.context();
        assert_eq!(ctx.map.center, Coord { x: 151.2093, y: -33.8688 });
        assert_eq!(ctx.map.zoom, 13);
        assert_eq!(ctx.view.source_id, "mapzen");
    }

    #[test]
    fn test_source_only_hash_uses_default_location() {
        let viewer = viewer_with_hash("#local");
        let ctx = viewer.context();
        assert_eq!(ctx.view.source_id, "local");
        assert_eq!(ctx.layer.source.as_ref().map(|s| s.id.as_str()), Some("local"));
        assert_eq!(ctx.map.zoom, 15);
        assert_eq!(ctx.map.center.y, 40.70531887544228);
    }

    #[test]
    fn test_move_end_writes_source_center_zoom() {
        let mut viewer = viewer_with_hash("#mapzen,1,2,3,perf");
        {
            let map = &mut viewer.context_mut().map;
            map.center = Coord {
                x: 13.404954,
                y: 52.520008,
            };
            map.zoom = 11;
        }
        viewer.handle(&MapEvent::MoveEnd);

        let ctx = viewer.context();
        let written = ctx.page.hash_writes.last().cloned().unwrap();
        let tokens = hash_tokens(&written);
        assert_eq!(&tokens[..4], &["mapzen", "52.5200", "13.4050", "11"]);
        assert_eq!(tokens[4], "perf");
        assert_eq!(ctx.last_hash, written);
    }

    #[test]
    fn test_unchanged_view_is_not_rewritten() {
        let mut viewer = viewer_with_hash("");
        viewer.handle(&MapEvent::Init);
        viewer.handle(&MapEvent::MoveEnd);
        viewer.handle(&MapEvent::MoveEnd);
        assert_eq!(viewer.context().page.hash_writes.len(), 1);
    }

    #[test]
    fn test_init_marks_ready_and_writes_resolved_hash() {
        let mut viewer = viewer_with_hash("#nope,tokyo");
        assert!(!viewer.context().layer_ready);
        viewer.handle(&MapEvent::Init);

        let ctx = viewer.context();
        assert!(ctx.layer_ready);
        assert_eq!(
            ctx.page.hash_writes,
            vec![format!("{},35.6762,139.6503,13", DEFAULT_SOURCE_ID)]
        );
    }

    #[test]
    fn test_resize_sets_exact_pixel_styles() {
        let mut viewer = viewer_with_hash("");
        // Once at startup
        assert_eq!(viewer.context().page.container_width.as_deref(), Some("1024px"));
        assert_eq!(viewer.context().map.invalidations, vec![false]);

        viewer.context_mut().page.viewport = ViewportSize::new(1366, 641);
        viewer.handle(&MapEvent::Resize);

        let ctx = viewer.context();
        assert_eq!(ctx.page.container_width.as_deref(), Some("1366px"));
        assert_eq!(ctx.page.container_height.as_deref(), Some("641px"));
        assert_eq!(ctx.map.invalidations, vec![false, false]);
    }

    #[test]
    fn test_pointer_move_over_empty_pixel_removes_label() {
        let mut viewer = viewer_with_hash("");
        viewer.handle(&MapEvent::Init);

        let over_feature = Vec2::new(100.0, 120.0);
        viewer.handle(&MapEvent::PointerMove {
            position: over_feature,
        });
        let ticket = viewer.context().layer.queries[0].1;
        viewer.handle(&MapEvent::FeaturePicked {
            ticket,
            position: over_feature,
            feature: Some(PickedFeature::named("Broadway")),
        });
        let label = viewer.context().page.label.clone().unwrap();
        assert_eq!(label.0, "Broadway");
        assert_eq!(label.1, over_feature + Vec2::new(12.0, -12.0));

        let empty = Vec2::new(300.0, 40.0);
        viewer.handle(&MapEvent::PointerMove { position: empty });
        let ticket = viewer.context().layer.queries[1].1;
        viewer.handle(&MapEvent::FeaturePicked {
            ticket,
            position: empty,
            feature: None,
        });
        assert_eq!(viewer.context().page.label, None);
    }

    #[test]
    fn test_unnamed_feature_clears_label() {
        let mut viewer = viewer_with_hash("");
        viewer.handle(&MapEvent::Init);
        viewer.context_mut().page.label = Some(("Old".to_string(), Vec2::ZERO));

        viewer.handle(&MapEvent::PointerMove {
            position: Vec2::ONE,
        });
        let ticket = viewer.context().layer.queries[0].1;
        viewer.handle(&MapEvent::FeaturePicked {
            ticket,
            position: Vec2::ONE,
            feature: Some(PickedFeature::default()),
        });
        assert_eq!(viewer.context().page.label, None);
    }

    #[test]
    fn test_stale_pick_does_not_overwrite_newer_label() {
        let mut viewer = viewer_with_hash("");
        viewer.handle(&MapEvent::Init);
        viewer.handle(&MapEvent::PointerMove {
            position: Vec2::new(1.0, 1.0),
        });
        viewer.handle(&MapEvent::PointerMove {
            position: Vec2::new(2.0, 2.0),
        });
        let first = viewer.context().layer.queries[0].1;
        let second = viewer.context().layer.queries[1].1;
        assert!(first < second);

        viewer.handle(&MapEvent::FeaturePicked {
            ticket: second,
            position: Vec2::new(2.0, 2.0),
            feature: Some(PickedFeature::named("Newer")),
        });
        viewer.handle(&MapEvent::FeaturePicked {
            ticket: first,
            position: Vec2::new(1.0, 1.0),
            feature: None,
        });

        assert_eq!(
            viewer.context().page.label.as_ref().map(|l| l.0.as_str()),
            Some("Newer")
        );
    }

    #[test]
    fn test_no_picks_while_dragging_or_before_init() {
        let mut viewer = viewer_with_hash("");
        let pointer = MapEvent::PointerMove {
            position: Vec2::new(5.0, 5.0),
        };

        viewer.handle(&pointer);
        assert!(viewer.context().layer.queries.is_empty());

        viewer.handle(&MapEvent::Init);
        viewer.handle(&MapEvent::DragStart);
        viewer.handle(&pointer);
        assert!(viewer.context().layer.queries.is_empty());

        viewer.handle(&MapEvent::DragEnd);
        viewer.handle(&pointer);
        assert_eq!(viewer.context().layer.queries.len(), 1);
        assert_eq!(viewer.context().layer.queries[0].1, PickTicket(1));
    }

    #[test]
    fn test_overlay_samples_render_metrics() {
        let mut viewer = viewer_with_hash("#nextzen,40.7,-74.0,15,perf");
        assert_eq!(viewer.context().page.stats_panel, Some(80.0));
        assert!(viewer.handles(EventKind::PostRender));

        viewer.context_mut().layer.metrics = RenderMetrics {
            tile_count: 9,
            buffer_bytes: 5 * 1024 * 1024,
            feature_count: 1234,
        };
        viewer.handle(&MapEvent::PreRender);
        viewer.handle(&MapEvent::PostRender);

        let ctx = viewer.context();
        assert_eq!(ctx.stats.frames, 1);
        assert!(ctx.page.stats_lines.contains(&"tiles: 9".to_string()));
        assert!(ctx.page.stats_lines.contains(&"buffer: 5.00 MB".to_string()));
        assert!(ctx.page.stats_lines.contains(&"features: 1234".to_string()));
    }

    #[test]
    fn test_overlay_off_without_flag() {
        let mut viewer = viewer_with_hash("#nextzen,40.7,-74.0,15");
        assert_eq!(viewer.context().page.stats_panel, None);
        assert!(!viewer.handles(EventKind::PreRender));

        viewer.handle(&MapEvent::PostRender);
        assert_eq!(viewer.context().stats.frames, 0);
        assert!(viewer.context().page.stats_lines.is_empty());
    }

    #[test]
    fn test_hash_change_moves_map_and_switches_source() {
        let mut viewer = viewer_with_hash("");
        viewer.handle(&MapEvent::Init);
        viewer.handle(&MapEvent::HashChange {
            hash: "#mapzen,48.8566,2.3522,14,mode=night".to_string(),
        });

        let ctx = viewer.context();
        assert_eq!(ctx.map.center, Coord { x: 2.3522, y: 48.8566 });
        assert_eq!(ctx.map.zoom, 14);
        assert_eq!(ctx.view.source_id, "mapzen");
        assert_eq!(ctx.layer.source.as_ref().map(|s| s.id.as_str()), Some("mapzen"));
        assert_eq!(ctx.layer.render_mode.as_deref(), Some("night"));
    }

    #[test]
    fn test_own_hash_write_is_not_reapplied() {
        let mut viewer = viewer_with_hash("");
        viewer.handle(&MapEvent::Init);
        let written = viewer.context().last_hash.clone();
        let calls = viewer.context().map.set_view_calls;

        viewer.handle(&MapEvent::HashChange {
            hash: format!("#{}", written),
        });
        assert_eq!(viewer.context().map.set_view_calls, calls);
    }

    #[test]
    fn test_cleared_hash_is_rewritten_after_move() {
        let mut viewer = viewer_with_hash("");
        viewer.handle(&MapEvent::Init);
        let canonical = viewer.context().last_hash.clone();

        viewer.context_mut().page.hash = String::new();
        viewer.handle(&MapEvent::HashChange {
            hash: "#".to_string(),
        });
        viewer.handle(&MapEvent::MoveEnd);

        let ctx = viewer.context();
        assert_eq!(ctx.page.hash, canonical);
        assert_eq!(ctx.page.hash_writes.len(), 2);
        assert_eq!(ctx.last_hash, canonical);
    }

    #[test]
    fn test_unparseable_hash_is_replaced_with_view() {
        let mut viewer = viewer_with_hash("");
        viewer.handle(&MapEvent::Init);
        let canonical = viewer.context().last_hash.clone();

        viewer.context_mut().page.hash = "garbage".to_string();
        viewer.handle(&MapEvent::HashChange {
            hash: "#garbage".to_string(),
        });
        viewer.handle(&MapEvent::MoveEnd);

        assert_eq!(viewer.context().page.hash, canonical);
    }

    #[test]
    fn test_set_source_unknown_uses_default() {
        let mut viewer = viewer_with_hash("#mapzen");
        viewer.set_source("doesnotexist");
        let ctx = viewer.context();
        assert_eq!(ctx.view.source_id, DEFAULT_SOURCE_ID);
        assert!(ctx.page.hash_writes.last().unwrap().starts_with(DEFAULT_SOURCE_ID));
    }

    #[test]
    fn test_config_clamps_initial_zoom() {
        let config = ViewerConfig {
            max_zoom: 10,
            ..ViewerConfig::default()
        };
        let viewer = viewer_with_config(config, "#1,2,18");
        assert_eq!(viewer.context().map.zoom, 10);
        assert_eq!(viewer.context().view.zoom, 10);
    }

    #[test]
    fn test_render_mode_passed_to_layer() {
        let viewer = viewer_with_hash("#nextzen,1,2,3,mode=sketch");
        assert_eq!(viewer.context().layer.render_mode.as_deref(), Some("sketch"));
    }
}
