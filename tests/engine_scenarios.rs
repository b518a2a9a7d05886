use eframe::egui::Color32;
use kaleido_painter::brush_engine::tool::Tool;
use kaleido_painter::canvas::flood_fill::FillOutcome;
use kaleido_painter::canvas::layers::NewLayer;
use kaleido_painter::utils::project::ProjectFile;
use kaleido_painter::utils::vector::Vec2;
use kaleido_painter::{Engine, EngineConfig, EngineError, EngineEvent};

fn config() -> EngineConfig {
    EngineConfig {
        canvas_width: 200,
        canvas_height: 200,
        preview_width: 120,
        preview_height: 120,
        segment_offset: [0.0, 0.0],
        ..EngineConfig::default()
    }
}

fn pixel_at(engine: &Engine, point: Vec2) -> Option<Color32> {
    engine
        .current_layer()
        .unwrap()
        .pixels
        .get(point.x.floor() as i32, point.y.floor() as i32)
}

#[test]
fn black_stroke_undo_redo_round_trip() {
    let mut engine = Engine::new(config()).unwrap();
    assert_eq!(engine.segment_count(), 8);
    let yellow = Color32::from_rgb(255, 255, 0);
    assert_eq!(engine.current_layer().unwrap().color, yellow);

    let wedge = engine.wedge();
    let direction = Vec2::from_angle(wedge.start_angle + wedge.angle_per_segment / 2.0);
    let edge = wedge.center + direction * wedge.radius;
    let halfway = wedge.center + direction * (wedge.radius * 0.5);
    let before = engine.current_layer().unwrap().pixels.clone();
    assert_eq!(pixel_at(&engine, halfway), Some(yellow));

    let tool = Tool::Brush {
        width: 10.0,
        color: Color32::BLACK,
    };
    engine.stroke_begin(wedge.center, tool).unwrap();
    engine.stroke_update(edge);
    engine.stroke_end();
    assert_eq!(pixel_at(&engine, halfway), Some(Color32::BLACK));
    // The round cap at the center stays inside the wedge.
    let behind = wedge.center - direction * 4.0;
    assert_ne!(pixel_at(&engine, behind), Some(Color32::BLACK));
    let stroked = engine.current_layer().unwrap().pixels.clone();

    assert!(engine.undo());
    assert_eq!(engine.current_layer().unwrap().pixels, before);

    assert!(engine.redo());
    assert_eq!(engine.current_layer().unwrap().pixels, stroked);
    assert_eq!(pixel_at(&engine, halfway), Some(Color32::BLACK));
}

#[test]
fn save_then_undo_restores_every_layer() {
    let mut engine = Engine::new(config()).unwrap();
    engine.add_default_layer().unwrap();
    engine
        .add_layer(NewLayer {
            name: Some("Accent".into()),
            opacity: 0.3,
            ..NewLayer::default()
        })
        .unwrap();
    let layers = engine.layers().layers().to_vec();

    engine.save();
    engine.set_layer_color(0, "#102030").unwrap();
    engine.toggle_layer_visibility(2, false).unwrap();
    engine.undo();
    engine.undo();
    assert!(engine.undo());
    assert_eq!(engine.layers().layers(), &layers[..]);
}

#[test]
fn recolor_is_not_cumulative() {
    let mut once = Engine::new(config()).unwrap();
    let mut twice = Engine::new(config()).unwrap();
    once.set_layer_color(0, "#3366cc").unwrap();
    twice.set_layer_color(0, "#3366cc").unwrap();
    twice.set_layer_color(0, "#3366cc").unwrap();
    assert_eq!(
        once.current_layer().unwrap().pixels,
        twice.current_layer().unwrap().pixels
    );
}

#[test]
fn last_layer_cannot_be_deleted() {
    let mut engine = Engine::new(config()).unwrap();
    let layers = engine.layers().layers().to_vec();
    let err = engine.delete_layer().unwrap_err();
    assert!(matches!(err, EngineError::LastLayer));
    assert!(err.is_invariant_violation());
    assert_eq!(engine.layers().layers(), &layers[..]);
    assert_eq!(engine.history_depth(), (0, 0));
}

#[test]
fn engines_are_independent() {
    let mut a = Engine::new(config()).unwrap();
    let b = Engine::new(config()).unwrap();
    a.set_segment_count(3).unwrap();
    a.add_default_layer().unwrap();
    assert_eq!(b.segment_count(), 8);
    assert_eq!(b.layers().len(), 1);
}

#[test]
fn bucket_fills_only_the_wedge_after_clearing() {
    let mut engine = Engine::new(EngineConfig {
        segment_count: 6,
        ..config()
    })
    .unwrap();
    engine.clear_current_layer().unwrap();
    let wedge = engine.wedge();
    let seed = wedge.center + Vec2::from_angle(wedge.bisector()) * (wedge.radius * 0.5);

    let outcome = engine.flood_fill(seed, Color32::RED).unwrap();
    let FillOutcome::Filled { pixels, truncated } = outcome else {
        panic!("seed was rejected: {outcome:?}");
    };
    assert!(!truncated);

    let layer = &engine.current_layer().unwrap().pixels;
    let mut inside = 0;
    for y in 0..200 {
        for x in 0..200 {
            let filled = layer.get(x, y) == Some(Color32::RED);
            if filled {
                assert!(
                    wedge.contains_pixel(x as usize, y as usize),
                    "({x}, {y}) is outside the wedge"
                );
                inside += 1;
            }
        }
    }
    assert_eq!(inside, pixels);
}

#[test]
fn preview_follows_edits_and_background() {
    let mut engine = Engine::new(EngineConfig {
        segment_count: 4,
        ..config()
    })
    .unwrap();
    let first = engine.preview().clone();
    assert_eq!((first.width(), first.height()), (120, 120));

    engine.set_background(Color32::from_rgb(10, 20, 30));
    let corner = engine.preview().get(0, 0);
    assert_eq!(corner, Some(Color32::from_rgb(10, 20, 30)));
    assert_ne!(engine.preview(), &first);
}

#[test]
fn project_round_trip_keeps_the_document() {
    let mut source = Engine::new(config()).unwrap();
    source.add_default_layer().unwrap();
    source.set_layer_opacity(1, 0.75).unwrap();
    source.set_segment_count(5).unwrap();

    let json = ProjectFile::capture(&source).unwrap().to_json().unwrap();
    let mut target = Engine::new(config()).unwrap();
    target.take_events();
    ProjectFile::from_json(&json)
        .unwrap()
        .apply(&mut target)
        .unwrap();

    assert_eq!(target.segment_count(), 5);
    assert_eq!(target.layers().layers(), source.layers().layers());
    assert!(!target.can_undo());
    let events = target.take_events();
    assert!(events.contains(&EngineEvent::SegmentsChanged));
    assert!(events.contains(&EngineEvent::PixelsChanged));
}

#[test]
fn shape_gesture_never_spills_onto_another_layer() {
    let mut engine = Engine::new(config()).unwrap();
    engine.add_default_layer().unwrap();
    engine.select_layer(0).unwrap();
    let wedge = engine.wedge();
    let untouched = engine.layers().layers()[1].pixels.clone();

    let tool = Tool::Line {
        width: 6.0,
        color: Color32::BLACK,
    };
    engine.stroke_begin(wedge.center, tool).unwrap();
    engine.select_layer(1).unwrap();
    engine.stroke_update(wedge.center + Vec2::from_angle(wedge.bisector()) * 60.0);
    assert_eq!(engine.layers().layers()[1].pixels, untouched);

    engine.stroke_begin(wedge.center, tool).unwrap();
    engine.add_default_layer().unwrap();
    let fresh = engine.current_layer().unwrap().pixels.clone();
    engine.stroke_update(wedge.center + Vec2::from_angle(wedge.bisector()) * 60.0);
    assert_eq!(engine.current_layer().unwrap().pixels, fresh);
}
