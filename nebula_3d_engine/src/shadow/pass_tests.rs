use super::*;
use std::sync::Arc;
use crate::batch::MotionHistory;
use crate::config::BatchConfig;
use crate::device::mock_device::MockCommandList;
use crate::resource::{KeywordSet, Material, MaterialDesc, Mesh, MeshId, Shader, ShaderId, ShaderLibrary, ShaderPass};
use crate::scene::{CascadeCount, SceneObject, ShadowResolution};
use crate::uniform::UniformCache;

// ============================================================================
// Helpers
// ============================================================================

fn camera() -> Camera {
    let view = Mat4::look_at_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
    let projection = Mat4::perspective_rh(1.0, 1.0, 0.1, 200.0);
    let viewport = Viewport::from_rect(Rect2D { x: 0, y: 0, width: 640, height: 480 });
    Camera::new(view, projection, viewport, 0.1, 200.0)
}

fn spot(id: u64, distance: f32) -> Light {
    Light::spot(id, Mat4::from_translation(Vec3::new(distance, 0.0, 0.0)), 30.0, 0.5)
}

fn sun(cascades: CascadeCount) -> Light {
    Light::directional(100, Mat4::from_rotation_x(-1.0), cascades)
}

struct Scene {
    drawables: Vec<SceneObject>,
    library: ShaderLibrary,
}

fn caster_scene() -> Scene {
    let shader = Arc::new(Shader::new(ShaderId(1), "lit", vec![
        ShaderPass::new("forward"),
        ShaderPass::new("shadow").with_tag("LightMode", "ShadowCaster"),
    ]));
    let mut library = ShaderLibrary::new();
    library.register(ShaderId(1), 0, KeywordSet::new());
    library.register(ShaderId(1), 1, KeywordSet::new());

    let material = Arc::new(Material::new(MaterialDesc { shader: Some(shader), ..Default::default() }).unwrap());
    let mesh = Arc::new(Mesh::new(MeshId(1), "crate", 24, 36));
    let drawables = (0..3)
        .map(|i| SceneObject::new(i, Some(Arc::clone(&material)), Arc::clone(&mesh), Mat4::IDENTITY))
        .collect();
    Scene { drawables, library }
}

fn run_pass(
    config: &ShadowConfig,
    lights: &[Light],
    atlas: &mut ShadowAtlas,
    scene: &Scene,
    cmd: &mut MockCommandList,
) -> Vec<ShadowRecord> {
    let pass = ShadowPass::new(config);
    let cam = camera();
    let selection = pass.selector().select(lights, cam.position());
    let mut builder = BatchBuilder::new(&BatchConfig::default());
    let mut cache = UniformCache::new();
    let mut motion = MotionHistory::new(60);
    let mut ctx = DrawContext { resolver: &scene.library, cache: &mut cache, motion: &mut motion, cmd };
    let inputs = ShadowInputs {
        lights,
        selection: &selection,
        camera: &cam,
        drawables: &scene.drawables,
        caster_excluded: &[],
        frame: 0,
    };
    pass.run(&inputs, atlas, &mut builder, &mut ctx).unwrap()
}

// ============================================================================
// State machine
// ============================================================================

#[test]
fn test_non_casting_and_excluded_lights_not_cast() {
    let config = ShadowConfig { max_spot_lights: 1, ..Default::default() };
    let lights = vec![spot(1, 2.0).with_shadows(false), spot(2, 5.0), spot(3, 9.0)];
    let mut atlas = ShadowAtlas::new(4096, 32);
    let mut cmd = MockCommandList::new();

    let records = run_pass(&config, &lights, &mut atlas, &caster_scene(), &mut cmd);

    // Light 1 is selected (closest) but does not cast; 2 and 3 are excluded
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.state() == ShadowState::NotCast));
    assert_eq!(cmd.count("begin_render_pass"), 0);
    assert!(atlas.reservations().is_empty());
}

#[test]
fn test_spot_light_rendered_into_its_tile() {
    let lights = vec![spot(1, 0.0)];
    let mut atlas = ShadowAtlas::new(4096, 32);
    let mut cmd = MockCommandList::new();

    let records = run_pass(&ShadowConfig::default(), &lights, &mut atlas, &caster_scene(), &mut cmd);
    let tile = &records[0].tiles[0];

    assert_eq!(records[0].state(), ShadowState::Rendered);
    assert_eq!(tile.slot, ShadowSlot::Spot);
    assert_eq!(tile.resolution, 2048);
    assert_eq!(tile.light_space.len(), 1);
    assert_eq!(cmd.count("begin_render_pass:ShadowAtlas"), 1);
    assert_eq!(cmd.count("end_render_pass"), 1);
    assert_eq!(cmd.viewports, vec![Viewport::from_rect(Rect2D { x: 0, y: 0, width: 2048, height: 2048 })]);
    // One caster batch, three members
    assert_eq!(cmd.count("draw"), 3);
}

#[test]
fn test_point_light_renders_six_faces_in_grid() {
    let lights = vec![Light::point(5, Vec3::new(0.0, 0.0, -2.0), 10.0).with_resolution(ShadowResolution::Low)];
    let mut atlas = ShadowAtlas::new(4096, 32);
    let mut cmd = MockCommandList::new();

    let records = run_pass(&ShadowConfig::default(), &lights, &mut atlas, &caster_scene(), &mut cmd);
    let tile = &records[0].tiles[0];

    assert_eq!(tile.slot, ShadowSlot::Cube);
    assert_eq!(tile.resolution, 512);
    assert_eq!(tile.light_space.len(), 6);
    let reservation = tile.reservation.unwrap();
    assert_eq!((reservation.width, reservation.height), (1536, 1024));

    let origins: Vec<(f32, f32)> = cmd.viewports.iter().map(|v| (v.x, v.y)).collect();
    assert_eq!(origins, vec![(0.0, 0.0), (512.0, 0.0), (1024.0, 0.0), (0.0, 512.0), (512.0, 512.0), (1024.0, 512.0)]);
    assert_eq!(cmd.count("draw"), 18);
}

#[test]
fn test_directional_cascades_halve_resolution() {
    let lights = vec![sun(CascadeCount::Four)];
    let mut atlas = ShadowAtlas::new(4096, 32);
    let mut cmd = MockCommandList::new();

    let records = run_pass(&ShadowConfig::default(), &lights, &mut atlas, &caster_scene(), &mut cmd);
    let resolutions: Vec<u32> = records[0].tiles.iter().map(|t| t.resolution).collect();
    let slots: Vec<ShadowSlot> = records[0].tiles.iter().map(|t| t.slot).collect();

    assert_eq!(resolutions, vec![2048, 1024, 512, 256]);
    assert_eq!(slots, vec![
        ShadowSlot::Cascade(0), ShadowSlot::Cascade(1), ShadowSlot::Cascade(2), ShadowSlot::Cascade(3),
    ]);
    assert!(records[0].tiles.iter().all(|t| t.state == ShadowState::Rendered));
    assert_eq!(cmd.count("set_viewport"), 4);
}

#[test]
fn test_exhausted_atlas_marks_failed_and_skips_render() {
    let lights = vec![spot(1, 0.0)];
    let mut atlas = ShadowAtlas::new(1024, 32);
    let mut cmd = MockCommandList::new();

    let records = run_pass(&ShadowConfig::default(), &lights, &mut atlas, &caster_scene(), &mut cmd);

    assert_eq!(records[0].state(), ShadowState::Failed);
    assert!(!records[0].is_shadowed());
    assert!(records[0].tiles[0].reservation.is_none());
    assert!(cmd.commands.is_empty());
}

#[test]
fn test_individual_cascades_fail_independently() {
    let lights = vec![sun(CascadeCount::Two).with_resolution(ShadowResolution::VeryHigh)];
    let mut atlas = ShadowAtlas::new(4096, 32);
    atlas.reserve(4096, 2048, 999).unwrap();
    let mut cmd = MockCommandList::new();

    let records = run_pass(&ShadowConfig::default(), &lights, &mut atlas, &caster_scene(), &mut cmd);
    let states: Vec<ShadowState> = records[0].tiles.iter().map(|t| t.state).collect();

    assert_eq!(states, vec![ShadowState::Failed, ShadowState::Rendered]);
    assert_eq!(records[0].state(), ShadowState::Rendered);
}

#[test]
fn test_reservation_order_directional_then_nearest() {
    let lights = vec![
        spot(1, 20.0).with_resolution(ShadowResolution::Low),
        Light::point(2, Vec3::new(3.0, 0.0, 0.0), 5.0).with_resolution(ShadowResolution::Low),
        sun(CascadeCount::One).with_resolution(ShadowResolution::Low),
        spot(3, 1.0).with_resolution(ShadowResolution::Low),
    ];
    let pass = ShadowPass::new(&ShadowConfig::default());
    let cam = camera();
    let selection = pass.selector().select(&lights, cam.position());
    let mut atlas = ShadowAtlas::new(4096, 32);
    pass.plan(&lights, &selection, &cam, &mut atlas);

    let owners: Vec<u64> = atlas.reservations().iter().map(|r| r.owner).collect();
    assert_eq!(owners, vec![100, 3, 2, 1]);
}

#[test]
fn test_plan_is_deterministic_after_clear() {
    let lights = vec![spot(1, 4.0), Light::point(2, Vec3::new(0.0, 2.0, 0.0), 5.0), sun(CascadeCount::Two)];
    let pass = ShadowPass::new(&ShadowConfig::default());
    let cam = camera();
    let selection = pass.selector().select(&lights, cam.position());
    let mut atlas = ShadowAtlas::new(8192, 32);

    let first = pass.plan(&lights, &selection, &cam, &mut atlas);
    atlas.clear();
    let second = pass.plan(&lights, &selection, &cam, &mut atlas);
    assert_eq!(first, second);
}

// ============================================================================
// Tiles, cascades and sampling data
// ============================================================================

#[test]
fn test_cascade_splits() {
    let uniform = cascade_splits(1.0, 101.0, 4, 0.0);
    assert_eq!(uniform, vec![26.0, 51.0, 76.0, 101.0]);

    let blended = cascade_splits(0.1, 100.0, 4, 0.5);
    assert_eq!(blended.len(), 4);
    assert!(blended.windows(2).all(|w| w[0] < w[1]));
    assert!((blended[3] - 100.0).abs() < 1e-3);
}

#[test]
fn test_atlas_uv_rect() {
    let tile = ShadowTile {
        reservation: Some(AtlasReservation { x: 1024, y: 2048, width: 1024, height: 1024, owner: 1 }),
        state: ShadowState::Reserved,
        ..ShadowTile::requested(ShadowSlot::Spot, 1024)
    };
    assert_eq!(tile.atlas_uv_rect(0, 4096), Some(Vec4::new(0.25, 0.25, 0.25, 0.5)));
    assert_eq!(tile.atlas_uv_rect(1, 4096), None);
}

#[test]
fn test_shadow_globals_cover_rendered_faces() {
    let lights = vec![spot(1, 0.0).with_resolution(ShadowResolution::Low), Light::point(2, Vec3::ZERO, 5.0)];
    let mut atlas = ShadowAtlas::new(4096, 32);
    let mut cmd = MockCommandList::new();
    let records = run_pass(&ShadowConfig::default(), &lights, &mut atlas, &caster_scene(), &mut cmd);

    let globals = shadow_globals(&records, atlas.size());
    let count = globals.iter().find(|(n, _)| n == "u_ShadowCount").map(|(_, v)| *v);
    assert_eq!(count, Some(UniformValue::UInt(7)));
    assert!(globals.iter().any(|(n, _)| n == "u_ShadowMatrix[6]"));
    assert!(globals.iter().any(|(n, _)| n == "u_ShadowAtlasRect[0]"));
    assert!(globals.iter().any(|(n, _)| n == "u_ShadowBias[3]"));
}

#[test]
fn test_shadow_globals_empty_when_nothing_rendered() {
    let globals = shadow_globals(&[], 4096);
    assert_eq!(globals, vec![("u_ShadowCount".to_string(), UniformValue::UInt(0))]);
}
