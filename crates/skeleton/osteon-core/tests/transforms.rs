use osteon_core::{
    Affine2, AtlasRegion, MemoryAssets, RuntimeConfig, SkeletonRuntime, TextureAtlas,
};
use serde_json::json;

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn stick_figure(resolution: f32) -> SkeletonRuntime {
    let doc = osteon_test_fixtures::skeletons::json("stick-figure").expect("skeleton fixture");
    let atlas: TextureAtlas =
        osteon_test_fixtures::atlases::load("stick-figure").expect("atlas fixture");
    let assets = MemoryAssets::new()
        .with_skeleton("stick-figure", doc)
        .with_atlas("stick-figure", atlas);
    let mut rt = SkeletonRuntime::new(RuntimeConfig::default().with_time_resolution(resolution));
    rt.skeleton_from_file_named("stick-figure", "stick-figure", None, &assets)
        .expect("stick figure loads");
    rt
}

fn assert_hierarchy(rt: &SkeletonRuntime) {
    let bones = rt.bones();
    for bone in bones {
        let local = bone.local().to_affine();
        let expected = match bone.parent_index() {
            Some(p) => bones[p].world().mul(&local),
            None => local,
        };
        assert!(
            bone.world().approx_eq(&expected, 1e-4),
            "bone '{}' world {:?} != {:?}",
            bone.name(),
            bone.world(),
            expected
        );
    }
}

#[test]
fn world_is_parent_world_after_local_on_every_tick() {
    let mut rt = stick_figure(0.25);
    assert_hierarchy(&rt);
    rt.run_animation("wave", 2).unwrap();
    for _ in 0..6 {
        rt.activate_animations(0.25);
        assert_hierarchy(&rt);
    }
    rt.run_animation_with("walk", 1, 0.5, false).unwrap();
    for _ in 0..8 {
        rt.activate_animations(0.25);
        assert_hierarchy(&rt);
    }
}

#[test]
fn setup_pose_world_positions() {
    let rt = stick_figure(0.25);
    let arm = rt.find_bone_named("arm").unwrap();
    approx(arm.world_x(), 10.0, 1e-5);
    approx(arm.world_y(), 10.0, 1e-5);
    let head = rt.find_bone_named("head").unwrap();
    approx(head.world_y(), 30.0, 1e-5);
    assert!(rt.find_bone_named("tail").is_none());
}

#[test]
fn reset_then_tick_reproduces_rest_pose() {
    let mut rt = stick_figure(0.25);
    let rest: Vec<Affine2> = rt.bones().iter().map(|b| *b.world()).collect();

    rt.run_animation("walk", 1).unwrap();
    rt.activate_animations(0.5);
    rt.run_animation("wave", 1).unwrap();
    rt.activate_animations(0.25);
    assert!(!rt.bones()[2].world().approx_eq(&rest[2], 1e-4));

    rt.stop_animation();
    rt.reset_skeleton();
    rt.activate_animations(1.0 / 60.0);
    for (bone, expected) in rt.bones().iter().zip(&rest) {
        assert_eq!(bone.world(), expected, "bone '{}'", bone.name());
    }
}

#[test]
fn reset_does_not_stop_playback() {
    let mut rt = stick_figure(0.25);
    rt.run_animation_with("wave", 1, 0.0, false).unwrap();
    rt.run_animation_with("nod", 1, 0.0, true).unwrap();
    rt.activate_animations(0.25);
    rt.reset_skeleton();
    assert!(rt.is_running_animation());
    assert_eq!(rt.current_animation_sequence(), vec!["wave", "nod"]);
    rt.activate_animations(0.25);
    approx(rt.find_bone_named("arm").unwrap().local().rotation, 90.0, 1e-4);
}

#[test]
fn root_and_arm_scenario() {
    let doc = json!({
        "bones": [
            {"name": "root"},
            {"name": "arm", "parent": "root", "x": 10}
        ]
    });
    let assets = MemoryAssets::new()
        .with_skeleton("pair", doc.to_string())
        .with_atlas("empty", TextureAtlas::new());
    let mut rt = SkeletonRuntime::default();
    rt.skeleton_from_file_named("pair", "empty", None, &assets)
        .unwrap();
    rt.reset_skeleton();
    rt.activate_animations(1.0 / 60.0);

    let root = rt.find_bone_named("root").unwrap();
    assert!(root.world().approx_eq(&Affine2::IDENTITY, 1e-6));
    let arm = rt.find_bone_named("arm").unwrap();
    assert!(arm.world().approx_eq(&Affine2::from_translation(10.0, 0.0), 1e-6));
}

#[test]
fn rotated_parent_carries_child() {
    let doc = json!({
        "bones": [
            {"name": "root", "rotation": 90},
            {"name": "arm", "parent": "root", "x": 10, "scaleX": 2}
        ]
    });
    let atlas = TextureAtlas::new().with_region(AtlasRegion::new("unused", "p.png"));
    let assets = MemoryAssets::new().with_skeleton("pair", doc.to_string());
    let mut rt = SkeletonRuntime::default();
    rt.skeleton_from_file_named("pair", atlas, None, &assets)
        .unwrap();

    let arm = rt.find_bone_named("arm").unwrap();
    approx(arm.world_x(), 0.0, 1e-4);
    approx(arm.world_y(), 10.0, 1e-4);
    approx(arm.world_rotation(), 90.0, 1e-3);
    approx(arm.world_scale_x(), 2.0, 1e-4);
    let (x, y) = arm.local_to_world(1.0, 0.0);
    approx(x, 0.0, 1e-4);
    approx(y, 12.0, 1e-4);
}
