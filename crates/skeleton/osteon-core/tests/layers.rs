use osteon_core::{
    Color, MemoryAssets, RuntimeConfig, RuntimeError, SkeletonRuntime, SlotPose, SlotTint,
    TextureAtlas,
};

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn stick_figure() -> SkeletonRuntime {
    let doc = osteon_test_fixtures::skeletons::json("stick-figure").expect("skeleton fixture");
    let atlas: TextureAtlas =
        osteon_test_fixtures::atlases::load("stick-figure").expect("atlas fixture");
    let assets = MemoryAssets::new()
        .with_skeleton("stick-figure", doc)
        .with_atlas("stick-figure", atlas);
    let mut rt = SkeletonRuntime::new(RuntimeConfig::default().with_time_resolution(0.25));
    rt.skeleton_from_file_named("stick-figure", "stick-figure", None, &assets)
        .expect("stick figure loads");
    rt
}

fn slot(rt: &SkeletonRuntime, name: &str) -> SlotPose {
    rt.skin_slots()
        .into_iter()
        .find(|s| s.name == name)
        .unwrap_or_else(|| panic!("slot '{name}' missing"))
}

fn region(rt: &SkeletonRuntime, name: &str) -> String {
    slot(rt, name).attachment.expect("attachment").region
}

#[test]
fn default_skin_is_active_after_load() {
    let rt = stick_figure();
    assert_eq!(rt.current_skin(), Some("default"));
    let names: Vec<String> = rt.skin_slots().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["body", "arm", "head"]);
    assert_eq!(region(&rt, "head"), "head");
}

#[test]
fn unknown_skin_is_rejected_and_current_kept() {
    let mut rt = stick_figure();
    let err = rt.change_skin_to("unknown").unwrap_err();
    assert_eq!(err, RuntimeError::UnknownSkin { name: "unknown".into() });
    assert_eq!(rt.current_skin(), Some("default"));
}

#[test]
fn skin_change_falls_back_to_default_per_slot() {
    let mut rt = stick_figure();
    rt.change_skin_to("armor").unwrap();
    assert_eq!(rt.current_skin(), Some("armor"));
    assert_eq!(region(&rt, "body"), "body-armor");
    assert_eq!(region(&rt, "head"), "helmet");
    assert_eq!(region(&rt, "arm"), "arm");
}

#[test]
fn partial_skin_round_trip() {
    let mut rt = stick_figure();
    rt.change_skin_to("armor").unwrap();
    let before = slot(&rt, "arm");

    rt.change_skin_partial([("arm", "arm-raised")]).unwrap();
    let during = slot(&rt, "arm").attachment.unwrap();
    assert_eq!(during.name, "arm-raised");
    assert!(during.from_partial);
    assert_eq!(rt.current_skin(), Some("armor"));

    rt.reset_skin_partial();
    assert_eq!(slot(&rt, "arm"), before);
}

#[test]
fn partial_overrides_beat_animation_keys() {
    let mut rt = stick_figure();
    rt.change_skin_partial([("arm", "arm")]).unwrap();
    rt.run_animation("wave", 1).unwrap();
    rt.jump_to_frame(3).unwrap();
    assert_eq!(slot(&rt, "arm").attachment.unwrap().name, "arm");
    rt.reset_skin_partial();
    assert_eq!(slot(&rt, "arm").attachment.unwrap().name, "arm-raised");
}

#[test]
fn partial_validation_is_all_or_nothing() {
    let mut rt = stick_figure();
    let err = rt
        .change_skin_partial([("arm", "arm-raised"), ("head", "hat")])
        .unwrap_err();
    assert_eq!(
        err,
        RuntimeError::UnknownAttachment {
            slot: "head".into(),
            attachment: "hat".into()
        }
    );
    assert_eq!(slot(&rt, "arm").attachment.unwrap().name, "arm");

    let err = rt.change_skin_partial([("tail", "arm")]).unwrap_err();
    assert_eq!(err, RuntimeError::UnknownSlot { name: "tail".into() });
}

#[test]
fn skin_change_clears_partials() {
    let mut rt = stick_figure();
    rt.change_skin_partial([("arm", "arm-raised")]).unwrap();
    rt.change_skin_to("default").unwrap();
    assert_eq!(slot(&rt, "arm").attachment.unwrap().name, "arm");
}

#[test]
fn texture_override_swaps_region_only() {
    let mut rt = stick_figure();
    rt.change_texture_partial([("arm", "gold-arm")]).unwrap();
    let arm = slot(&rt, "arm").attachment.unwrap();
    assert_eq!(arm.name, "arm");
    assert_eq!(arm.region, "gold-arm");
    assert!(arm.texture_override);

    // survives skin changes and playback
    rt.change_skin_to("armor").unwrap();
    rt.run_animation("walk", 1).unwrap();
    rt.activate_animations(0.25);
    assert_eq!(region(&rt, "arm"), "gold-arm");

    let err = rt.change_texture_partial([("head", "crown")]).unwrap_err();
    assert_eq!(err, RuntimeError::UnknownRegion { name: "crown".into() });

    rt.reset_texture_partial();
    assert_eq!(region(&rt, "arm"), "arm");
}

#[test]
fn colorize_all_then_reset_is_neutral() {
    let mut rt = stick_figure();
    let red = Color::rgba(1.0, 0.0, 0.0, 1.0);
    rt.colorize_all_slots_with_color(red, 0.6).unwrap();
    assert_eq!(rt.colorized_slot_count(), 3);
    assert!(rt.skin_slots().iter().all(|s| s.tint == SlotTint::new(red, 0.6)));

    rt.reset_colorized_slots();
    assert_eq!(rt.colorized_slot_count(), 0);
    assert!(rt.skin_slots().iter().all(|s| s.tint == SlotTint::NEUTRAL));
}

#[test]
fn colorize_named_slots() {
    let mut rt = stick_figure();
    let blue = Color::rgba(0.0, 0.0, 1.0, 1.0);
    rt.colorize_slots(["head"], blue, 2.0).unwrap();
    assert_eq!(rt.colorized_slot_count(), 1);
    let head = slot(&rt, "head");
    assert_eq!(head.tint.intensity, 1.0);
    assert_eq!(head.final_color(), blue);
    assert_eq!(slot(&rt, "body").tint, SlotTint::NEUTRAL);

    let err = rt.colorize_slots(["body", "tail"], blue, 1.0).unwrap_err();
    assert_eq!(err, RuntimeError::UnknownSlot { name: "tail".into() });
    assert_eq!(rt.colorized_slot_count(), 1);
}

#[test]
fn draw_order_and_color_timelines() {
    let mut rt = stick_figure();
    rt.run_animation("walk", 1).unwrap();
    let order = |rt: &SkeletonRuntime| -> Vec<String> {
        rt.skin_slots().into_iter().map(|s| s.name).collect()
    };
    assert_eq!(order(&rt), vec!["body", "arm", "head"]);

    rt.activate_animations(0.5);
    assert_eq!(order(&rt), vec!["arm", "body", "head"]);
    let slots = rt.skin_slots();
    assert_eq!(slots[0].draw_index, 0);
    assert_eq!(slots[0].slot, 1);

    let head = slot(&rt, "head");
    approx(head.color.r, 1.0, 1e-5);
    approx(head.color.g, 0.5, 1e-5);
    approx(head.color.a, 0.5 + 0.5 * 128.0 / 255.0, 1e-5);
    let body = rt.find_bone_named("body").unwrap();
    approx(body.world_x(), 10.0, 1e-5);

    rt.reset_skeleton();
    assert_eq!(order(&rt), vec!["body", "arm", "head"]);
    assert_eq!(slot(&rt, "head").color, Color::WHITE);
}

#[test]
fn blink_swaps_attachments_discretely() {
    let mut rt = stick_figure();
    rt.run_animation("blink", 1).unwrap();
    assert_eq!(slot(&rt, "head").attachment.unwrap().name, "head-blink");
    rt.activate_animations(0.25);
    assert_eq!(slot(&rt, "head").attachment.unwrap().name, "head");
}
