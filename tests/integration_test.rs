use glam::{Quat, Vec3};
use particle_engine::animation::{AnimationSequence, Curve, EasingId, ParameterTrack, ParameterValue, ValueKind};
use particle_engine::config::{EngineConfig, LogLevel};
use particle_engine::AnimationError;

#[test]
fn test_curve_boundary_clamping() {
    let mut curve = Curve::new();
    curve.insert(1.0, 10.0f32, EasingId::Linear);
    curve.insert(3.0, 30.0f32, EasingId::Linear);

    assert_eq!(curve.evaluate(-5.0), 10.0);
    assert_eq!(curve.evaluate(1.0), 10.0);
    assert_eq!(curve.evaluate(3.0), 30.0);
    assert_eq!(curve.evaluate(100.0), 30.0);
}

#[test]
fn test_single_keyframe_is_constant() {
    let mut curve = Curve::new();
    curve.insert(0.5, Vec3::new(1.0, 2.0, 3.0), EasingId::EaseOutBounce);
    for t in [-1.0, 0.0, 0.5, 0.9, 42.0] {
        assert_eq!(curve.evaluate(t), Vec3::new(1.0, 2.0, 3.0));
    }
}

#[test]
fn test_linear_midpoint() {
    let mut curve = Curve::new();
    curve.insert(0.0, 0.0f32, EasingId::Linear);
    curve.insert(10.0, 100.0f32, EasingId::Linear);
    assert!((curve.evaluate(5.0) - 50.0).abs() < 1e-4);
}

#[test]
fn test_int_rounding() {
    let mut curve = Curve::new();
    curve.insert(0.0, 0i32, EasingId::Linear);
    curve.insert(1.0, 3i32, EasingId::Linear);
    assert_eq!(curve.evaluate(0.4), 1);
}

#[test]
fn test_quaternion_shortest_arc() {
    let mut curve = Curve::new();
    curve.insert(0.0, Quat::IDENTITY, EasingId::Linear);
    curve.insert(1.0, Quat::from_rotation_y(350f32.to_radians()), EasingId::Linear);

    let mid = curve.evaluate(0.5);
    let expected = Quat::from_rotation_y(-5f32.to_radians());
    assert!(mid.angle_between(expected) < 1e-3, "took the long way: {:?}", mid);
}

#[test]
fn test_type_mismatch_rejected() {
    let mut track = ParameterTrack::new(ValueKind::Float);
    track
        .add_keyframe(0.0, ParameterValue::Float(1.0), EasingId::Linear)
        .unwrap();

    let err = track
        .add_keyframe(1.0, ParameterValue::Vec3(Vec3::ONE), EasingId::Linear)
        .unwrap_err();
    assert_eq!(
        err,
        AnimationError::TypeMismatch {
            expected: ValueKind::Float,
            found: ValueKind::Vec3,
        }
    );
    assert_eq!(track.len(), 1);
}

#[test]
fn test_unsorted_insertion_stays_sorted() {
    let mut track = ParameterTrack::new(ValueKind::Float);
    for (time, value) in [(2.0, 20.0), (0.0, 0.0), (1.0, 10.0)] {
        track
            .add_keyframe(time, ParameterValue::Float(value), EasingId::Linear)
            .unwrap();
    }
    let times: Vec<f32> = (0..track.len()).filter_map(|i| track.keyframe_time(i)).collect();
    assert_eq!(times, vec![0.0, 1.0, 2.0]);
    assert_eq!(track.evaluate_as::<f32>(1.5).unwrap(), 15.0);
}

#[test]
fn test_sequence_playback() {
    let mut sequence = AnimationSequence::new("fade");
    sequence.set_max_play_time(2.0);
    sequence
        .create_track("alpha", ParameterValue::Float(1.0))
        .unwrap()
        .add_keyframe(2.0, ParameterValue::Float(0.0), EasingId::Linear)
        .unwrap();
    sequence
        .create_track("offset", ParameterValue::Vec3(Vec3::ZERO))
        .unwrap();

    sequence.update(1.0);
    assert!((sequence.get::<f32>("alpha").unwrap() - 0.5).abs() < 1e-5);
    assert!(!sequence.is_end());
    assert!(matches!(
        sequence.get::<Vec3>("alpha"),
        Err(AnimationError::TypeMismatch { .. })
    ));
    assert!(matches!(
        sequence.value("missing"),
        Err(AnimationError::UnknownLabel(_))
    ));

    sequence.update(5.0);
    assert!(sequence.is_end());
    assert_eq!(sequence.get::<f32>("alpha").unwrap(), 0.0);

    let labels: Vec<&str> = sequence.labels().collect();
    assert_eq!(labels, vec!["alpha", "offset"]);
}

#[test]
fn test_sequence_json_round_trip() {
    let mut sequence = AnimationSequence::new("pulse");
    sequence
        .create_track("scale", ParameterValue::Vec3(Vec3::ONE))
        .unwrap()
        .add_keyframe(0.5, ParameterValue::Vec3(Vec3::splat(2.0)), EasingId::EaseInOutSine)
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pulse.json");
    sequence.save_json(&path).unwrap();

    let loaded = AnimationSequence::load_json(&path).unwrap();
    let track = loaded.track("scale").unwrap();
    assert_eq!(track.len(), 2);
    assert_eq!(
        track.evaluate(0.25),
        sequence.track("scale").unwrap().evaluate(0.25)
    );
}

#[test]
fn test_engine_config_from_toml() {
    let config = EngineConfig::from_toml_str(
        r#"
[particles]
max_instances_per_group = 256
frames_in_flight = 3

[logging]
level = "debug"
"#,
    )
    .unwrap();

    assert_eq!(config.particles.max_instances_per_group, 256);
    assert_eq!(config.particles.frames_in_flight, 3);
    assert_eq!(config.particles.default_model, "plane/plane.gltf");
    assert_eq!(config.logging.level, LogLevel::Debug);
    assert!(config.validate().is_ok());
}

#[test]
fn test_engine_config_rejects_zero_capacity() {
    let config = EngineConfig::from_toml_str("[particles]\nmax_instances_per_group = 0\n").unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_engine_config_file_round_trip() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("particles.json");

    let mut config = EngineConfig::default();
    config.particles.max_instances_per_group = 64;
    config.save_json(&path)?;

    let loaded = EngineConfig::from_json_file(&path)?;
    assert_eq!(loaded.particles.max_instances_per_group, 64);
    Ok(())
}
