//! End-to-end recording and playback through a clip file.

use anyhow::Context;
use posecast::{
    Clip, JointId, JointPose, PlaybackEngine, PlaybackState, PlaybackStatus, Quat, RecordingEngine, Skeleton,
    SkeletonState, Vec3,
};

const RATE: f32 = 30.0;

/// Move the hips so every tick produces a distinct, checkable pose.
fn pose_for_tick(tick: usize) -> JointPose {
    JointPose::new(
        Vec3::new(tick as f32, 1.0, -(tick as f32) * 0.5),
        Quat::from_axis_angle(Vec3::new(0.0, 1.0, 0.0), tick as f32 * 0.01),
    )
}

#[test]
fn record_save_reload_and_play_discrete() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("take.yaml");
    let dt = 1.0 / RATE;

    // Record 2 seconds of 30 Hz ticks.
    let mut skeleton = SkeletonState::full();
    let mut recorder = RecordingEngine::new();
    recorder.start(RATE, RecordingEngine::default_clip_name())?;
    for tick in 1..=60 {
        skeleton.set(JointId::Hips, pose_for_tick(tick));
        assert!(recorder.update(dt, &skeleton), "tick {tick} should capture a frame");
    }
    let recorded = recorder.stop(&path).context("saving recording")?;
    assert_eq!(recorded.total_frames(), 60);
    assert_eq!(recorded.frame_rate, RATE);

    // Reload and compare every value.
    let reloaded = Clip::load(&path)?;
    assert_eq!(reloaded, recorded);

    // Discrete playback: each tick applies exactly the next frame.
    let mut target = SkeletonState::full();
    let mut player = PlaybackEngine::new();
    player.set_interpolation(false);
    player.load(&path, &mut target)?;
    assert!(!target.external_driver_enabled());
    assert_eq!(target.get(JointId::Hips), Some(pose_for_tick(1)));

    for index in 1..60 {
        let status = player.update(dt, &mut target);
        assert_eq!(status, PlaybackStatus::Frame { index });
        assert_eq!(target.get(JointId::Hips), Some(pose_for_tick(index + 1)));
    }

    assert_eq!(player.update(dt, &mut target), PlaybackStatus::Finished);
    assert_eq!(player.state(), PlaybackState::Stopped);
    assert!(target.external_driver_enabled());
    Ok(())
}

#[test]
fn interpolated_playback_blends_recorded_frames() -> anyhow::Result<()> {
    let mut clip = Clip::new("two", 10.0);
    let mut skeleton = SkeletonState::with_joints(&[JointId::Hips]);
    clip.frames.push(posecast::Frame::capture(&skeleton, 0.0));
    skeleton.set(JointId::Hips, JointPose::new(Vec3::new(10.0, 0.0, 0.0), Quat::IDENTITY));
    clip.frames.push(posecast::Frame::capture(&skeleton, 0.1));

    let mut target = SkeletonState::full();
    let mut player = PlaybackEngine::new();
    player.load_clip(clip, &mut target)?;

    player.update(0.05, &mut target);
    let hips = target.get(JointId::Hips).context("hips present")?;
    assert!((hips.position.x - 5.0).abs() < 1e-4, "got {:?}", hips.position);

    assert_eq!(player.update(0.05, &mut target), PlaybackStatus::Finished);
    Ok(())
}

#[test]
fn step_through_a_loaded_clip() -> anyhow::Result<()> {
    let clip = posecast_clip(5);
    let mut target = SkeletonState::full();
    let mut player = PlaybackEngine::new();
    player.load_clip(clip, &mut target)?;

    for expected in [1, 2, 3, 4, 4] {
        assert_eq!(player.step_forward(&mut target)?, expected);
    }
    assert_eq!(target.get(JointId::Hips), Some(pose_for_tick(4)));

    for expected in [3, 2, 1, 0, 0] {
        assert_eq!(player.step_backward(&mut target)?, expected);
    }
    assert_eq!(player.playback_time(), 0.0);
    assert_eq!(player.state(), PlaybackState::Playing { paused: true });
    Ok(())
}

#[test]
fn clip_with_unknown_joints_still_plays() -> anyhow::Result<()> {
    let document = r#"
clipName: external
frameRate: 10
frames:
  - timeStamp: 0.0
    boneDataList:
      - boneType: tail_joint
        localPosition: {x: 9, y: 9, z: 9}
        localRotation: {x: 0, y: 0, z: 0, w: 1}
      - boneType: 1
        localPosition: {x: 1, y: 2, z: 3}
        localRotation: {x: 0, y: 0, z: 0, w: 1}
"#;
    let clip = Clip::from_yaml(document)?;
    assert_eq!(clip.frames[0].bone_data.len(), 1);

    let mut target = SkeletonState::full();
    PlaybackEngine::new().load_clip(clip, &mut target)?;
    assert_eq!(target.get(JointId::Hips).map(|p| p.position), Some(Vec3::new(1.0, 2.0, 3.0)));
    Ok(())
}

fn posecast_clip(frames: usize) -> Clip {
    let mut clip = Clip::new("steps", RATE);
    let mut skeleton = SkeletonState::with_joints(&[JointId::Hips]);
    for i in 0..frames {
        skeleton.set(JointId::Hips, pose_for_tick(i));
        clip.frames.push(posecast::Frame::capture(&skeleton, i as f32 / RATE));
    }
    clip
}
