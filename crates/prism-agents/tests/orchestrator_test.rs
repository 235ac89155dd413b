// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Integration tests for the per-camera command streams of the FrameOrchestrator.

mod common;

use common::{
    acquired, fullscreen_draws, game_camera, position, released, CopyingPostStack,
    RecordingDevice, ScriptedVisibility,
};
use prism_agents::{CameraOutcome, FrameOrchestrator};
use prism_core::math::Extent2D;
use prism_core::renderer::{
    properties, AntiAliasingMode, BlendFactor, BlendMode, CameraId, CameraKind, ClearFlags,
    Command, FullscreenProgram, GraphicsDevice, LoadOp, PipelineSettings, RenderPath,
    RenderTarget, MAX_RENDER_SCALE,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;

fn orchestrator(device: &Arc<RecordingDevice>, settings: PipelineSettings) -> FrameOrchestrator {
    let device: Arc<dyn GraphicsDevice> = device.clone();
    FrameOrchestrator::new(device, Box::new(ScriptedVisibility::default()), settings)
        .expect("placeholder upload succeeds")
}

fn taa_settings() -> PipelineSettings {
    let mut settings = PipelineSettings::default();
    settings.camera_buffer.anti_aliasing = AntiAliasingMode::Taa;
    settings
}

fn clear_of(commands: &[Command]) -> Option<(bool, bool)> {
    commands.iter().find_map(|command| match command {
        Command::ClearRenderTarget {
            clear_depth,
            clear_color,
            ..
        } => Some((*clear_depth, *clear_color)),
        _ => None,
    })
}

#[test]
fn test_direct_camera_acquires_no_temporaries() {
    let device = RecordingDevice::new();
    let mut pipeline = orchestrator(&device, PipelineSettings::default());

    let outcome = pipeline.render_camera(&game_camera(1)).unwrap();

    assert_eq!(outcome, CameraOutcome::Submitted);
    let stream = device.last_submitted();
    assert!(acquired(&stream).is_empty());
    assert!(fullscreen_draws(&stream, FullscreenProgram::FinalBlend).is_empty());
    // A skybox camera drawing straight to its target clears depth only.
    assert_eq!(clear_of(stream.commands()), Some((true, false)));
    assert!(stream.commands().contains(&Command::DrawSkybox));
}

#[test]
fn test_stream_is_wrapped_in_the_camera_sample() {
    let device = RecordingDevice::new();
    let mut pipeline = orchestrator(&device, PipelineSettings::default());
    let camera = game_camera(3);

    pipeline.render_camera(&camera).unwrap();

    let stream = device.last_submitted();
    let commands = stream.commands();
    assert_eq!(
        commands.first(),
        Some(&Command::BeginSample(camera.name.clone().into()))
    );
    assert_eq!(
        commands.last(),
        Some(&Command::EndSample(camera.name.clone().into()))
    );
    assert!(commands.iter().any(|command| matches!(
        command,
        Command::SetGlobalVector { property, .. } if *property == properties::BUFFER_SIZE
    )));
}

#[test]
fn test_forward_with_taa_uses_one_color_and_one_depth_surface() {
    let device = RecordingDevice::new();
    let mut pipeline = orchestrator(&device, taa_settings());
    let camera = game_camera(1);

    pipeline.render_camera(&camera).unwrap();

    let stream = device.last_submitted();
    let descriptors = acquired(&stream);
    assert_eq!(descriptors.len(), 2);
    assert!(descriptors[0].format.is_depth() != descriptors[1].format.is_depth());
    assert_eq!(released(&stream), 2);
    assert!(stream.live_temporaries().is_empty());

    assert_eq!(
        fullscreen_draws(&stream, FullscreenProgram::TemporalResolve).len(),
        1
    );
    let state = pipeline.temporal().state(camera.id).expect("temporal state");
    assert!(state.history().iter().all(Option::is_some));
}

#[test]
fn test_deferred_allocates_and_releases_eight_surfaces() {
    let device = RecordingDevice::new();
    let settings = PipelineSettings {
        render_path: RenderPath::Deferred,
        ..PipelineSettings::default()
    };
    let mut pipeline = orchestrator(&device, settings);

    pipeline.render_camera(&game_camera(1)).unwrap();

    let stream = device.last_submitted();
    assert_eq!(acquired(&stream).len(), 8);
    assert_eq!(released(&stream), 8);
    assert_eq!(
        fullscreen_draws(&stream, FullscreenProgram::DeferredLighting).len(),
        1
    );
    assert_eq!(
        fullscreen_draws(&stream, FullscreenProgram::FinalBlend).len(),
        1
    );
}

#[test]
fn test_failing_camera_does_not_stop_the_next_one() {
    let device = RecordingDevice::new();
    let visibility = ScriptedVisibility::default().failing_for(CameraId(1));
    let shared: Arc<dyn GraphicsDevice> = device.clone();
    let mut pipeline =
        FrameOrchestrator::new(shared, Box::new(visibility), PipelineSettings::default())
            .unwrap();

    let report = pipeline.render(&[game_camera(1), game_camera(2)]).unwrap();

    assert_eq!(report.aborted, vec![CameraId(1)]);
    assert_eq!(report.submitted, vec![CameraId(2)]);
    assert_eq!(device.submit_count(), 1);
}

#[test]
fn test_degenerate_camera_is_aborted_without_submitting() {
    let device = RecordingDevice::new();
    let mut pipeline = orchestrator(&device, PipelineSettings::default());
    let mut camera = game_camera(1);
    camera.pixel_size = Extent2D::new(0, 720);

    let outcome = pipeline.render_camera(&camera).unwrap();

    assert_eq!(outcome, CameraOutcome::Aborted);
    assert_eq!(device.submit_count(), 0);
}

#[test]
fn test_render_scale_is_clamped_before_sizing_buffers() {
    let device = RecordingDevice::new();
    let mut settings = PipelineSettings::default();
    settings.camera_buffer.render_scale = 5.0;
    let mut pipeline = orchestrator(&device, settings);

    pipeline.render_camera(&game_camera(1)).unwrap();

    let stream = device.last_submitted();
    let expected = (1920.0 * MAX_RENDER_SCALE) as u32;
    for descriptor in acquired(&stream) {
        assert_eq!(descriptor.size.width, expected);
    }
    // The final blend covers the camera's own pixels.
    assert!(stream.commands().iter().any(|command| matches!(
        command,
        Command::SetViewport(viewport) if viewport.width == 1920.0 && viewport.height == 1080.0
    )));
}

#[test]
fn test_reduced_scale_publishes_the_buffer_size() {
    let device = RecordingDevice::new();
    let mut settings = PipelineSettings::default();
    settings.camera_buffer.render_scale = 0.5;
    let mut pipeline = orchestrator(&device, settings);

    pipeline.render_camera(&game_camera(1)).unwrap();

    let stream = device.last_submitted();
    let size = stream
        .commands()
        .iter()
        .find_map(|command| match command {
            Command::SetGlobalVector { property, value } if *property == properties::BUFFER_SIZE => {
                Some(*value)
            }
            _ => None,
        })
        .expect("buffer size published");
    assert_eq!((size.z, size.w), (960.0, 540.0));
    assert_eq!(acquired(&stream).len(), 2);
}

#[test]
fn test_intermediate_buffer_demotes_skybox_clear_to_color() {
    let device = RecordingDevice::new();
    let mut pipeline = orchestrator(&device, taa_settings());
    let mut camera = game_camera(1);
    camera.clear_flags = ClearFlags::Skybox;

    pipeline.render_camera(&camera).unwrap();

    let stream = device.last_submitted();
    assert_eq!(clear_of(stream.commands()), Some((true, true)));
    assert!(stream.commands().contains(&Command::DrawSkybox));
}

#[test]
fn test_depth_only_clear_is_kept_for_intermediate_buffers() {
    let device = RecordingDevice::new();
    let mut pipeline = orchestrator(&device, taa_settings());
    let mut camera = game_camera(1);
    camera.clear_flags = ClearFlags::Depth;

    pipeline.render_camera(&camera).unwrap();

    let stream = device.last_submitted();
    assert_eq!(clear_of(stream.commands()), Some((true, false)));
    assert!(!stream.commands().contains(&Command::DrawSkybox));
}

#[test]
fn test_opaque_final_blend_discards_the_target() {
    let device = RecordingDevice::new();
    let mut pipeline = orchestrator(&device, taa_settings());

    pipeline.render_camera(&game_camera(1)).unwrap();

    let stream = device.last_submitted();
    let finals = fullscreen_draws(&stream, FullscreenProgram::FinalBlend);
    assert_eq!(finals.len(), 1);
    assert_eq!(finals[0].destination, RenderTarget::CameraTarget);
    assert_eq!(finals[0].blend, BlendMode::OPAQUE);
    assert_eq!(finals[0].load, LoadOp::DontCare);
}

#[test]
fn test_layered_final_blend_loads_the_target() {
    let device = RecordingDevice::new();
    let mut pipeline = orchestrator(&device, taa_settings());
    let mut camera = game_camera(1);
    camera.settings.final_blend_mode = BlendMode {
        source: BlendFactor::SrcAlpha,
        destination: BlendFactor::OneMinusSrcAlpha,
    };

    pipeline.render_camera(&camera).unwrap();

    let finals = fullscreen_draws(&device.last_submitted(), FullscreenProgram::FinalBlend);
    assert_eq!(finals[0].load, LoadOp::Load);
}

#[test]
fn test_final_blend_runs_after_every_geometry_draw() {
    let device = RecordingDevice::new();
    let mut pipeline = orchestrator(&device, taa_settings());

    pipeline.render_camera(&game_camera(1)).unwrap();

    let stream = device.last_submitted();
    let last_draw = stream
        .commands()
        .iter()
        .rposition(|command| matches!(command, Command::DrawRenderers(_)))
        .unwrap();
    let resolve = position(&stream, |command| {
        matches!(command, Command::DrawFullscreen(draw) if draw.program == FullscreenProgram::TemporalResolve)
    })
    .unwrap();
    let final_blend = position(&stream, |command| {
        matches!(command, Command::DrawFullscreen(draw) if draw.program == FullscreenProgram::FinalBlend)
    })
    .unwrap();
    let first_release = position(&stream, |command| {
        matches!(command, Command::ReleaseTemporary(_))
    })
    .unwrap();
    assert!(last_draw < resolve);
    assert!(resolve < final_blend);
    assert!(final_blend < first_release);
}

#[test]
fn test_active_post_stack_replaces_the_final_blend() {
    let device = RecordingDevice::new();
    let post = CopyingPostStack::new(true);
    let composites = post.composites.clone();
    let mut pipeline =
        orchestrator(&device, PipelineSettings::default()).with_post_processing(Box::new(post));

    pipeline.render_camera(&game_camera(1)).unwrap();

    let stream = device.last_submitted();
    assert_eq!(composites.load(Ordering::SeqCst), 1);
    assert_eq!(acquired(&stream).len(), 2);
    assert!(fullscreen_draws(&stream, FullscreenProgram::FinalBlend).is_empty());
}

#[test]
fn test_inactive_post_stack_keeps_direct_rendering() {
    let device = RecordingDevice::new();
    let post = CopyingPostStack::new(false);
    let composites = post.composites.clone();
    let mut pipeline =
        orchestrator(&device, PipelineSettings::default()).with_post_processing(Box::new(post));

    pipeline.render_camera(&game_camera(1)).unwrap();

    assert_eq!(composites.load(Ordering::SeqCst), 0);
    assert!(acquired(&device.last_submitted()).is_empty());
}

#[test]
fn test_post_policy_skips_scene_views() {
    let device = RecordingDevice::new();
    let post = CopyingPostStack::new(true);
    let composites = post.composites.clone();
    let mut pipeline = orchestrator(&device, PipelineSettings::default())
        .with_post_processing(Box::new(post))
        .with_post_processing_policy(|camera| camera.kind != CameraKind::SceneView);
    let mut scene_view = game_camera(2);
    scene_view.kind = CameraKind::SceneView;

    pipeline.render_camera(&scene_view).unwrap();
    assert_eq!(composites.load(Ordering::SeqCst), 0);

    pipeline.render_camera(&game_camera(1)).unwrap();
    assert_eq!(composites.load(Ordering::SeqCst), 1);
}

#[test]
fn test_copies_fall_back_to_fullscreen_draws() {
    let device = RecordingDevice::without_copy_texture();
    let mut settings = PipelineSettings::default();
    settings.camera_buffer.copy_color = true;
    settings.camera_buffer.copy_depth = true;
    let mut pipeline = orchestrator(&device, settings);

    pipeline.render_camera(&game_camera(1)).unwrap();

    let stream = device.last_submitted();
    assert!(!stream
        .commands()
        .iter()
        .any(|command| matches!(command, Command::CopyTexture { .. })));
    assert_eq!(fullscreen_draws(&stream, FullscreenProgram::CopyDepth).len(), 1);
    // Color, depth and both copies.
    assert_eq!(acquired(&stream).len(), 4);
    assert_eq!(released(&stream), 4);
}

#[test]
fn test_reflection_cameras_use_their_own_copy_flags() {
    let device = RecordingDevice::new();
    let mut settings = PipelineSettings::default();
    settings.camera_buffer.copy_color = true;
    settings.camera_buffer.copy_depth = true;
    let mut pipeline = orchestrator(&device, settings);
    let mut reflection = game_camera(5);
    reflection.kind = CameraKind::Reflection;

    pipeline.render_camera(&reflection).unwrap();

    assert!(acquired(&device.last_submitted()).is_empty());
}

#[test]
fn test_motion_vectors_are_released_with_the_camera() {
    let device = RecordingDevice::new();
    let mut settings = taa_settings();
    settings.camera_buffer.motion_vectors = true;
    let mut pipeline = orchestrator(&device, settings);

    pipeline.render_camera(&game_camera(1)).unwrap();

    let stream = device.last_submitted();
    let descriptors = acquired(&stream);
    assert_eq!(descriptors.len(), 3);
    assert!(descriptors
        .iter()
        .any(|desc| desc.label.as_deref() == Some("Motion Vectors")));
    assert!(stream.live_temporaries().is_empty());
}

#[test]
fn test_every_stream_releases_what_it_acquires() {
    let device = RecordingDevice::new();
    let mut settings = taa_settings();
    settings.render_path = RenderPath::Deferred;
    settings.camera_buffer.copy_color = true;
    settings.camera_buffer.motion_vectors = true;
    let mut pipeline = orchestrator(&device, settings);

    pipeline
        .render(&[game_camera(1), game_camera(2), game_camera(3)])
        .unwrap();

    let streams = device.submitted();
    assert_eq!(streams.len(), 3);
    for stream in streams {
        assert!(stream.live_temporaries().is_empty());
        assert_eq!(acquired(&stream).len(), released(&stream));
    }
}

#[test]
fn test_switching_render_path_swaps_the_geometry_lane() {
    let device = RecordingDevice::new();
    let mut pipeline = orchestrator(&device, PipelineSettings::default());
    let forward = pipeline.geometry_strategy();

    pipeline.set_settings(PipelineSettings {
        render_path: RenderPath::Deferred,
        ..PipelineSettings::default()
    });

    assert_ne!(pipeline.geometry_strategy(), forward);
    pipeline.render_camera(&game_camera(1)).unwrap();
    assert_eq!(acquired(&device.last_submitted()).len(), 8);
}

#[test]
fn test_frame_report_counts_frames() {
    let device = RecordingDevice::new();
    let mut pipeline = orchestrator(&device, PipelineSettings::default());

    let first = pipeline.render(&[game_camera(1)]).unwrap();
    let second = pipeline.render(&[]).unwrap();

    assert_eq!(first.frame, 0);
    assert_eq!(second.frame, 1);
    assert!(second.submitted.is_empty());
}

#[test]
fn test_shutdown_destroys_every_long_lived_texture() {
    let device = RecordingDevice::new();
    let mut pipeline = orchestrator(&device, taa_settings());
    pipeline.render(&[game_camera(1), game_camera(2)]).unwrap();
    assert!(device.live_textures() > 1);

    pipeline.shutdown().unwrap();

    assert_eq!(device.live_textures(), 0);
}

#[test]
fn test_failed_placeholder_upload_leaks_no_texture() {
    let device = RecordingDevice::new();
    device.fail_next_writes(1);
    let shared: Arc<dyn GraphicsDevice> = device.clone();

    let result = FrameOrchestrator::new(
        shared,
        Box::new(ScriptedVisibility::default()),
        PipelineSettings::default(),
    );

    assert!(result.is_err());
    assert_eq!(device.live_textures(), 0);
    assert_eq!(device.destroyed_textures(), 1);
}
