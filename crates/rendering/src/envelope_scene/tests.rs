#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bevy::prelude::*;

    use experience::app_state::AppState;
    use experience::machine::Control;
    use experience::sequencer::{Ease, Layout, Property, Target};

    use super::super::systems::{envelope_control, hit_test, part_pose};
    use super::super::types::{
        BaseLook, PartProps, PartTweens, PropertyTween, LETTER_EXPANDED_SCALE, VIDEO_COVER_SCALE,
    };

    fn base(y: f32) -> BaseLook {
        BaseLook {
            color: Color::WHITE,
            translation: Vec3::new(0.0, y, 1.0),
        }
    }

    #[test]
    fn test_initial_props_match_sequencer_layout() {
        let layout = Layout::default();
        for (target, property, value) in layout.iter() {
            assert_eq!(
                PartProps::initial(target).get(property),
                value,
                "{target:?}.{property:?}"
            );
        }
        assert_eq!(PartProps::initial(Target::Letter).opacity, 0.0);
    }

    #[test]
    fn test_tween_reaches_target_exactly() {
        let mut tween = PropertyTween {
            property: Property::Opacity,
            from: 0.0,
            to: 1.0,
            elapsed: Duration::ZERO,
            duration: Duration::from_millis(300),
            ease: Ease::QuadOut,
        };
        let (mid, done) = tween.step(Duration::from_millis(150));
        assert!(!done);
        assert!(
            mid > 0.5 && mid < 1.0,
            "quad-out is past halfway at t=0.5: {mid}"
        );
        let (end, done) = tween.step(Duration::from_millis(200));
        assert!(done);
        assert_eq!(end, 1.0);
    }

    #[test]
    fn test_zero_duration_tween_snaps() {
        let mut tween = PropertyTween {
            property: Property::VideoFit,
            from: 0.0,
            to: 1.0,
            elapsed: Duration::ZERO,
            duration: Duration::ZERO,
            ease: Ease::Linear,
        };
        assert_eq!(tween.step(Duration::ZERO), (1.0, true));
    }

    #[test]
    fn test_new_tween_replaces_same_property() {
        let mut tweens = PartTweens::default();
        let tween = |to: f32| PropertyTween {
            property: Property::Opacity,
            from: 0.0,
            to,
            elapsed: Duration::ZERO,
            duration: Duration::from_secs(1),
            ease: Ease::Linear,
        };
        tweens.start(tween(1.0));
        tweens.start(tween(0.0));
        assert_eq!(tweens.0.len(), 1);
        assert_eq!(tweens.0[0].to, 0.0);
    }

    #[test]
    fn test_letter_pose_expands_to_centre() {
        let container = PartProps::default();
        let mut props = PartProps::initial(Target::Letter);
        props.opacity = 1.0;
        props.letter_rise = 200.0;

        let tucked = part_pose(Target::Letter, &props, &base(10.0), &container);
        assert_eq!(tucked.translation.y, 210.0);
        assert_eq!(tucked.scale, Vec3::ONE);

        props.letter_expand = 1.0;
        let expanded = part_pose(Target::Letter, &props, &base(10.0), &container);
        assert_eq!(expanded.translation.y, 0.0);
        assert_eq!(expanded.scale, Vec3::splat(LETTER_EXPANDED_SCALE));
        assert!(
            expanded.translation.z > tucked.translation.z,
            "expanded letter draws on top"
        );
    }

    #[test]
    fn test_flap_open_flips_vertically() {
        let container = PartProps::default();
        let mut props = PartProps::initial(Target::Flap);
        let closed = part_pose(Target::Flap, &props, &base(120.0), &container);
        assert!((closed.scale.y - 1.0).abs() < 1e-6);
        props.flap_angle = -180.0;
        let open = part_pose(Target::Flap, &props, &base(120.0), &container);
        assert!((open.scale.y + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_container_opacity_multiplies_into_parts() {
        let container = PartProps {
            opacity: 0.5,
            ..Default::default()
        };
        let mut props = PartProps::initial(Target::VideoPanel);
        props.opacity = 0.8;
        let pose = part_pose(Target::VideoPanel, &props, &base(0.0), &container);
        assert!((pose.alpha - 0.4).abs() < 1e-6);
        assert_eq!(pose.scale, Vec3::splat(VIDEO_COVER_SCALE));
    }

    #[test]
    fn test_hit_test_bounds() {
        let half = Vec2::new(180.0, 120.0);
        assert!(hit_test(Vec2::new(179.0, -119.0), Vec2::ZERO, half));
        assert!(!hit_test(Vec2::new(181.0, 0.0), Vec2::ZERO, half));
        let lowered = Vec2::new(0.0, -40.0);
        assert!(hit_test(Vec2::new(10.0, -30.0), lowered, half));
    }

    #[test]
    fn test_envelope_control_by_state() {
        assert_eq!(
            envelope_control(AppState::Locked),
            Some(Control::LockedEnvelope)
        );
        assert_eq!(
            envelope_control(AppState::Unlocked),
            Some(Control::Envelope)
        );
        assert_eq!(envelope_control(AppState::Playing), None);
        assert_eq!(envelope_control(AppState::Final), None);
    }
}
