// src/ui/animation.rs
//! Named motion presets handed to the front end's animation runtime

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    Spring { stiffness: f32, damping: f32 },
}

/// Start and end values of an animated property
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframes {
    pub from: f32,
    pub to: f32,
}

const fn frames(from: f32, to: f32) -> Option<Keyframes> {
    Some(Keyframes { from, to })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionVariant {
    /// Seconds
    pub duration: f32,
    pub delay: f32,
    pub easing: Easing,
    /// Delay between consecutive children, in seconds
    pub stagger_children: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<Keyframes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<Keyframes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<Keyframes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<Keyframes>,
}

impl MotionVariant {
    const BASE: MotionVariant = MotionVariant {
        duration: 0.3,
        delay: 0.0,
        easing: Easing::EaseOut,
        stagger_children: 0.0,
        opacity: None,
        x: None,
        y: None,
        scale: None,
    };

    /// Zero-duration version that jumps straight to the end state
    pub fn reduced(&self) -> MotionVariant {
        let settle = |k: Option<Keyframes>| k.map(|k| Keyframes { from: k.to, to: k.to });
        MotionVariant {
            duration: 0.0,
            delay: 0.0,
            easing: Easing::Linear,
            stagger_children: 0.0,
            opacity: settle(self.opacity),
            x: settle(self.x),
            y: settle(self.y),
            scale: settle(self.scale),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MotionPreset {
    FadeIn,
    SlideUp,
    SlideInRight,
    SlideInLeft,
    ScaleIn,
    StaggerContainer,
    ListItem,
    ModalBackdrop,
    ModalContent,
    StepTransition,
}

const PRESETS: &[(MotionPreset, MotionVariant)] = &[
    (
        MotionPreset::FadeIn,
        MotionVariant {
            opacity: frames(0.0, 1.0),
            ..MotionVariant::BASE
        },
    ),
    (
        MotionPreset::SlideUp,
        MotionVariant {
            duration: 0.4,
            opacity: frames(0.0, 1.0),
            y: frames(20.0, 0.0),
            ..MotionVariant::BASE
        },
    ),
    (
        MotionPreset::SlideInRight,
        MotionVariant {
            opacity: frames(0.0, 1.0),
            x: frames(40.0, 0.0),
            ..MotionVariant::BASE
        },
    ),
    (
        MotionPreset::SlideInLeft,
        MotionVariant {
            opacity: frames(0.0, 1.0),
            x: frames(-40.0, 0.0),
            ..MotionVariant::BASE
        },
    ),
    (
        MotionPreset::ScaleIn,
        MotionVariant {
            duration: 0.25,
            opacity: frames(0.0, 1.0),
            scale: frames(0.95, 1.0),
            ..MotionVariant::BASE
        },
    ),
    (
        MotionPreset::StaggerContainer,
        MotionVariant {
            duration: 0.2,
            stagger_children: 0.08,
            opacity: frames(0.0, 1.0),
            ..MotionVariant::BASE
        },
    ),
    (
        MotionPreset::ListItem,
        MotionVariant {
            duration: 0.25,
            opacity: frames(0.0, 1.0),
            y: frames(10.0, 0.0),
            ..MotionVariant::BASE
        },
    ),
    (
        MotionPreset::ModalBackdrop,
        MotionVariant {
            duration: 0.2,
            easing: Easing::Linear,
            opacity: frames(0.0, 1.0),
            ..MotionVariant::BASE
        },
    ),
    (
        MotionPreset::ModalContent,
        MotionVariant {
            easing: Easing::Spring {
                stiffness: 300.0,
                damping: 30.0,
            },
            opacity: frames(0.0, 1.0),
            y: frames(30.0, 0.0),
            scale: frames(0.96, 1.0),
            ..MotionVariant::BASE
        },
    ),
    (
        MotionPreset::StepTransition,
        MotionVariant {
            duration: 0.35,
            easing: Easing::EaseInOut,
            opacity: frames(0.0, 1.0),
            x: frames(24.0, 0.0),
            ..MotionVariant::BASE
        },
    ),
];

impl MotionPreset {
    pub fn all() -> impl Iterator<Item = MotionPreset> {
        PRESETS.iter().map(|(preset, _)| *preset)
    }

    pub fn variant(self) -> MotionVariant {
        PRESETS
            .iter()
            .find(|(preset, _)| *preset == self)
            .map(|(_, variant)| *variant)
            .unwrap_or(MotionVariant::BASE)
    }
}

/// Variant to use for `preset`, honouring the reduced-motion preference
pub fn get_reduced_motion_variant(
    preset: MotionPreset,
    prefers_reduced_motion: bool,
) -> MotionVariant {
    let variant = preset.variant();
    if prefers_reduced_motion {
        variant.reduced()
    } else {
        variant
    }
}

/// The whole preset table as JSON, keyed by preset name
pub fn presets_json(prefers_reduced_motion: bool) -> serde_json::Value {
    let table: serde_json::Map<String, serde_json::Value> = MotionPreset::all()
        .filter_map(|preset| {
            let name = serde_json::to_value(preset).ok()?.as_str()?.to_string();
            let variant =
                serde_json::to_value(get_reduced_motion_variant(preset, prefers_reduced_motion))
                    .ok()?;
            Some((name, variant))
        })
        .collect();
    serde_json::Value::Object(table)
}
