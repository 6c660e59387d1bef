//! Resource handlers: static JSON guides and the file-backed notes document.
use std::sync::Arc;

use serde::Serialize;

use crate::{
    lib::errors::{HandlerError, RegistryError},
    notes::NotesStore,
    registry::{HandlerDescriptor, Invocation, Registry},
};

pub const PRODUCTIVITY_METHODS_URI: &str = "resource://productivity_methods";
pub const FOCUS_TIPS_URI: &str = "resource://focus_tips";
pub const ENERGY_MANAGEMENT_URI: &str = "resource://energy_management";
pub const NOTES_URI: &str = "resource://notes";

#[derive(Serialize)]
struct Method {
    name: &'static str,
    description: &'static str,
    key_principles: &'static [&'static str],
}

#[derive(Serialize)]
struct ProductivityMethods {
    methods: &'static [Method],
}

#[derive(Serialize)]
struct FocusTips {
    tips: &'static [&'static str],
}

#[derive(Serialize)]
struct EnergyTypes {
    physical: &'static str,
    emotional: &'static str,
    mental: &'static str,
    spiritual: &'static str,
}

#[derive(Serialize)]
struct EnergyManagement {
    peak_hours: &'static str,
    energy_types: EnergyTypes,
    recovery_strategies: &'static [&'static str],
}

const PRODUCTIVITY_METHODS: ProductivityMethods = ProductivityMethods {
    methods: &[
        Method {
            name: "Getting Things Done (GTD)",
            description: "A workflow methodology for organizing tasks and projects",
            key_principles: &["Capture", "Clarify", "Organize", "Reflect", "Engage"],
        },
        Method {
            name: "Pomodoro Technique",
            description: "Time management method using 25-minute focused work sessions",
            key_principles: &["Work in sprints", "Take breaks", "Track progress"],
        },
        Method {
            name: "Eisenhower Matrix",
            description: "Prioritization framework based on urgency and importance",
            key_principles: &[
                "Urgent & Important",
                "Not Urgent & Important",
                "Urgent & Not Important",
                "Not Urgent & Not Important",
            ],
        },
    ],
};

const FOCUS_TIPS: FocusTips = FocusTips {
    tips: &[
        "Use noise-canceling headphones or ambient sounds to block distractions",
        "Put your phone in another room or use focus mode",
        "Set up a dedicated workspace with good lighting",
        "Take regular breaks every 25-45 minutes",
        "Use the 'two-minute rule' for quick tasks",
        "Batch similar activities together",
        "Practice mindfulness meditation to improve attention span",
    ],
};

const ENERGY_MANAGEMENT: EnergyManagement = EnergyManagement {
    peak_hours: "Identify your natural energy peaks (usually morning or afternoon)",
    energy_types: EnergyTypes {
        physical: "Exercise, nutrition, sleep quality",
        emotional: "Stress management, relationships, mood",
        mental: "Learning, problem-solving, creativity",
        spiritual: "Purpose, values, meaning",
    },
    recovery_strategies: &[
        "Power naps (10-20 minutes)",
        "Short walks in nature",
        "Deep breathing exercises",
        "Hydration and healthy snacks",
    ],
};

/// Register every resource handler.
pub fn register(registry: &mut Registry, store: Arc<NotesStore>) -> Result<(), RegistryError> {
    registry.add(
        HandlerDescriptor::resource(
            PRODUCTIVITY_METHODS_URI,
            "Collection of proven productivity methodologies.",
        ),
        |_| json_resource(&PRODUCTIVITY_METHODS),
    )?;
    registry.add(
        HandlerDescriptor::resource(
            FOCUS_TIPS_URI,
            "Actionable tips for improving focus and concentration.",
        ),
        |_| json_resource(&FOCUS_TIPS),
    )?;
    registry.add(
        HandlerDescriptor::resource(
            ENERGY_MANAGEMENT_URI,
            "Guidance on managing personal energy throughout the day.",
        ),
        |_| json_resource(&ENERGY_MANAGEMENT),
    )?;
    registry.add(
        HandlerDescriptor::resource(NOTES_URI, "Current contents of the notes document."),
        move |_| Ok(Invocation::Text(store.read()?)),
    )?;
    Ok(())
}

fn json_resource(content: &impl Serialize) -> Result<Invocation, HandlerError> {
    Ok(Invocation::Text(serde_json::to_string_pretty(content)?))
}
