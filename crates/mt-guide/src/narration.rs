//! Narration and answers.
//!
//! Text is assembled from short fragments.  Its *length* matters as much as
//! its content: visitors rate narration partly on whether it fits their
//! patience, so a guide talking outside its specialization, or to a group
//! that is drifting apart, produces noticeably different output.

use mt_core::{ActorRng, Theme, unit};
use mt_group::Formation;
use mt_schedule::Location;

use crate::GuideProfile;

const OPENERS: [&str; 3] = [
    "Welcome to {title}.",
    "Here we are at {title}.",
    "Gather round, this is {title}.",
];

const SPECIALIST_DETAIL: [&str; 3] = [
    "Notice how each piece answers the one beside it; the curators arranged them as a conversation.",
    "Most visitors walk past the smallest work in this room, yet it is the one scholars argue about most.",
    "The restoration records show three earlier attempts to display this collection before it found its home here.",
];

const GENERAL_DETAIL: [&str; 2] = [
    "This room gives a good overview of the {theme} collection.",
    "The labels on the left wall tell the main story.",
];

const BRIDGE: &str = "It is not my own field, but the connection to the rest of the tour is worth pointing out.";
const STAY_CLOSE: &str = "Please stay close so everyone can hear.";
const DISCUSSION: &str = "Take a moment to look around and share what catches your eye.";

/// Compose narration for `location`.
///
/// * On-specialization stops get all specialist detail.
/// * Off-specialization stops get a general overview, plus a bridging remark
///   if the guide is adaptable.
/// * Low cohesion trims the talk and asks the group to close up; a loose
///   `Circle` formation invites discussion.
pub fn narrate(
    profile:   &GuideProfile,
    location:  &Location,
    formation: Formation,
    cohesion:  f64,
    rng:       &mut ActorRng,
) -> String {
    let mut parts: Vec<String> = Vec::new();
    let opener = OPENERS[rng.gen_range(0..OPENERS.len())];
    parts.push(opener.replace("{title}", &location.title));

    let on_topic = location.theme == profile.specialization;
    let sparse = cohesion < 0.5;
    if on_topic {
        let take = if sparse { 1 } else { SPECIALIST_DETAIL.len() };
        parts.extend(SPECIALIST_DETAIL.iter().take(take).map(|s| s.to_string()));
    } else {
        parts.push(GENERAL_DETAIL[0].replace("{theme}", location.theme.as_str()));
        if !sparse {
            parts.push(GENERAL_DETAIL[1].to_string());
        }
        if profile.adaptability > 0.6 {
            parts.push(BRIDGE.to_string());
        }
    }

    if sparse {
        parts.push(STAY_CLOSE.to_string());
    } else if formation == Formation::Circle {
        parts.push(DISCUSSION.to_string());
    }
    parts.join(" ")
}

/// Reply to a question about a `theme` stop.  Returns the text and its
/// quality in `[0, 1]`.
pub fn answer(profile: &GuideProfile, theme: Theme, question: &str, rng: &mut ActorRng) -> (String, f64) {
    let specialist = theme == profile.specialization;
    let topic_bonus = if specialist { 0.2 } else { 0.05 };
    let quality = unit(
        0.4 * profile.knowledge + 0.3 * profile.communication + topic_bonus
            + rng.gen_range(-0.1..0.1),
    );

    let text = if specialist {
        format!("Good question. \"{question}\" Let me tell you what the archive says about the {theme} side of it.")
    } else {
        format!("\"{question}\" I can give you the short version, the {theme} specialists know more.")
    };
    (text, quality)
}
