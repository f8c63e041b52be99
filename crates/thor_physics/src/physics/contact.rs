//! Contact classification
//!
//! While an object is held or placed, the host reports the colliders it
//! stays in contact with each physics step. Whether such a contact counts as
//! an obstruction depends only on the other collider's tag and name.

/// Tag carried by receptacle trigger boxes
pub const RECEPTACLE_TAG: &str = "Receptacle";

/// Tag carried by every part of the agent
pub const PLAYER_TAG: &str = "Player";

/// Name of the agent's body collider
pub const AGENT_BODY_NAME: &str = "FPSController";

/// One contact reported during a physics step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactEvent<'a> {
    /// Tag of the other collider's node
    pub tag: &'a str,
    /// Name of the other collider's node
    pub name: &'a str,
}

impl<'a> ContactEvent<'a> {
    /// Contact with a collider tagged `tag` on a node named `name`
    pub fn new(tag: &'a str, name: &'a str) -> Self {
        Self { tag, name }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Clear,
    Obstruct,
    Unchanged,
}

fn classify(tag: &str, name: &str) -> Verdict {
    if tag == RECEPTACLE_TAG {
        Verdict::Clear
    } else if tag != PLAYER_TAG || name == AGENT_BODY_NAME {
        Verdict::Obstruct
    } else {
        Verdict::Unchanged
    }
}

/// True when touching this collider counts as being obstructed.
///
/// Receptacle trigger boxes never obstruct, the agent body does, any other
/// non-agent collider does, and other agent parts do not.
pub fn is_obstructing_contact(tag: &str, name: &str) -> bool {
    classify(tag, name) == Verdict::Obstruct
}

/// Fold one step's contacts into a colliding flag.
///
/// Contacts are applied in order and the last deciding one wins: receptacle
/// contacts clear the flag, obstructing contacts set it, other agent parts
/// leave it as it was. The flag starts each step cleared.
pub fn colliding_this_step<'a>(contacts: impl IntoIterator<Item = ContactEvent<'a>>) -> bool {
    contacts
        .into_iter()
        .fold(false, |colliding, contact| match classify(contact.tag, contact.name) {
            Verdict::Clear => false,
            Verdict::Obstruct => true,
            Verdict::Unchanged => colliding,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_table() {
        assert!(!is_obstructing_contact("Receptacle", "TriggerBox"));
        assert!(is_obstructing_contact("Player", "FPSController"));
        assert!(is_obstructing_contact("Untagged", "Wall"));
        assert!(is_obstructing_contact("SimObjPhysics", "Apple"));
        assert!(!is_obstructing_contact("Player", "Arm"));
    }

    #[test]
    fn test_last_contact_decides() {
        let wall = ContactEvent::new("Untagged", "Wall");
        let trigger = ContactEvent::new("Receptacle", "TriggerBox");
        let arm = ContactEvent::new("Player", "Arm");

        assert!(!colliding_this_step(Vec::<ContactEvent>::new()));
        assert!(colliding_this_step([trigger, wall]));
        assert!(!colliding_this_step([wall, trigger]));
        assert!(colliding_this_step([wall, arm]));
        assert!(!colliding_this_step([arm]));
    }
}
