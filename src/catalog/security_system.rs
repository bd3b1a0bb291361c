//! Security system groups
//!
//! A security system is a group with an armed switch member and, optionally,
//! an arm-level selector member.

use super::{members as collect, Members};
use intent_bridge_shared::Item;

pub const ARMED: &str = "securitySystemArmed";
pub const ARM_LEVEL: &str = "securitySystemArmLevel";

const SUPPORTED: [&str; 2] = [ARMED, ARM_LEVEL];

const STATE_ACTIVE: &str = "ON";

pub fn members(item: &Item) -> Members {
    collect(item, &SUPPORTED)
}

/// Name of the member that receives an arm/disarm command.
///
/// An arm level goes to the arm-level selector when the group has one;
/// everything else goes to the armed switch.
pub fn member_to_send_arm_command(item: &Item, arm_level: Option<&str>) -> Option<String> {
    let members = members(item);
    if arm_level.is_some() {
        if let Some(level) = members.get(ARM_LEVEL) {
            return Some(level.name.clone());
        }
    }
    members.get(ARMED).map(|armed| armed.name.clone())
}

/// Whether the armed switch reports armed. `None` without an armed member.
pub fn is_armed(members: &Members, inverted: bool) -> Option<bool> {
    members
        .get(ARMED)
        .map(|armed| (armed.state == STATE_ACTIVE) != inverted)
}

/// Current arm level, if the group has a level selector
pub fn arm_level(members: &Members) -> Option<&str> {
    members.get(ARM_LEVEL).map(|level| level.state.as_str())
}
