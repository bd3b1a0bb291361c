//! Device/Trait Catalog lookups
//!
//! Composite devices are registry groups whose members carry a semantic role
//! in their `ga` metadata. Commands use these lookups to pick the member that
//! receives a value and to read the member states they validate against.

pub mod security_system;
pub mod thermostat;

use intent_bridge_shared::Item;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A member of a composite device
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub name: String,
    pub state: String,
    pub config: Map<String, Value>,
}

/// Members keyed by their semantic role
pub type Members = HashMap<&'static str, Member>;

/// Collect the members of `item` whose role is one of `supported`.
///
/// Roles match case-insensitively; when two members claim the same role the
/// later one wins.
pub fn members(item: &Item, supported: &[&'static str]) -> Members {
    let mut members = Members::new();
    for member in &item.members {
        let Some(role) = member.ga_value() else {
            continue;
        };
        let Some(&role) = supported.iter().find(|s| s.eq_ignore_ascii_case(role)) else {
            continue;
        };
        let config = member
            .metadata
            .as_ref()
            .and_then(|m| m.ga.as_ref())
            .map(|ga| ga.config.clone())
            .unwrap_or_default();
        members.insert(
            role,
            Member {
                name: member.name.clone(),
                state: member.state.clone(),
                config,
            },
        );
    }
    members
}

/// Direct member of `item` with the given item name
pub fn member_by_name<'a>(item: &'a Item, name: &str) -> Option<&'a Item> {
    item.members.iter().find(|member| member.name == name)
}
