//! Triggered modifiers, resolved in two passes.
//!
//! The first pass reserves a slot per declaration (in file order) and stashes
//! the body unparsed. The second pass parses each stashed body, commits a
//! provincial modifier and writes its handle back into the reserved slot, so
//! the slot table always follows declaration order whatever order the second
//! pass runs in. A trigger may name a modifier declared later in the file.

use crate::context::{ScenarioBuildingContext, TriggeredModifier};
use crate::diagnostics::Diagnostics;
use crate::modifiers::ModifierDefinition;
use crate::static_modifiers::parse_named_groups;
use crate::world::ModifierId;
use std::collections::HashSet;
use v2txt::{Entry, TokenGenerator, TokenSpan};

/// Trigger keys whose value names a modifier.
const MODIFIER_REFERENCES: [&str; 2] = ["has_country_modifier", "has_province_modifier"];

/// A declaration seen by the first pass.
#[derive(Debug, Clone)]
pub struct PendingTriggeredModifier {
    pub name: String,
    /// Reserved slot in `NationalDefinitions::triggered_modifiers`.
    pub index: usize,
    pub span: TokenSpan,
    pub line: u32,
}

/// Reserves the next slot and stashes the declaration's body.
pub fn make_triggered_modifier(
    name: &str,
    line: u32,
    tg: &mut TokenGenerator,
    ctx: &mut ScenarioBuildingContext,
) -> PendingTriggeredModifier {
    let slots = &mut ctx.state.national_definitions.triggered_modifiers;
    let index = slots.len();
    slots.push(TriggeredModifier::default());

    PendingTriggeredModifier {
        name: name.to_string(),
        index,
        span: tg.capture_group(),
        line,
    }
}

/// First pass over `triggered_modifiers.txt`.
pub fn scan_triggered_modifiers(
    tg: &mut TokenGenerator,
    err: &mut Diagnostics,
    ctx: &mut ScenarioBuildingContext,
) -> Vec<PendingTriggeredModifier> {
    let mut pending = Vec::new();
    parse_named_groups(tg, err, |name, line, tg, _| {
        pending.push(make_triggered_modifier(name, line, tg, ctx));
    });
    log::debug!("reserved {} triggered modifier slots", pending.len());
    pending
}

impl PendingTriggeredModifier {
    /// Second pass for one declaration. `pending_names` holds every name
    /// seen by the first pass, so forward references resolve.
    pub fn finish(
        &self,
        pending_names: &HashSet<&str>,
        err: &mut Diagnostics,
        ctx: &mut ScenarioBuildingContext,
    ) -> ModifierId {
        let mut tg = TokenGenerator::from_span(&self.span);
        let mut parsed = ModifierDefinition::default();
        let mut trigger = None;

        while let Some(entry) = tg.next_entry() {
            match entry {
                Ok(Entry::KeyGroup { key, .. }) if key == "trigger" => {
                    trigger = Some(tg.capture_group());
                }
                other => parsed.apply_entry(other, &mut tg, err),
            }
        }

        match &trigger {
            Some(span) => check_references(span, pending_names, err, ctx),
            None => err.push(
                self.line,
                format!("triggered modifier '{}' has no trigger", self.name),
            ),
        }

        let name_id = ctx.state.text.find_or_add_key(&self.name);
        parsed.name = name_id;
        parsed.convert_to_province_mod();
        let id = ctx.commit_modifier(name_id, &parsed);
        ctx.map_of_modifiers.insert(name_id, id);

        ctx.state.national_definitions.triggered_modifiers[self.index] = TriggeredModifier {
            linked_modifier: Some(id),
            trigger,
        };
        id
    }
}

/// Second pass over every declaration, in declaration order.
pub fn finish_all(
    pending: &[PendingTriggeredModifier],
    err: &mut Diagnostics,
    ctx: &mut ScenarioBuildingContext,
) {
    let names: HashSet<&str> = pending.iter().map(|p| p.name.as_str()).collect();
    for p in pending {
        p.finish(&names, err, ctx);
    }
    log::info!("Resolved {} triggered modifiers", pending.len());
}

fn check_references(
    span: &TokenSpan,
    pending_names: &HashSet<&str>,
    err: &mut Diagnostics,
    ctx: &ScenarioBuildingContext,
) {
    let mut tg = TokenGenerator::from_span(span);
    check_group(&mut tg, pending_names, err, ctx);
}

fn check_group(
    tg: &mut TokenGenerator,
    pending_names: &HashSet<&str>,
    err: &mut Diagnostics,
    ctx: &ScenarioBuildingContext,
) {
    while let Some(entry) = tg.next_entry() {
        match entry {
            Ok(Entry::KeyValue { key, value, line }) if MODIFIER_REFERENCES.contains(&key.as_str()) => {
                let target = value.to_text();
                if ctx.modifier_by_name(&target).is_none() && !pending_names.contains(target.as_str()) {
                    err.push(line, format!("{} names unknown modifier '{}'", key, target));
                }
            }
            Ok(Entry::KeyGroup { .. }) | Ok(Entry::Group { .. }) => {
                check_group(tg, pending_names, err, ctx);
            }
            Ok(_) => {}
            Err(e) => err.push_parse_error(&e),
        }
    }
}
