//! Session state threaded through every compiler operation.

use crate::modifiers::{ModifierDefinition, ModifierValues};
use crate::static_modifiers::STATIC_MODIFIER_COUNT;
use crate::text::{TextKey, TextPool};
use crate::world::{ModifierId, NationalIdentityId, NationalTag, UnitTypeId, WorldStore};
use std::collections::HashMap;
use v2txt::TokenSpan;

/// A committed triggered modifier. Slots are reserved before their modifier
/// exists, so both fields start empty.
#[derive(Debug, Clone, Default)]
pub struct TriggeredModifier {
    pub linked_modifier: Option<ModifierId>,
    /// The unevaluated `trigger = { ... }` block.
    pub trigger: Option<TokenSpan>,
}

#[derive(Debug, Clone)]
pub struct NationalDefinitions {
    /// Indexed by `StaticModifier as usize`.
    pub static_modifiers: [Option<ModifierId>; STATIC_MODIFIER_COUNT],
    /// Indexed by declaration order in the triggered modifiers file.
    pub triggered_modifiers: Vec<TriggeredModifier>,
}

impl Default for NationalDefinitions {
    fn default() -> Self {
        Self {
            static_modifiers: [None; STATIC_MODIFIER_COUNT],
            triggered_modifiers: Vec::new(),
        }
    }
}

/// The long-lived game state the compiler fills in.
#[derive(Debug, Clone, Default)]
pub struct GameState {
    pub text: TextPool,
    pub world: WorldStore,
    pub national_definitions: NationalDefinitions,
}

/// Both records created for one event modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventModifierIds {
    pub province: ModifierId,
    pub national: ModifierId,
}

/// [`GameState`] plus the lookup tables that only matter while loading.
#[derive(Debug, Clone, Default)]
pub struct ScenarioBuildingContext {
    pub state: GameState,
    pub map_of_modifiers: HashMap<TextKey, ModifierId>,
    pub map_of_event_modifiers: HashMap<TextKey, EventModifierIds>,
    pub map_of_unit_types: HashMap<String, UnitTypeId>,
    pub map_of_ident_names: HashMap<NationalTag, NationalIdentityId>,
    /// Country file per identity index; may be shorter than the identity
    /// table, missing entries read as no file.
    pub file_names_for_idents: Vec<String>,
}

impl ScenarioBuildingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a world modifier from `def`'s current projection.
    pub fn commit_modifier(&mut self, name: TextKey, def: &ModifierDefinition) -> ModifierId {
        let world = &mut self.state.world;
        let id = world.create_modifier();
        world.modifier_set_name(id, name);
        world.modifier_set_icon(id, def.icon_index);
        match def.constructed_definition() {
            Some(ModifierValues::National(v)) => world.modifier_set_national_values(id, *v),
            Some(ModifierValues::Province(v)) => world.modifier_set_province_values(id, *v),
            Some(ModifierValues::Neutral(v)) => world.modifier_set_neutral_values(id, *v),
            None => {}
        }
        log::debug!(
            "committed modifier '{}' as {:?}",
            self.state.text.to_string_view(name),
            def.constructed_definition().map(ModifierValues::domain)
        );
        id
    }

    /// Name of the country file for `ident`, if one was declared.
    pub fn file_name_for_ident(&self, ident: NationalIdentityId) -> Option<&str> {
        self.file_names_for_idents
            .get(ident.index())
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn register_unit_type(&mut self, name: &str) -> UnitTypeId {
        let world = &mut self.state.world;
        let id = world.create_unit_type();
        let key = self.state.text.find_or_add_key(name);
        world.unit_type_set_name(id, key);
        self.map_of_unit_types.insert(name.to_string(), id);
        id
    }

    pub fn modifier_by_name(&self, name: &str) -> Option<ModifierId> {
        let key = self.state.text.lookup_key(name)?;
        self.map_of_modifiers.get(&key).copied()
    }
}
