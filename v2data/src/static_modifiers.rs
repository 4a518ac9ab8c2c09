//! Engine-known static modifiers, national values and event modifiers.
//!
//! All three files share the same shape, `name = { <modifier block> }`, and
//! differ only in the layout(s) a parsed block is committed with.

use crate::context::{EventModifierIds, ScenarioBuildingContext};
use crate::diagnostics::Diagnostics;
use crate::modifiers::{ModifierDomain, parse_modifier_base};
use crate::world::ModifierId;
use v2txt::{Entry, TokenGenerator};

/// A modifier the engine refers to by a fixed name, stored in
/// [`crate::context::NationalDefinitions::static_modifiers`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StaticModifier {
    VeryEasyPlayer,
    EasyPlayer,
    HardPlayer,
    VeryHardPlayer,
    VeryEasyAi,
    EasyAi,
    HardAi,
    VeryHardAi,
    Overseas,
    Coastal,
    NonCoastal,
    CoastalSea,
    SeaZone,
    LandProvince,
    Blockaded,
    NoAdjacentControlled,
    Core,
    HasSiege,
    Occupied,
    Nationalism,
    Infrastructure,
    BaseValues,
    War,
    Peace,
    Disarming,
    WarExhaustion,
    Badboy,
    DebtDefaultTo,
    BadDebter,
    GreatPower,
    SecondPower,
    CivNation,
    UncivNation,
    AverageLiteracy,
    Plurality,
    GeneralisedDebtDefault,
    TotalOccupation,
    TotalBlockaded,
    InBankruptcy,
}

pub const STATIC_MODIFIER_COUNT: usize = STATIC_MODIFIERS.len();

use ModifierDomain::{National, Province};
use StaticModifier as S;

/// Name in `static_modifiers.txt` -> slot and layout.
pub const STATIC_MODIFIERS: [(&str, StaticModifier, ModifierDomain); 39] = [
    ("very_easy_player", S::VeryEasyPlayer, National),
    ("easy_player", S::EasyPlayer, National),
    ("hard_player", S::HardPlayer, National),
    ("very_hard_player", S::VeryHardPlayer, National),
    ("very_easy_ai", S::VeryEasyAi, National),
    ("easy_ai", S::EasyAi, National),
    ("hard_ai", S::HardAi, National),
    ("very_hard_ai", S::VeryHardAi, National),
    ("overseas", S::Overseas, Province),
    ("coastal", S::Coastal, Province),
    ("non_coastal", S::NonCoastal, Province),
    ("coastal_sea", S::CoastalSea, Province),
    ("sea_zone", S::SeaZone, Province),
    ("land_province", S::LandProvince, Province),
    ("blockaded", S::Blockaded, Province),
    ("no_adjacent_controlled", S::NoAdjacentControlled, Province),
    ("core", S::Core, Province),
    ("has_siege", S::HasSiege, Province),
    ("occupied", S::Occupied, Province),
    ("nationalism", S::Nationalism, Province),
    ("infrastructure", S::Infrastructure, Province),
    ("base_values", S::BaseValues, National),
    ("war", S::War, National),
    ("peace", S::Peace, National),
    ("disarming", S::Disarming, National),
    ("war_exhaustion", S::WarExhaustion, National),
    ("badboy", S::Badboy, National),
    ("debt_default_to", S::DebtDefaultTo, National),
    ("bad_debter", S::BadDebter, National),
    ("great_power", S::GreatPower, National),
    ("second_power", S::SecondPower, National),
    ("civ_nation", S::CivNation, National),
    ("unciv_nation", S::UncivNation, National),
    ("average_literacy", S::AverageLiteracy, National),
    ("plurality", S::Plurality, National),
    ("generalised_debt_default", S::GeneralisedDebtDefault, National),
    ("total_occupation", S::TotalOccupation, National),
    ("total_blockaded", S::TotalBlockaded, National),
    // sic, the game files spell it this way
    ("in_bankrupcy", S::InBankruptcy, National),
];

impl StaticModifier {
    pub fn from_name(name: &str) -> Option<(StaticModifier, ModifierDomain)> {
        STATIC_MODIFIERS
            .iter()
            .find(|(n, _, _)| *n == name)
            .map(|&(_, kind, domain)| (kind, domain))
    }

    pub fn name(self) -> &'static str {
        STATIC_MODIFIERS[self as usize].0
    }

    pub fn domain(self) -> ModifierDomain {
        STATIC_MODIFIERS[self as usize].2
    }
}

/// Walks a file of `name = { ... }` declarations. Each group is handed to
/// `make`, which must consume it; anything else is reported.
pub(crate) fn parse_named_groups<F>(tg: &mut TokenGenerator, err: &mut Diagnostics, mut make: F)
where
    F: FnMut(&str, u32, &mut TokenGenerator, &mut Diagnostics),
{
    while let Some(entry) = tg.next_entry() {
        match entry {
            Ok(Entry::KeyGroup { key, line }) => make(&key, line, tg, err),
            Ok(Entry::KeyValue { key, line, .. }) => {
                err.push(line, format!("expected a block after '{}'", key));
            }
            Ok(Entry::Value { value, line }) => {
                err.push(line, format!("unexpected value '{}'", value.to_text()));
            }
            Ok(Entry::Group { line }) => {
                err.push(line, "unexpected unnamed block");
                tg.discard_group();
            }
            Err(e) => err.push_parse_error(&e),
        }
    }
}

/// Parses one static modifier and stores it at its named slot.
pub fn make_static_modifier(
    kind: StaticModifier,
    tg: &mut TokenGenerator,
    err: &mut Diagnostics,
    ctx: &mut ScenarioBuildingContext,
) -> ModifierId {
    let name_id = ctx.state.text.find_or_add_key(kind.name());
    let mut parsed = parse_modifier_base(tg, err);
    parsed.name = name_id;
    parsed.convert_to(kind.domain());

    let id = ctx.commit_modifier(name_id, &parsed);
    ctx.map_of_modifiers.insert(name_id, id);
    ctx.state.national_definitions.static_modifiers[kind as usize] = Some(id);
    id
}

pub fn parse_static_modifiers_file(
    tg: &mut TokenGenerator,
    err: &mut Diagnostics,
    ctx: &mut ScenarioBuildingContext,
) {
    parse_named_groups(tg, err, |name, line, tg, err| {
        match StaticModifier::from_name(name) {
            Some((kind, _)) => {
                make_static_modifier(kind, tg, err, ctx);
            }
            None => {
                err.push(line, format!("unknown static modifier '{}'", name));
                tg.discard_group();
            }
        }
    });
}

pub fn make_national_value(
    name: &str,
    tg: &mut TokenGenerator,
    err: &mut Diagnostics,
    ctx: &mut ScenarioBuildingContext,
) -> ModifierId {
    let name_id = ctx.state.text.find_or_add_key(name);
    let mut parsed = parse_modifier_base(tg, err);
    parsed.name = name_id;
    parsed.convert_to_national_mod();

    let id = ctx.commit_modifier(name_id, &parsed);
    ctx.map_of_modifiers.insert(name_id, id);
    id
}

pub fn parse_national_values_file(
    tg: &mut TokenGenerator,
    err: &mut Diagnostics,
    ctx: &mut ScenarioBuildingContext,
) {
    parse_named_groups(tg, err, |name, _, tg, err| {
        make_national_value(name, tg, err, ctx);
    });
}

/// Parses one event modifier and commits it twice: once with the
/// provincial layout and once with the national one.
pub fn make_event_modifier(
    name: &str,
    tg: &mut TokenGenerator,
    err: &mut Diagnostics,
    ctx: &mut ScenarioBuildingContext,
) -> EventModifierIds {
    let name_id = ctx.state.text.find_or_add_key(name);
    let mut parsed = parse_modifier_base(tg, err);
    parsed.name = name_id;

    parsed.convert_to_province_mod();
    let province = ctx.commit_modifier(name_id, &parsed);

    parsed.convert_to_national_mod();
    let national = ctx.commit_modifier(name_id, &parsed);

    let ids = EventModifierIds { province, national };
    ctx.map_of_modifiers.insert(name_id, national);
    ctx.map_of_event_modifiers.insert(name_id, ids);
    ids
}

pub fn parse_event_modifiers_file(
    tg: &mut TokenGenerator,
    err: &mut Diagnostics,
    ctx: &mut ScenarioBuildingContext,
) {
    parse_named_groups(tg, err, |name, _, tg, err| {
        make_event_modifier(name, tg, err, ctx);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifiers::{ModifierKey, ModifierValues};

    fn run(
        text: &str,
        parse: fn(&mut TokenGenerator, &mut Diagnostics, &mut ScenarioBuildingContext),
    ) -> (ScenarioBuildingContext, Diagnostics) {
        let mut ctx = ScenarioBuildingContext::new();
        let mut err = Diagnostics::new("common/test.txt");
        let mut tg = TokenGenerator::from_text(text);
        parse(&mut tg, &mut err, &mut ctx);
        (ctx, err)
    }

    #[test]
    fn test_table_order_matches_discriminants() {
        for (i, &(name, kind, _)) in STATIC_MODIFIERS.iter().enumerate() {
            assert_eq!(kind as usize, i, "{}", name);
            assert_eq!(kind.name(), name);
        }
    }

    #[test]
    fn test_static_modifiers_land_in_named_slots() {
        let (ctx, err) = run(
            "war = { war_exhaustion = 0.1 }\ncoastal = { life_rating = 2 }\n",
            parse_static_modifiers_file,
        );
        assert!(err.is_empty(), "{}", err.report());

        let defs = &ctx.state.national_definitions.static_modifiers;
        let war = defs[StaticModifier::War as usize].expect("war committed");
        let coastal = defs[StaticModifier::Coastal as usize].expect("coastal committed");
        assert!(defs[StaticModifier::Peace as usize].is_none());

        let war_values = ctx.state.world.modifier(war).values;
        assert!(matches!(war_values, Some(ModifierValues::National(_))));
        let coastal_values = ctx.state.world.modifier(coastal).values;
        assert_eq!(
            coastal_values.and_then(|v| v.get(ModifierKey::LifeRating)),
            Some(2.0)
        );
        assert!(matches!(coastal_values, Some(ModifierValues::Province(_))));
        assert_eq!(ctx.modifier_by_name("coastal"), Some(coastal));
    }

    #[test]
    fn test_unknown_static_modifier_is_skipped() {
        let (ctx, err) = run(
            "made_up = { prestige = 1 nested = { x = 1 } }\npeace = { prestige = 1 }",
            parse_static_modifiers_file,
        );
        assert_eq!(err.len(), 1);
        assert!(err.entries()[0].contains("unknown static modifier 'made_up'"));
        assert_eq!(ctx.state.world.modifier_size(), 1);
        assert!(ctx.state.national_definitions.static_modifiers[StaticModifier::Peace as usize].is_some());
    }

    #[test]
    fn test_national_values_are_national() {
        let (ctx, err) = run(
            "nv_order = { icon = 2 tax_efficiency = 0.1 }\nnv_liberty = { research_points_modifier = 0.1 }",
            parse_national_values_file,
        );
        assert!(err.is_empty());
        assert_eq!(ctx.state.world.modifier_size(), 2);
        let order = ctx.modifier_by_name("nv_order").expect("nv_order");
        let record = ctx.state.world.modifier(order);
        assert_eq!(record.icon, 2);
        assert_eq!(
            record.values.and_then(|v| v.get(ModifierKey::TaxEfficiency)),
            Some(0.1)
        );
    }

    #[test]
    fn test_event_modifier_writes_two_independent_records() {
        let (ctx, err) = run(
            "gold_rush = { icon = 4 prestige = 3 life_rating = -1 farm_rgo_eff = 0.25 }",
            parse_event_modifiers_file,
        );
        assert!(err.is_empty());
        let name = ctx.state.text.lookup_key("gold_rush").expect("interned");
        let ids = ctx.map_of_event_modifiers[&name];
        assert_ne!(ids.province, ids.national);
        assert_eq!(ctx.map_of_modifiers[&name], ids.national);

        let Some(ModifierValues::Province(p)) = ctx.state.world.modifier(ids.province).values else {
            panic!("expected province layout");
        };
        let Some(ModifierValues::National(n)) = ctx.state.world.modifier(ids.national).values else {
            panic!("expected national layout");
        };

        for (i, key) in ModifierDomain::Province.remap_table().iter().enumerate() {
            let expected = match key {
                ModifierKey::LifeRating => -1.0,
                ModifierKey::FarmRgoEff => 0.25,
                _ => 0.0,
            };
            assert_eq!(p.field(i), Some(expected), "{:?}", key);
        }
        for (i, key) in ModifierDomain::National.remap_table().iter().enumerate() {
            let expected = match key {
                ModifierKey::Prestige => 3.0,
                ModifierKey::FarmRgoEff => 0.25,
                _ => 0.0,
            };
            assert_eq!(n.field(i), Some(expected), "{:?}", key);
        }
        assert_eq!(ctx.state.world.modifier(ids.province).icon, 4);
        assert_eq!(ctx.state.world.modifier(ids.national).icon, 4);
    }
}
