//! Modifier value parsing and domain projection.
//!
//! A modifier block is parsed once into a generic array with one slot per
//! known modifier key, regardless of where the modifier will be applied.
//! The converters then project that array into one of three typed layouts:
//!
//! | Domain     | Fields                                   |
//! |------------|------------------------------------------|
//! | national   | national-only keys + keys valid anywhere |
//! | provincial | province-only keys + keys valid anywhere |
//! | neutral    | keys valid anywhere                      |
//!
//! Output field `i` of a layout reads generic slot `REMAP_TABLES[domain][i]`.

use crate::diagnostics::Diagnostics;
use crate::text::TextKey;
use v2txt::{Entry, ParseError, TokenGenerator};

/// Where a modifier key has a meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    National,
    Province,
    /// Meaningful on nations and on provinces.
    Any,
}

macro_rules! modifier_keys {
    ($($variant:ident => $name:literal, $scope:ident;)*) => {
        /// Every modifier key the compiler recognizes. The discriminant is
        /// the key's generic slot.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        pub enum ModifierKey {
            $($variant),*
        }

        impl ModifierKey {
            pub const ALL: &'static [ModifierKey] = &[$(ModifierKey::$variant),*];

            pub fn name(self) -> &'static str {
                match self {
                    $(ModifierKey::$variant => $name),*
                }
            }

            pub const fn scope(self) -> Scope {
                match self {
                    $(ModifierKey::$variant => Scope::$scope),*
                }
            }

            pub fn from_name(name: &str) -> Option<ModifierKey> {
                match name {
                    $($name => Some(ModifierKey::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

modifier_keys! {
    Prestige => "prestige", National;
    Badboy => "badboy", National;
    ResearchPoints => "research_points", National;
    ResearchPointsModifier => "research_points_modifier", National;
    TaxEfficiency => "tax_efficiency", National;
    AdministrativeEfficiency => "administrative_efficiency", National;
    WarExhaustion => "war_exhaustion", National;
    MaxWarExhaustion => "max_war_exhaustion", National;
    Leadership => "leadership", National;
    LeadershipModifier => "leadership_modifier", National;
    SupplyConsumption => "supply_consumption", National;
    OrgRegain => "org_regain", National;
    LandOrganisation => "land_organisation", National;
    NavalOrganisation => "naval_organisation", National;
    RulingPartySupport => "ruling_party_support", National;
    DiplomaticPointsModifier => "diplomatic_points_modifier", National;
    MobilisationSize => "mobilisation_size", National;
    MobilisationEconomyImpact => "mobilisation_economy_impact", National;
    CorePopMilitancyModifier => "core_pop_militancy_modifier", National;
    NonAcceptedPopMilitancyModifier => "non_accepted_pop_militancy_modifier", National;
    GlobalPopulationGrowth => "global_population_growth", National;
    GlobalAssimilationRate => "global_assimilation_rate", National;
    GlobalImmigrantAttract => "global_immigrant_attract", National;
    FactoryOutput => "factory_output", National;
    FactoryInput => "factory_input", National;
    RgoOutput => "rgo_output", National;
    EducationEfficiencyModifier => "education_efficiency_modifier", National;
    SuppressionPointsModifier => "suppression_points_modifier", National;
    UncivEconomicModifier => "unciv_economic_modifier", National;
    UncivMilitaryModifier => "unciv_military_modifier", National;
    CbGenerationSpeedModifier => "cb_generation_speed_modifier", National;
    AdministrativeEfficiencyModifier => "administrative_efficiency_modifier", National;
    ResearchPointsOnConquer => "research_points_on_conquer", National;
    MinTax => "min_tax", National;
    MaxTax => "max_tax", National;
    MinTariff => "min_tariff", National;
    MaxTariff => "max_tariff", National;
    MinMilitarySpending => "min_military_spending", National;
    MaxMilitarySpending => "max_military_spending", National;
    MinSocialSpending => "min_social_spending", National;
    MaxSocialSpending => "max_social_spending", National;
    ReinforceSpeed => "reinforce_speed", National;
    LandUnitStartExperience => "land_unit_start_experience", National;
    NavalUnitStartExperience => "naval_unit_start_experience", National;
    DiplomaticPoints => "diplomatic_points", National;
    MilitaryTactics => "military_tactics", National;
    DigInCap => "dig_in_cap", National;
    CorePopConsciousnessModifier => "core_pop_consciousness_modifier", National;
    NonAcceptedPopConsciousnessModifier => "non_accepted_pop_consciousness_modifier", National;
    GlobalPopMilitancyModifier => "global_pop_militancy_modifier", National;
    GlobalPopConsciousnessModifier => "global_pop_consciousness_modifier", National;
    FactoryThroughput => "factory_throughput", National;
    FactoryOwnerCost => "factory_owner_cost", National;
    FactoryCost => "factory_cost", National;
    RgoThroughput => "rgo_throughput", National;
    ArtisanInput => "artisan_input", National;
    ArtisanOutput => "artisan_output", National;
    ArtisanThroughput => "artisan_throughput", National;
    EducationEfficiency => "education_efficiency", National;
    PoliticalReformDesire => "political_reform_desire", National;
    SocialReformDesire => "social_reform_desire", National;
    IssueChangeSpeed => "issue_change_speed", National;
    TariffEfficiencyModifier => "tariff_efficiency_modifier", National;
    LoanInterest => "loan_interest", National;
    MaxLoanModifier => "max_loan_modifier", National;
    IncreaseResearch => "increase_research", National;
    ColonialMigration => "colonial_migration", National;
    ColonialPrestige => "colonial_prestige", National;
    ColonialLifeRating => "colonial_life_rating", National;
    PermanentPrestige => "permanent_prestige", National;
    LocalRulingPartySupport => "local_ruling_party_support", Province;
    LifeRating => "life_rating", Province;
    FarmRgoSize => "farm_rgo_size", Province;
    MineRgoSize => "mine_rgo_size", Province;
    LocalFactoryInput => "local_factory_input", Province;
    LocalFactoryOutput => "local_factory_output", Province;
    LocalRgoOutput => "local_rgo_output", Province;
    SupplyLimit => "supply_limit", Province;
    Attrition => "attrition", Province;
    MaxAttrition => "max_attrition", Province;
    MovementCost => "movement_cost", Province;
    Defence => "defence", Province;
    LocalRepair => "local_repair", Province;
    LocalShipBuild => "local_ship_build", Province;
    MinBuildNavalBase => "min_build_naval_base", Province;
    MinBuildRailroad => "min_build_railroad", Province;
    MinBuildFort => "min_build_fort", Province;
    PopMilitancyModifier => "pop_militancy_modifier", Province;
    PopConsciousnessModifier => "pop_consciousness_modifier", Province;
    ImmigrantAttract => "immigrant_attract", Province;
    ImmigrantPush => "immigrant_push", Province;
    AssimilationRate => "assimilation_rate", Province;
    PopulationGrowth => "population_growth", Province;
    BoostStrongestParty => "boost_strongest_party", Province;
    NumberOfVoters => "number_of_voters", Province;
    LocalArtisanInput => "local_artisan_input", Province;
    LocalArtisanOutput => "local_artisan_output", Province;
    LocalArtisanThroughput => "local_artisan_throughput", Province;
    LocalFactoryThroughput => "local_factory_throughput", Province;
    LocalRgoThroughput => "local_rgo_throughput", Province;
    RichVote => "rich_vote", Province;
    MiddleVote => "middle_vote", Province;
    PoorVote => "poor_vote", Province;
    FlashpointTension => "flashpoint_tension", Province;
    FarmRgoEff => "farm_rgo_eff", Any;
    MineRgoEff => "mine_rgo_eff", Any;
    PoorLifeNeeds => "poor_life_needs", Any;
    MiddleLifeNeeds => "middle_life_needs", Any;
    RichLifeNeeds => "rich_life_needs", Any;
    PoorEverydayNeeds => "poor_everyday_needs", Any;
    LiteracyConImpact => "literacy_con_impact", Any;
    GoodsDemand => "goods_demand", Any;
    MiddleEverydayNeeds => "middle_everyday_needs", Any;
    RichEverydayNeeds => "rich_everyday_needs", Any;
    PoorLuxuryNeeds => "poor_luxury_needs", Any;
    MiddleLuxuryNeeds => "middle_luxury_needs", Any;
    RichLuxuryNeeds => "rich_luxury_needs", Any;
    PoorIncomeModifier => "poor_income_modifier", Any;
    MiddleIncomeModifier => "middle_income_modifier", Any;
    RichIncomeModifier => "rich_income_modifier", Any;
}

impl ModifierKey {
    #[inline]
    pub fn slot(self) -> usize {
        self as usize
    }
}

pub const GENERIC_SLOT_COUNT: usize = ModifierKey::ALL.len();
pub const NATIONAL_FIELD_COUNT: usize = field_count(ModifierDomain::National);
pub const PROVINCE_FIELD_COUNT: usize = field_count(ModifierDomain::Province);
pub const NEUTRAL_FIELD_COUNT: usize = field_count(ModifierDomain::Neutral);

const NATIONAL_FIELDS: [ModifierKey; NATIONAL_FIELD_COUNT] = remap_table(ModifierDomain::National);
const PROVINCE_FIELDS: [ModifierKey; PROVINCE_FIELD_COUNT] = remap_table(ModifierDomain::Province);
const NEUTRAL_FIELDS: [ModifierKey; NEUTRAL_FIELD_COUNT] = remap_table(ModifierDomain::Neutral);

const fn field_count(domain: ModifierDomain) -> usize {
    let mut count = 0;
    let mut i = 0;
    while i < ModifierKey::ALL.len() {
        if domain.covers(ModifierKey::ALL[i].scope()) {
            count += 1;
        }
        i += 1;
    }
    count
}

/// Keys `domain` covers, in generic slot order.
const fn remap_table<const N: usize>(domain: ModifierDomain) -> [ModifierKey; N] {
    let mut table = [ModifierKey::Prestige; N];
    let mut next = 0;
    let mut i = 0;
    while i < ModifierKey::ALL.len() {
        let key = ModifierKey::ALL[i];
        if domain.covers(key.scope()) {
            table[next] = key;
            next += 1;
        }
        i += 1;
    }
    table
}

/// Target layout of a projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierDomain {
    National = 0,
    Province = 1,
    Neutral = 2,
}

/// Per-domain remap tables, indexed by `ModifierDomain as usize`.
pub const REMAP_TABLES: [&[ModifierKey]; 3] = [&NATIONAL_FIELDS, &PROVINCE_FIELDS, &NEUTRAL_FIELDS];

impl ModifierDomain {
    pub fn remap_table(self) -> &'static [ModifierKey] {
        REMAP_TABLES[self as usize]
    }

    /// Whether keys of `scope` get a field in this layout.
    pub const fn covers(self, scope: Scope) -> bool {
        matches!(
            (self, scope),
            (ModifierDomain::National, Scope::National | Scope::Any)
                | (ModifierDomain::Province, Scope::Province | Scope::Any)
                | (ModifierDomain::Neutral, Scope::Any)
        )
    }
}

macro_rules! modifier_layout {
    ($(#[$meta:meta])* $name:ident, $table:ident, $count:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub struct $name {
            values: [f32; $count],
        }

        impl Default for $name {
            fn default() -> Self {
                Self { values: [0.0; $count] }
            }
        }

        impl $name {
            pub const FIELDS: &'static [ModifierKey] = &$table;

            fn project(generic: &[f32; GENERIC_SLOT_COUNT]) -> Self {
                let mut values = [0.0; $count];
                for (out, key) in values.iter_mut().zip($table.iter()) {
                    *out = generic[key.slot()];
                }
                Self { values }
            }

            /// Output field `i`.
            pub fn field(&self, i: usize) -> Option<f32> {
                self.values.get(i).copied()
            }

            /// Value of `key`, or `None` if the layout has no such field.
            pub fn get(&self, key: ModifierKey) -> Option<f32> {
                $table
                    .iter()
                    .position(|k| *k == key)
                    .map(|i| self.values[i])
            }

            pub fn values(&self) -> &[f32] {
                &self.values
            }

            /// Fields with a non-zero effect.
            pub fn effects(&self) -> impl Iterator<Item = (ModifierKey, f32)> + '_ {
                $table
                    .iter()
                    .copied()
                    .zip(self.values.iter().copied())
                    .filter(|(_, v)| *v != 0.0)
            }
        }
    };
}

modifier_layout!(
    /// Effects of a modifier attached to a nation.
    NationalValues,
    NATIONAL_FIELDS,
    NATIONAL_FIELD_COUNT
);
modifier_layout!(
    /// Effects of a modifier attached to a province.
    ProvinceValues,
    PROVINCE_FIELDS,
    PROVINCE_FIELD_COUNT
);
modifier_layout!(
    /// Effects that mean the same thing on a nation or a province.
    NeutralValues,
    NEUTRAL_FIELDS,
    NEUTRAL_FIELD_COUNT
);

/// A typed projection of a modifier definition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModifierValues {
    National(NationalValues),
    Province(ProvinceValues),
    Neutral(NeutralValues),
}

impl ModifierValues {
    pub fn domain(&self) -> ModifierDomain {
        match self {
            ModifierValues::National(_) => ModifierDomain::National,
            ModifierValues::Province(_) => ModifierDomain::Province,
            ModifierValues::Neutral(_) => ModifierDomain::Neutral,
        }
    }

    pub fn get(&self, key: ModifierKey) -> Option<f32> {
        match self {
            ModifierValues::National(v) => v.get(key),
            ModifierValues::Province(v) => v.get(key),
            ModifierValues::Neutral(v) => v.get(key),
        }
    }

    pub fn field(&self, i: usize) -> Option<f32> {
        match self {
            ModifierValues::National(v) => v.field(i),
            ModifierValues::Province(v) => v.field(i),
            ModifierValues::Neutral(v) => v.field(i),
        }
    }
}

/// A parsed modifier block, before it is copied into a world record.
#[derive(Debug, Clone, PartialEq)]
pub struct ModifierDefinition {
    pub icon_index: u8,
    pub name: TextKey,
    values: [f32; GENERIC_SLOT_COUNT],
    constructed_definition: Option<ModifierValues>,
}

impl Default for ModifierDefinition {
    fn default() -> Self {
        Self {
            icon_index: 0,
            name: TextKey::NULL,
            values: [0.0; GENERIC_SLOT_COUNT],
            constructed_definition: None,
        }
    }
}

impl ModifierDefinition {
    pub fn get(&self, key: ModifierKey) -> f32 {
        self.values[key.slot()]
    }

    pub fn set(&mut self, key: ModifierKey, value: f32) {
        self.values[key.slot()] = value;
    }

    /// The generic slot array shared by every projection.
    pub fn generic_values(&self) -> &[f32; GENERIC_SLOT_COUNT] {
        &self.values
    }

    /// The result of the most recent conversion.
    pub fn constructed_definition(&self) -> Option<&ModifierValues> {
        self.constructed_definition.as_ref()
    }

    pub fn convert_to_national_mod(&mut self) {
        self.constructed_definition = Some(ModifierValues::National(NationalValues::project(
            &self.values,
        )));
    }

    pub fn convert_to_province_mod(&mut self) {
        self.constructed_definition = Some(ModifierValues::Province(ProvinceValues::project(
            &self.values,
        )));
    }

    pub fn convert_to_neutral_mod(&mut self) {
        self.constructed_definition = Some(ModifierValues::Neutral(NeutralValues::project(
            &self.values,
        )));
    }

    pub fn convert_to(&mut self, domain: ModifierDomain) {
        match domain {
            ModifierDomain::National => self.convert_to_national_mod(),
            ModifierDomain::Province => self.convert_to_province_mod(),
            ModifierDomain::Neutral => self.convert_to_neutral_mod(),
        }
    }

    /// Applies one entry of a modifier block. Anything that is not a known
    /// `key = number` pair or `icon = n` is reported and skipped.
    pub fn apply_entry(
        &mut self,
        entry: Result<Entry, ParseError>,
        tg: &mut TokenGenerator,
        err: &mut Diagnostics,
    ) {
        match entry {
            Err(e) => err.push_parse_error(&e),
            Ok(Entry::KeyValue { key, value, line }) if key == "icon" => {
                match value.as_i32().and_then(|i| u8::try_from(i).ok()) {
                    Some(icon) => self.icon_index = icon,
                    None => err.push(line, format!("invalid icon index '{}'", value.to_text())),
                }
            }
            Ok(Entry::KeyValue { key, value, line }) => match ModifierKey::from_name(&key) {
                Some(k) => match value.as_f32() {
                    Some(v) => self.set(k, v),
                    None => err.push(
                        line,
                        format!("modifier key '{}' expects a number, found '{}'", key, value.to_text()),
                    ),
                },
                None => err.push(line, format!("unknown modifier key '{}'", key)),
            },
            Ok(Entry::KeyGroup { key, line }) => {
                err.push(line, format!("unexpected block '{}' in modifier", key));
                tg.discard_group();
            }
            Ok(Entry::Group { line }) => {
                err.push(line, "unexpected block in modifier");
                tg.discard_group();
            }
            Ok(Entry::Value { value, line }) => {
                err.push(line, format!("unexpected value '{}' in modifier", value.to_text()));
            }
        }
    }
}

/// Reads a modifier block up to the end of the current group.
pub fn parse_modifier_base(tg: &mut TokenGenerator, err: &mut Diagnostics) -> ModifierDefinition {
    let mut def = ModifierDefinition::default();
    while let Some(entry) = tg.next_entry() {
        def.apply_entry(entry, tg, err);
    }
    def
}
