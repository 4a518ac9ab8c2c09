//! Handle-based entity store filled by the scenario compiler.
//!
//! Records are only ever appended. Each kind has a `create_<kind>` that
//! returns a typed handle, and fields change only through named setters.

use crate::modifiers::{ModifierValues, NationalValues, NeutralValues, ProvinceValues};
use crate::text::TextKey;
use std::collections::HashMap;
use std::str::FromStr;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Hash, Eq, PartialEq, Clone, Copy, Debug, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

handle!(
    /// Handle to a [`ModifierRecord`].
    ModifierId
);
handle!(
    /// Handle to a [`NationalIdentityRecord`].
    NationalIdentityId
);
handle!(
    /// Handle to a [`PoliticalPartyRecord`].
    ///
    /// Parties of one identity are created back to back, so an identity
    /// stores only its first party and a count.
    PoliticalPartyId
);
handle!(UnitTypeId);

/// Packed 3-byte country tag (`FRA`, `ENG`, ...).
#[derive(Hash, Eq, PartialEq, Clone, Copy, Debug, Default, PartialOrd, Ord)]
pub struct NationalTag(pub u32);

/// A calendar date as written in script files (`1836.1.1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date {
    pub year: i32,
    pub month: u8, // 1-12
    pub day: u8,   // 1-31
}

impl Date {
    pub fn new(year: i32, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }
}

impl Default for Date {
    fn default() -> Self {
        Self::new(1836, 1, 1)
    }
}

impl std::fmt::Display for Date {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.year, self.month, self.day)
    }
}

impl FromStr for Date {
    type Err = String;

    /// Parses `Y.M.D`; month and day default to 1 when omitted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('.');
        let year = parts
            .next()
            .and_then(|y| y.trim().parse::<i32>().ok())
            .ok_or_else(|| format!("invalid date '{}'", s))?;
        let mut next_component = |max: u8| -> Result<u8, String> {
            match parts.next() {
                None => Ok(1),
                Some(p) => p
                    .trim()
                    .parse::<u8>()
                    .ok()
                    .filter(|v| (1..=max).contains(v))
                    .ok_or_else(|| format!("invalid date '{}'", s)),
            }
        };
        let month = next_component(12)?;
        let day = next_component(31)?;
        Ok(Date::new(year, month, day))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModifierRecord {
    pub icon: u8,
    pub name: TextKey,
    /// Typed effect values; which layout is chosen by the code that created
    /// the record.
    pub values: Option<ModifierValues>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NationalIdentityRecord {
    pub identifying_int: NationalTag,
    pub name: TextKey,
    pub adjective: TextKey,
    pub color: Option<[u8; 3]>,
    pub graphical_culture: TextKey,
    pub political_party_first: Option<PoliticalPartyId>,
    pub political_party_count: u8,
    pub unit_names: HashMap<UnitTypeId, Vec<TextKey>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoliticalPartyRecord {
    pub name: TextKey,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub ideology: TextKey,
    /// Issue name -> chosen option, in declaration order.
    pub policies: Vec<(TextKey, TextKey)>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitTypeRecord {
    pub name: TextKey,
}

#[derive(Debug, Clone, Default)]
pub struct WorldStore {
    modifiers: Vec<ModifierRecord>,
    national_identities: Vec<NationalIdentityRecord>,
    political_parties: Vec<PoliticalPartyRecord>,
    unit_types: Vec<UnitTypeRecord>,
}

impl WorldStore {
    pub fn new() -> Self {
        Self::default()
    }

    // --- modifiers ---

    pub fn create_modifier(&mut self) -> ModifierId {
        self.modifiers.push(ModifierRecord::default());
        ModifierId((self.modifiers.len() - 1) as u32)
    }

    pub fn modifier_size(&self) -> usize {
        self.modifiers.len()
    }

    pub fn modifier(&self, id: ModifierId) -> &ModifierRecord {
        &self.modifiers[id.index()]
    }

    pub fn modifier_set_icon(&mut self, id: ModifierId, icon: u8) {
        self.modifiers[id.index()].icon = icon;
    }

    pub fn modifier_set_name(&mut self, id: ModifierId, name: TextKey) {
        self.modifiers[id.index()].name = name;
    }

    pub fn modifier_set_national_values(&mut self, id: ModifierId, values: NationalValues) {
        self.modifiers[id.index()].values = Some(ModifierValues::National(values));
    }

    pub fn modifier_set_province_values(&mut self, id: ModifierId, values: ProvinceValues) {
        self.modifiers[id.index()].values = Some(ModifierValues::Province(values));
    }

    pub fn modifier_set_neutral_values(&mut self, id: ModifierId, values: NeutralValues) {
        self.modifiers[id.index()].values = Some(ModifierValues::Neutral(values));
    }

    // --- national identities ---

    pub fn create_national_identity(&mut self) -> NationalIdentityId {
        self.national_identities
            .push(NationalIdentityRecord::default());
        NationalIdentityId((self.national_identities.len() - 1) as u32)
    }

    pub fn national_identity_size(&self) -> usize {
        self.national_identities.len()
    }

    pub fn national_identity(&self, id: NationalIdentityId) -> &NationalIdentityRecord {
        &self.national_identities[id.index()]
    }

    pub fn national_identity_set_identifying_int(&mut self, id: NationalIdentityId, tag: NationalTag) {
        self.national_identities[id.index()].identifying_int = tag;
    }

    pub fn national_identity_set_name(&mut self, id: NationalIdentityId, name: TextKey) {
        self.national_identities[id.index()].name = name;
    }

    pub fn national_identity_set_adjective(&mut self, id: NationalIdentityId, adjective: TextKey) {
        self.national_identities[id.index()].adjective = adjective;
    }

    pub fn national_identity_set_color(&mut self, id: NationalIdentityId, color: [u8; 3]) {
        self.national_identities[id.index()].color = Some(color);
    }

    pub fn national_identity_set_graphical_culture(&mut self, id: NationalIdentityId, culture: TextKey) {
        self.national_identities[id.index()].graphical_culture = culture;
    }

    pub fn national_identity_get_political_party_first(
        &self,
        id: NationalIdentityId,
    ) -> Option<PoliticalPartyId> {
        self.national_identities[id.index()].political_party_first
    }

    pub fn national_identity_set_political_party_first(
        &mut self,
        id: NationalIdentityId,
        party: PoliticalPartyId,
    ) {
        self.national_identities[id.index()].political_party_first = Some(party);
    }

    pub fn national_identity_get_political_party_count(&self, id: NationalIdentityId) -> u8 {
        self.national_identities[id.index()].political_party_count
    }

    pub fn national_identity_set_political_party_count(&mut self, id: NationalIdentityId, count: u8) {
        self.national_identities[id.index()].political_party_count = count;
    }

    pub fn national_identity_add_unit_name(
        &mut self,
        id: NationalIdentityId,
        unit_type: UnitTypeId,
        name: TextKey,
    ) {
        self.national_identities[id.index()]
            .unit_names
            .entry(unit_type)
            .or_default()
            .push(name);
    }

    pub fn national_identity_get_unit_names(
        &self,
        id: NationalIdentityId,
        unit_type: UnitTypeId,
    ) -> &[TextKey] {
        self.national_identities[id.index()]
            .unit_names
            .get(&unit_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    // --- political parties ---

    pub fn create_political_party(&mut self) -> PoliticalPartyId {
        self.political_parties.push(PoliticalPartyRecord::default());
        PoliticalPartyId((self.political_parties.len() - 1) as u32)
    }

    pub fn political_party_size(&self) -> usize {
        self.political_parties.len()
    }

    pub fn political_party(&self, id: PoliticalPartyId) -> &PoliticalPartyRecord {
        &self.political_parties[id.index()]
    }

    pub fn political_party_set_name(&mut self, id: PoliticalPartyId, name: TextKey) {
        self.political_parties[id.index()].name = name;
    }

    pub fn political_party_set_start_date(&mut self, id: PoliticalPartyId, date: Date) {
        self.political_parties[id.index()].start_date = Some(date);
    }

    pub fn political_party_set_end_date(&mut self, id: PoliticalPartyId, date: Date) {
        self.political_parties[id.index()].end_date = Some(date);
    }

    pub fn political_party_set_ideology(&mut self, id: PoliticalPartyId, ideology: TextKey) {
        self.political_parties[id.index()].ideology = ideology;
    }

    /// Sets the party's stance on `issue`, replacing an earlier stance.
    pub fn political_party_set_policy(&mut self, id: PoliticalPartyId, issue: TextKey, option: TextKey) {
        let policies = &mut self.political_parties[id.index()].policies;
        match policies.iter_mut().find(|(i, _)| *i == issue) {
            Some(existing) => existing.1 = option,
            None => policies.push((issue, option)),
        }
    }

    // --- unit types ---

    pub fn create_unit_type(&mut self) -> UnitTypeId {
        self.unit_types.push(UnitTypeRecord::default());
        UnitTypeId((self.unit_types.len() - 1) as u32)
    }

    pub fn unit_type_size(&self) -> usize {
        self.unit_types.len()
    }

    pub fn unit_type(&self, id: UnitTypeId) -> &UnitTypeRecord {
        &self.unit_types[id.index()]
    }

    pub fn unit_type_set_name(&mut self, id: UnitTypeId, name: TextKey) {
        self.unit_types[id.index()].name = name;
    }
}
