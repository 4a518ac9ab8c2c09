//! National identities, country files and unit types.

use crate::context::ScenarioBuildingContext;
use crate::diagnostics::Diagnostics;
use crate::static_modifiers::parse_named_groups;
use crate::world::{Date, NationalIdentityId, NationalTag, PoliticalPartyId};
use v2txt::{Entry, TokenGenerator};

/// Packs a tag into an integer, first byte most significant.
pub fn tag_to_int(a: u8, b: u8, c: u8) -> NationalTag {
    NationalTag((u32::from(a) << 16) | (u32::from(b) << 8) | u32::from(c))
}

pub fn int_to_tag(tag: NationalTag) -> [u8; 3] {
    [(tag.0 >> 16) as u8, (tag.0 >> 8) as u8, tag.0 as u8]
}

impl std::fmt::Display for NationalTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&int_to_tag(*self)))
    }
}

/// Country file path relative to `common/` for a `countries.txt` value.
pub fn country_file_path(declared: &str) -> String {
    if declared.ends_with(".txt") {
        declared.to_string()
    } else {
        format!("countries/{}.txt", declared)
    }
}

/// Handles one `TAG = "Name"` line of `countries.txt`.
///
/// Returns `None` when the tag is not exactly three bytes; nothing is created
/// in that case. A repeated tag creates a new identity and takes over the
/// tag's lookup entry.
pub fn register_national_identity(
    tag: &str,
    name: &str,
    line: u32,
    err: &mut Diagnostics,
    ctx: &mut ScenarioBuildingContext,
) -> Option<NationalIdentityId> {
    let &[a, b, c] = tag.as_bytes() else {
        err.push(line, "encountered a tag that was not three characters");
        return None;
    };
    let packed = tag_to_int(a, b, c);
    let ident = ctx.state.world.create_national_identity();

    let name_id = ctx.state.text.find_or_add_key(name);
    let adj_id = ctx.state.text.find_or_add_key(&format!("{}_ADJ", name));
    let world = &mut ctx.state.world;
    world.national_identity_set_identifying_int(ident, packed);
    world.national_identity_set_name(ident, name_id);
    world.national_identity_set_adjective(ident, adj_id);

    ctx.file_names_for_idents
        .resize(world.national_identity_size(), String::new());
    ctx.file_names_for_idents[ident.index()] = name.to_string();
    ctx.map_of_ident_names.insert(packed, ident);

    log::debug!("registered {} as '{}'", packed, name);
    Some(ident)
}

pub fn parse_national_identity_file(
    tg: &mut TokenGenerator,
    err: &mut Diagnostics,
    ctx: &mut ScenarioBuildingContext,
) {
    while let Some(entry) = tg.next_entry() {
        match entry {
            Ok(Entry::KeyValue { key, value, line }) => {
                register_national_identity(&key, &value.to_text(), line, err, ctx);
            }
            Ok(Entry::KeyGroup { key, line }) => {
                err.push(line, format!("unexpected block '{}' in identity list", key));
                tg.discard_group();
            }
            Ok(Entry::Group { line }) => {
                err.push(line, "unexpected block in identity list");
                tg.discard_group();
            }
            Ok(Entry::Value { value, line }) => {
                err.push(line, format!("unexpected value '{}' in identity list", value.to_text()));
            }
            Err(e) => err.push_parse_error(&e),
        }
    }
}

/// Registers every top-level `name = { ... }` of a unit file as a unit type.
pub fn parse_unit_type_file(
    tg: &mut TokenGenerator,
    err: &mut Diagnostics,
    ctx: &mut ScenarioBuildingContext,
) {
    parse_named_groups(tg, err, |name, _, tg, _| {
        ctx.register_unit_type(name);
        tg.discard_group();
    });
}

/// Reads one identity's country file.
pub fn parse_country_file(
    ident: NationalIdentityId,
    tg: &mut TokenGenerator,
    err: &mut Diagnostics,
    ctx: &mut ScenarioBuildingContext,
) {
    while let Some(entry) = tg.next_entry() {
        match entry {
            Ok(Entry::KeyGroup { key, line }) => match key.as_str() {
                "color" => parse_color(ident, line, tg, err, ctx),
                "party" => {
                    make_party(ident, tg, err, ctx);
                }
                "unit_names" => parse_unit_names(ident, tg, err, ctx),
                _ => {
                    err.push(line, format!("unknown country block '{}'", key));
                    tg.discard_group();
                }
            },
            Ok(Entry::KeyValue { key, value, line }) => match key.as_str() {
                "graphical_culture" => {
                    let culture = ctx.state.text.add_unique_to_pool(&value.to_text());
                    ctx.state
                        .world
                        .national_identity_set_graphical_culture(ident, culture);
                }
                _ => err.push(line, format!("unknown country key '{}'", key)),
            },
            Ok(Entry::Group { line }) => {
                err.push(line, "unexpected unnamed block");
                tg.discard_group();
            }
            Ok(Entry::Value { value, line }) => {
                err.push(line, format!("unexpected value '{}'", value.to_text()));
            }
            Err(e) => err.push_parse_error(&e),
        }
    }
}

fn parse_color(
    ident: NationalIdentityId,
    line: u32,
    tg: &mut TokenGenerator,
    err: &mut Diagnostics,
    ctx: &mut ScenarioBuildingContext,
) {
    let mut components = Vec::with_capacity(3);
    while let Some(entry) = tg.next_entry() {
        match entry {
            Ok(Entry::Value { value, line }) => {
                match value.as_i32().and_then(|v| u8::try_from(v).ok()) {
                    Some(v) => components.push(v),
                    None => err.push(line, format!("invalid color component '{}'", value.to_text())),
                }
            }
            Ok(Entry::KeyGroup { line, .. }) | Ok(Entry::Group { line }) => {
                err.push(line, "unexpected block in color");
                tg.discard_group();
            }
            Ok(Entry::KeyValue { key, line, .. }) => {
                err.push(line, format!("unexpected key '{}' in color", key));
            }
            Err(e) => err.push_parse_error(&e),
        }
    }
    match components.as_slice() {
        &[r, g, b] => ctx.state.world.national_identity_set_color(ident, [r, g, b]),
        _ => err.push(line, format!("color needs 3 components, found {}", components.len())),
    }
}

/// Creates a party for `ident`. Parties of one identity are contiguous, so
/// only the first one is linked and later ones bump the count.
pub fn make_party(
    ident: NationalIdentityId,
    tg: &mut TokenGenerator,
    err: &mut Diagnostics,
    ctx: &mut ScenarioBuildingContext,
) -> PoliticalPartyId {
    let world = &mut ctx.state.world;
    let party = world.create_political_party();
    if world.national_identity_get_political_party_first(ident).is_none() {
        world.national_identity_set_political_party_first(ident, party);
        world.national_identity_set_political_party_count(ident, 1);
    } else {
        let count = world.national_identity_get_political_party_count(ident);
        world.national_identity_set_political_party_count(ident, count.saturating_add(1));
    }

    while let Some(entry) = tg.next_entry() {
        match entry {
            Ok(Entry::KeyValue { key, value, line }) => {
                let text = value.to_text();
                match key.as_str() {
                    "name" => {
                        let name = ctx.state.text.find_or_add_key(&text);
                        ctx.state.world.political_party_set_name(party, name);
                    }
                    "start_date" | "end_date" => match text.parse::<Date>() {
                        Ok(date) if key == "start_date" => {
                            ctx.state.world.political_party_set_start_date(party, date)
                        }
                        Ok(date) => ctx.state.world.political_party_set_end_date(party, date),
                        Err(e) => err.push(line, e),
                    },
                    "ideology" => {
                        let ideology = ctx.state.text.add_unique_to_pool(&text);
                        ctx.state.world.political_party_set_ideology(party, ideology);
                    }
                    issue if issue.ends_with("_policy") => {
                        let issue = ctx.state.text.add_unique_to_pool(issue);
                        let option = ctx.state.text.add_unique_to_pool(&text);
                        ctx.state.world.political_party_set_policy(party, issue, option);
                    }
                    _ => err.push(line, format!("unknown party key '{}'", key)),
                }
            }
            Ok(Entry::KeyGroup { key, line }) => {
                err.push(line, format!("unexpected block '{}' in party", key));
                tg.discard_group();
            }
            Ok(Entry::Group { line }) => {
                err.push(line, "unexpected block in party");
                tg.discard_group();
            }
            Ok(Entry::Value { value, line }) => {
                err.push(line, format!("unexpected value '{}' in party", value.to_text()));
            }
            Err(e) => err.push_parse_error(&e),
        }
    }
    party
}

fn parse_unit_names(
    ident: NationalIdentityId,
    tg: &mut TokenGenerator,
    err: &mut Diagnostics,
    ctx: &mut ScenarioBuildingContext,
) {
    parse_named_groups(tg, err, |unit_type, line, tg, err| {
        make_unit_names_list(ident, unit_type, line, tg, err, ctx);
    });
}

/// Reads `<unit_type> = { "Name" ... }`. An unknown unit type skips the list.
pub fn make_unit_names_list(
    ident: NationalIdentityId,
    unit_type: &str,
    line: u32,
    tg: &mut TokenGenerator,
    err: &mut Diagnostics,
    ctx: &mut ScenarioBuildingContext,
) {
    let Some(&found) = ctx.map_of_unit_types.get(unit_type) else {
        err.push(line, format!("no unit type named '{}'", unit_type));
        tg.discard_group();
        return;
    };
    while let Some(entry) = tg.next_entry() {
        match entry {
            Ok(Entry::Value { value, .. }) => {
                let name = ctx.state.text.add_to_pool(&value.to_text());
                ctx.state.world.national_identity_add_unit_name(ident, found, name);
            }
            Ok(Entry::KeyGroup { line, .. }) | Ok(Entry::Group { line }) => {
                err.push(line, "unexpected block in unit name list");
                tg.discard_group();
            }
            Ok(Entry::KeyValue { key, line, .. }) => {
                err.push(line, format!("unexpected key '{}' in unit name list", key));
            }
            Err(e) => err.push_parse_error(&e),
        }
    }
}
