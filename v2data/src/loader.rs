//! Loads a scenario from a game directory in dependency order.
//!
//! Unit types and identities come first because country files refer to
//! them; modifiers come before triggered modifiers so trigger references to
//! ordinary modifiers resolve.

use crate::config::LoadConfig;
use crate::context::ScenarioBuildingContext;
use crate::diagnostics::Diagnostics;
use crate::nations::{
    country_file_path, parse_country_file, parse_national_identity_file, parse_unit_type_file,
};
use crate::static_modifiers::{
    parse_event_modifiers_file, parse_national_values_file, parse_static_modifiers_file,
};
use crate::triggered::{finish_all, scan_triggered_modifiers};
use crate::world::NationalIdentityId;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use v2txt::{DefaultV2Txt, TokenGenerator, V2Txt};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Game directory not found: {0}")]
    RootNotFound(PathBuf),
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result of a load: the filled context plus everything that went wrong.
#[derive(Debug)]
pub struct LoadReport {
    pub context: ScenarioBuildingContext,
    pub diagnostics: Diagnostics,
    pub files_read: usize,
}

impl LoadReport {
    /// Whether `config` asks for this load to count as a failure.
    pub fn is_failure(&self, config: &LoadConfig) -> bool {
        config.fail_on_diagnostics && !self.diagnostics.is_empty()
    }

    /// One-line record counts.
    pub fn summary(&self) -> String {
        let world = &self.context.state.world;
        format!(
            "{} files, {} modifiers ({} triggered), {} identities, {} parties, {} unit types, {} diagnostics",
            self.files_read,
            world.modifier_size(),
            self.context.state.national_definitions.triggered_modifiers.len(),
            world.national_identity_size(),
            world.political_party_size(),
            world.unit_type_size(),
            self.diagnostics.len(),
        )
    }
}

struct Loader<'a> {
    root: &'a Path,
    ctx: ScenarioBuildingContext,
    err: Diagnostics,
    files_read: usize,
}

impl Loader<'_> {
    /// Tokenizes `rel` (relative to the root). A missing file is skipped.
    fn open(&mut self, rel: &str) -> Result<Option<TokenGenerator>, LoadError> {
        let path = self.root.join(rel);
        if !path.is_file() {
            log::warn!("{} not found, skipping", path.display());
            return Ok(None);
        }
        let tokens = DefaultV2Txt::open_txt(&path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        self.err.set_file(rel);
        self.files_read += 1;
        Ok(Some(TokenGenerator::new(tokens)))
    }

    fn run(
        &mut self,
        rel: &str,
        parse: fn(&mut TokenGenerator, &mut Diagnostics, &mut ScenarioBuildingContext),
    ) -> Result<(), LoadError> {
        if let Some(mut tg) = self.open(rel)? {
            parse(&mut tg, &mut self.err, &mut self.ctx);
        }
        Ok(())
    }

    fn unit_files(&self) -> Result<Vec<String>, LoadError> {
        let dir = self.root.join("units");
        if !dir.is_dir() {
            log::warn!("{} not found, no unit types", dir.display());
            return Ok(Vec::new());
        }
        let entries = std::fs::read_dir(&dir).map_err(|source| LoadError::Io {
            path: dir.clone(),
            source,
        })?;
        let mut files: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "txt"))
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(|n| format!("units/{}", n)))
            .collect();
        files.sort();
        Ok(files)
    }

    fn load_triggered_modifiers(&mut self) -> Result<(), LoadError> {
        let rel = "common/triggered_modifiers.txt";
        let Some(mut tg) = self.open(rel)? else {
            return Ok(());
        };
        let pending = scan_triggered_modifiers(&mut tg, &mut self.err, &mut self.ctx);
        finish_all(&pending, &mut self.err, &mut self.ctx);
        Ok(())
    }

    fn load_country_files(&mut self) -> Result<(), LoadError> {
        let files: Vec<(NationalIdentityId, String)> = (0..self.ctx.state.world.national_identity_size())
            .map(|i| NationalIdentityId(i as u32))
            .filter_map(|id| {
                self.ctx
                    .file_name_for_ident(id)
                    .map(|name| (id, format!("common/{}", country_file_path(name))))
            })
            .collect();

        for (ident, rel) in files {
            if let Some(mut tg) = self.open(&rel)? {
                parse_country_file(ident, &mut tg, &mut self.err, &mut self.ctx);
            }
        }
        Ok(())
    }
}

/// Loads every supported file under `root`.
///
/// Only I/O failures are errors; malformed content ends up in
/// [`LoadReport::diagnostics`].
pub fn load_scenario(root: &Path, config: &LoadConfig) -> Result<LoadReport, LoadError> {
    if !root.is_dir() {
        return Err(LoadError::RootNotFound(root.to_path_buf()));
    }
    log::info!("Loading scenario from {}", root.display());

    let mut loader = Loader {
        root,
        ctx: ScenarioBuildingContext::new(),
        err: Diagnostics::default(),
        files_read: 0,
    };

    for rel in loader.unit_files()? {
        loader.run(&rel, parse_unit_type_file)?;
    }
    log::info!("Loaded {} unit types", loader.ctx.state.world.unit_type_size());

    loader.run("common/countries.txt", parse_national_identity_file)?;
    log::info!(
        "Loaded {} national identities",
        loader.ctx.state.world.national_identity_size()
    );

    loader.run("common/static_modifiers.txt", parse_static_modifiers_file)?;
    loader.run("common/nationalvalues.txt", parse_national_values_file)?;
    loader.run("common/event_modifiers.txt", parse_event_modifiers_file)?;
    loader.load_triggered_modifiers()?;
    log::info!("Loaded {} modifiers", loader.ctx.state.world.modifier_size());

    loader.load_country_files()?;

    let report = LoadReport {
        context: loader.ctx,
        diagnostics: loader.err,
        files_read: loader.files_read,
    };
    log::info!("{}", report.summary());
    if report.is_failure(config) {
        log::warn!("Load finished with {} diagnostics", report.diagnostics.len());
    }
    Ok(report)
}
