//! Scanner: recursive traversal and rule application
//!
//! Depth-first, pre-order walk over the filesystem provider. Each
//! directory runs, in order: component detectors, virtual merges,
//! auxiliary detectors, license detection, file/extension matchers,
//! content matchers with the validation gate, language counting, then
//! recursion into subdirectories with the current context.

mod ignore;

pub use ignore::IgnorePolicy;

use crate::classifier::Classifier;
use crate::deps::DependencyResolver;
use crate::detectors::{
    self, detect_directory_licenses, ComponentDetector, Detection, DetectorContext,
    DotenvDetector, GithubActionsDetector, JsonSchemaDetector,
};
use crate::error::{ConfigError, ScanError};
use crate::fs::{DirEntry, FileSystem, FileType};
use crate::matchers::{ContentMatchers, FileMatchers};
use crate::payload::Payload;
use crate::rules::{self, RuleSet};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Default size ceiling for structured-path content predicates.
pub const DEFAULT_STRUCTURED_CEILING: u64 = 500_000;
/// Default size ceiling for regex body content predicates.
pub const DEFAULT_BODY_CEILING: u64 = 5_000_000;

/// A tech forced into the root payload by project configuration.
#[derive(Debug, Clone)]
pub struct ForcedTech {
    pub tech: String,
    pub reason: Option<String>,
}

/// Scan-level options supplied by the host.
pub struct ScanOptions {
    pub exclude: Vec<String>,
    pub forced_techs: Vec<ForcedTech>,
    pub structured_content_ceiling: u64,
    pub body_content_ceiling: u64,
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            forced_techs: Vec::new(),
            structured_content_ceiling: DEFAULT_STRUCTURED_CEILING,
            body_content_ceiling: DEFAULT_BODY_CEILING,
            cancel: None,
        }
    }
}

/// The read-only rule machinery, built once and shared by reference.
pub struct Engine {
    pub rules: RuleSet,
    pub classifier: Classifier,
    pub resolver: DependencyResolver,
    pub file_matchers: FileMatchers,
    pub content_matchers: ContentMatchers,
}

impl Engine {
    pub fn load() -> Result<Self, ConfigError> {
        let rules = rules::load_rules()?;
        let types = rules::load_types_config()?;

        let resolver = DependencyResolver::from_rules(&rules);
        let file_matchers = FileMatchers::from_rules(&rules);
        let content_matchers = ContentMatchers::from_rules(&rules);

        Ok(Self {
            rules,
            classifier: Classifier::new(types),
            resolver,
            file_matchers,
            content_matchers,
        })
    }
}

pub struct Scanner {
    engine: Arc<Engine>,
    fs: Arc<dyn FileSystem>,
    base_path: PathBuf,
    detectors: Vec<Box<dyn ComponentDetector>>,
    aux_detectors: Vec<Box<dyn ComponentDetector>>,
    ignore: IgnorePolicy,
    options: ScanOptions,
}

impl Scanner {
    pub fn new(
        engine: Arc<Engine>,
        fs: Arc<dyn FileSystem>,
        base_path: PathBuf,
        options: ScanOptions,
    ) -> Self {
        let ignore = IgnorePolicy::new(&options.exclude);

        Self {
            engine,
            fs,
            base_path,
            detectors: detectors::default_detectors(),
            aux_detectors: vec![
                Box::new(GithubActionsDetector),
                Box::new(DotenvDetector),
                Box::new(JsonSchemaDetector),
            ],
            ignore,
            options,
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Scans the whole tree and returns the root payload.
    pub fn scan(&self) -> Result<Payload, ScanError> {
        debug!(path = %self.base_path.display(), "scan start");

        // the root must be listable; anything below degrades gracefully
        if let Err(e) = self.fs.read_dir(&self.base_path) {
            return Err(ScanError::Provider {
                path: self.base_path.clone(),
                reason: e.to_string(),
            });
        }

        let mut payload = Payload::with_path("main", "/");

        for forced in &self.options.forced_techs {
            let reason = forced
                .reason
                .clone()
                .unwrap_or_else(|| "declared in project configuration".to_string());
            payload.add_tech(&forced.tech, &reason);
        }

        self.recurse(&mut payload, &self.base_path)?;

        // renumber ids so identical inputs yield identical trees
        payload.assign_ids();

        debug!(
            components = payload.component_count(),
            files = payload.file_count(),
            "scan complete"
        );

        Ok(payload)
    }

    /// Scans a single file as if it were the only entry of its directory.
    pub fn scan_file(&self, file_name: &str) -> Result<Payload, ScanError> {
        let full = self.base_path.join(file_name);
        let size = self.fs.metadata(&full).map(|m| m.size).unwrap_or(0);

        let files = vec![DirEntry {
            path: full,
            name: file_name.to_string(),
            file_type: FileType::File,
            size,
        }];

        let mut payload = Payload::with_path("main", "/");
        let child_idx = self.apply_rules(&mut payload, &files, &self.base_path)?;

        let ctx = match child_idx {
            Some(idx) => &mut payload.childs[idx],
            None => &mut payload,
        };
        if let Some((language, _)) = crate::languages::detect_language(file_name) {
            ctx.add_language(language);
        }

        payload.assign_ids();

        Ok(payload)
    }

    fn check_cancel(&self) -> Result<(), ScanError> {
        if let Some(cancel) = &self.options.cancel {
            if cancel.load(Ordering::Relaxed) {
                return Err(ScanError::Canceled);
            }
        }
        Ok(())
    }

    fn recurse(&self, payload: &mut Payload, dir: &Path) -> Result<(), ScanError> {
        self.check_cancel()?;
        trace!(dir = %dir.display(), "entering directory");

        let listing = match self.fs.read_dir(dir) {
            Ok(listing) => listing,
            Err(e) => {
                // subtree is skipped, siblings continue
                warn!(dir = %dir.display(), error = %e, "directory listing failed");
                return Ok(());
            }
        };

        // excluded files are invisible to every later step
        let files: Vec<DirEntry> = listing
            .into_iter()
            .filter(|entry| {
                if entry.file_type != FileType::File {
                    return true;
                }
                let rel = detectors::relative_file_path(&self.base_path, dir, &entry.name);
                !self.ignore.is_excluded_file(&rel, &entry.name)
            })
            .collect();

        let child_idx = self.apply_rules(payload, &files, dir)?;
        let ctx = match child_idx {
            Some(idx) => &mut payload.childs[idx],
            None => payload,
        };

        // language attribution for regular files
        for file in files.iter().filter(|f| f.file_type == FileType::File) {
            if let Some((language, _)) = crate::languages::detect_language(&file.name) {
                ctx.add_language(language);
            }
        }

        // recurse into subdirectories with the current context
        for entry in files.iter().filter(|f| f.file_type == FileType::Directory) {
            self.check_cancel()?;

            if self.ignore.is_ignored_dir(&entry.name) {
                trace!(dir = %entry.name, "skipping ignored directory");
                continue;
            }

            self.recurse(ctx, &dir.join(&entry.name))?;
        }

        Ok(())
    }

    /// Runs detectors and matchers for one directory. Returns the index of
    /// the child component that becomes the context, if one was created.
    fn apply_rules(
        &self,
        payload: &mut Payload,
        files: &[DirEntry],
        dir: &Path,
    ) -> Result<Option<usize>, ScanError> {
        let detector_ctx = DetectorContext {
            files,
            current_path: dir,
            base_path: &self.base_path,
            fs: self.fs.as_ref(),
            resolver: &self.engine.resolver,
            rules: &self.engine.rules,
        };

        // 1. component detectors
        let mut named: Vec<Payload> = Vec::new();
        let mut virtuals: Vec<Payload> = Vec::new();
        for detector in &self.detectors {
            for detection in detector.detect(&detector_ctx) {
                match detection {
                    Detection::Named(p) => named.push(p),
                    Detection::Virtual(p) => virtuals.push(p),
                }
            }
        }

        // 2. attach named components; several in one directory merge into
        // a single hybrid component
        let child_idx = match named.len() {
            0 => None,
            _ => {
                let mut merged = named.remove(0);
                for other in named {
                    merged.merge_component(other);
                }
                Some(self.attach_named_component(payload, merged))
            }
        };

        {
            let ctx = match child_idx {
                Some(idx) => &mut payload.childs[idx],
                None => &mut *payload,
            };

            // 3. virtual fragments merge into the current context
            for fragment in virtuals {
                self.merge_virtual(ctx, fragment, dir);
            }

            // 4. auxiliary detectors (virtual-only)
            for detector in &self.aux_detectors {
                for detection in detector.detect(&detector_ctx) {
                    match detection {
                        Detection::Virtual(fragment) => self.merge_virtual(ctx, fragment, dir),
                        Detection::Named(component) => {
                            ctx.add_child(component);
                        }
                    }
                }
            }

            // 5. licenses from LICENSE files in this directory
            for license in detect_directory_licenses(&detector_ctx) {
                ctx.add_license(&license);
            }

            // 6.-8. file, extension, and content matchers with the
            // content-validation gate
            self.apply_matchers(ctx, files, dir);
        }

        Ok(child_idx)
    }

    fn apply_matchers(&self, ctx: &mut Payload, files: &[DirEntry], dir: &Path) {
        let mut matched: BTreeSet<String> = BTreeSet::new();

        // file matchers create edges for their implicit components
        let current = detectors::relative_dir_path(&self.base_path, dir);
        let file_matches = self.engine.file_matchers.match_files(files, &current);
        for (tech, reasons) in file_matches {
            if matched.contains(&tech) {
                continue;
            }
            for reason in &reasons {
                self.add_tech_with_primary_check(ctx, &tech, reason);
            }
            matched.insert(tech.clone());
            self.find_implicit_component(ctx, &tech, &current, true);
        }

        // extension matchers never create edges
        let mut by_extension: BTreeSet<String> = BTreeSet::new();
        let extension_matches = self.engine.file_matchers.match_extensions(files);
        for (tech, reasons) in extension_matches {
            if matched.contains(&tech) {
                continue;
            }
            for reason in &reasons {
                self.add_tech_with_primary_check(ctx, &tech, reason);
            }
            matched.insert(tech.clone());
            by_extension.insert(tech.clone());
            self.find_implicit_component(ctx, &tech, &current, false);
        }

        // content matchers, reading each candidate file at most once
        let mut validated: BTreeSet<String> = BTreeSet::new();
        for file in files.iter().filter(|f| f.file_type == FileType::File) {
            let ext = crate::matchers::extension_of(&file.name);
            let wants_ext = ext
                .as_deref()
                .map(|e| self.engine.content_matchers.has_extension_matchers(e))
                .unwrap_or(false);
            let wants_name = self.engine.content_matchers.has_filename_matchers(&file.name);

            if !wants_ext && !wants_name {
                continue;
            }
            if file.size > self.options.body_content_ceiling {
                continue;
            }

            let content = match self.fs.read_to_string(&dir.join(&file.name)) {
                Ok(content) => content,
                Err(e) => {
                    trace!(file = %file.name, error = %e, "content read failed");
                    continue;
                }
            };

            let mut results = std::collections::BTreeMap::new();
            if let Some(ext) = ext.as_deref() {
                results.extend(self.engine.content_matchers.match_content(ext, &content));
            }
            for (tech, reasons) in self
                .engine
                .content_matchers
                .match_file_content(&file.name, &content)
            {
                results.entry(tech).or_insert(reasons);
            }
            if file.size <= self.options.structured_content_ceiling {
                for (tech, reasons) in self
                    .engine
                    .content_matchers
                    .match_structured(&file.name, &content)
                {
                    results.entry(tech).or_insert(reasons);
                }
            }

            for (tech, reasons) in results {
                validated.insert(tech.clone());
                for reason in &reasons {
                    ctx.add_tech(&tech, reason);
                }
                if matched.insert(tech.clone()) {
                    self.find_implicit_component(ctx, &tech, &current, false);
                }
            }
        }

        // content-validation gate: an extension-introduced tech whose rule
        // demands content is revoked unless some predicate matched; techs
        // introduced by detectors or dependencies are untouched
        for tech in by_extension {
            if self.engine.rules.has_content_rules(&tech) && !validated.contains(&tech) {
                trace!(tech = %tech, "revoking extension-only detection");
                ctx.remove_tech(&tech);
            }
        }
    }

    /// Attaches a named component and derives implicit child components
    /// from its techs. Returns the child's index in the context.
    fn attach_named_component(&self, payload: &mut Payload, component: Payload) -> usize {
        debug!(name = %component.name, tech = ?component.tech, "component detected");

        let idx = payload.add_child(component);
        let techs: Vec<String> = payload.childs[idx].techs.clone();
        let current = payload.childs[idx]
            .path
            .first()
            .cloned()
            .unwrap_or_else(|| "/".to_string());

        for tech in techs {
            self.find_implicit_component(&mut payload.childs[idx], &tech, &current, true);
        }

        idx
    }

    /// Merges a virtual fragment into the context: its children become
    /// child components, everything else combines in place, and its techs
    /// may spawn implicit components (without edges).
    fn merge_virtual(&self, target: &mut Payload, mut fragment: Payload, dir: &Path) {
        let current = detectors::relative_dir_path(&self.base_path, dir);

        for child in std::mem::take(&mut fragment.childs) {
            target.add_child(child);
        }
        target.combine(&fragment);

        for tech in &fragment.techs {
            self.find_implicit_component(target, tech, &current, false);
        }
    }

    /// Adds a tech to the context; rules that are primary without being a
    /// component promote the tech on the context itself.
    fn add_tech_with_primary_check(&self, ctx: &mut Payload, tech: &str, reason: &str) {
        ctx.add_tech(tech, reason);

        if let Some(rule) = self.engine.rules.find(tech) {
            if self.engine.classifier.is_primary_tech(rule)
                && !self.engine.classifier.creates_component(rule)
            {
                ctx.add_primary_tech(tech);
            }
        }
    }

    /// Creates an implicit child component for a component-classified
    /// tech, with an edge from the context unless the rule type opts out.
    fn find_implicit_component(
        &self,
        payload: &mut Payload,
        tech: &str,
        current: &str,
        add_edges: bool,
    ) {
        let Some(rule) = self.engine.rules.find(tech) else {
            return;
        };
        if !self.engine.classifier.creates_component(rule) {
            return;
        }

        let mut component = Payload::new(rule.name.clone(), payload.path.clone());
        if self.engine.classifier.is_primary_tech(rule) {
            component.add_primary_tech(tech);
        } else {
            component.add_tech(tech, &format!("matched file: {}", current));
        }
        component.add_reason(&format!("matched file: {}", current));

        let creates_edge = self.engine.classifier.creates_edge(rule);
        let idx = payload.add_child(component);

        if add_edges && creates_edge {
            let target_id = payload.childs[idx].id.clone();
            payload.add_edge(&target_id);
        }
    }
}
