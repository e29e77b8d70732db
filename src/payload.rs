//! Component tree model
//!
//! A `Payload` is one node of the analysis result: the root describes the
//! scanned repository, children describe detected components. Merge
//! semantics are union-based with deduplication on every collection field.

use crate::metadata::ScanMetadata;
use serde::ser::{SerializeSeq, SerializeStruct};
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

const ID_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const ID_LENGTH: usize = 12;

static CONSTRUCTION_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Renders a 12-character base-62 token from a sequence number.
fn encode_id(n: u64) -> String {
    // splitmix64 whitening over the sequence number
    let mut z = n.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^= z >> 31;

    let mut out = Vec::with_capacity(ID_LENGTH);
    let mut v = z;
    for _ in 0..ID_LENGTH {
        out.push(ID_ALPHABET[(v % 62) as usize]);
        v = v / 62 + n; // keep mixing the sequence number back in
    }
    String::from_utf8(out).expect("alphabet is ascii")
}

/// Construction-time placeholder id, unique within the process. The
/// scanner renumbers the finished tree with [`Payload::assign_ids`], so
/// placeholders never reach serialized output.
pub fn generate_id() -> String {
    encode_id(CONSTRUCTION_COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// Deterministic id sequence used to renumber a finished tree.
pub struct IdGenerator {
    counter: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self { counter: 0 }
    }

    pub fn next_id(&mut self) -> String {
        let id = encode_id(self.counter);
        self.counter += 1;
        id
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// A concrete dependency extracted from a manifest: `(dep_type, name,
/// version_or_literal)`. Serializes as a JSON array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub dep_type: String,
    pub name: String,
    pub version: String,
}

impl Dependency {
    pub fn new(
        dep_type: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            dep_type: dep_type.into(),
            name: name.into(),
            version: version.into(),
        }
    }
}

impl Serialize for Dependency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(3))?;
        seq.serialize_element(&self.dep_type)?;
        seq.serialize_element(&self.name)?;
        seq.serialize_element(&self.version)?;
        seq.end()
    }
}

/// Directed relation between components. The target is serialized as the
/// referenced component's id string to keep the tree acyclic in JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub target_id: String,
    pub read: bool,
    pub write: bool,
}

impl Serialize for Edge {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Edge", 3)?;
        s.serialize_field("target", &self.target_id)?;
        s.serialize_field("read", &self.read)?;
        s.serialize_field("write", &self.write)?;
        s.end()
    }
}

/// One node of the component tree.
#[derive(Debug, Clone, Serialize)]
pub struct Payload {
    pub id: String,
    pub name: String,
    pub path: Vec<String>,
    pub tech: Vec<String>,
    pub techs: Vec<String>,
    pub languages: BTreeMap<String, u64>,
    pub dependencies: Vec<Dependency>,
    pub childs: Vec<Payload>,
    pub edges: Vec<Edge>,
    pub licenses: Vec<String>,
    pub reason: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ScanMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_stats: Option<serde_json::Value>,
}

impl Payload {
    pub fn new(name: impl Into<String>, paths: Vec<String>) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            path: paths,
            tech: Vec::new(),
            techs: Vec::new(),
            languages: BTreeMap::new(),
            dependencies: Vec::new(),
            childs: Vec::new(),
            edges: Vec::new(),
            licenses: Vec::new(),
            reason: Vec::new(),
            properties: BTreeMap::new(),
            metadata: None,
            code_stats: None,
        }
    }

    pub fn with_path(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name, vec![path.into()])
    }

    pub fn add_path(&mut self, path: impl Into<String>) {
        let path = path.into();
        if !self.path.contains(&path) {
            self.path.push(path);
        }
    }

    /// Adds a technology to `techs` and records the reason. Does not touch
    /// the primary `tech` field.
    pub fn add_tech(&mut self, tech: &str, reason: &str) {
        if !self.techs.iter().any(|t| t == tech) {
            self.techs.push(tech.to_string());
        }
        self.add_reason(reason);
    }

    /// Promotes a technology to primary. Primary techs are always also
    /// present in `techs`.
    pub fn add_primary_tech(&mut self, tech: &str) {
        if !self.tech.iter().any(|t| t == tech) {
            self.tech.push(tech.to_string());
        }
        if !self.techs.iter().any(|t| t == tech) {
            self.techs.push(tech.to_string());
        }
    }

    /// Removes a technology from both `techs` and `tech` (content gate).
    pub fn remove_tech(&mut self, tech: &str) {
        self.techs.retain(|t| t != tech);
        self.tech.retain(|t| t != tech);
    }

    pub fn add_reason(&mut self, reason: &str) {
        if !reason.is_empty() && !self.reason.iter().any(|r| r == reason) {
            self.reason.push(reason.to_string());
        }
    }

    pub fn add_license(&mut self, license: &str) {
        if !license.is_empty() && !self.licenses.iter().any(|l| l == license) {
            self.licenses.push(license.to_string());
        }
    }

    /// Dependencies are unique by `(dep_type, name, version)`.
    pub fn add_dependency(&mut self, dep: Dependency) {
        if !self.dependencies.contains(&dep) {
            self.dependencies.push(dep);
        }
    }

    pub fn add_language(&mut self, language: &str) {
        *self.languages.entry(language.to_string()).or_insert(0) += 1;
    }

    pub fn add_language_count(&mut self, language: &str, count: u64) {
        if count > 0 {
            *self.languages.entry(language.to_string()).or_insert(0) += count;
        }
    }

    pub fn add_edge(&mut self, target_id: &str) {
        let edge = Edge {
            target_id: target_id.to_string(),
            read: true,
            write: true,
        };
        if !self.edges.contains(&edge) {
            self.edges.push(edge);
        }
    }

    pub fn add_property(&mut self, tech: &str, value: serde_json::Value) {
        self.properties.entry(tech.to_string()).or_default().push(value);
    }

    /// Attaches a child component, merging into an existing child when one
    /// with the same name and at least one primary tech on both sides
    /// already exists. Returns the index of the attached or merged child.
    pub fn add_child(&mut self, service: Payload) -> usize {
        let existing = self.childs.iter().position(|child| {
            !child.tech.is_empty() && !service.tech.is_empty() && child.name == service.name
        });

        match existing {
            Some(idx) => {
                // merged children accumulate their file counts
                for (lang, count) in &service.languages {
                    self.childs[idx].add_language_count(lang, *count);
                }
                self.childs[idx].combine(&service);
                for reason in &service.reason {
                    self.childs[idx].add_reason(reason);
                }
                idx
            }
            None => {
                self.childs.push(service);
                self.childs.len() - 1
            }
        }
    }

    /// Union-merge of another payload into this one; combining the same
    /// fragment twice is a no-op. No edges are created.
    pub fn combine(&mut self, other: &Payload) {
        for path in &other.path {
            self.add_path(path.clone());
        }
        for (lang, count) in &other.languages {
            let entry = self.languages.entry(lang.clone()).or_insert(0);
            *entry = (*entry).max(*count);
        }
        for tech in &other.techs {
            if !self.techs.iter().any(|t| t == tech) {
                self.techs.push(tech.clone());
            }
        }
        for tech in &other.tech {
            self.add_primary_tech(tech);
        }
        for dep in &other.dependencies {
            self.add_dependency(dep.clone());
        }
        for license in &other.licenses {
            self.add_license(license);
        }
        for reason in &other.reason {
            self.add_reason(reason);
        }
        for (tech, entries) in &other.properties {
            let bucket = self.properties.entry(tech.clone()).or_default();
            for entry in entries {
                if !bucket.contains(entry) {
                    bucket.push(entry.clone());
                }
            }
        }
    }

    /// Merges a sibling component detected in the same directory into this
    /// one, producing a hybrid multi-primary-tech component.
    pub fn merge_component(&mut self, other: Payload) {
        for tech in &other.tech {
            self.add_primary_tech(tech);
        }
        for tech in &other.techs {
            self.add_tech(tech, "merged from multiple detectors");
        }
        for dep in other.dependencies {
            self.add_dependency(dep);
        }
        for path in other.path {
            self.add_path(path);
        }
        for license in &other.licenses {
            self.add_license(license);
        }
        for reason in &other.reason {
            self.add_reason(reason);
        }
        for (tech, entries) in other.properties {
            let bucket = self.properties.entry(tech).or_default();
            for entry in entries {
                if !bucket.contains(&entry) {
                    bucket.push(entry);
                }
            }
        }
        for child in other.childs {
            self.add_child(child);
        }
        for edge in other.edges {
            if !self.edges.contains(&edge) {
                self.edges.push(edge);
            }
        }
    }

    /// Renumbers the tree pre-order with a fresh deterministic id
    /// sequence and rewrites edge targets accordingly. Run once on the
    /// finished tree: repeated scans over identical inputs then produce
    /// identical trees.
    pub fn assign_ids(&mut self) {
        let mut generator = IdGenerator::new();
        let mut mapping = HashMap::new();
        self.renumber(&mut generator, &mut mapping);
        self.rewrite_edge_targets(&mapping);
    }

    fn renumber(&mut self, generator: &mut IdGenerator, mapping: &mut HashMap<String, String>) {
        let id = generator.next_id();
        mapping.insert(std::mem::replace(&mut self.id, id.clone()), id);
        for child in &mut self.childs {
            child.renumber(generator, mapping);
        }
    }

    fn rewrite_edge_targets(&mut self, mapping: &HashMap<String, String>) {
        for edge in &mut self.edges {
            if let Some(target) = mapping.get(&edge.target_id) {
                edge.target_id = target.clone();
            }
        }
        for child in &mut self.childs {
            child.rewrite_edge_targets(mapping);
        }
    }

    /// Total files attributed to languages in this subtree.
    pub fn file_count(&self) -> u64 {
        let own: u64 = self.languages.values().sum();
        own + self.childs.iter().map(|c| c.file_count()).sum::<u64>()
    }

    /// Number of components (children, recursively).
    pub fn component_count(&self) -> u64 {
        self.childs.len() as u64
            + self.childs.iter().map(|c| c.component_count()).sum::<u64>()
    }

    /// Distinct language names in this subtree.
    pub fn language_names(&self) -> Vec<String> {
        let mut set = std::collections::BTreeSet::new();
        self.collect_language_names(&mut set);
        set.into_iter().collect()
    }

    fn collect_language_names(&self, set: &mut std::collections::BTreeSet<String>) {
        for lang in self.languages.keys() {
            set.insert(lang.clone());
        }
        for child in &self.childs {
            child.collect_language_names(set);
        }
    }

    /// Distinct (primary, all) tech counts across the subtree.
    pub fn tech_counts(&self) -> (u64, u64) {
        let mut primary = std::collections::BTreeSet::new();
        let mut all = std::collections::BTreeSet::new();
        self.collect_techs(&mut primary, &mut all);
        (primary.len() as u64, all.len() as u64)
    }

    fn collect_techs(
        &self,
        primary: &mut std::collections::BTreeSet<String>,
        all: &mut std::collections::BTreeSet<String>,
    ) {
        for tech in &self.tech {
            primary.insert(tech.clone());
            all.insert(tech.clone());
        }
        for tech in &self.techs {
            all.insert(tech.clone());
        }
        for child in &self.childs {
            child.collect_techs(primary, all);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_shape() {
        let id = generate_id();
        assert_eq!(id.len(), 12);
        assert!(id.bytes().all(|b| b.is_ascii_alphanumeric()));
        // placeholders are unique within the process
        assert_ne!(generate_id(), generate_id());
    }

    #[test]
    fn test_id_generator_is_deterministic() {
        let mut first = IdGenerator::new();
        let mut second = IdGenerator::new();

        for _ in 0..8 {
            assert_eq!(first.next_id(), second.next_id());
        }
        assert_ne!(IdGenerator::new().next_id(), first.next_id());
    }

    #[test]
    fn test_assign_ids_renumbers_and_rewrites_edges() {
        let build = || {
            let mut root = Payload::with_path("main", "/");
            let mut svc = Payload::with_path("svc", "/package.json");
            svc.add_primary_tech("nodejs");

            let mut db = Payload::with_path("PostgreSQL", "/package.json");
            db.add_primary_tech("postgresql");
            let db_id = db.id.clone();
            svc.add_child(db);
            svc.add_edge(&db_id);

            root.add_child(svc);
            root.assign_ids();
            root
        };

        let first = build();
        let second = build();

        // identical trees get identical ids, edges included
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );

        // edge targets follow the renumbering
        let svc = &first.childs[0];
        assert_eq!(svc.edges[0].target_id, svc.childs[0].id);

        // renumbered ids stay unique across the tree
        let mut ids = std::collections::BTreeSet::new();
        ids.insert(first.id.clone());
        ids.insert(svc.id.clone());
        assert!(ids.insert(svc.childs[0].id.clone()));
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_add_tech_dedupes() {
        let mut p = Payload::with_path("main", "/");
        p.add_tech("nodejs", "matched file: package.json");
        p.add_tech("nodejs", "matched file: package.json");

        assert_eq!(p.techs, vec!["nodejs"]);
        assert_eq!(p.reason, vec!["matched file: package.json"]);
    }

    #[test]
    fn test_primary_tech_subset_of_techs() {
        let mut p = Payload::with_path("main", "/");
        p.add_primary_tech("rust");

        assert_eq!(p.tech, vec!["rust"]);
        assert_eq!(p.techs, vec!["rust"]);
    }

    #[test]
    fn test_dependency_dedupe() {
        let mut p = Payload::with_path("main", "/");
        p.add_dependency(Dependency::new("npm", "express", "^4.18.0"));
        p.add_dependency(Dependency::new("npm", "express", "^4.18.0"));
        p.add_dependency(Dependency::new("npm", "express", "^5.0.0"));

        assert_eq!(p.dependencies.len(), 2);
    }

    #[test]
    fn test_combine_is_idempotent() {
        let mut ctx = Payload::with_path("main", "/");
        let mut virt = Payload::with_path("fragment", "/docker-compose.yml");
        virt.add_tech("postgresql", "matched dependency: postgres");
        virt.add_dependency(Dependency::new("docker", "postgres", "15"));
        virt.add_language_count("YAML", 1);

        ctx.combine(&virt);
        let once = ctx.clone();
        ctx.combine(&virt);

        assert_eq!(ctx.techs, once.techs);
        assert_eq!(ctx.dependencies, once.dependencies);
        assert_eq!(ctx.reason, once.reason);
        assert_eq!(ctx.languages, once.languages);
        assert_eq!(ctx.path, once.path);
    }

    #[test]
    fn test_add_child_merges_same_name() {
        let mut root = Payload::with_path("main", "/");

        let mut a = Payload::with_path("svc", "/package.json");
        a.add_primary_tech("nodejs");
        a.add_dependency(Dependency::new("npm", "express", "^4.18.0"));

        let mut b = Payload::with_path("svc", "/pom.xml");
        b.add_primary_tech("java");
        b.add_dependency(Dependency::new("maven", "com.x:svc", "1.0"));

        let first = root.add_child(a);
        let second = root.add_child(b);

        assert_eq!(first, second);
        assert_eq!(root.childs.len(), 1);
        let child = &root.childs[0];
        assert!(child.tech.contains(&"nodejs".to_string()));
        assert!(child.tech.contains(&"java".to_string()));
        assert_eq!(child.path.len(), 2);
        assert_eq!(child.dependencies.len(), 2);
    }

    #[test]
    fn test_add_child_no_merge_without_primary() {
        let mut root = Payload::with_path("main", "/");
        let a = Payload::with_path("svc", "/a");
        let b = Payload::with_path("svc", "/b");

        root.add_child(a);
        root.add_child(b);

        // without a primary tech on both sides, same name is not enough
        assert_eq!(root.childs.len(), 2);
    }

    #[test]
    fn test_merge_component_hybrid() {
        let mut node = Payload::with_path("svc", "/package.json");
        node.add_primary_tech("nodejs");

        let mut java = Payload::with_path("svc", "/pom.xml");
        java.add_primary_tech("java");
        java.add_tech("maven", "matched file: pom.xml");

        node.merge_component(java);

        assert_eq!(node.tech.len(), 2);
        assert!(node.techs.contains(&"maven".to_string()));
        assert!(node
            .reason
            .contains(&"merged from multiple detectors".to_string()));
    }

    #[test]
    fn test_remove_tech() {
        let mut p = Payload::with_path("main", "/");
        p.add_primary_tech("mfc");
        p.add_tech("cplusplus", "matched extension: .cpp");

        p.remove_tech("mfc");

        assert!(!p.tech.contains(&"mfc".to_string()));
        assert!(!p.techs.contains(&"mfc".to_string()));
        assert!(p.techs.contains(&"cplusplus".to_string()));
    }

    #[test]
    fn test_edge_serialization() {
        let mut p = Payload::with_path("main", "/");
        p.add_edge("abc123");

        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["edges"][0]["target"], "abc123");
        assert_eq!(json["edges"][0]["read"], true);
        assert_eq!(json["edges"][0]["write"], true);
    }

    #[test]
    fn test_dependency_serializes_as_array() {
        let dep = Dependency::new("npm", "pg", "^8.8.0");
        let json = serde_json::to_value(&dep).unwrap();
        assert_eq!(json, serde_json::json!(["npm", "pg", "^8.8.0"]));
    }

    #[test]
    fn test_counts() {
        let mut root = Payload::with_path("main", "/");
        root.add_language_count("Rust", 3);

        let mut child = Payload::with_path("svc", "/svc");
        child.add_language_count("JavaScript", 2);
        child.add_primary_tech("nodejs");
        root.add_child(child);

        assert_eq!(root.file_count(), 5);
        assert_eq!(root.component_count(), 1);
        assert_eq!(root.language_names(), vec!["JavaScript", "Rust"]);
        let (primary, all) = root.tech_counts();
        assert_eq!(primary, 1);
        assert_eq!(all, 1);
    }
}
