/*============================================================
  Synavera Project: Syn-JDK
  Module: synjdk_core::query
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1
  ------------------------------------------------------------
  Purpose:
    Structured package filter and its translation into catalog
    query parameters.

  Security / Safety Notes:
    All values are percent-encoded before being placed in a
    request URL.

  Dependencies:
    urlencoding for parameter encoding.

  Operational Scope:
    Built by callers (or use_or_install) and consumed by the
    resolver and the HTTP catalog client.

  Revision History:
    2026-10-16 COD  Introduced PackageQuery.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Absent values never reach the wire
    - Stable parameter ordering for reproducible URLs
============================================================*/

use urlencoding::encode;

/// Archive format the extractor understands.
pub const SUPPORTED_ARCHIVE_TYPE: &str = "zip";

/// Filter for the catalog's packages endpoint. Every dimension is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageQuery {
    pub version: Option<String>,
    pub version_by_definition: Option<String>,
    pub jdk_version: Option<u32>,
    pub distro: Vec<String>,
    pub distribution: Vec<String>,
    pub architecture: Vec<String>,
    pub archive_type: Vec<String>,
    pub operating_system: Vec<String>,
    pub package_type: Option<String>,
    pub operating_status: Vec<String>,
    pub libc_type: Vec<String>,
    pub lib_c_type: Vec<String>,
    pub release_status: Vec<String>,
    pub term_of_support: Vec<String>,
    pub bitness: Option<u32>,
    pub fpu: Vec<String>,
    pub javafx_bundled: bool,
    pub with_javafx_available: bool,
    pub directly_downloadable: bool,
    pub latest: Option<String>,
    pub feature: Vec<String>,
    pub signature_available: bool,
    pub free_to_use_in_production: bool,
    pub tck_tested: Option<String>,
    pub aqavit_certified: Option<String>,
    pub discovery_scope_id: Vec<String>,
    pub match_mode: Option<String>,
}

impl PackageQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn distribution(mut self, distribution: impl Into<String>) -> Self {
        self.distribution.push(distribution.into());
        self
    }

    pub fn jdk_version(mut self, version: u32) -> Self {
        self.jdk_version = Some(version);
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn operating_system(mut self, os: impl Into<String>) -> Self {
        self.operating_system.push(os.into());
        self
    }

    pub fn architecture(mut self, arch: impl Into<String>) -> Self {
        self.architecture.push(arch.into());
        self
    }

    pub fn package_type(mut self, package_type: impl Into<String>) -> Self {
        self.package_type = Some(package_type.into());
        self
    }

    pub fn latest(mut self, latest: impl Into<String>) -> Self {
        self.latest = Some(latest.into());
        self
    }

    /// Copy of this query restricted to the one archive type we can unpack.
    pub fn with_supported_archive(&self) -> Self {
        let mut query = self.clone();
        query.archive_type = vec![SUPPORTED_ARCHIVE_TYPE.to_string()];
        query
    }

    /// Non-empty parameters in declaration order. Lists are comma-joined.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_text(&mut pairs, "version", &self.version);
        push_text(&mut pairs, "version_by_definition", &self.version_by_definition);
        push_number(&mut pairs, "jdk_version", self.jdk_version);
        push_list(&mut pairs, "distro", &self.distro);
        push_list(&mut pairs, "distribution", &self.distribution);
        push_list(&mut pairs, "architecture", &self.architecture);
        push_list(&mut pairs, "archive_type", &self.archive_type);
        push_list(&mut pairs, "operating_system", &self.operating_system);
        push_text(&mut pairs, "package_type", &self.package_type);
        push_list(&mut pairs, "operating_status", &self.operating_status);
        push_list(&mut pairs, "libc_type", &self.libc_type);
        push_list(&mut pairs, "lib_c_type", &self.lib_c_type);
        push_list(&mut pairs, "release_status", &self.release_status);
        push_list(&mut pairs, "term_of_support", &self.term_of_support);
        push_number(&mut pairs, "bitness", self.bitness);
        push_list(&mut pairs, "fpu", &self.fpu);
        push_flag(&mut pairs, "javafx_bundled", self.javafx_bundled);
        push_flag(&mut pairs, "with_javafx_available", self.with_javafx_available);
        push_flag(&mut pairs, "directly_downloadable", self.directly_downloadable);
        push_text(&mut pairs, "latest", &self.latest);
        push_list(&mut pairs, "feature", &self.feature);
        push_flag(&mut pairs, "signature_available", self.signature_available);
        push_flag(
            &mut pairs,
            "free_to_use_in_production",
            self.free_to_use_in_production,
        );
        push_text(&mut pairs, "tck_tested", &self.tck_tested);
        push_text(&mut pairs, "aqavit_certified", &self.aqavit_certified);
        push_list(&mut pairs, "discovery_scope_id", &self.discovery_scope_id);
        push_text(&mut pairs, "match", &self.match_mode);
        pairs
    }

    /// Percent-encoded query string without the leading `?`.
    pub fn to_query_string(&self) -> String {
        encode_pairs(&self.to_pairs())
    }
}

impl std::fmt::Display for PackageQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pairs = self.to_pairs();
        if pairs.is_empty() {
            return f.write_str("{}");
        }
        let rendered: Vec<String> = pairs.iter().map(|(k, v)| format!("{k}={v}")).collect();
        write!(f, "{{{}}}", rendered.join(" "))
    }
}

/// Encode `key=value` pairs joined by `&`.
pub fn encode_pairs(pairs: &[(&str, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{key}={}", encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

fn push_text(pairs: &mut Vec<(&'static str, String)>, key: &'static str, value: &Option<String>) {
    if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
        pairs.push((key, value.to_string()));
    }
}

fn push_number(pairs: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<u32>) {
    if let Some(value) = value.filter(|v| *v != 0) {
        pairs.push((key, value.to_string()));
    }
}

fn push_list(pairs: &mut Vec<(&'static str, String)>, key: &'static str, values: &[String]) {
    let joined: Vec<&str> = values
        .iter()
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .collect();
    if !joined.is_empty() {
        pairs.push((key, joined.join(",")));
    }
}

fn push_flag(pairs: &mut Vec<(&'static str, String)>, key: &'static str, value: bool) {
    if value {
        pairs.push((key, "true".to_string()));
    }
}
