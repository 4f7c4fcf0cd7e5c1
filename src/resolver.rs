/*============================================================
  Synavera Project: Syn-JDK
  Module: synjdk_core::resolver
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1
  ------------------------------------------------------------
  Purpose:
    Turn a package query into the single catalog candidate
    that the installer will act on.

  Security / Safety Notes:
    The archive type is pinned to zip regardless of caller
    input; only that format is ever unpacked.

  Dependencies:
    None beyond the Catalog seam.

  Operational Scope:
    First stage of every install.

  Revision History:
    2026-10-16 COD  Implemented first-match resolution.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Catalog order is authoritative; no local re-ranking
    - Collaborator errors propagate unchanged
============================================================*/

use crate::catalog::Catalog;
use crate::error::{Result, SynjdkError};
use crate::package_info::PackageDescriptor;
use crate::query::PackageQuery;

/// Resolve `query` to the first matching catalog package.
pub async fn resolve(catalog: &dyn Catalog, query: &PackageQuery) -> Result<PackageDescriptor> {
    let query = query.with_supported_archive();
    catalog
        .search_packages(&query)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| SynjdkError::NoMatch {
            query: query.to_string(),
        })
}
