/*============================================================
  Synavera Project: Syn-JDK
  Module: synjdk_core::platform
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1
  ------------------------------------------------------------
  Purpose:
    Detect the host operating system and architecture in the
    vocabulary understood by the package catalog.

  Security / Safety Notes:
    Compile-time detection only; no probing of the system.

  Dependencies:
    None beyond std.

  Operational Scope:
    Consulted by use_or_install and by InstalledPackage when
    deriving the launcher path.

  Revision History:
    2026-10-16 COD  Added host platform detection.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Deterministic mapping tables
============================================================*/

/// Host operating system as named by the catalog.
pub fn host_os() -> &'static str {
    catalog_os(std::env::consts::OS, cfg!(target_env = "musl"))
}

/// Host architecture as named by the catalog.
pub fn host_arch() -> &'static str {
    catalog_arch(std::env::consts::ARCH, cfg!(target_endian = "little"))
}

/// Only names that differ from Rust's are mapped.
fn catalog_os(os: &'static str, musl: bool) -> &'static str {
    match os {
        "linux" if musl => "linux_musl",
        "illumos" => "solaris",
        other => other,
    }
}

fn catalog_arch(arch: &'static str, little_endian: bool) -> &'static str {
    match arch {
        "x86_64" => "x64",
        "powerpc64" if little_endian => "ppc64le",
        "powerpc64" => "ppc64",
        "powerpc" => "ppc",
        other => other,
    }
}

/// Append `.exe` on Windows.
pub fn executable_name(name: &str) -> String {
    if cfg!(windows) {
        format!("{name}.exe")
    } else {
        name.to_string()
    }
}
