//! Direct dependency confirmation.
//!
//! The lock file lists the whole transitive closure; only libraries a human
//! declared in the direct manifest are actionable. Declaration is detected
//! textually: the manifest must contain the library name in single quotes,
//! as in `gem 'rack'`.
//!
//! The check is a substring match, not a parser. It misses declarations
//! written with double quotes or `%w[]` lists, and it also accepts a quoted
//! name that only appears in a comment or as another gem's option value.

/// True iff `manifest` contains `'<library>'`.
pub fn is_direct_dependency(library: &str, manifest: &str) -> bool {
    if library.is_empty() {
        return false;
    }
    let needle = format!("'{}'", library);
    manifest.contains(&needle)
}
