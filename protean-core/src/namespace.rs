//! Deterministic derivation of tenant-isolated storage namespaces.
//!
//! The namespace string is the sole tenant-isolation boundary this core
//! enforces: as long as tenant and path slugs are validated, two distinct
//! tenants can never share a namespace for the same resource name.

/// Path names that collide with system collections and are rejected at
/// definition time, never silently remapped.
pub const RESERVED_PATHS: &[&str] = &["definitions", "users", "sessions", "logs", "usage"];

/// True when `path_name` collides with a system-reserved namespace.
pub fn is_reserved_path(path_name: &str) -> bool {
    RESERVED_PATHS.contains(&path_name)
}

/// Tenant and resource path slugs: `[a-z0-9][a-z0-9-]*`.
///
/// The character set excludes `.`, which keeps the dotted namespace join
/// injective.
pub fn is_valid_slug(slug: &str) -> bool {
    let mut chars = slug.chars();

    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c.is_ascii_digit() => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Derives the document namespace for a tenant's resource.
///
/// Pure and deterministic: the same inputs always produce the same string,
/// and validated slugs make the mapping injective in both arguments. Callers
/// must validate both slugs first (see
/// [`ResourceDefinition::validate`](crate::schema::ResourceDefinition::validate)
/// and the service entry points).
pub fn namespace(tenant: &str, path_name: &str) -> String {
    format!("tenant.{tenant}.resource.{path_name}")
}

/// Derives the per-tenant request-log namespace.
///
/// `logs` is a reserved path, so this can never collide with a declared
/// resource.
pub fn logs_namespace(tenant: &str) -> String {
    format!("tenant.{tenant}.logs")
}
