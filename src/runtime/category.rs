// SPDX-License-Identifier: MIT OR Apache-2.0

//! Logger category derivation.
//!
//! Categories look like `System.Net.Http.HttpClient.<name>.TraceHandler`, the
//! layout existing log filters already match on.

/// Prefix of every default category.
pub const LOG_CATEGORY_PREFIX: &str = "System.Net.Http.HttpClient";

/// Suffix of every default category.
pub const LOG_CATEGORY_SUFFIX: &str = "TraceHandler";

/// Category for a client called `name`.
#[must_use]
pub fn logger_category(name: &str) -> String {
    format!("{LOG_CATEGORY_PREFIX}.{name}.{LOG_CATEGORY_SUFFIX}")
}

/// Category for a typed client, named after the type.
#[must_use]
pub fn category_for<T: ?Sized>() -> String {
    logger_category(type_simple_name::<T>())
}

/// The last path segment of a type's name, without generic arguments.
#[must_use]
pub fn type_simple_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let path = full.split('<').next().unwrap_or(full);
    path.rsplit("::").next().unwrap_or(path)
}
