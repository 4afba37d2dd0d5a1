//! Convenience macros for plugin authors.

/// Builds a [`PluginMetadata`](crate::definition::PluginMetadata).
///
/// `id`, `name` and `version` are required; `description`, `author` and
/// `dependencies` may follow in any order.
///
/// # Example
/// ```rust,ignore
/// let metadata = plugin_metadata!(
///     id: "brand-theme",
///     name: "Brand Theme",
///     version: "1.0.0",
///     author: "Design Systems",
///     dependencies: ["core-components"]
/// );
/// ```
#[macro_export]
macro_rules! plugin_metadata {
    (
        id: $id:expr,
        name: $name:expr,
        version: $version:expr
        $(, $field:ident : $value:expr)* $(,)?
    ) => {
        $crate::definition::PluginMetadata::new($id, $name, $version)
            $(.$field($value))*
    };
}
