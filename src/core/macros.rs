//! 宏

/// 以字段列表实现 `Default`
///
/// ```rust
/// use particle_engine::impl_default;
///
/// struct EmitterLimits {
///     max_particles: u32,
///     label: String,
/// }
///
/// impl_default!(EmitterLimits {
///     max_particles: 1024,
///     label: String::new(),
/// });
///
/// assert_eq!(EmitterLimits::default().max_particles, 1024);
/// ```
#[macro_export]
macro_rules! impl_default {
    ($struct_name:ident {
        $($field:ident: $value:expr),* $(,)?
    }) => {
        impl Default for $struct_name {
            fn default() -> Self {
                Self {
                    $($field: $value),*
                }
            }
        }
    };
}
