//! Macros for declaring validators with minimal boilerplate.
//!
//! # Available Macros
//!
//! - [`fields!`]: build a field map for structural composition
//!
//! # Examples
//!
//! ```rust,ignore
//! use keel_validator::prelude::*;
//!
//! let address = fields! {
//!     "street" => required(),
//!     "city" => vec![required(), max_length(40)],
//! };
//! let person = props(fields! {
//!     "name" => required(),
//!     "address" => address,
//! });
//! ```

// ============================================================================
// FIELDS MACRO
// ============================================================================

/// Builds an [`IndexMap`](crate::indexmap::IndexMap) of field name to
/// [`Validator`](crate::foundation::Validator), keeping declaration order.
///
/// Each value may be anything that converts into a validator: a leaf, a
/// `Vec` of validators (sequential), or another `fields!` map (structural).
/// The map itself converts into a validator with `.into()` or can be passed
/// to [`props`](crate::combinators::props).
///
/// ```rust,ignore
/// let map = fields! { "first" => required(), "last" => required() };
/// let validator: Validator = map.into();
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::indexmap::IndexMap::<::std::string::String, $crate::foundation::Validator>::new()
    };
    ($($name:expr => $validator:expr),+ $(,)?) => {{
        let mut map = $crate::indexmap::IndexMap::<::std::string::String, $crate::foundation::Validator>::new();
        $(
            map.insert(
                ::std::string::String::from($name),
                $crate::foundation::Validator::from($validator),
            );
        )+
        map
    }};
}
