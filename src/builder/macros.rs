//! Macros for ergonomic state declarations.

/// Declare a closed state enum and its `State` implementation.
///
/// Each variant is paired with the name it is registered under. The macro
/// also generates an `ALL` constant listing every variant, handy for
/// registering the whole set at once, and a `Display` impl printing the name.
///
/// # Example
///
/// ```
/// use dispenser::state_enum;
/// use dispenser::core::State;
///
/// state_enum! {
///     pub enum PumpState {
///         Idle => "idle",
///         Pumping => "pumping",
///         Jammed => "jammed",
///     }
/// }
///
/// assert_eq!(PumpState::Pumping.name(), "pumping");
/// assert_eq!(PumpState::Jammed.to_string(), "jammed");
/// assert_eq!(PumpState::ALL.len(), 3);
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $label:literal
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                #[serde(rename = $label)]
                $variant
            ),*
        }

        impl $name {
            /// Every state, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),*];
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => $label),*
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::core::State::name(self))
            }
        }
    };
}
