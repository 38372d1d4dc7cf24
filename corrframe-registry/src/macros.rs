//! Macro that turns the field table literal into the `FieldCode` enum and its lookup tables.

/// Map a name token from the table to a `FieldName`.
#[doc(hidden)]
#[macro_export]
macro_rules! __field_name {
    ( computed ) => {
        $crate::FieldName::DirectlyComputed
    };
    ( $name:literal ) => {
        $crate::FieldName::Named($name)
    };
}

/// Declarative field table. Generates the closed `FieldCode` enum, the ordered `ALL` array
/// and one `const fn` per column, so every column is answered by a single `match`.
#[macro_export]
macro_rules! define_fields {
    (
        $(
            $( #[$meta:meta] )*
            field $Variant:ident = $code:literal {
                key: $key:literal,
                name: $name:tt,
                distance: $dist:literal $(,)?
            }
        ),* $(,)?
    ) => {
        /// Identifier of one registration field. The discriminant is the numeric field code.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        pub enum FieldCode {
            $(
                $( #[$meta] )*
                $Variant = $code,
            )*
        }

        impl FieldCode {
            /// Every field, in code order.
            pub const ALL: [FieldCode; $crate::NUMBER_OF_FIELDS] = [ $( FieldCode::$Variant, )* ];

            /// Numeric field code.
            pub const fn code(self) -> u8 {
                self as u8
            }

            /// Stable symbolic key, defined for every field including the computed ones.
            pub const fn key(self) -> &'static str {
                match self {
                    $( FieldCode::$Variant => $key, )*
                }
            }

            /// Canonical on-disk name, or `DirectlyComputed`.
            pub const fn name(self) -> $crate::FieldName {
                match self {
                    $( FieldCode::$Variant => $crate::__field_name!($name), )*
                }
            }

            /// Whether the field is a signed distance to a subcortical structure boundary.
            pub const fn is_distance_field(self) -> bool {
                match self {
                    $( FieldCode::$Variant => $dist, )*
                }
            }

            pub(crate) const fn from_code(code: i128) -> Option<Self> {
                match code {
                    $( $code => Some(FieldCode::$Variant), )*
                    _ => None,
                }
            }
        }

        // Codes must be dense and listed in order: ALL[i] has code i.
        const _: () = {
            let mut i = 0;
            while i < FieldCode::ALL.len() {
                assert!(FieldCode::ALL[i] as usize == i, "field table is not dense and ordered");
                i += 1;
            }
        };
    };
}
