//! # Records
//!
//! A [`Record`] is a decode target: a struct that knows its own
//! [`TypeDescriptor`] and can absorb a JSON object field by field.
//!
//! The [`record!`](crate::record!) macro declares such a struct and generates
//! its descriptor, so the descriptor cannot drift from the fields:
//!
//! ```
//! use lenient_decode::{record, Record};
//!
//! record! {
//!     #[derive(Debug, Default)]
//!     pub struct Resource {
//!         /// Stable identifier.
//!         pub id: String => "id" required,
//!         pub display_name: Option<String> => "displayName",
//!         pub tags: Vec<String> => "tags",
//!     }
//! }
//!
//! let descriptor = Resource::descriptor();
//! assert_eq!(descriptor.name, "Resource");
//! assert_eq!(descriptor.required_fields(), vec!["id"]);
//! assert!(descriptor.field("displayName").is_some());
//! ```
//!
//! Each field is written `name: Type => "wireName"`, followed by `required`
//! when the payload must carry it. Field types must implement
//! [`Describe`] and [`Lenient`]; nested records declared with the macro do.

use lenient_core::{Describe, TypeDescriptor};

use crate::assign::Lenient;

/// A decode target with a build-time type descriptor.
pub trait Record: Describe + Lenient + Default + 'static {
    fn descriptor() -> TypeDescriptor;
}

/// Declares a struct together with its [`Describe`], [`Lenient`] and
/// [`Record`] implementations. See the [module docs](crate::record).
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $fty:ty => $wire:literal $($required:ident)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $fty,
            )*
        }

        impl $crate::Describe for $name {
            fn shape() -> $crate::FieldShape {
                $crate::FieldShape::Record(<$name as $crate::Record>::descriptor)
            }
        }

        impl $crate::Lenient for $name {
            #[allow(unused_mut, unused_variables)]
            fn assign_lenient(&mut self, value: &$crate::__private::Value) -> bool {
                let $crate::__private::Value::Object(object) = value else {
                    return false;
                };
                let mut all_taken = true;
                $(
                    all_taken &= $crate::assign::assign_field(&mut self.$field, $wire, object);
                )*
                all_taken
            }

            fn fits(value: &$crate::__private::Value) -> bool {
                value.is_object()
            }
        }

        impl $crate::Record for $name {
            fn descriptor() -> $crate::TypeDescriptor {
                $crate::TypeDescriptor::new(
                    stringify!($name),
                    vec![
                        $(
                            $crate::FieldDescriptor::new(
                                stringify!($field),
                                $wire,
                                <$fty as $crate::Describe>::shape(),
                            )
                            .required($crate::__record_required!($($required)?)),
                        )*
                    ],
                )
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __record_required {
    () => {
        false
    };
    (required) => {
        true
    };
}
