use std::fmt;

use rusqlite::ToSql;
use rusqlite::types::ToSqlOutput;
use serde::{Deserialize, Serialize};

/// Declares a closed set of string-valued variants shared by the HTTP layer
/// and the store. `parse` is strict; `from_stored` is lenient and falls back
/// to the default for rows written before validation existed.
macro_rules! closed_set {
    (
        $(#[$meta:meta])*
        $name:ident, label = $label:literal, default = $default:ident {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }

            /// Parses an exact variant name, ignoring surrounding whitespace.
            pub fn parse(s: &str) -> Option<Self> {
                match s.trim() {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }

            /// Parses a user-supplied value, producing the message returned to clients on failure.
            pub fn parse_field(s: &str) -> Result<Self, String> {
                Self::parse(s).ok_or_else(|| {
                    let allowed: Vec<&str> = Self::ALL.iter().map(|v| v.as_str()).collect();
                    format!(
                        "Invalid {} '{}'. Allowed values: {}",
                        $label,
                        s.trim(),
                        allowed.join(", ")
                    )
                })
            }

            /// Normalizes a stored column value. Null, empty and unknown values map to the default.
            pub fn from_stored(s: Option<&str>) -> Self {
                s.and_then(Self::parse).unwrap_or_default()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }
    };
}

closed_set! {
    /// Lifecycle state of a cabinet. Cabinets are never deleted, only archived.
    CabinetStatus, label = "cabinet status", default = Active {
        Active => "active",
        Pending => "pending",
        Archived => "archived",
    }
}

closed_set! {
    /// Circulation state of a file. `Archived` on a live file means shelved;
    /// soft deletion is tracked separately through `deleted_at`.
    FileStatus, label = "file status", default = Available {
        Available => "available",
        Borrowed => "borrowed",
        Archived => "archived",
    }
}

closed_set! {
    Category, label = "category", default = Documents {
        Documents => "Documents",
        Sports => "Sports",
        Objects => "Objects",
    }
}
