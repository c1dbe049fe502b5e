//! In-memory architecture model
//!
//! ```text
//!   ModelDocument (loader)
//!          │
//!          ▼
//!   ThreatModel ── owns ──▶ technical assets (with outgoing links)
//!          │                data assets, trust boundaries, shared runtimes
//!          │
//!          ├── TopologyIndex   incoming links, containing boundary,
//!          │                   boundary parents
//!          │
//!          └── topology        network / execution-environment predicates
//! ```
//!
//! One model is built per analysis run and dropped afterwards. Nothing is
//! persisted between runs.

/// Declares a closed enumeration whose serialized form is a fixed string.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            serde::Serialize, serde::Deserialize,
        )]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = anyhow::Error;

            /// Parses the same names the model documents use.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                use serde::de::value::{Error as ValueError, StrDeserializer};
                use serde::de::IntoDeserializer;

                let de: StrDeserializer<'_, ValueError> = s.trim().into_deserializer();
                <$name as serde::Deserialize>::deserialize(de)
                    .map_err(|_| anyhow::anyhow!("Unknown {} '{}'", stringify!($name), s))
            }
        }
    };
}

pub mod index;
pub mod store;
pub mod store_models;
pub mod technology;
pub mod topology;

pub use index::TopologyIndex;
pub use store::ThreatModel;
pub use store_models::{
    make_id, Authentication, Authorization, CommunicationLink, Confidentiality, Criticality,
    DataAsset, DataFormat, EncryptionStyle, Machine, Protocol, Quantity, SharedRuntime, Size,
    TechnicalAsset, TechnicalAssetType, TrustBoundary, TrustBoundaryType, Usage,
};
pub use technology::{Capability, Technology};
