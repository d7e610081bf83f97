use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a room.
    RoomId
);

uuid_id!(
    /// Unique identifier for a single bed allotment.
    AllotmentId
);

uuid_id!(
    /// Unique identifier for a stored credential.
    CredentialId
);

/// Climate type of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AcType {
    Ac,
    NonAc,
}

impl AcType {
    /// Returns the canonical storage label.
    pub fn as_str(&self) -> &'static str {
        match self {
            AcType::Ac => "AC",
            AcType::NonAc => "NON_AC",
        }
    }
}

impl std::fmt::Display for AcType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a recognised AC type label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAcTypeError {
    pub input: String,
}

impl std::fmt::Display for ParseAcTypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown AC type: {:?}", self.input)
    }
}

impl std::error::Error for ParseAcTypeError {}

impl std::str::FromStr for AcType {
    type Err = ParseAcTypeError;

    /// Accepts "AC" and the "NON AC" / "NON_AC" / "NON-AC" spellings, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect();

        match normalized.as_str() {
            "AC" => Ok(AcType::Ac),
            "NON_AC" | "NONAC" => Ok(AcType::NonAc),
            _ => Err(ParseAcTypeError {
                input: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_id_new_creates_unique_ids() {
        let id1 = RoomId::new();
        let id2 = RoomId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn allotment_id_from_uuid_preserves_value() {
        let uuid = Uuid::new_v4();
        let id = AllotmentId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), uuid);
    }

    #[test]
    fn ac_type_parses_picker_labels() {
        assert_eq!("AC".parse::<AcType>().unwrap(), AcType::Ac);
        assert_eq!("NON AC".parse::<AcType>().unwrap(), AcType::NonAc);
        assert_eq!("non-ac".parse::<AcType>().unwrap(), AcType::NonAc);
        assert_eq!(" NON_AC ".parse::<AcType>().unwrap(), AcType::NonAc);
    }

    #[test]
    fn ac_type_rejects_unknown_label() {
        let err = "Select AC Type".parse::<AcType>().unwrap_err();
        assert_eq!(err.input, "Select AC Type");
    }

    #[test]
    fn ac_type_serializes_as_storage_label() {
        let json = serde_json::to_string(&AcType::NonAc).unwrap();
        assert_eq!(json, "\"NON_AC\"");
        let back: AcType = serde_json::from_str("\"AC\"").unwrap();
        assert_eq!(back, AcType::Ac);
    }
}
