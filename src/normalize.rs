//! Type normalization
//!
//! Maps relational (EDM) primitive type tags onto the canonical type
//! vocabulary. Unknown tags pass through unchanged.

use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalType {
    String,
    LargeString,
    Decimal,
    DecimalFloat,
    BinaryFloat,
    UtcDateTime,
    UtcTimestamp,
    LocalTime,
    Integer,
    Boolean,
    Uuid,
    Binary,
    LargeBinary,
}

impl CanonicalType {
    pub const ALL: [CanonicalType; 13] = [
        CanonicalType::String,
        CanonicalType::LargeString,
        CanonicalType::Decimal,
        CanonicalType::DecimalFloat,
        CanonicalType::BinaryFloat,
        CanonicalType::UtcDateTime,
        CanonicalType::UtcTimestamp,
        CanonicalType::LocalTime,
        CanonicalType::Integer,
        CanonicalType::Boolean,
        CanonicalType::Uuid,
        CanonicalType::Binary,
        CanonicalType::LargeBinary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalType::String => "String",
            CanonicalType::LargeString => "LargeString",
            CanonicalType::Decimal => "Decimal",
            CanonicalType::DecimalFloat => "DecimalFloat",
            CanonicalType::BinaryFloat => "BinaryFloat",
            CanonicalType::UtcDateTime => "UTCDateTime",
            CanonicalType::UtcTimestamp => "UTCTimestamp",
            CanonicalType::LocalTime => "LocalTime",
            CanonicalType::Integer => "Integer",
            CanonicalType::Boolean => "Boolean",
            CanonicalType::Uuid => "UUID",
            CanonicalType::Binary => "Binary",
            CanonicalType::LargeBinary => "LargeBinary",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == name)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, CanonicalType::String | CanonicalType::LargeString)
    }

    pub fn is_date(&self) -> bool {
        matches!(
            self,
            CanonicalType::UtcTimestamp | CanonicalType::UtcDateTime | CanonicalType::LocalTime
        )
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            CanonicalType::Decimal
                | CanonicalType::DecimalFloat
                | CanonicalType::Integer
                | CanonicalType::BinaryFloat
        )
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, CanonicalType::Binary | CanonicalType::LargeBinary)
    }
}

impl fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalizes `source_type` given the property's annotations and raw
/// attributes. Returns the source tag itself when it is not an EDM primitive
/// this table knows about.
pub fn normalize_type(
    source_type: &str,
    annotations: &Map<String, Value>,
    attributes: &Map<String, Value>,
) -> String {
    canonical_type(source_type, annotations, attributes)
        .map(|t| t.as_str().to_string())
        .unwrap_or_else(|| source_type.to_string())
}

pub fn canonical_type(
    source_type: &str,
    annotations: &Map<String, Value>,
    attributes: &Map<String, Value>,
) -> Option<CanonicalType> {
    let not_filterable = || is_not_filterable(annotations, attributes);
    let canonical = match source_type {
        "Edm.String" if not_filterable() => CanonicalType::LargeString,
        "Edm.String" => CanonicalType::String,
        "Edm.Decimal" if has_precision(attributes) => CanonicalType::Decimal,
        "Edm.Decimal" => CanonicalType::DecimalFloat,
        "Edm.Single" => CanonicalType::Decimal,
        "Edm.DateTimeOffset" | "Edm.DateTime" if precision_is_seven(attributes) => {
            CanonicalType::UtcTimestamp
        }
        "Edm.DateTimeOffset" | "Edm.DateTime" => CanonicalType::UtcDateTime,
        "Edm.Time" => CanonicalType::LocalTime,
        "Edm.Int16" | "Edm.Int32" | "Edm.Int64" | "Edm.Byte" | "Edm.SByte" => CanonicalType::Integer,
        "Edm.Double" => CanonicalType::BinaryFloat,
        "Edm.Boolean" => CanonicalType::Boolean,
        "Edm.Guid" => CanonicalType::Uuid,
        "Edm.Binary" if not_filterable() => CanonicalType::LargeBinary,
        "Edm.Binary" => CanonicalType::Binary,
        _ => return None,
    };
    Some(canonical)
}

/// `filterable == "false"`, looked up in the annotations first and the raw
/// attributes second.
fn is_not_filterable(annotations: &Map<String, Value>, attributes: &Map<String, Value>) -> bool {
    annotations
        .get("filterable")
        .or_else(|| attributes.get("filterable"))
        .and_then(Value::as_str)
        == Some("false")
}

fn has_precision(attributes: &Map<String, Value>) -> bool {
    match attributes.get("precision") {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

fn precision_is_seven(attributes: &Map<String, Value>) -> bool {
    attributes.get("precision").and_then(Value::as_str) == Some("7")
}

/// Drops any namespace qualifier: `NS.Multiplicity.*` becomes `*`.
pub fn normalize_multiplicity(multiplicity: &str) -> &str {
    match multiplicity.rfind('.') {
        Some(i) => &multiplicity[i + 1..],
        None => multiplicity,
    }
}

/// A type reference that survives normalization still qualified and outside
/// the EDM namespace names a complex type.
pub fn is_complex_type_reference(type_name: &str) -> bool {
    type_name.contains('.') && !type_name.starts_with("Edm.")
}
