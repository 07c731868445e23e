use std::collections::BTreeMap;

/// Fields the model doesn't know the name of yet, preserved so a
/// round-trip through an external serializer doesn't silently drop data.
pub type UnknownAttrs = BTreeMap<String, serde_json::Value>;

/// How a tax value's nominal quantity should be read: per-piece or as a
/// percentage of nominal value (used for bonds quoted in percent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum QuotationType {
    Piece,
    Percent,
}
