//! Mount descriptors and their tagged JSON encoding.
//!
//! A descriptor is encoded as an object with exactly one of the keys `path`,
//! `bundle`, `icloudbundle` or `preset`. Decoding tries the keys in that
//! order and commits to the first one whose value has the expected shape, so
//! a malformed document carrying several tags resolves by key order instead
//! of being rejected. Unknown keys are ignored.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};
use thiserror::Error;

const PATH_KEY: &str = "path";
const BUNDLE_KEY: &str = "bundle";
const ICLOUD_BUNDLE_KEY: &str = "icloudbundle";
const PRESET_KEY: &str = "preset";

/// Locations the daemon knows how to resolve on its own.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PresetKind {
    /// The photo library.
    Photos,
    /// The "On My iPhone" local files area.
    LocalFiles,
    /// The mobile user's home directory.
    Home,
    /// The mobile user's documents directory.
    Documents,
}

/// Errors raised while decoding a descriptor document.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DescriptorError {
    /// None of the four tag keys carried a usable value.
    #[error("mount descriptor matches none of: path, bundle, icloudbundle, preset")]
    UnrecognizedVariant,
}

/// What a mount exposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MountDescriptor {
    /// An arbitrary filesystem path.
    Path(String),
    /// An application's private data container, by bundle identifier.
    AppBundle(String),
    /// An application's iCloud container, by bundle identifier.
    ICloudBundle(String),
    /// A fixed location known to the daemon.
    Preset(PresetKind),
}

impl MountDescriptor {
    /// Tag key used in the serialised form.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Path(_) => PATH_KEY,
            Self::AppBundle(_) => BUNDLE_KEY,
            Self::ICloudBundle(_) => ICLOUD_BUNDLE_KEY,
            Self::Preset(_) => PRESET_KEY,
        }
    }
}

impl fmt::Display for MountDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "path {path}"),
            Self::AppBundle(bundle) => write!(f, "app bundle {bundle}"),
            Self::ICloudBundle(bundle) => write!(f, "icloud bundle {bundle}"),
            Self::Preset(kind) => write!(f, "preset {kind}"),
        }
    }
}

impl Serialize for MountDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Self::Path(value) | Self::AppBundle(value) | Self::ICloudBundle(value) => {
                map.serialize_entry(self.tag(), value)?;
            }
            Self::Preset(kind) => map.serialize_entry(self.tag(), kind)?,
        }
        map.end()
    }
}

/// Every tag the document might carry, captured loosely so a tag with the
/// wrong value shape falls through to the next one.
#[derive(Deserialize)]
struct TaggedFields {
    #[serde(default)]
    path: Option<Value>,
    #[serde(default)]
    bundle: Option<Value>,
    #[serde(default)]
    icloudbundle: Option<Value>,
    #[serde(default)]
    preset: Option<Value>,
}

impl TaggedFields {
    fn resolve(self) -> Result<MountDescriptor, DescriptorError> {
        if let Some(Value::String(path)) = self.path {
            return Ok(MountDescriptor::Path(path));
        }
        if let Some(Value::String(bundle)) = self.bundle {
            return Ok(MountDescriptor::AppBundle(bundle));
        }
        if let Some(Value::String(bundle)) = self.icloudbundle {
            return Ok(MountDescriptor::ICloudBundle(bundle));
        }
        if let Some(kind) = self
            .preset
            .and_then(|value| serde_json::from_value::<PresetKind>(value).ok())
        {
            return Ok(MountDescriptor::Preset(kind));
        }
        Err(DescriptorError::UnrecognizedVariant)
    }
}

impl<'de> Deserialize<'de> for MountDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        TaggedFields::deserialize(deserializer)?
            .resolve()
            .map_err(de::Error::custom)
    }
}
