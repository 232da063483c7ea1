//! Package manifest object model and stream codec.
//!
//! A package is a multi-document YAML stream. Each document decodes into a
//! [`PackageObject`]: custom resource definitions get a typed arm carrying
//! the identity fields the filter inspects, everything else rides along as
//! an opaque document. The original document is kept on both arms so the
//! stream can be re-emitted without loss.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_yml::Value;

/// API version of the one recognized filterable kind.
pub const CRD_API_VERSION: &str = "apiextensions.k8s.io/v1";

/// Kind string of the one recognized filterable kind.
pub const CRD_KIND: &str = "CustomResourceDefinition";

/// One decoded document of a package manifest stream.
#[derive(Debug, Clone, PartialEq)]
pub enum PackageObject {
    /// The only kind the filter ever considers for exclusion.
    CustomResourceDefinition(CustomResourceDefinition),
    /// Any other kind; always passes through the filter untouched.
    Other(Unstructured),
}

/// Typed view of a custom resource definition manifest.
///
/// Only the identity fields consulted during filtering are extracted:
/// `name` from `metadata.name` and `group` from `spec.group`. Missing
/// fields decode as empty strings.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomResourceDefinition {
    name: String,
    group: String,
    document: Value,
}

impl CustomResourceDefinition {
    pub fn kind(&self) -> &str {
        CRD_KIND
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn group(&self) -> &str {
        &self.group
    }
}

/// An unrecognized manifest document, carried opaquely.
#[derive(Debug, Clone, PartialEq)]
pub struct Unstructured {
    api_version: String,
    kind: String,
    name: String,
    document: Value,
}

impl Unstructured {
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PackageObject {
    /// Decode one parsed document.
    ///
    /// Recognition requires both the apiVersion and the kind to match; any
    /// other combination (older apiextensions versions included) lands in
    /// the [`PackageObject::Other`] arm. Only non-mapping documents are
    /// rejected.
    pub fn from_value(value: Value) -> Result<Self> {
        if value.as_mapping().is_none() {
            bail!("manifest document is not a mapping");
        }

        let api_version = str_at(&value, &["apiVersion"]);
        let kind = str_at(&value, &["kind"]);
        let name = str_at(&value, &["metadata", "name"]);

        if api_version == CRD_API_VERSION && kind == CRD_KIND {
            Ok(Self::CustomResourceDefinition(CustomResourceDefinition {
                name,
                group: str_at(&value, &["spec", "group"]),
                document: value,
            }))
        } else {
            Ok(Self::Other(Unstructured {
                api_version,
                kind,
                name,
                document: value,
            }))
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            Self::CustomResourceDefinition(crd) => crd.kind(),
            Self::Other(other) => other.kind(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::CustomResourceDefinition(crd) => crd.name(),
            Self::Other(other) => other.name(),
        }
    }

    /// The complete document as parsed.
    pub fn document(&self) -> &Value {
        match self {
            Self::CustomResourceDefinition(crd) => &crd.document,
            Self::Other(other) => &other.document,
        }
    }
}

/// Decode a multi-document YAML stream in document order.
///
/// Empty documents between separators are skipped.
pub fn parse_stream(input: &str) -> Result<Vec<PackageObject>> {
    let mut objects = Vec::new();
    for (index, document) in serde_yml::Deserializer::from_str(input).enumerate() {
        let value = Value::deserialize(document)
            .with_context(|| format!("malformed YAML in document {}", index + 1))?;
        if value.is_null() {
            continue;
        }
        let object = PackageObject::from_value(value)
            .with_context(|| format!("invalid manifest in document {}", index + 1))?;
        objects.push(object);
    }
    Ok(objects)
}

/// Render documents in order as a `---`-separated YAML stream.
pub fn to_yaml(objects: &[&PackageObject]) -> Result<String> {
    let mut rendered = String::new();
    for (index, object) in objects.iter().enumerate() {
        if index > 0 {
            rendered.push_str("---\n");
        }
        rendered.push_str(&serde_yml::to_string(object.document())?);
    }
    Ok(rendered)
}

/// Render documents as one pretty-printed JSON array.
pub fn to_json(objects: &[&PackageObject]) -> Result<String> {
    let documents: Vec<&Value> = objects.iter().map(|object| object.document()).collect();
    let mut rendered = serde_json::to_string_pretty(&documents)?;
    rendered.push('\n');
    Ok(rendered)
}

fn str_at(value: &Value, path: &[&str]) -> String {
    let mut current = value;
    for key in path {
        match current.get(key) {
            Some(next) => current = next,
            None => return String::new(),
        }
    }
    current.as_str().unwrap_or_default().to_string()
}
