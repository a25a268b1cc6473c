use std::fmt;
use std::path::Path;
use std::str::FromStr;

use tracing::*;

use crate::errors::*;
use crate::jsonutils::order_json;
use crate::prelude::*;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Format {
    #[default]
    Json,
    Yaml,
}

impl Format {
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Format> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) => ext.parse(),
            None => bail!("cannot determine fixture format for {}: no file extension", path.display()),
        }
    }
}

impl FromStr for Format {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Format> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            _ => bail!("unknown fixture format {s:?} (expected json or yaml)"),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Format::Json => f.write_str("json"),
            Format::Yaml => f.write_str("yaml"),
        }
    }
}

// Serialize a fixture for checking in or serving to a client under test.  Only valid fixtures are
// rendered, keys are sorted at every level so that diffs between fixtures are minimal, and the
// output always ends in a newline.
pub fn render(fixture: &PodFixture, format: Format) -> anyhow::Result<String> {
    fixture.validate()?;

    let value = order_json(serde_json::to_value(fixture)?);
    let mut out = match format {
        Format::Json => serde_json::to_string_pretty(&value)?,
        Format::Yaml => serde_yaml::to_string(&value)?,
    };
    if !out.ends_with('\n') {
        out.push('\n');
    }

    debug!("rendered {} as {format} ({} bytes)", fixture.namespaced_name(), out.len());
    Ok(out)
}

// The inverse of `render`; the document has to describe a valid fixture, and if it doesn't the
// returned error downcasts to the ValidationError that was violated.
pub fn parse(contents: &str, format: Format) -> anyhow::Result<PodFixture> {
    let fixture: PodFixture = match format {
        Format::Json => serde_json::from_str(contents)?,
        // serde_yaml only reads externally-tagged enums (container states, volume sources) from
        // `!tag` syntax, so Kubernetes-shaped YAML goes through a JSON value first
        Format::Yaml => serde_json::from_value(serde_yaml::from_str::<serde_json::Value>(contents)?)?,
    };
    fixture.validate()?;
    Ok(fixture)
}

#[cfg(test)]
mod tests;
