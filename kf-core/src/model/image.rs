use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;

use crate::errors::*;

lazy_static! {
    static ref REPOSITORY: Regex = Regex::new(r"^[a-z0-9]+([._-][a-z0-9]+)*(/[a-z0-9]+([._-][a-z0-9]+)*)*$").unwrap();
    static ref TAG: Regex = Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.-]{0,127}$").unwrap();
    static ref DIGEST: Regex = Regex::new(r"^sha256:[a-f0-9]{64}$").unwrap();
}

// A parsed container image reference, `[registry[:port]/]repository[:tag][@digest]`.  Following
// the docker convention, the first path component is only treated as a registry if it looks like
// a hostname (contains a dot or a port, or is `localhost`); `stefanprodan/podinfo` is a
// repository on the default registry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ImageReference {
    pub registry: Option<String>,
    pub repository: String,
    pub tag: Option<String>,
    pub digest: Option<String>,
}

impl ImageReference {
    pub fn parse(image: &str) -> ValidationResult<ImageReference> {
        let field = "image";
        check!(!image.is_empty(), field, "must be non-empty");

        let (rest, digest) = match image.split_once('@') {
            Some((rest, digest)) => {
                check!(DIGEST.is_match(digest), field, "{image:?} has a malformed digest");
                (rest, Some(digest.to_string()))
            },
            None => (image, None),
        };

        let (registry, rest) = match rest.split_once('/') {
            Some((first, remainder)) if first.contains('.') || first.contains(':') || first == "localhost" => {
                (Some(first.to_string()), remainder)
            },
            _ => (None, rest),
        };

        // the tag separator is the last colon _after_ the last slash (registry ports were already
        // split off above)
        let last_component_start = rest.rfind('/').map_or(0, |i| i + 1);
        let (repository, tag) = match rest[last_component_start..].rfind(':') {
            Some(i) => {
                let split = last_component_start + i;
                (&rest[..split], Some(rest[split + 1..].to_string()))
            },
            None => (rest, None),
        };

        check!(REPOSITORY.is_match(repository), field, "{image:?} has an invalid repository {repository:?}");
        if let Some(t) = tag.as_ref() {
            check!(TAG.is_match(t), field, "{image:?} has an invalid tag {t:?}");
        }

        Ok(ImageReference {
            registry,
            repository: repository.into(),
            tag,
            digest,
        })
    }

    // The name of the image without tag or digest, which is how the kubelet reports image IDs
    pub fn name(&self) -> String {
        match &self.registry {
            Some(r) => format!("{r}/{}", self.repository),
            None => self.repository.clone(),
        }
    }

    pub fn with_digest(&self, hex_digest: &str) -> String {
        format!("{}@sha256:{hex_digest}", self.name())
    }
}

impl FromStr for ImageReference {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ImageReference::parse(s)
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())?;
        if let Some(t) = &self.tag {
            write!(f, ":{t}")?;
        }
        if let Some(d) = &self.digest {
            write!(f, "@{d}")?;
        }
        Ok(())
    }
}
