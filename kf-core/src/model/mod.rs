mod container;
mod image;
mod meta;
pub(crate) mod names;
mod pod;
mod status;
mod volume;

use std::collections::BTreeSet;

pub use container::*;
pub use image::ImageReference;
pub use meta::*;
pub use names::quantity_value;
pub use pod::*;
pub use status::*;
pub use volume::*;

use crate::errors::*;

// Every entity in the fixture model checks its own local invariants; PodFixture additionally checks
// the invariants that span entities (statuses vs. containers, mounts vs. volumes, phase vs.
// conditions, and so forth).  Field paths in the returned error are relative to the entity being
// validated.
pub trait Validate {
    fn validate(&self) -> ValidationResult<()>;

    fn validated(self) -> ValidationResult<Self>
    where
        Self: Sized,
    {
        self.validate()?;
        Ok(self)
    }
}

pub(crate) fn validate_each<T: Validate>(items: &[T], field: &str) -> ValidationResult<()> {
    for (i, item) in items.iter().enumerate() {
        item.validate().within(&format!("{field}[{i}]"))?;
    }
    Ok(())
}

pub(crate) fn check_unique<I, S>(items: I, field: &str, what: &str) -> ValidationResult<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = BTreeSet::new();
    for item in items {
        let s = item.as_ref().to_string();
        check!(!seen.contains(&s), field, "duplicate {what} {s:?}");
        seen.insert(s);
    }
    Ok(())
}

#[cfg(test)]
mod tests;
