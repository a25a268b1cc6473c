#![cfg_attr(coverage, feature(coverage_attribute))]
pub mod constants;
pub mod errors;
pub mod jsonutils;
pub mod k8s;
pub mod lifecycle;
pub mod macros;
pub mod model;
pub mod render;
pub mod scenario;
pub mod synth;

mod ids;
#[cfg(test)]
mod testutils;

pub mod prelude {
    pub use k8s_openapi::api::core::v1 as corev1;
    pub use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
    pub use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;

    pub use crate::constants::*;
    pub use crate::errors::{
        ValidationError,
        ValidationResult,
    };
    pub use crate::k8s::{
        GVK,
        owner_object,
    };
    pub use crate::lifecycle::Timeline;
    pub use crate::model::*;
    pub use crate::render::{
        Format,
        parse,
        render,
    };
    pub use crate::scenario::{
        ResolvedScenario,
        ScenarioDescriptor,
        Seed,
    };
    pub use crate::synth::{
        synthesize,
        transition,
    };
}
