//! Elementwise transcendental functions. Float32 only.

use tensile_core::{ElementKind, Result, TensorError};

use super::map_elements;
use crate::element::Element;
use crate::instance::Instance;

pub fn log(input: &Instance) -> Result<Instance> {
    float_map(input, "log", f32::ln)
}

pub fn exp(input: &Instance) -> Result<Instance> {
    float_map(input, "exp", f32::exp)
}

pub fn pow(input: &Instance, exponent: i32) -> Result<Instance> {
    float_map(input, "pow", move |v| v.powi(exponent))
}

fn float_map(
    input: &Instance,
    name: &str,
    op: impl Fn(f32) -> f32 + Sync + Send,
) -> Result<Instance> {
    if input.element_kind() != ElementKind::Float32 {
        return Err(TensorError::UnknownOperation(format!(
            "{name}_{}",
            input.kind().tag()
        )));
    }
    let view = f32::view(input)?;
    let out = map_elements(view.data, op);
    f32::build(view.shape.clone(), out)
}
