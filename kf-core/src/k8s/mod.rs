mod gvk;
mod interop;
mod owner;

pub use gvk::*;
pub use owner::owner_object;

#[cfg(test)]
mod tests;
