pub mod json;
pub mod terminal;

use crate::registry::Registry;

pub trait Reporter {
    fn report(&self, registry: &Registry) -> String;
}
