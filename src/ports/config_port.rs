//! Configuration access port trait.

use std::collections::BTreeMap;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;
    /// Every key/value pair of one section, in key order. `None` when the
    /// section is absent.
    fn get_section(&self, section: &str) -> Option<BTreeMap<String, String>>;
}
