//! Package provides and dependency requirements attached to files.
//!
//! A [`Package`] is something a file provides, a [`Dependency`] is something
//! a file requires. Both are plain values until they are attached to a file
//! through [`crate::tree::Collection::add_package`] or
//! [`crate::tree::Collection::add_dependency`]; from then on the collection
//! owns them and every edit goes through the collection so the dirty flag
//! stays accurate.
//!
//! Names are matched exactly (case-sensitive).

use crate::version::Version;
use std::cmp::Ordering;
use std::fmt;

/// Stores `text` parsed into `slot`, returning whether the parsed value
/// differs from the old one.
fn replace_version(slot: &mut Version, text: &str) -> bool {
    let parsed = Version::new(text);
    if *slot == parsed {
        return false;
    }
    *slot = parsed;
    true
}

/// A named package, optionally versioned, provided by a file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Package {
    /// Package name
    name: String,
    /// Provided version, unset when unknown
    version: Version,
}

impl Package {
    /// Creates a package with a name and an optional version string.
    #[must_use]
    pub fn new(name: &str, version: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            version: Version::new(version.unwrap_or_default()),
        }
    }

    /// Package name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Provided version.
    #[must_use]
    pub const fn version(&self) -> &Version {
        &self.version
    }

    /// Sets the name, returning whether it changed.
    pub fn set_name(&mut self, name: &str) -> bool {
        if self.name == name {
            return false;
        }
        self.name = name.to_string();
        true
    }

    /// Sets the version text, returning whether it changed.
    pub fn set_version(&mut self, version: &str) -> bool {
        replace_version(&mut self.version, version)
    }

    /// `name` followed by the version when one is set.
    #[must_use]
    pub fn display_string(&self) -> String {
        if self.version.is_ok() {
            format!("{} {}", self.name, self.version)
        } else {
            self.name.clone()
        }
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_string())
    }
}

/// A requirement on a named package within an optional version range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependency {
    /// Required package name
    name: String,
    /// Inclusive lower bound, unset when absent
    min_version: Version,
    /// Inclusive upper bound, unset when absent
    max_version: Version,
}

impl Dependency {
    /// Creates a dependency on `name` with optional inclusive bounds.
    #[must_use]
    pub fn new(name: &str, min_version: Option<&str>, max_version: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            min_version: Version::new(min_version.unwrap_or_default()),
            max_version: Version::new(max_version.unwrap_or_default()),
        }
    }

    /// Required package name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lower bound.
    #[must_use]
    pub const fn min_version(&self) -> &Version {
        &self.min_version
    }

    /// Upper bound.
    #[must_use]
    pub const fn max_version(&self) -> &Version {
        &self.max_version
    }

    /// Sets the name, returning whether it changed.
    pub fn set_name(&mut self, name: &str) -> bool {
        if self.name == name {
            return false;
        }
        self.name = name.to_string();
        true
    }

    /// Sets the lower bound text, returning whether it changed.
    pub fn set_min_version(&mut self, version: &str) -> bool {
        replace_version(&mut self.min_version, version)
    }

    /// Sets the upper bound text, returning whether it changed.
    pub fn set_max_version(&mut self, version: &str) -> bool {
        replace_version(&mut self.max_version, version)
    }

    /// Whether `package` satisfies this dependency.
    ///
    /// A package without a version only satisfies a dependency that has no
    /// bounds at all.
    #[must_use]
    pub fn check(&self, package: &Package) -> bool {
        if self.name != package.name() {
            return false;
        }

        let provided = package.version();
        if !provided.is_ok() {
            return !self.min_version.is_ok() && !self.max_version.is_ok();
        }

        if self.min_version.is_ok() && self.min_version.compare(provided) == Ordering::Greater {
            return false;
        }

        if self.max_version.is_ok() && self.max_version.compare(provided) == Ordering::Less {
            return false;
        }

        true
    }

    /// Human readable form, e.g. `libfoo >= 1.0, <= 2.0`.
    #[must_use]
    pub fn display_string(&self) -> String {
        let mut result = self.name.clone();

        if self.min_version.is_ok() {
            result.push_str(" >= ");
            result.push_str(self.min_version.as_str());
        }

        if self.max_version.is_ok() {
            if self.min_version.is_ok() {
                result.push(',');
            }
            result.push_str(" <= ");
            result.push_str(self.max_version.as_str());
        }

        result
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_string())
    }
}
