//! Capability gates that must be checked out before use.

use crate::SwathError;
use dashmap::DashSet;
use log::debug;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extension {
    /// Raster analysis: clipping, rotation, focal statistics.
    Spatial,

    /// Surface interpolation of lines.
    ThreeD,
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spatial => f.write_str("Spatial Analyst"),
            Self::ThreeD => f.write_str("3D Analyst"),
        }
    }
}

/// Registry of available and checked out extensions.
pub struct Extensions {
    available: DashSet<Extension>,
    checked_out: DashSet<Extension>,
}

impl Default for Extensions {
    fn default() -> Self {
        Self::all()
    }
}

impl Extensions {
    /// Returns a registry with every extension available.
    pub fn all() -> Self {
        let available = DashSet::new();
        available.insert(Extension::Spatial);
        available.insert(Extension::ThreeD);
        Self {
            available,
            checked_out: DashSet::new(),
        }
    }

    /// Marks `ext` as unavailable.
    #[must_use]
    pub fn without(self, ext: Extension) -> Self {
        self.available.remove(&ext);
        self
    }

    pub fn is_available(&self, ext: Extension) -> bool {
        self.available.contains(&ext)
    }

    pub fn is_checked_out(&self, ext: Extension) -> bool {
        self.checked_out.contains(&ext)
    }

    /// Returns the number of extensions currently checked out.
    pub fn checked_out_count(&self) -> usize {
        self.checked_out.len()
    }

    /// Checks out `ext`, returning a guard that checks it back in when
    /// dropped.
    pub fn check_out(&self, ext: Extension) -> Result<Checkout<'_>, SwathError> {
        if !self.is_available(ext) {
            return Err(SwathError::License(ext));
        }
        self.checked_out.insert(ext);
        debug!("checked out {ext}");
        Ok(Checkout { ext, owner: self })
    }
}

/// A checked out extension.
#[must_use]
pub struct Checkout<'a> {
    ext: Extension,
    owner: &'a Extensions,
}

impl Drop for Checkout<'_> {
    fn drop(&mut self) {
        self.owner.checked_out.remove(&self.ext);
        debug!("checked in {}", self.ext);
    }
}

#[cfg(test)]
mod tests {
    use super::{Extension, Extensions};
    use crate::SwathError;

    #[test]
    fn test_checkout_is_scoped() {
        let extensions = Extensions::all();
        {
            let _spatial = extensions.check_out(Extension::Spatial).unwrap();
            assert!(extensions.is_checked_out(Extension::Spatial));
            assert!(!extensions.is_checked_out(Extension::ThreeD));
        }
        assert_eq!(extensions.checked_out_count(), 0);
    }

    #[test]
    fn test_unavailable_extension() {
        let extensions = Extensions::all().without(Extension::ThreeD);
        assert!(extensions.is_available(Extension::Spatial));
        assert!(matches!(
            extensions.check_out(Extension::ThreeD),
            Err(SwathError::License(Extension::ThreeD))
        ));
        assert_eq!(extensions.checked_out_count(), 0);
    }
}
