//! Multi-component cell field with ghost cells.

use std::ops::Range;

use crate::error::{Result, TransportError};
use crate::types::{CellLayout, ComponentIndex};

/// Concentrations of several components over owned and ghost cells.
///
/// Storage is component-major: all cells of component 0, then all cells of
/// component 1, and so on. Within a component, owned cells come first.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentField {
    layout: CellLayout,
    n_components: usize,
    data: Vec<f64>,
}

impl ComponentField {
    /// Create a zero-initialized field.
    pub fn new(layout: CellLayout, n_components: usize) -> Self {
        Self {
            layout,
            n_components,
            data: vec![0.0; layout.n_total() * n_components],
        }
    }

    /// Create a field from one vector per component.
    pub fn from_components(layout: CellLayout, components: Vec<Vec<f64>>) -> Result<Self> {
        let mut field = Self::new(layout, components.len());
        for (k, values) in components.iter().enumerate() {
            TransportError::check_len("component cell values", layout.n_total(), values.len())?;
            field.component_mut(ComponentIndex::new(k)).copy_from_slice(values);
        }
        Ok(field)
    }

    /// Cell layout of this field.
    #[inline]
    pub fn layout(&self) -> CellLayout {
        self.layout
    }

    /// Number of components.
    #[inline]
    pub fn n_components(&self) -> usize {
        self.n_components
    }

    /// Values of one component over all cells (owned and ghost).
    #[inline]
    pub fn component(&self, k: ComponentIndex) -> &[f64] {
        let n = self.layout.n_total();
        &self.data[k.get() * n..(k.get() + 1) * n]
    }

    /// Mutable values of one component over all cells.
    #[inline]
    pub fn component_mut(&mut self, k: ComponentIndex) -> &mut [f64] {
        let n = self.layout.n_total();
        &mut self.data[k.get() * n..(k.get() + 1) * n]
    }

    /// Values of one component over owned cells only.
    #[inline]
    pub fn owned(&self, k: ComponentIndex) -> &[f64] {
        &self.component(k)[..self.layout.n_owned]
    }

    /// Value of component `k` in `cell`.
    #[inline]
    pub fn get(&self, k: ComponentIndex, cell: usize) -> f64 {
        self.data[k.get() * self.layout.n_total() + cell]
    }

    /// Raw storage.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Check that another field has the same shape.
    pub fn check_compatible(&self, other: &ComponentField) -> Result<()> {
        if self.layout.n_total() != other.layout.n_total() {
            return Err(TransportError::Synchronization {
                expected: self.layout.n_total(),
                actual: other.layout.n_total(),
            });
        }
        TransportError::check_len("components", self.n_components, other.n_components)
    }

    /// Overwrite this field with the contents of `other`.
    pub fn copy_from(&mut self, other: &ComponentField) -> Result<()> {
        self.check_compatible(other)?;
        self.data.copy_from_slice(&other.data);
        Ok(())
    }

    /// Copy a range of components from `other`.
    pub fn copy_components_from(
        &mut self,
        other: &ComponentField,
        components: Range<usize>,
    ) -> Result<()> {
        self.check_compatible(other)?;
        if components.end > self.n_components {
            return Err(TransportError::dimension(
                "component range",
                self.n_components,
                components.end,
            ));
        }
        for k in components.map(ComponentIndex::new) {
            self.component_mut(k).copy_from_slice(other.component(k));
        }
        Ok(())
    }

    /// Minimum and maximum of a component over owned cells.
    pub fn owned_range(&self, k: ComponentIndex) -> (f64, f64) {
        self.owned(k)
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }
}
