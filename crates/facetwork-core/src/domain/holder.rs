//! Facet holders: one slot per facet type, discovery order preserved.

use tracing::trace;

use crate::domain::facet::{Capabilities, Facet, FacetType};

/// A metamodel element that owns facets.
///
/// Facets are kept in the order their type was first discovered. Advisors
/// are consulted in that order, so it decides which veto reason surfaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetHolder {
    facets: Vec<Facet>,
}

impl FacetHolder {
    pub const fn new() -> Self {
        Self { facets: Vec::new() }
    }

    /// Install `facet` in the slot for its type.
    ///
    /// An occupied slot is overwritten unless the occupant has strictly
    /// higher precedence. A replacement keeps the occupant's position.
    /// Returns `true` when `facet` was installed.
    pub fn add_facet(&mut self, facet: Facet) -> bool {
        let facet_type = facet.facet_type();
        match self.facets.iter().position(|f| f.facet_type() == facet_type) {
            Some(slot) => {
                let existing = &self.facets[slot];
                if existing.precedence() > facet.precedence() {
                    trace!(
                        %facet_type,
                        kept = existing.factory(),
                        rejected = facet.factory(),
                        "facet not installed, existing facet has higher precedence"
                    );
                    return false;
                }
                trace!(
                    %facet_type,
                    replaced = existing.factory(),
                    by = facet.factory(),
                    "facet replaced"
                );
                self.facets[slot] = facet;
                true
            }
            None => {
                self.facets.push(facet);
                true
            }
        }
    }

    pub fn get_facet(&self, facet_type: FacetType) -> Option<&Facet> {
        self.facets.iter().find(|f| f.facet_type() == facet_type)
    }

    pub fn contains(&self, facet_type: FacetType) -> bool {
        self.get_facet(facet_type).is_some()
    }

    pub fn remove_facet(&mut self, facet_type: FacetType) -> Option<Facet> {
        let slot = self
            .facets
            .iter()
            .position(|f| f.facet_type() == facet_type)?;
        Some(self.facets.remove(slot))
    }

    /// All facets matching `predicate`, in discovery order.
    pub fn facets_matching<'a>(
        &'a self,
        predicate: impl Fn(&Facet) -> bool + 'a,
    ) -> impl Iterator<Item = &'a Facet> + 'a {
        self.facets.iter().filter(move |f| predicate(f))
    }

    /// Facets that take part in checks of the given capability.
    pub fn advisors(&self, capability: Capabilities) -> impl Iterator<Item = &Facet> {
        self.facets
            .iter()
            .filter(move |f| f.capabilities().contains(capability))
    }

    pub fn facets(&self) -> &[Facet] {
        &self.facets
    }

    pub fn facet_types(&self) -> Vec<FacetType> {
        self.facets.iter().map(Facet::facet_type).collect()
    }

    pub fn len(&self) -> usize {
        self.facets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }
}
