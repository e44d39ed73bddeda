//! Audience filter model
//!
//! Maps the console's current selections (audience class, optional sub-filter,
//! chosen template) to the `FilterDescriptor` the bulk-send endpoint accepts.
//! The descriptor is rebuilt from scratch on every submission attempt and is
//! never persisted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Audience classes offered by the backend filter engine.
///
/// The wire representation is the human-readable label, not an enum tag;
/// `filter_name` in the descriptor carries this label verbatim (optionally
/// suffixed by the active sub-filter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudienceClass {
    #[default]
    AllClients,
    FamilyHeads,
    MaleClients,
    FemaleClients,
    /// Birthday audience is mutually exclusive with any sub-filter.
    BirthdayClients,
}

impl AudienceClass {
    /// Backend-facing label for this audience class
    pub fn label(&self) -> &'static str {
        match self {
            AudienceClass::AllClients => "All clients",
            AudienceClass::FamilyHeads => "Family heads",
            AudienceClass::MaleClients => "Male clients",
            AudienceClass::FemaleClients => "Female clients",
            AudienceClass::BirthdayClients => "Clients who celebrate birthday",
        }
    }
}

impl fmt::Display for AudienceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Age comparison operator for the "by age" sub-filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AgeComparator {
    #[default]
    #[serde(rename = ">")]
    Over,
    #[serde(rename = "<")]
    Under,
    #[serde(rename = "=")]
    Exactly,
}

impl fmt::Display for AgeComparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            AgeComparator::Over => ">",
            AgeComparator::Under => "<",
            AgeComparator::Exactly => "=",
        };
        f.write_str(symbol)
    }
}

/// Which sub-filter is currently selected (independent of whether its
/// required fields are populated)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubFilterKind {
    #[default]
    None,
    Product,
    Age,
}

/// Serializable descriptor of which audience and template a send job targets.
///
/// Constructed fresh from a [`FilterSelection`] on every submission attempt,
/// POSTed as the bulk-send request body, then discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDescriptor {
    /// Template to apply; resolved at build time, immutable once a job starts
    pub template_id: u64,
    /// Audience label, optionally suffixed with " with product" / " by age"
    pub filter_name: String,
    /// Present only for the product sub-filter; non-empty when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_ids: Option<BTreeSet<u64>>,
    /// Present only for the age sub-filter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_comparator: Option<AgeComparator>,
    /// Present only for the age sub-filter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_value: Option<u32>,
}

/// Current console selections from which a descriptor is built.
///
/// The selection is always constructible; [`FilterSelection::is_valid`] gates
/// submission separately so the console can keep (and display) an incomplete
/// sub-filter without ever sending it.
#[derive(Debug, Clone, Default)]
pub struct FilterSelection {
    pub audience: AudienceClass,
    pub sub_filter: SubFilterKind,
    pub product_ids: BTreeSet<u64>,
    pub age_comparator: AgeComparator,
    pub age_value: Option<u32>,
    pub template_id: u64,
}

impl FilterSelection {
    /// Validity check consulted before allowing a send.
    ///
    /// Invalid when a sub-filter is selected but its required field is empty.
    /// The birthday audience ignores the sub-filter entirely, so it is always
    /// valid regardless of stale sub-filter state.
    pub fn is_valid(&self) -> bool {
        if self.audience == AudienceClass::BirthdayClients {
            return true;
        }
        match self.sub_filter {
            SubFilterKind::Product => !self.product_ids.is_empty(),
            SubFilterKind::Age => self.age_value.is_some(),
            SubFilterKind::None => true,
        }
    }

    /// Deterministically build the descriptor for the current selections.
    ///
    /// The birthday audience clears any sub-filter fields. A sub-filter whose
    /// required field is empty degrades to the bare audience name; such a
    /// descriptor is constructible but rejected by [`Self::is_valid`] before
    /// submission.
    pub fn descriptor(&self) -> FilterDescriptor {
        let mut descriptor = FilterDescriptor {
            template_id: self.template_id,
            filter_name: self.audience.label().to_string(),
            product_ids: None,
            age_comparator: None,
            age_value: None,
        };

        if self.audience == AudienceClass::BirthdayClients {
            return descriptor;
        }

        match self.sub_filter {
            SubFilterKind::Product if !self.product_ids.is_empty() => {
                descriptor.filter_name = format!("{} with product", self.audience.label());
                descriptor.product_ids = Some(self.product_ids.clone());
            }
            SubFilterKind::Age if self.age_value.is_some() => {
                descriptor.filter_name = format!("{} by age", self.audience.label());
                descriptor.age_comparator = Some(self.age_comparator);
                descriptor.age_value = self.age_value;
            }
            _ => {}
        }

        descriptor
    }
}
