//! Region resolver: the active country context with blacklist policy

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::watch;
use tracing;

use vk_shared::RegionConfig;

use crate::domain::entities::PhoneNumber;
use crate::domain::value_objects::{RegionCatalog, NON_GEOGRAPHIC_REGION};
use crate::errors::{DomainError, DomainResult};

/// Process-wide region context
///
/// Holds the user's region selection plus the blacklist. The selection is
/// published through a watch channel, so a write is an atomic replacement
/// and readers always see either the old or the new value.
#[derive(Debug)]
pub struct RegionResolver {
    catalog: Arc<RegionCatalog>,
    blacklist: BTreeSet<String>,
    selection: watch::Sender<String>,
    fallback: String,
}

impl RegionResolver {
    /// Create a resolver over `catalog`
    ///
    /// Fails when the blacklist leaves no selectable region, since the
    /// effective region must always have somewhere to fall back to.
    pub fn new<I, S>(
        catalog: Arc<RegionCatalog>,
        initial_region: &str,
        blacklist: I,
    ) -> DomainResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let blacklist: BTreeSet<String> = blacklist
            .into_iter()
            .map(|code| code.as_ref().trim().to_ascii_uppercase())
            .filter(|code| !code.is_empty())
            .collect();

        let fallback = catalog
            .entries()
            .iter()
            .map(|entry| entry.code.as_str())
            .find(|code| *code != NON_GEOGRAPHIC_REGION && !blacklist.contains(*code))
            .map(str::to_string)
            .ok_or_else(|| DomainError::config("every known region is blacklisted"))?;

        let (selection, _) = watch::channel(initial_region.trim().to_ascii_uppercase());

        tracing::debug!(
            event = "region_resolver_created",
            blacklisted = blacklist.len(),
            fallback = %fallback,
            "Region resolver initialised"
        );

        Ok(Self {
            catalog,
            blacklist,
            selection,
            fallback,
        })
    }

    /// Resolver over the built-in catalog configured from [`RegionConfig`]
    pub fn from_config(config: &RegionConfig) -> DomainResult<Self> {
        Self::new(
            Arc::new(RegionCatalog::builtin()),
            &config.default_region,
            config.normalized_blacklist(),
        )
    }

    /// The region to format and parse numbers in
    ///
    /// The stored selection, unless it is blacklisted; then the first
    /// supported region in display order.
    pub fn effective_region(&self) -> String {
        let selected = self.selection.borrow();
        if self.blacklist.contains(selected.as_str()) {
            self.fallback.clone()
        } else {
            selected.clone()
        }
    }

    /// The raw stored selection, which may be blacklisted
    pub fn selected_region(&self) -> String {
        self.selection.borrow().clone()
    }

    /// Selectable region codes in display-name order
    ///
    /// The iterator is lazy and can be cloned to restart it. The
    /// non-geographic sentinel and every blacklisted code are skipped.
    pub fn supported_regions(&self) -> impl Iterator<Item = &str> + Clone + '_ {
        self.catalog
            .entries()
            .iter()
            .map(|entry| entry.code.as_str())
            .filter(move |code| *code != NON_GEOGRAPHIC_REGION && !self.blacklist.contains(*code))
    }

    /// Overwrite the selection; blacklisting is applied on read
    pub fn select(&self, region: &str) {
        let region = region.trim().to_ascii_uppercase();
        let previous = self.selection.send_replace(region.clone());

        tracing::info!(
            event = "region_selected",
            previous = %previous,
            region = %region,
            "Region selection changed"
        );
    }

    /// Watch for selection changes (for a country picker)
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.selection.subscribe()
    }

    pub fn is_blacklisted(&self, region: &str) -> bool {
        self.blacklist.contains(&region.trim().to_ascii_uppercase())
    }

    pub fn catalog(&self) -> &RegionCatalog {
        &self.catalog
    }

    /// E.164 calling code for `region`
    pub fn calling_code(&self, region: &str) -> Option<u16> {
        self.catalog.get(region).and_then(|info| info.calling_code)
    }

    /// Display name for `region`, falling back to the code itself
    pub fn display_name(&self, region: &str) -> String {
        self.catalog
            .get(region)
            .map(|info| info.display_name.clone())
            .unwrap_or_else(|| region.trim().to_ascii_uppercase())
    }

    /// Flag emoji built from regional indicator symbols
    ///
    /// Returns `None` unless `region` is two ASCII letters.
    pub fn emoji_flag(region: &str) -> Option<String> {
        let region = region.trim();
        if region.len() != 2 || !region.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }

        region
            .to_ascii_uppercase()
            .chars()
            .map(|c| char::from_u32(0x1F1E6 + (c as u32 - 'A' as u32)))
            .collect()
    }

    /// Build a phone number with the effective region's calling code
    pub fn phone_number(&self, raw_number: &str) -> PhoneNumber {
        let region = self.effective_region();
        let calling_code = self
            .calling_code(&region)
            .map(|code| code.to_string())
            .unwrap_or_default();
        PhoneNumber::new(calling_code, raw_number)
    }

    /// Canonical form of `number` in the effective region
    pub fn canonical_form(&self, number: &PhoneNumber) -> String {
        number.canonical_form(&self.effective_region())
    }

    /// National form of `number` in the effective region
    pub fn national_form(&self, number: &PhoneNumber) -> String {
        number.national_form(&self.effective_region())
    }
}
