//! Capability registry: one provider per capability name.

use std::collections::BTreeMap;

use condor_core::artifact::ArtifactKey;

use crate::error::{Provider, ResolveError, ResolveResult};

#[derive(Debug, Default, Clone)]
pub struct CapabilityRegistry {
    providers: BTreeMap<String, Provider>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `provider` as the provider of `capability`.
    ///
    /// Registering the same provider again is a no-op; a different provider
    /// is a [`ResolveError::CapabilityConflict`] and leaves the existing
    /// entry in place.
    pub fn register(
        &mut self,
        capability: &str,
        provider: &ArtifactKey,
        label: &str,
    ) -> ResolveResult<()> {
        if let Some(existing) = self.providers.get(capability) {
            if existing.key == *provider {
                return Ok(());
            }
            return Err(ResolveError::CapabilityConflict {
                capability: capability.to_string(),
                existing: existing.clone(),
                new: Provider {
                    key: provider.clone(),
                    label: label.to_string(),
                },
            });
        }
        tracing::debug!("capability {capability} provided by {provider}");
        self.providers.insert(
            capability.to_string(),
            Provider {
                key: provider.clone(),
                label: label.to_string(),
            },
        );
        Ok(())
    }

    pub fn lookup(&self, capability: &str) -> Option<&ArtifactKey> {
        self.providers.get(capability).map(|p| &p.key)
    }

    pub fn provider(&self, capability: &str) -> Option<&Provider> {
        self.providers.get(capability)
    }

    /// All registrations, ordered by capability name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Provider)> {
        self.providers.iter().map(|(name, p)| (name.as_str(), p))
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
