use std::borrow::Cow;

use indexmap::IndexMap;

/// A mapping from resource URIs to resource content.
#[derive(Clone, Debug, Default)]
pub struct ResourceMapping {
    resources: IndexMap<String, Cow<'static, str>>,
}

impl ResourceMapping {
    /// Create an empty resource mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource, replacing any resource with the same URI.
    #[must_use]
    pub fn with_resource(
        mut self,
        uri: impl Into<String>,
        content: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.resources.insert(uri.into(), content.into());
        self
    }

    /// Returns the number of resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Returns true if the mapping has no resources.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Iterate over `(uri, content)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.resources
            .iter()
            .map(|(uri, content)| (uri.as_str(), content.as_ref()))
    }
}

impl FromIterator<(&'static str, &'static str)> for ResourceMapping {
    fn from_iter<T: IntoIterator<Item = (&'static str, &'static str)>>(iter: T) -> Self {
        Self {
            resources: iter
                .into_iter()
                .map(|(uri, content)| (uri.to_string(), Cow::Borrowed(content)))
                .collect(),
        }
    }
}

/// Resolves resource URIs from a prioritised list of [`ResourceMapping`]s.
#[derive(Clone, Debug, Default)]
pub struct ResourceManager {
    resources: IndexMap<String, Cow<'static, str>>,
}

impl ResourceManager {
    /// Create a resource manager from `mappings`, highest priority first.
    ///
    /// If more than one mapping provides a URI, the first wins.
    #[must_use]
    pub fn new(mappings: &[ResourceMapping]) -> Self {
        let mut manager = Self::default();
        for mapping in mappings {
            manager.add_mapping(mapping);
        }
        manager
    }

    /// Add the resources of `mapping` that are not already provided.
    pub fn add_mapping(&mut self, mapping: &ResourceMapping) {
        for (uri, content) in &mapping.resources {
            if self.resources.contains_key(uri) {
                log::debug!("resource {uri} is already provided by a higher priority mapping");
            } else {
                self.resources.insert(uri.clone(), content.clone());
            }
        }
    }

    /// Returns the content of the resource with `uri`.
    #[must_use]
    pub fn get(&self, uri: &str) -> Option<&str> {
        self.resources.get(uri).map(AsRef::as_ref)
    }

    /// Returns true if a resource with `uri` is provided.
    #[must_use]
    pub fn contains(&self, uri: &str) -> bool {
        self.resources.contains_key(uri)
    }

    /// Iterate over the provided resource URIs.
    pub fn uris(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }
}
