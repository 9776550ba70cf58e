//! Page metadata collection for the host's head rendering.

/// Metadata fields this core knows how to project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaField {
    Title,
    Description,
}

impl MetaField {
    fn property_names(self) -> [&'static str; 3] {
        match self {
            MetaField::Title => ["title", "og:title", "twitter:title"],
            MetaField::Description => ["description", "og:description", "twitter:description"],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaProperty {
    pub name: &'static str,
    pub content: String,
}

/// Ordered set of metadata properties; setting a field upserts its whole
/// property group (plain, OpenGraph, Twitter).
#[derive(Debug, Default)]
pub struct MetaTagCollector {
    properties: Vec<MetaProperty>,
}

impl MetaTagCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: MetaField, value: &str) {
        for name in field.property_names() {
            match self
                .properties
                .iter_mut()
                .find(|property| property.name == name)
            {
                Some(existing) => existing.content = value.to_string(),
                None => self.properties.push(MetaProperty {
                    name,
                    content: value.to_string(),
                }),
            }
        }
    }

    pub fn properties(&self) -> &[MetaProperty] {
        &self.properties
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_projects_to_all_title_properties() {
        let mut collector = MetaTagCollector::new();
        collector.set(MetaField::Title, "Ranking related posts");

        let names: Vec<&str> = collector
            .properties()
            .iter()
            .map(|property| property.name)
            .collect();
        assert_eq!(names, vec!["title", "og:title", "twitter:title"]);
    }

    #[test]
    fn setting_twice_upserts_instead_of_duplicating() {
        let mut collector = MetaTagCollector::new();
        collector.set(MetaField::Description, "first");
        collector.set(MetaField::Description, "second");

        assert_eq!(collector.properties().len(), 3);
        assert!(
            collector
                .properties()
                .iter()
                .all(|property| property.content == "second")
        );
    }

    #[test]
    fn fields_do_not_interfere() {
        let mut collector = MetaTagCollector::new();
        collector.set(MetaField::Title, "a title");
        collector.set(MetaField::Description, "a description");
        assert_eq!(collector.properties().len(), 6);
    }
}
