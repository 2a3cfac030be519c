use serde::{Deserialize, Serialize};

/// Catalog key of the overlay-free template.
pub const BLANK_TEMPLATE_ID: &str = "blank";

/// A decorative overlay painted full-canvas above the photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    /// Overlay bitmap location; `None` for the blank template.
    pub overlay: Option<String>,
}

impl Template {
    pub fn new(id: &str, name: &str, overlay: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            overlay: Some(overlay.to_string()),
        }
    }

    pub fn blank() -> Self {
        Self {
            id: BLANK_TEMPLATE_ID.to_string(),
            name: "Blank".to_string(),
            overlay: None,
        }
    }
}

/// The fixed set of templates a card may use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateCatalog {
    templates: Vec<Template>,
}

impl TemplateCatalog {
    pub fn new() -> Self {
        Self {
            templates: Vec::new(),
        }
    }

    /// The three stock overlays followed by the blank option.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.add_template(Template::new("t1", "Template 1", "templates/temp1.png"));
        catalog.add_template(Template::new("t2", "Template 2", "templates/temp2.png"));
        catalog.add_template(Template::new("t3", "Template 3", "templates/temp3.png"));
        catalog.add_template(Template::blank());
        catalog
    }

    pub fn add_template(&mut self, template: Template) {
        if let Some(existing) = self.templates.iter_mut().find(|t| t.id == template.id) {
            *existing = template;
        } else {
            self.templates.push(template);
        }
    }

    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// A new card starts on the second catalog entry, or the first / blank
    /// when the catalog is shorter.
    pub fn default_template(&self) -> Template {
        self.templates
            .get(1)
            .or_else(|| self.templates.first())
            .cloned()
            .unwrap_or_else(Template::blank)
    }

    pub fn all(&self) -> &[Template] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
