use crate::foundation::math::Fnv1a64;

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// One class rule gated by the narrow-viewport media condition.
pub struct StyleRule {
    /// Generated class name attached to the node.
    pub class_name: String,
    /// `max-width` of the media condition, in CSS pixels.
    pub max_width_px: f64,
    /// Property/value pairs, in insertion order.
    pub declarations: Vec<(String, String)>,
}

impl StyleRule {
    /// The media condition, e.g. `max-width: 1096px`.
    pub fn media_condition(&self) -> String {
        format!("max-width: {}px", self.max_width_px)
    }

    /// Render as a CSS `@media` block. Every declaration is `!important` so it wins over the
    /// node's inline style.
    pub fn to_css(&self) -> String {
        let mut css = format!(
            "@media ({}) {{\n\t.{} {{\n",
            self.media_condition(),
            self.class_name
        );
        for (property, value) in &self.declarations {
            css.push_str(&format!("\t\t{property}: {value} !important;\n"));
        }
        css.push_str("\t}\n}\n");
        css
    }
}

/// Collects narrow-viewport overrides for one node into a single [`StyleRule`].
#[derive(Clone, Debug)]
pub struct ResponsiveStyleBuilder {
    class_name: String,
    declarations: Vec<(String, String)>,
}

impl ResponsiveStyleBuilder {
    /// Builder whose class name is derived from `identity`; equal identities give equal names.
    pub fn new(identity: &str) -> Self {
        let mut h = Fnv1a64::new_default();
        h.write_str(identity);
        Self {
            class_name: format!("sp-{:016x}", h.finish()),
            declarations: Vec::new(),
        }
    }

    /// Class name the compiled rule will use.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Set `property` to `value`, replacing an earlier value for the same property.
    pub fn mobile_style(mut self, property: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.declarations.iter_mut().find(|(p, _)| p == property) {
            Some(slot) => slot.1 = value,
            None => self.declarations.push((property.to_string(), value)),
        }
        self
    }

    /// Set `property` to a pixel length.
    pub fn mobile_px(self, property: &str, px: f64) -> Self {
        self.mobile_style(property, format!("{px}px"))
    }

    /// Set `property` to `px` if present.
    pub fn mobile_px_opt(self, property: &str, px: Option<f64>) -> Self {
        match px {
            Some(px) => self.mobile_px(property, px),
            None => self,
        }
    }

    /// The rule, or `None` when no override was collected.
    pub fn compile(self, max_width_px: f64) -> Option<StyleRule> {
        if self.declarations.is_empty() {
            return None;
        }
        Some(StyleRule {
            class_name: self.class_name,
            max_width_px,
            declarations: self.declarations,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/responsive.rs"]
mod tests;
