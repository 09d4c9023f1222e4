//! `{name}`-style string templates used for tile URLs and panel texts.

use std::collections::HashMap;

use strfmt::DisplayStr;

use crate::error::HeatmapError;

struct TemplateValue<'a>(&'a str);

impl DisplayStr for TemplateValue<'_> {
    fn display_str(&self, f: &mut strfmt::Formatter) -> strfmt::Result<()> {
        f.str(self.0)?;
        Ok(())
    }
}

/// Substitutes `{key}` placeholders of the template with the given values.
///
/// Unknown placeholders are an error, unused values are ignored.
pub fn expand(template: &str, values: &[(&str, &str)]) -> Result<String, HeatmapError> {
    let vars: HashMap<String, TemplateValue> = values
        .iter()
        .map(|(key, value)| (key.to_string(), TemplateValue(value)))
        .collect();

    strfmt::strfmt(template, &vars)
        .map_err(|err| HeatmapError::InvalidConfig(format!("template '{template}': {err}")))
}
