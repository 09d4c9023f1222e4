use crate::error::HeatmapError;
use crate::template;
use crate::tile_schema::TileIndex;

/// Tile URL template with `{z}`, `{x}`, `{y}`, `{s}`, `{r}` and `{ext}` placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct TileUrlTemplate {
    template: String,
    ext: String,
    subdomains: Vec<String>,
    retina: bool,
}

impl TileUrlTemplate {
    /// Creates a template, checking that it has no unknown placeholders.
    pub fn new(template: impl Into<String>, ext: impl Into<String>) -> Result<Self, HeatmapError> {
        let template = Self {
            template: template.into(),
            ext: ext.into(),
            subdomains: vec![],
            retina: false,
        };
        template.try_url(&TileIndex::new(0, 0, 0))?;

        Ok(template)
    }

    /// Sets the values of the `{s}` placeholder.
    pub fn with_subdomains(mut self, subdomains: Vec<String>) -> Self {
        self.subdomains = subdomains;
        self
    }

    /// Requests double resolution tiles (`{r}` is replaced with `@2x`).
    pub fn with_retina(mut self, retina: bool) -> Self {
        self.retina = retina;
        self
    }

    /// URL of the tile.
    pub fn url(&self, index: &TileIndex) -> String {
        self.try_url(index).unwrap_or_else(|err| {
            log::error!("Failed to build tile url for {index:?}: {err}");
            String::new()
        })
    }

    fn try_url(&self, index: &TileIndex) -> Result<String, HeatmapError> {
        let z = index.z.to_string();
        let x = index.x.to_string();
        let y = index.y.to_string();
        let subdomain = self.subdomain(index);
        let retina = if self.retina { "@2x" } else { "" };

        template::expand(
            &self.template,
            &[
                ("z", &z),
                ("x", &x),
                ("y", &y),
                ("s", subdomain),
                ("r", retina),
                ("ext", &self.ext),
            ],
        )
    }

    fn subdomain(&self, index: &TileIndex) -> &str {
        if self.subdomains.is_empty() {
            return "";
        }

        let i = (index.x as i64 + index.y as i64).unsigned_abs() as usize % self.subdomains.len();
        &self.subdomains[i]
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn stadia_url() {
        let template = TileUrlTemplate::new(
            "https://tiles.stadiamaps.com/tiles/stamen_toner_lite/{z}/{x}/{y}{r}.{ext}",
            "png",
        )
        .unwrap();
        assert_eq!(
            template.url(&TileIndex::new(5565, 9365, 14)),
            "https://tiles.stadiamaps.com/tiles/stamen_toner_lite/14/5565/9365.png"
        );

        let retina = template.with_retina(true);
        assert_eq!(
            retina.url(&TileIndex::new(1, 2, 3)),
            "https://tiles.stadiamaps.com/tiles/stamen_toner_lite/3/1/2@2x.png"
        );
    }

    #[test]
    fn subdomains_rotate() {
        let template = TileUrlTemplate::new("https://{s}.tile.example.com/{z}/{x}/{y}.png", "png")
            .unwrap()
            .with_subdomains(vec!["a".into(), "b".into(), "c".into()]);

        assert_eq!(
            template.url(&TileIndex::new(0, 0, 1)),
            "https://a.tile.example.com/1/0/0.png"
        );
        assert_eq!(
            template.url(&TileIndex::new(1, 1, 1)),
            "https://c.tile.example.com/1/1/1.png"
        );
    }

    #[test]
    fn unknown_placeholder() {
        assert_matches!(
            TileUrlTemplate::new("https://example.com/{level}/{x}/{y}.png", "png"),
            Err(HeatmapError::InvalidConfig(_))
        );
    }
}
