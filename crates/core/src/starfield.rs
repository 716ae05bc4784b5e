use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use stellar_protocol::{ClassName, DomCommand, InsertPosition, NodeId, SharedStr, StyleProperty, Tag};
use tracing::debug;

use crate::config::SiteConfig;
use crate::runtime::Context;

/// One decorative star. Positions are percentages of the container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub x_pct: f64,
    pub y_pct: f64,
    pub size_px: f64,
    pub opacity: f64,
    pub duration_secs: f64,
}

impl Star {
    /// Inline styles; twinkle opacity and period go through custom
    /// properties the stylesheet animates.
    pub fn styles(&self) -> Vec<(StyleProperty, SharedStr)> {
        vec![
            (StyleProperty::Left, format!("{:.3}%", self.x_pct).into()),
            (StyleProperty::Top, format!("{:.3}%", self.y_pct).into()),
            (StyleProperty::Width, format!("{:.3}px", self.size_px).into()),
            (StyleProperty::Height, format!("{:.3}px", self.size_px).into()),
            (
                StyleProperty::Custom("--opacity".into()),
                format!("{:.3}", self.opacity).into(),
            ),
            (
                StyleProperty::Custom("--duration".into()),
                format!("{:.3}s", self.duration_secs).into(),
            ),
        ]
    }
}

pub fn generate<R: Rng>(config: &SiteConfig, rng: &mut R) -> Vec<Star> {
    (0..config.star_count)
        .map(|_| Star {
            x_pct: rng.random_range(0.0..=100.0),
            y_pct: rng.random_range(0.0..=100.0),
            size_px: rng.random_range(config.star_size_px.min..=config.star_size_px.max),
            opacity: rng.random_range(config.star_opacity.min..=config.star_opacity.max),
            duration_secs: rng
                .random_range(config.star_duration_secs.min..=config.star_duration_secs.max),
        })
        .collect()
}

/// Fill `container` with freshly generated stars.
pub fn populate(container: NodeId, config: &SiteConfig, seed: u64, ctx: &mut Context<'_>) -> usize {
    let mut rng = SmallRng::seed_from_u64(seed);
    let stars = generate(config, &mut rng);
    for star in &stars {
        let node = ctx.nodes.alloc();
        ctx.emit(DomCommand::CreateElement {
            node,
            parent: container,
            position: InsertPosition::Append,
            tag: Tag::Div,
            class: Some(ClassName::Star),
            text: None,
            styles: star.styles(),
            attributes: Vec::new(),
        });
    }
    debug!(count = stars.len(), "Starfield populated");
    stars.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Runtime;

    #[test]
    fn stars_stay_within_configured_ranges() {
        let config = SiteConfig::default();
        let mut rng = SmallRng::seed_from_u64(7);
        let stars = generate(&config, &mut rng);
        assert_eq!(stars.len(), 150);
        for star in &stars {
            assert!((0.0..=100.0).contains(&star.x_pct));
            assert!((0.0..=100.0).contains(&star.y_pct));
            assert!((0.5..=3.0).contains(&star.size_px));
            assert!((0.3..=1.0).contains(&star.opacity));
            assert!((2.0..=6.0).contains(&star.duration_secs));
        }
    }

    #[test]
    fn same_seed_same_sky() {
        let config = SiteConfig::default();
        let a = generate(&config, &mut SmallRng::seed_from_u64(42));
        let b = generate(&config, &mut SmallRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn populate_appends_star_elements() {
        let mut h = Runtime::default();
        let container = h.nodes.alloc();
        let config = SiteConfig {
            star_count: 3,
            ..SiteConfig::default()
        };
        assert_eq!(populate(container, &config, 1, &mut h.ctx()), 3);
        let out = h.drain();
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|c| matches!(
            c,
            DomCommand::CreateElement { parent, class: Some(ClassName::Star), .. } if *parent == container
        )));
    }

    #[test]
    fn star_styles_use_custom_properties() {
        let star = Star {
            x_pct: 12.5,
            y_pct: 50.0,
            size_px: 1.5,
            opacity: 0.75,
            duration_secs: 4.0,
        };
        let styles = star.styles();
        assert_eq!(styles[0].1, "12.500%".into());
        assert_eq!(styles[4].0.css_name(), "--opacity");
        assert_eq!(styles[5].1, "4.000s".into());
    }
}
