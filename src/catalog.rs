use serde::Serialize;
use std::collections::HashSet;

use crate::error::CatalogError;

/// One showcased project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortfolioItem {
    pub id: u32,
    pub title: String,
    pub category: String,
    pub date: String,
    pub description: String,
    /// Opaque locator of the video asset, relative to the static directory.
    pub media_ref: String,
}

impl PortfolioItem {
    pub fn new(
        id: u32,
        title: &str,
        category: &str,
        date: &str,
        description: &str,
        media_ref: &str,
    ) -> Self {
        Self {
            id,
            title: title.to_string(),
            category: category.to_string(),
            date: date.to_string(),
            description: description.to_string(),
            media_ref: media_ref.to_string(),
        }
    }
}

/// The fixed, ordered list of portfolio entries shown by the carousel.
///
/// Never empty and never mutated after construction, so index arithmetic
/// over it can always wrap modulo `len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    owner: String,
    items: Vec<PortfolioItem>,
}

impl Catalog {
    pub fn new(owner: impl Into<String>, items: Vec<PortfolioItem>) -> Result<Self, CatalogError> {
        if items.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for item in &items {
            if !seen.insert(item.id) {
                return Err(CatalogError::DuplicateId(item.id));
            }
        }
        Ok(Self {
            owner: owner.into(),
            items,
        })
    }

    /// The portfolio shipped with the site.
    pub fn builtin() -> Self {
        let items = vec![
            PortfolioItem::new(
                1,
                "TGI Intro",
                "Brand Identity",
                "2024 - Featured",
                "Dynamic introduction showcasing creative vision and brand identity through compelling visual storytelling",
                "media/tgi-intro.mp4",
            ),
            PortfolioItem::new(
                2,
                "Raleigh Event",
                "Event Coverage",
                "2024 - Live Coverage",
                "Professional event documentation capturing the energy and atmosphere of live experiences",
                "media/raleigh-event.mov",
            ),
            PortfolioItem::new(
                3,
                "Open Butterfly Jewelry",
                "Product Showcase",
                "2024 - Commercial",
                "Elegant jewelry showcase highlighting craftsmanship and beauty through artistic cinematography",
                "media/open-butterfly-jewelry.mov",
            ),
            PortfolioItem::new(
                4,
                "Lucy Lu's Boutique",
                "Fashion & Retail",
                "2024 - Fashion",
                "Fashion boutique presentation featuring style, elegance, and contemporary retail experience",
                "media/lucy-lus-boutique.mov",
            ),
            PortfolioItem::new(
                5,
                "Juicy Vybz",
                "Lifestyle Brand",
                "2024 - Lifestyle",
                "Vibrant lifestyle content capturing energy, culture, and authentic brand personality",
                "media/juicy-vybz.mov",
            ),
            PortfolioItem::new(
                6,
                "Calming Candles Aromatherapy",
                "Wellness & Lifestyle",
                "2024 - Wellness",
                "Serene wellness brand showcase emphasizing relaxation, mindfulness, and therapeutic experiences",
                "media/calming-candles-aromatherapy.mov",
            ),
            PortfolioItem::new(
                7,
                "A Great Day Candle Company",
                "Artisan Craft",
                "2024 - Artisan",
                "Artisan candle craftsmanship highlighting quality, ambiance, and handmade excellence",
                "media/a-great-day-candle-company.mov",
            ),
        ];
        Self {
            owner: "Kilah Oliver".to_string(),
            items,
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// First word of the owner's name, used in assistant copy.
    pub fn owner_first_name(&self) -> &str {
        self.owner.split_whitespace().next().unwrap_or(&self.owner)
    }

    pub fn items(&self) -> &[PortfolioItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Never true for a catalog built through `new` or `builtin`.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PortfolioItem> {
        self.items.get(index)
    }
}
