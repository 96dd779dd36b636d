use serde::Serialize;

use crate::carousel::Direction;
use crate::catalog::PortfolioItem;

/// One navigation dot under the player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dot {
    pub index: usize,
    pub active: bool,
}

/// Everything the page needs to draw the current slide. Built fresh on every
/// transition; it holds no state of its own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModel {
    pub id: u32,
    pub title: String,
    pub category: String,
    pub date: String,
    pub description: String,
    pub media_url: String,
    pub index: usize,
    pub position: usize,
    pub total: usize,
    pub position_label: String,
    pub counter: String,
    pub progress_percent: f64,
    pub dots: Vec<Dot>,
    pub direction: Direction,
}

impl ViewModel {
    pub fn build(item: &PortfolioItem, index: usize, total: usize, direction: Direction) -> Self {
        let position = index + 1;
        Self {
            id: item.id,
            title: item.title.clone(),
            category: item.category.clone(),
            date: item.date.clone(),
            description: item.description.clone(),
            media_url: format!("/static/{}", item.media_ref),
            index,
            position,
            total,
            position_label: format!("{} of {}", position, total),
            counter: format!("{:02} / {:02}", position, total),
            progress_percent: position as f64 / total as f64 * 100.0,
            dots: (0..total)
                .map(|i| Dot {
                    index: i,
                    active: i == index,
                })
                .collect(),
            direction,
        }
    }
}

/// Playback time as `m:ss`.
pub fn format_timestamp(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let whole = seconds.floor() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_view_model() {
        let item = PortfolioItem::new(3, "Open Butterfly Jewelry", "Product Showcase", "2024", "Jewelry", "media/obj.mov");
        let view = ViewModel::build(&item, 2, 7, Direction::Forward);

        assert_eq!(view.title, "Open Butterfly Jewelry");
        assert_eq!(view.media_url, "/static/media/obj.mov");
        assert_eq!(view.position, 3);
        assert_eq!(view.position_label, "3 of 7");
        assert_eq!(view.counter, "03 / 07");
        assert!((view.progress_percent - 300.0 / 7.0).abs() < 1e-9);
        assert_eq!(view.dots.len(), 7);
        assert_eq!(view.dots.iter().filter(|d| d.active).count(), 1);
        assert!(view.dots[2].active);
    }

    #[test]
    fn test_last_item_is_full_progress() {
        let item = PortfolioItem::new(1, "Only", "Solo", "2024", "Alone", "a.mp4");
        let view = ViewModel::build(&item, 0, 1, Direction::Initial);
        assert_eq!(view.progress_percent, 100.0);
        assert_eq!(view.counter, "01 / 01");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "0:00");
        assert_eq!(format_timestamp(9.9), "0:09");
        assert_eq!(format_timestamp(65.2), "1:05");
        assert_eq!(format_timestamp(600.0), "10:00");
        assert_eq!(format_timestamp(f64::NAN), "0:00");
        assert_eq!(format_timestamp(-3.0), "0:00");
    }
}
