//! Jikan API v4 response types.
//!
//! Only the fields the browser projects into cards are modelled; everything
//! else in the payload is ignored by serde.

use serde::{Deserialize, Serialize};

/// Generic pagination wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub has_next_page: bool,
    /// Only the search endpoint reports totals
    #[serde(default)]
    pub items: Option<PaginationItems>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationItems {
    pub total: u32,
}

/// One manga entry as returned by `/manga` and `/top/manga`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MangaEntry {
    pub mal_id: u32,
    #[serde(default)]
    pub images: Option<MangaImages>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "type", default)]
    pub manga_type: Option<String>,
    #[serde(default)]
    pub volumes: Option<u32>,
    #[serde(default)]
    pub score: Option<f64>,
}

impl MangaEntry {
    /// Cover image URL (jpg variant)
    pub fn image_url(&self) -> Option<&str> {
        self.images
            .as_ref()
            .and_then(|images| images.jpg.as_ref())
            .and_then(|set| set.image_url.as_deref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MangaImages {
    #[serde(default)]
    pub jpg: Option<ImageSet>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageSet {
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Error response from Jikan API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JikanError {
    pub status: u16,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_PAGE: &str = r#"{
        "pagination": {
            "last_visible_page": 40,
            "has_next_page": true,
            "current_page": 1,
            "items": { "count": 2, "total": 958, "per_page": 24 }
        },
        "data": [
            {
                "mal_id": 11,
                "url": "https://myanimelist.net/manga/11/Naruto",
                "images": { "jpg": { "image_url": "https://cdn.myanimelist.net/images/manga/3/249658.jpg",
                                     "small_image_url": null, "large_image_url": null } },
                "title": "Naruto",
                "type": "Manga",
                "chapters": 700,
                "volumes": 72,
                "status": "Finished",
                "score": 8.07,
                "genres": [{ "mal_id": 1, "type": "manga", "name": "Action" }]
            },
            {
                "mal_id": 154059,
                "images": { "jpg": { "image_url": null } },
                "title": "Naruto: Konoha Shinden",
                "type": null,
                "volumes": null,
                "score": null
            }
        ]
    }"#;

    #[test]
    fn test_parse_search_page() {
        let page: PaginatedResponse<MangaEntry> = serde_json::from_str(SEARCH_PAGE).unwrap();

        assert!(page.pagination.has_next_page);
        assert_eq!(page.pagination.items.as_ref().map(|i| i.total), Some(958));
        assert_eq!(page.data.len(), 2);

        let naruto = &page.data[0];
        assert_eq!(naruto.mal_id, 11);
        assert_eq!(naruto.manga_type.as_deref(), Some("Manga"));
        assert_eq!(naruto.volumes, Some(72));
        assert_eq!(
            naruto.image_url(),
            Some("https://cdn.myanimelist.net/images/manga/3/249658.jpg")
        );

        let spin_off = &page.data[1];
        assert_eq!(spin_off.image_url(), None);
        assert_eq!(spin_off.score, None);
        assert_eq!(spin_off.manga_type, None);
    }

    #[test]
    fn test_parse_top_page_without_totals() {
        let json = r#"{ "data": [], "pagination": { "has_next_page": false } }"#;
        let page: PaginatedResponse<MangaEntry> = serde_json::from_str(json).unwrap();
        assert!(!page.pagination.has_next_page);
        assert!(page.pagination.items.is_none());
    }

    #[test]
    fn test_missing_pagination_is_rejected() {
        let json = r#"{ "data": [] }"#;
        assert!(serde_json::from_str::<PaginatedResponse<MangaEntry>>(json).is_err());
    }

    #[test]
    fn test_parse_error_body() {
        let json = r#"{ "status": 429, "type": "RateLimitException", "message": "You are being rate-limited." }"#;
        let err: JikanError = serde_json::from_str(json).unwrap();
        assert_eq!(err.status, 429);
        assert_eq!(err.message, "You are being rate-limited.");
    }
}
