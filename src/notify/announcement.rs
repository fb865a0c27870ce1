// src/notify/announcement.rs
use crate::catalog::{Creator, CreatorType, ItemDetail, ItemId};

/// Builds public links to items and creators.
#[derive(Debug, Clone)]
pub struct SiteLinks {
    base: String,
}

impl SiteLinks {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn item_url(&self, id: &ItemId) -> String {
        format!("{}/catalog/{}/", self.base, id)
    }

    /// Users link to their profile; groups (and anything unrecognised) to the group page.
    pub fn creator_url(&self, creator: &Creator) -> String {
        match creator.kind {
            CreatorType::User => format!("{}/users/{}/profile", self.base, creator.target_id),
            CreatorType::Group | CreatorType::Unknown => {
                format!("{}/groups/{}", self.base, creator.target_id)
            }
        }
    }
}

/// Everything one announcement shows, independent of the sink's wire format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub title: String,
    pub url: String,
    pub description: String,
    pub thumbnail_url: String,
    pub price_label: String,
    pub creator_name: String,
    pub creator_url: String,
}

impl Announcement {
    pub fn build(
        detail: &ItemDetail,
        thumbnail_url: &str,
        links: &SiteLinks,
        price_prefix: &str,
    ) -> Self {
        let price_label = match (detail.is_purchasable, detail.price) {
            (true, Some(p)) => format!("{price_prefix}{p}"),
            // purchasable but the API sent no price: treat as free
            (true, None) => format!("{price_prefix}0"),
            (false, _) => format!("{price_prefix}Offsale"),
        };

        Self {
            title: detail.name.clone(),
            url: links.item_url(&detail.id),
            description: detail.description.clone(),
            thumbnail_url: thumbnail_url.to_string(),
            price_label,
            creator_name: detail.creator.name.clone(),
            creator_url: links.creator_url(&detail.creator),
        }
    }

    /// Markdown link to the creator, e.g. `[Builders](https://…/groups/77)`.
    pub fn creator_link(&self) -> String {
        format!("[{}]({})", self.creator_name, self.creator_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(kind: CreatorType, purchasable: bool, price: Option<i64>) -> ItemDetail {
        ItemDetail {
            id: ItemId::from(1001),
            name: "Neon Wings".into(),
            description: "glows".into(),
            is_purchasable: purchasable,
            price,
            creator: Creator {
                kind,
                target_id: 55,
                name: "Maker".into(),
            },
        }
    }

    #[test]
    fn group_creator_links_to_group_page() {
        let links = SiteLinks::new("https://site.test/");
        let a = Announcement::build(&detail(CreatorType::Group, true, Some(75)), "", &links, "R$");
        assert_eq!(a.creator_url, "https://site.test/groups/55");
        assert_eq!(a.creator_link(), "[Maker](https://site.test/groups/55)");
        assert_eq!(a.url, "https://site.test/catalog/1001/");
    }

    #[test]
    fn user_creator_links_to_profile() {
        let links = SiteLinks::new("https://site.test");
        let a = Announcement::build(&detail(CreatorType::User, true, Some(75)), "", &links, "R$");
        assert_eq!(a.creator_url, "https://site.test/users/55/profile");
    }

    #[test]
    fn price_label_reflects_purchasability() {
        let links = SiteLinks::new("https://site.test");
        let on_sale = Announcement::build(&detail(CreatorType::User, true, Some(75)), "", &links, "R$");
        assert_eq!(on_sale.price_label, "R$75");

        let offsale = Announcement::build(&detail(CreatorType::User, false, Some(75)), "", &links, "R$");
        assert_eq!(offsale.price_label, "R$Offsale");
    }
}
