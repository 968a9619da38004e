//! News source scrapers.
//!
//! Each scraper turns a search term into a list of raw
//! [`ListingItem`](crate::models::ListingItem)s; resolution and filtering
//! happen later in [`pipeline`](crate::pipeline).
//!
//! | Source | Module | Method |
//! |--------|--------|--------|
//! | Google News | [`google_news`] | HTML search results |

pub mod google_news;
