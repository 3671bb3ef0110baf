use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;
use tracing::debug;

use surplus_types::events::{INTENDED_PAGE_KEY, LISTINGS_KEY, SESSION_KEY, USERS_KEY};
use surplus_types::models::{FoodListing, Identity, ListingStatus, NewListing, Session};
use surplus_types::pages::Page;

use crate::Database;
use crate::kv;

/// The shared listing collection, stored whole under `surplusFoods`.
pub trait ListingRepository: Send + Sync {
    /// All listings in append order.
    fn list(&self) -> Result<Vec<FoodListing>>;

    fn get(&self, id: i64) -> Result<Option<FoodListing>>;

    /// Stores a new available listing and returns it with its assigned id.
    fn append(&self, listing: NewListing) -> Result<FoodListing>;

    /// Moves a listing forward to `status`. Unknown ids and backward
    /// transitions are silently ignored.
    fn set_status(&self, id: i64, status: ListingStatus) -> Result<()>;

    /// Moves an available listing to requested in one transaction and
    /// returns the listing as it was before, or `None` for an unknown id.
    fn mark_requested(&self, id: i64) -> Result<Option<FoodListing>>;
}

/// The single active session plus the deferred redirect target.
pub trait SessionRepository: Send + Sync {
    fn current(&self) -> Result<Option<Session>>;
    fn save(&self, session: &Session) -> Result<()>;
    fn clear(&self) -> Result<()>;
    fn remember_intended_page(&self, page: Page) -> Result<()>;
    /// Returns and clears the remembered page.
    fn take_intended_page(&self) -> Result<Option<Page>>;
}

/// Append-only account registry. Usernames are not unique.
pub trait IdentityRepository: Send + Sync {
    fn register(&self, identity: Identity) -> Result<()>;
    /// Most recently registered identity with this username.
    fn find(&self, username: &str) -> Result<Option<Identity>>;
}

// -- Listings --

impl ListingRepository for Database {
    fn list(&self) -> Result<Vec<FoodListing>> {
        self.with_conn(read_listings)
    }

    fn get(&self, id: i64) -> Result<Option<FoodListing>> {
        let listings = self.with_conn(read_listings)?;
        Ok(listings.into_iter().find(|l| l.id == id))
    }

    fn append(&self, listing: NewListing) -> Result<FoodListing> {
        self.with_conn_mut(|conn| {
            let mut listings = read_listings(conn)?;
            let now = Utc::now();
            let id = next_listing_id(&listings, now.timestamp_millis());
            let listing = listing.into_listing(id, now);
            listings.push(listing.clone());
            kv::write_json(conn, LISTINGS_KEY, &listings)?;
            debug!("Appended listing {} ({})", listing.id, listing.food_name);
            Ok(listing)
        })
    }

    fn set_status(&self, id: i64, status: ListingStatus) -> Result<()> {
        self.with_conn_mut(|conn| {
            let mut listings = read_listings(conn)?;
            let Some(listing) = listings.iter_mut().find(|l| l.id == id) else {
                debug!("set_status: no listing {}", id);
                return Ok(());
            };
            if !listing.status.can_transition_to(status) {
                debug!(
                    "set_status: refusing {} -> {} for listing {}",
                    listing.status.as_str(),
                    status.as_str(),
                    id
                );
                return Ok(());
            }
            listing.status = status;
            kv::write_json(conn, LISTINGS_KEY, &listings)
        })
    }

    fn mark_requested(&self, id: i64) -> Result<Option<FoodListing>> {
        self.with_conn_mut(|conn| {
            let mut listings = read_listings(conn)?;
            let Some(listing) = listings.iter_mut().find(|l| l.id == id) else {
                return Ok(None);
            };
            let before = listing.clone();
            if listing.status == ListingStatus::Available {
                listing.status = ListingStatus::Requested;
                kv::write_json(conn, LISTINGS_KEY, &listings)?;
            }
            Ok(Some(before))
        })
    }
}

fn read_listings(conn: &Connection) -> Result<Vec<FoodListing>> {
    Ok(kv::read_json(conn, LISTINGS_KEY)?.unwrap_or_default())
}

/// Ids are creation timestamps in milliseconds, bumped past the largest
/// existing id so two creations in the same millisecond cannot collide.
fn next_listing_id(existing: &[FoodListing], now_millis: i64) -> i64 {
    let max = existing.iter().map(|l| l.id).max().unwrap_or(i64::MIN);
    now_millis.max(max.saturating_add(1))
}

// -- Session --

impl SessionRepository for Database {
    fn current(&self) -> Result<Option<Session>> {
        self.with_conn(|conn| kv::read_json(conn, SESSION_KEY))
    }

    fn save(&self, session: &Session) -> Result<()> {
        self.with_conn_mut(|conn| kv::write_json(conn, SESSION_KEY, session))
    }

    fn clear(&self) -> Result<()> {
        self.with_conn_mut(|conn| kv::remove_item(conn, SESSION_KEY))
    }

    fn remember_intended_page(&self, page: Page) -> Result<()> {
        self.with_conn_mut(|conn| kv::set_item(conn, INTENDED_PAGE_KEY, page.token()))
    }

    fn take_intended_page(&self) -> Result<Option<Page>> {
        self.with_conn_mut(|conn| {
            let raw = kv::get_item(conn, INTENDED_PAGE_KEY)?;
            if raw.is_some() {
                kv::remove_item(conn, INTENDED_PAGE_KEY)?;
            }
            Ok(raw.as_deref().and_then(Page::from_token))
        })
    }
}

// -- Identities --

impl IdentityRepository for Database {
    fn register(&self, identity: Identity) -> Result<()> {
        self.with_conn_mut(|conn| {
            let mut users = read_identities(conn)?;
            users.push(identity);
            kv::write_json(conn, USERS_KEY, &users)
        })
    }

    fn find(&self, username: &str) -> Result<Option<Identity>> {
        let users = self.with_conn(read_identities)?;
        Ok(users.into_iter().rev().find(|u| u.username == username))
    }
}

fn read_identities(conn: &Connection) -> Result<Vec<Identity>> {
    Ok(kv::read_json(conn, USERS_KEY)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use surplus_types::models::UserType;

    fn new_listing(name: &str, donor: &str) -> NewListing {
        NewListing {
            food_name: name.to_string(),
            quantity: "25 servings".to_string(),
            location: "Main Street".to_string(),
            expiry_time: "2026-10-18T18:00".to_string(),
            food_type: "Cooked Meal".to_string(),
            additional_info: String::new(),
            donor: donor.to_string(),
            posted_date: None,
        }
    }

    #[test]
    fn empty_store_lists_nothing() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.list().unwrap().is_empty());
    }

    #[test]
    fn append_then_list_round_trips() {
        let db = Database::open_in_memory().unwrap();
        let stored = db.append(new_listing("Vegetable Biryani", "alice")).unwrap();

        let listed = db.list().unwrap();
        assert_eq!(listed, vec![stored.clone()]);
        assert_eq!(stored.food_name, "Vegetable Biryani");
        assert_eq!(stored.status, ListingStatus::Available);
    }

    #[test]
    fn rapid_appends_get_distinct_ids_in_order() {
        let db = Database::open_in_memory().unwrap();
        for i in 0..20 {
            db.append(new_listing(&format!("item {i}"), "alice")).unwrap();
        }

        let listed = db.list().unwrap();
        let ids: Vec<i64> = listed.iter().map(|l| l.id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(listed[0].food_name, "item 0");
        assert_eq!(listed[19].food_name, "item 19");
    }

    #[test]
    fn next_id_prefers_clock_when_ahead() {
        assert_eq!(next_listing_id(&[], 1_000), 1_000);
        let existing = new_listing("x", "a").into_listing(5_000, Utc::now());
        assert_eq!(next_listing_id(&[existing], 1_000), 5_001);
    }

    #[test]
    fn set_status_moves_forward_only() {
        let db = Database::open_in_memory().unwrap();
        let stored = db.append(new_listing("Soup", "alice")).unwrap();

        db.set_status(stored.id, ListingStatus::Requested).unwrap();
        assert_eq!(db.get(stored.id).unwrap().unwrap().status, ListingStatus::Requested);

        db.set_status(stored.id, ListingStatus::Available).unwrap();
        assert_eq!(db.get(stored.id).unwrap().unwrap().status, ListingStatus::Requested);
    }

    #[test]
    fn set_status_on_unknown_id_is_silent() {
        let db = Database::open_in_memory().unwrap();
        let stored = db.append(new_listing("Soup", "alice")).unwrap();

        db.set_status(stored.id + 1, ListingStatus::Requested).unwrap();
        assert_eq!(db.list().unwrap()[0].status, ListingStatus::Available);
    }

    #[test]
    fn mark_requested_reports_previous_state() {
        let db = Database::open_in_memory().unwrap();
        let stored = db.append(new_listing("Soup", "alice")).unwrap();

        let before = db.mark_requested(stored.id).unwrap().unwrap();
        assert_eq!(before.status, ListingStatus::Available);
        assert_eq!(db.get(stored.id).unwrap().unwrap().status, ListingStatus::Requested);

        let again = db.mark_requested(stored.id).unwrap().unwrap();
        assert_eq!(again.status, ListingStatus::Requested);
        assert!(db.mark_requested(stored.id + 1).unwrap().is_none());
    }

    #[test]
    fn concurrent_mark_requested_has_one_winner() {
        let db = std::sync::Arc::new(Database::open_in_memory().unwrap());
        let id = db.append(new_listing("Soup", "alice")).unwrap().id;

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let db = db.clone();
                std::thread::spawn(move || db.mark_requested(id).unwrap().unwrap().status)
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|s| *s == ListingStatus::Available)
            .count();
        assert_eq!(winners, 1);
    }

    #[test]
    fn intended_page_is_consumed_once() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.take_intended_page().unwrap(), None);

        db.remember_intended_page(Page::Donor).unwrap();
        assert_eq!(db.take_intended_page().unwrap(), Some(Page::Donor));
        assert_eq!(db.take_intended_page().unwrap(), None);
    }

    #[test]
    fn session_save_and_clear() {
        let db = Database::open_in_memory().unwrap();
        db.save(&Session::new("alice", UserType::Donor)).unwrap();
        db.save(&Session::new("bob", UserType::Receiver)).unwrap();

        let current = db.current().unwrap().unwrap();
        assert_eq!(current.username, "bob");

        db.clear().unwrap();
        assert!(db.current().unwrap().is_none());
    }

    #[test]
    fn registry_allows_duplicate_usernames() {
        let db = Database::open_in_memory().unwrap();
        for hash in ["first", "second"] {
            db.register(Identity {
                username: "sam".into(),
                password: hash.into(),
                user_type: UserType::Donor,
            })
            .unwrap();
        }

        assert_eq!(db.with_conn(read_identities).unwrap().len(), 2);
        assert_eq!(db.find("sam").unwrap().unwrap().password, "second");
        assert!(db.find("nobody").unwrap().is_none());
    }
}
