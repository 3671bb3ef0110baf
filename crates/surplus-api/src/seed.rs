use anyhow::Result;
use chrono::{Duration, Utc};
use tracing::info;

use surplus_db::ListingRepository;
use surplus_types::models::NewListing;

/// Fills an empty store with three demo listings. Returns how many were added.
pub fn seed_samples_if_empty(listings: &dyn ListingRepository) -> Result<usize> {
    if !listings.list()?.is_empty() {
        return Ok(0);
    }

    let now = Utc::now();
    let samples = [
        (
            "Vegetable Biryani",
            "25 servings",
            "Downtown Community Center, Main Street",
            Duration::hours(4),
            "Cooked Meal",
            "Freshly prepared with seasonal vegetables. Contains nuts.",
            Duration::hours(2),
            "Sample Restaurant",
        ),
        (
            "Fresh Fruit Platter",
            "50 pieces",
            "Green Market, Park Avenue",
            Duration::hours(6),
            "Fresh Produce",
            "Assorted seasonal fruits - apples, oranges, bananas",
            Duration::hours(1),
            "Local Grocery Store",
        ),
        (
            "Sandwich Assortment",
            "30 pieces",
            "City Hall Cafeteria, Central Plaza",
            Duration::hours(3),
            "Packaged Food",
            "Various sandwiches - turkey, ham, vegetarian options available",
            Duration::minutes(30),
            "Office Catering Co.",
        ),
    ];

    let count = samples.len();
    for (name, quantity, location, pickup_in, food_type, info, posted_ago, donor) in samples {
        listings.append(NewListing {
            food_name: name.to_string(),
            quantity: quantity.to_string(),
            location: location.to_string(),
            expiry_time: (now + pickup_in).to_rfc3339(),
            food_type: food_type.to_string(),
            additional_info: info.to_string(),
            donor: donor.to_string(),
            posted_date: Some(now - posted_ago),
        })?;
    }

    info!("Sample food data added ({} listings)", count);
    Ok(count)
}
