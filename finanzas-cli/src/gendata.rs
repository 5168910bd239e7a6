//! Synthetic native-format dataset for trying the tool without real statements

use chrono::NaiveDate;
use finanzas_core::Transaction;
use rand::Rng;

type Subcategories = &'static [(&'static str, &'static [&'static str])];

const CATEGORIES: &[(&str, Subcategories)] = &[
    (
        "Housing",
        &[
            ("Rent", &["Apartment Rent", "Deposit"]),
            ("Utilities", &["Electricity", "Water", "Gas", "Internet"]),
            ("Maintenance", &["Repairs", "Cleaning", "Furniture"]),
        ],
    ),
    (
        "Food",
        &[
            ("Supermarket", &["Mercadona", "Carrefour", "Lidl", "Dia"]),
            ("Restaurants", &["Restaurant", "Bar", "Cafe"]),
            ("Takeaway", &["Glovo", "Uber Eats", "Just Eat"]),
        ],
    ),
    (
        "Transport",
        &[
            ("Public", &["Metro", "Bus", "Taxi"]),
            ("Private", &["Gas", "Parking", "Car Maintenance"]),
        ],
    ),
    (
        "Leisure",
        &[
            ("Entertainment", &["Cinema", "Theater", "Concerts"]),
            ("Sports", &["Gym", "Sports Equipment"]),
            ("Travel", &["Flights", "Hotel", "Activities"]),
        ],
    ),
    (
        "Subscriptions",
        &[
            ("Streaming", &["Netflix", "Spotify", "HBO"]),
            ("Software", &["Adobe", "Microsoft", "iCloud"]),
        ],
    ),
    (
        "Income",
        &[
            ("Salary", &["Salary", "Bonus"]),
            ("Other", &["Refund", "Gift", "Reimbursement"]),
        ],
    ),
];

/// Typical amount range per category (min, max)
fn amount_range(category: &str) -> (f64, f64) {
    match category {
        "Housing" => (-1200.0, -400.0),
        "Food" => (-500.0, -20.0),
        "Transport" => (-200.0, -10.0),
        "Leisure" => (-300.0, -15.0),
        "Subscriptions" => (-50.0, -5.0),
        "Income" => (1000.0, 3000.0),
        _ => (-100.0, -1.0),
    }
}

fn round_cents(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Between `per_day.0` and `per_day.1` random rows for every day in
/// `[start, end]`, with a running balance starting at `initial_balance`.
pub fn generate_transactions<R: Rng>(
    rng: &mut R,
    start: NaiveDate,
    end: NaiveDate,
    initial_balance: f64,
    per_day: (usize, usize),
) -> Vec<Transaction> {
    let (lo, hi) = if per_day.0 <= per_day.1 { per_day } else { (per_day.1, per_day.0) };
    let mut out = Vec::new();
    let mut balance = initial_balance;

    for date in start.iter_days().take_while(|d| *d <= end) {
        for _ in 0..rng.gen_range(lo..=hi) {
            let (category, subs) = CATEGORIES[rng.gen_range(0..CATEGORIES.len())];
            let (subcategory, concepts) = subs[rng.gen_range(0..subs.len())];
            let concept = concepts[rng.gen_range(0..concepts.len())];

            let (min, max) = amount_range(category);
            let amount = round_cents(rng.gen_range(min..max));
            balance += amount;

            out.push(
                Transaction::new(date, concept, amount, round_cents(balance))
                    .with_category(category, subcategory)
                    .with_subscription(category == "Subscriptions"),
            );
        }
    }
    out
}
