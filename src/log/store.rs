use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Quantities are clamped here instead of rejected; the UI steps in 0.5
/// increments and may drive the value arbitrarily low.
pub const MIN_QUANTITY: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Snacks,
    Dinner,
}

impl MealType {
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Snacks,
        MealType::Dinner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Snacks => "snacks",
            MealType::Dinner => "dinner",
        }
    }
}

/// Fixed four-slot record keyed by the closed `MealType` enum, so a missing
/// bucket is unrepresentable.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PerMeal<T> {
    pub breakfast: T,
    pub lunch: T,
    pub snacks: T,
    pub dinner: T,
}

impl<T> PerMeal<T> {
    pub fn get(&self, meal: MealType) -> &T {
        match meal {
            MealType::Breakfast => &self.breakfast,
            MealType::Lunch => &self.lunch,
            MealType::Snacks => &self.snacks,
            MealType::Dinner => &self.dinner,
        }
    }

    pub fn get_mut(&mut self, meal: MealType) -> &mut T {
        match meal {
            MealType::Breakfast => &mut self.breakfast,
            MealType::Lunch => &mut self.lunch,
            MealType::Snacks => &mut self.snacks,
            MealType::Dinner => &mut self.dinner,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (MealType, &T)> {
        MealType::ALL.into_iter().map(move |m| (m, self.get(m)))
    }
}

/// One logged entry. The four macro fields are per single `unit`; totals are
/// scaled by `quantity` at aggregation time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodItem {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl FoodItem {
    /// Ad-hoc entry with no catalog backing: zero nutrition, counted in pieces.
    pub fn custom(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: 1.0,
            unit: "pieces".to_string(),
            calories: 0.0,
            protein: 0.0,
            carbs: 0.0,
            fat: 0.0,
        }
    }
}

/// One meal bucket. The running totals are maintained exclusively by the
/// three mutation deltas below; they are never recomputed from the item list.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MealBucket {
    pub items: Vec<FoodItem>,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
}

impl MealBucket {
    /// Appends the item with quantity forced to 1 and bumps the totals by the
    /// raw per-unit values. Quantity is always 1 at add time, which is the
    /// only reason the unscaled increment is consistent with the scaled
    /// deltas used by `update_quantity` and `delete_item`.
    pub fn add_item(&mut self, mut item: FoodItem) {
        item.quantity = 1.0;
        self.total_calories += item.calories;
        self.total_protein += item.protein;
        self.total_carbs += item.carbs;
        self.total_fat += item.fat;
        self.items.push(item);
    }

    /// Steps the quantity of the item at `index` by `delta`, clamped to
    /// `MIN_QUANTITY`, and applies the scaled nutrition delta to the totals.
    /// Out-of-range indices are a no-op; the caller only ever issues indices
    /// it rendered, so this is not an error.
    pub fn update_quantity(&mut self, index: usize, delta: f64) -> bool {
        let Some(item) = self.items.get_mut(index) else {
            return false;
        };
        let new_quantity = (item.quantity + delta).max(MIN_QUANTITY);
        let step = new_quantity - item.quantity;
        item.quantity = new_quantity;
        self.total_calories += step * item.calories;
        self.total_protein += step * item.protein;
        self.total_carbs += step * item.carbs;
        self.total_fat += step * item.fat;
        true
    }

    /// Removes the item at `index`, deducting its full quantity-scaled
    /// contribution. Out-of-range is a no-op.
    pub fn delete_item(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        let item = self.items.remove(index);
        self.total_calories -= item.calories * item.quantity;
        self.total_protein -= item.protein * item.quantity;
        self.total_carbs -= item.carbs * item.quantity;
        self.total_fat -= item.fat * item.quantity;
        true
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The four buckets for one logged day. The date is display-only; it does not
/// gate which bucket is visible or writable.
#[derive(Debug, Clone, Serialize)]
pub struct DailyLog {
    pub date: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub meals: PerMeal<MealBucket>,
}

impl DailyLog {
    pub fn new(date: Option<String>) -> Self {
        Self {
            date,
            created_at: OffsetDateTime::now_utc(),
            meals: PerMeal::default(),
        }
    }

    pub fn bucket(&self, meal: MealType) -> &MealBucket {
        self.meals.get(meal)
    }

    pub fn bucket_mut(&mut self, meal: MealType) -> &mut MealBucket {
        self.meals.get_mut(meal)
    }

    pub fn clear_all(&mut self) {
        self.meals = PerMeal::default();
    }

    /// Fraction of buckets with at least one entry, 0.0..=1.0. A logging
    /// progress indicator, not a nutritional completeness metric.
    pub fn progress(&self) -> f64 {
        let logged = self.meals.iter().filter(|(_, b)| !b.is_empty()).count();
        logged as f64 / MealType::ALL.len() as f64
    }

    /// Item names per bucket, in display order. This is all the submission
    /// upstream receives; quantities and macros stay local.
    pub fn names(&self) -> PerMeal<Vec<String>> {
        let collect = |meal| {
            self.bucket(meal)
                .items
                .iter()
                .map(|i| i.name.clone())
                .collect()
        };
        PerMeal {
            breakfast: collect(MealType::Breakfast),
            lunch: collect(MealType::Lunch),
            snacks: collect(MealType::Snacks),
            dinner: collect(MealType::Dinner),
        }
    }
}
