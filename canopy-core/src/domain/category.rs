//! Personal finance category constants
//!
//! The primary category set follows the aggregator's nomenclature
//! (Plaid-style personal finance categories). Rules assign one of these
//! to matching transactions; unknown values fall back to `OTHER`.

/// Fallback category for anything unrecognized
pub const OTHER: &str = "OTHER";

/// All known primary categories, in display order
pub const PERSONAL_FINANCE_CATEGORIES: [&str; 18] = [
    "INCOME",
    "LOAN_DISBURSEMENTS",
    "LOAN_PAYMENTS",
    "TRANSFER_IN",
    "TRANSFER_OUT",
    "BANK_FEES",
    "ENTERTAINMENT",
    "FOOD_AND_DRINK",
    "GENERAL_MERCHANDISE",
    "HOME_IMPROVEMENT",
    "MEDICAL",
    "PERSONAL_CARE",
    "GENERAL_SERVICES",
    "GOVERNMENT_AND_NON_PROFIT",
    "TRANSPORTATION",
    "TRAVEL",
    "RENT_AND_UTILITIES",
    "OTHER",
];

/// Whether the given string is a known primary category
pub fn is_valid_category(category: &str) -> bool {
    PERSONAL_FINANCE_CATEGORIES.contains(&category)
}

/// Human-readable label for a category; unknown values read as "Other"
pub fn category_label(category: &str) -> &'static str {
    match category {
        "INCOME" => "Income",
        "LOAN_DISBURSEMENTS" => "Loan Disbursements",
        "LOAN_PAYMENTS" => "Loan Payments",
        "TRANSFER_IN" => "Transfer In",
        "TRANSFER_OUT" => "Transfer Out",
        "BANK_FEES" => "Bank Fees",
        "ENTERTAINMENT" => "Entertainment",
        "FOOD_AND_DRINK" => "Food & Drink",
        "GENERAL_MERCHANDISE" => "General Merchandise",
        "HOME_IMPROVEMENT" => "Home Improvement",
        "MEDICAL" => "Medical",
        "PERSONAL_CARE" => "Personal Care",
        "GENERAL_SERVICES" => "General Services",
        "GOVERNMENT_AND_NON_PROFIT" => "Government & Non-Profit",
        "TRANSPORTATION" => "Transportation",
        "TRAVEL" => "Travel",
        "RENT_AND_UTILITIES" => "Rent & Utilities",
        _ => "Other",
    }
}
