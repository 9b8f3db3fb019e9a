use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Whether a transaction increases or decreases the account balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Credit,
    Debit,
}

/// Spending category vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Housing,
    Transportation,
    #[serde(rename = "Food & Dining", alias = "FoodAndDining")]
    FoodAndDining,
    Shopping,
    Utilities,
    Entertainment,
    Health,
    Education,
    Personal,
    Income,
    Investments,
    Debt,
    Miscellaneous,
}

impl Category {
    pub const ALL: [Category; 13] = [
        Category::Housing,
        Category::Transportation,
        Category::FoodAndDining,
        Category::Shopping,
        Category::Utilities,
        Category::Entertainment,
        Category::Health,
        Category::Education,
        Category::Personal,
        Category::Income,
        Category::Investments,
        Category::Debt,
        Category::Miscellaneous,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Housing => "Housing",
            Category::Transportation => "Transportation",
            Category::FoodAndDining => "Food & Dining",
            Category::Shopping => "Shopping",
            Category::Utilities => "Utilities",
            Category::Entertainment => "Entertainment",
            Category::Health => "Health",
            Category::Education => "Education",
            Category::Personal => "Personal",
            Category::Income => "Income",
            Category::Investments => "Investments",
            Category::Debt => "Debt",
            Category::Miscellaneous => "Miscellaneous",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Default rule table. The order is part of the contract: the first category with a
/// keyword found in the description wins, so `"LOAN BILL PAYMENT"` is `Utilities`
/// and not `Debt`.
const DEFAULT_CATEGORY_RULES: &[(Category, &[&str])] = &[
    (
        Category::Housing,
        &["house rent", "rent payment", "mortgage", "landlord", "lease payment", "housing"],
    ),
    (
        Category::Transportation,
        &[
            "uber", "bolt", "taxi", "fuel", "petrol", "filling station", "parking", "toll",
            "transport", "airline", "flight",
        ],
    ),
    (
        Category::FoodAndDining,
        &[
            "grocery", "groceries", "supermarket", "restaurant", "food", "cafe", "coffee",
            "eatery", "bakery", "pizza", "kfc", "dining",
        ],
    ),
    (
        Category::Shopping,
        &[
            "shopping", "amazon", "jumia", "konga", "boutique", "store", "pos purchase",
            "web purchase",
        ],
    ),
    (
        Category::Utilities,
        &[
            "electricity", "electric", "water", "internet", "airtime", "data bundle", "utility",
            "bill payment", "phcn", "mtn", "glo airtime", "glo data", "airtel",
        ],
    ),
    (
        Category::Entertainment,
        &[
            "netflix", "spotify", "dstv", "gotv", "showmax", "cinema", "movie", "concert",
            "betting",
        ],
    ),
    (
        Category::Health,
        &["hospital", "pharmacy", "clinic", "medical", "health", "dental", "doctor"],
    ),
    (
        Category::Education,
        &["school", "tuition", "university", "college", "course", "exam fee", "education"],
    ),
    (
        Category::Personal,
        &["salon", "barber", "spa ", "gym", "fitness", "cosmetics", "laundry", "personal"],
    ),
    (
        Category::Income,
        &["salary", "payroll", "wage", "bonus", "refund", "reversal", "commission", "income"],
    ),
    (
        Category::Investments,
        &[
            "invest", "stock", "shares", "dividend", "mutual fund", "treasury bill", "crypto",
            "brokerage", "savings",
        ],
    ),
    (
        Category::Debt,
        &[
            "loan", "repayment", "credit card payment", "debt", "installment", "overdraft",
            "interest charge",
        ],
    ),
];

/// Keywords which mark a transaction as money coming in.
const DEFAULT_CREDIT_KEYWORDS: &[&str] = &[
    "credit",
    "deposit",
    "transfer received",
    "inflow",
    "received",
];

/// One row of the category table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: Category,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new<S: Into<String>>(category: Category, keywords: impl IntoIterator<Item = S>) -> Self {
        Self {
            category,
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }

    fn matches(&self, description: &str) -> bool {
        self.keywords
            .iter()
            .any(|keyword| description.contains(keyword.as_str()))
    }
}

/// Ordered `(category, keywords)` table. Matching is a case-insensitive substring
/// search and the first matching rule wins, ties are never resolved by match length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CategoryRule>", into = "Vec<CategoryRule>")]
pub struct CategoryRules {
    rules: Vec<CategoryRule>,
}

impl CategoryRules {
    /// Keywords are lowercased and empty ones dropped, an empty keyword would match
    /// every description.
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|rule| CategoryRule {
                category: rule.category,
                keywords: lowercase_keywords(rule.keywords),
            })
            .collect();
        Self { rules }
    }

    /// Reads a table written as `[{"category": "Debt", "keywords": ["loan"]}, ...]`.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Position of the first rule for `category`, if the table has one.
    pub fn position(&self, category: Category) -> Option<usize> {
        self.rules.iter().position(|rule| rule.category == category)
    }

    pub fn classify(&self, description: &str) -> Option<Category> {
        let description = description.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&description))
            .map(|rule| rule.category)
    }
}

impl Default for CategoryRules {
    fn default() -> Self {
        Self::new(
            DEFAULT_CATEGORY_RULES
                .iter()
                .map(|(category, keywords)| CategoryRule::new(*category, keywords.iter().copied()))
                .collect(),
        )
    }
}

impl From<Vec<CategoryRule>> for CategoryRules {
    fn from(rules: Vec<CategoryRule>) -> Self {
        Self::new(rules)
    }
}

impl From<CategoryRules> for Vec<CategoryRule> {
    fn from(rules: CategoryRules) -> Self {
        rules.rules
    }
}

/// Credit keyword set. Statements rarely print a sign, so anything without one of
/// these keywords is a debit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct DirectionRules {
    credit_keywords: Vec<String>,
}

impl DirectionRules {
    pub fn new<S: Into<String>>(credit_keywords: impl IntoIterator<Item = S>) -> Self {
        Self {
            credit_keywords: lowercase_keywords(credit_keywords.into_iter().map(Into::into)),
        }
    }

    pub fn credit_keywords(&self) -> &[String] {
        &self.credit_keywords
    }

    pub fn classify(&self, description: &str) -> Direction {
        let description = description.to_lowercase();
        if self
            .credit_keywords
            .iter()
            .any(|keyword| description.contains(keyword.as_str()))
        {
            Direction::Credit
        } else {
            Direction::Debit
        }
    }
}

impl Default for DirectionRules {
    fn default() -> Self {
        Self::new(DEFAULT_CREDIT_KEYWORDS.iter().copied())
    }
}

impl From<Vec<String>> for DirectionRules {
    fn from(credit_keywords: Vec<String>) -> Self {
        Self::new(credit_keywords)
    }
}

impl From<DirectionRules> for Vec<String> {
    fn from(rules: DirectionRules) -> Self {
        rules.credit_keywords
    }
}

fn lowercase_keywords(keywords: impl IntoIterator<Item = String>) -> Vec<String> {
    keywords
        .into_iter()
        .map(|keyword| keyword.to_lowercase())
        .filter(|keyword| !keyword.is_empty())
        .collect()
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn should_classify_common_descriptions() {
        let rules = CategoryRules::default();
        assert_eq!(
            Some(Category::FoodAndDining),
            rules.classify("GROCERY MART")
        );
        assert_eq!(Some(Category::Income), rules.classify("SALARY CREDIT"));
        assert_eq!(
            Some(Category::Transportation),
            rules.classify("Uber trip Lagos")
        );
        assert_eq!(Some(Category::Debt), rules.classify("LOAN REPAYMENT"));
        assert_eq!(None, rules.classify("TRF TO J DOE"));
    }

    #[test]
    fn should_not_match_keywords_inside_unrelated_words() {
        let rules = CategoryRules::default();
        assert_eq!(None, rules.classify("GLOBAL ACCELEREX POS"));
        assert_eq!(None, rules.classify("SMALL CHOPS"));
        assert_eq!(None, rules.classify("PLEASE PAY J DOE"));
        assert_eq!(None, rules.classify("EXAMPLE LTD"));
        assert_eq!(Some(Category::Utilities), rules.classify("GLO AIRTIME TOP UP"));
        assert_eq!(Some(Category::Housing), rules.classify("SHOP LEASE PAYMENT"));
    }

    #[test]
    fn should_resolve_overlapping_keywords_by_table_order() {
        let rules = CategoryRules::default();
        let description = "QUICKCASH LOAN BILL PAYMENT";

        let utilities = rules.position(Category::Utilities).expect("utilities rule");
        let debt = rules.position(Category::Debt).expect("debt rule");
        assert!(utilities < debt);
        assert_eq!(Some(Category::Utilities), rules.classify(description));

        let reversed = CategoryRules::new(rules.rules().iter().rev().cloned().collect());
        assert_eq!(Some(Category::Debt), reversed.classify(description));
    }

    #[test]
    fn should_follow_the_documented_table_order() {
        let order: Vec<Category> = CategoryRules::default()
            .rules()
            .iter()
            .map(|rule| rule.category)
            .collect();
        assert_eq!(
            Category::ALL[..Category::ALL.len() - 1].to_vec(),
            order
        );
    }

    #[test]
    fn should_classify_deterministically() {
        let rules = CategoryRules::default();
        let first = rules.classify("NETFLIX.COM SUBSCRIPTION");
        for _ in 0..10 {
            assert_eq!(first, rules.classify("NETFLIX.COM SUBSCRIPTION"));
        }
        assert_eq!(Some(Category::Entertainment), first);
    }

    #[test]
    fn should_load_rules_from_json() {
        let rules = CategoryRules::from_json(
            r#"[
                {"category": "Debt", "keywords": ["LOAN", ""]},
                {"category": "Food & Dining", "keywords": ["Suya"]}
            ]"#,
        )
        .expect("rules");
        assert_eq!(
            vec![
                CategoryRule::new(Category::Debt, ["loan"]),
                CategoryRule::new(Category::FoodAndDining, ["suya"]),
            ],
            rules.rules().to_vec()
        );
        assert_eq!(Some(Category::FoodAndDining), rules.classify("MAMA SUYA SPOT"));
    }

    #[test]
    fn should_reject_unknown_categories_in_json() {
        assert!(CategoryRules::from_json(r#"[{"category": "Pets", "keywords": ["vet"]}]"#).is_err());
    }

    #[test]
    fn should_detect_credits_by_keyword() {
        let rules = DirectionRules::default();
        assert_eq!(Direction::Credit, rules.classify("SALARY CREDIT"));
        assert_eq!(Direction::Credit, rules.classify("Cash Deposit"));
        assert_eq!(Direction::Credit, rules.classify("NIP Transfer Received from A"));
        assert_eq!(Direction::Credit, rules.classify("inflow from savings"));
    }

    #[test]
    fn should_default_to_debit() {
        let rules = DirectionRules::default();
        assert_eq!(Direction::Debit, rules.classify("GROCERY MART"));
        assert_eq!(Direction::Debit, rules.classify(""));
    }

    #[test]
    fn should_serialize_labels() {
        assert_eq!(
            r#""Food & Dining""#,
            serde_json::to_string(&Category::FoodAndDining).expect("json")
        );
        assert_eq!(r#""debit""#, serde_json::to_string(&Direction::Debit).expect("json"));
        assert_eq!("Food & Dining", Category::FoodAndDining.to_string());
    }
}
